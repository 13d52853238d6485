#![forbid(unsafe_code)]

//! Lifecycle edge cases: overlapping dialogs, panics, teardown at awkward
//! moments, and re-entry policies.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use modalkit_core::{ElementKind, NodeFlags, NodeId};
use modalkit_harness::strategies::{ClickTargets, steps};
use modalkit_harness::{
    Awaiter, BackgroundPage, action_button, active, click, escape, find_by_text, page_state,
    settle, show, tab,
};
use modalkit_widgets::modal::guard::{holders, is_scroll_locked};
use modalkit_widgets::modal::{
    ConfirmDialog, ConfirmOptions, ContentScope, DialogError, FormDialog, FormHandle,
    FormOptions, FormScope, ModalAction, ModalConfig, ModalController, ModalRequest, Phase,
    ReentryPolicy,
};
use proptest::prelude::*;

fn doc_holders(bg: &BackgroundPage) -> usize {
    holders(bg.page.document().borrow().id())
}

fn scroll_locked(bg: &BackgroundPage) -> bool {
    is_scroll_locked(&bg.page.document().borrow())
}

// ============================================================================
// Overlapping dialogs
// ============================================================================

#[test]
fn stacked_controllers_share_page_effects() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let before = page_state(&page.document().borrow());
    let outer = ConfirmDialog::new(page);
    let inner = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();

    let first = awaiter.watch(outer.open(ConfirmOptions::new().title("Outer")).expect("opens"));
    show(page);
    let second = awaiter.watch(inner.open(ConfirmOptions::new().title("Inner")).expect("opens"));
    show(page);
    assert_eq!(doc_holders(&bg), 2);

    // The newest dialog receives keys first.
    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(second.get(), Some(false));
    assert!(!first.is_resolved());
    assert_eq!(outer.phase(), Phase::Visible);
    assert_eq!(doc_holders(&bg), 1);
    assert!(scroll_locked(&bg));

    let panel = outer.controller().nodes().expect("mounted").panel;
    click(page, action_button(page, panel, ModalAction::Confirm).expect("confirm"));
    settle(page);
    awaiter.run();
    assert_eq!(first.get(), Some(true));
    assert_eq!(doc_holders(&bg), 0);
    assert!(!scroll_locked(&bg));
    assert_eq!(page_state(&page.document().borrow()), before);
}

#[test]
fn hidden_form_yields_to_nested_confirm() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let form = FormDialog::<String>::new(page);
    let confirm = ConfirmDialog::new(page);
    let handle_slot = Rc::new(RefCell::new(None::<FormHandle<String>>));
    let mut awaiter = Awaiter::new();

    let options = {
        let handle_slot = Rc::clone(&handle_slot);
        FormOptions::new()
            .title("Edit")
            .render_form(move |scope: FormScope<'_, String>| {
                *handle_slot.borrow_mut() = Some(scope.handle);
            })
    };
    let edited = awaiter.watch(form.open(options).expect("opens"));
    show(page);
    let form_panel = form.controller().nodes().expect("mounted").panel;
    let handle = handle_slot.borrow_mut().take().expect("render fn ran");

    handle.on_hide();
    let sure = awaiter.watch(confirm.open(ConfirmOptions::new()).expect("opens"));
    show(page);
    assert_eq!(doc_holders(&bg), 2);
    assert_eq!(page.events().len(), 1);

    let confirm_panel = confirm.controller().nodes().expect("mounted").panel;
    click(page, action_button(page, confirm_panel, ModalAction::Confirm).expect("confirm"));
    settle(page);
    awaiter.run();
    assert_eq!(sure.get(), Some(true));
    assert_eq!(doc_holders(&bg), 1);
    assert!(scroll_locked(&bg));

    handle.on_show();
    {
        let doc = page.document().borrow();
        let focused = doc.active_element().expect("focus restored into form");
        assert!(doc.contains(form_panel, focused));
    }
    handle.on_confirm("saved".to_owned());
    settle(page);
    awaiter.run();
    assert_eq!(edited.get(), Some(Some("saved".to_owned())));
    assert_eq!(doc_holders(&bg), 0);
    assert_eq!(active(page), Some(bg.trigger));
}

// ============================================================================
// Panics
// ============================================================================

#[test]
fn panicking_hook_still_resolves() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(
        dialog
            .open(ConfirmOptions::new().on_confirm(|| panic!("hook failed")))
            .expect("opens"),
    );
    show(page);
    let panel = dialog.controller().nodes().expect("mounted").panel;
    let confirm = action_button(page, panel, ModalAction::Confirm).expect("confirm");

    let result = catch_unwind(AssertUnwindSafe(|| click(page, confirm)));
    assert!(result.is_err());
    assert_eq!(dialog.phase(), Phase::Closing);

    settle(page);
    awaiter.run();
    assert_eq!(outcome.get(), Some(true));
    assert_eq!(doc_holders(&bg), 0);
    assert_eq!(page.events().len(), 0);
}

#[test]
fn panicking_render_rolls_back_and_controller_recovers() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let before = page_state(&page.document().borrow());
    let dialog = FormDialog::<u8>::new(page);

    let result = catch_unwind(AssertUnwindSafe(|| {
        dialog.open(
            FormOptions::new().render_form(|_scope: FormScope<'_, u8>| panic!("render failed")),
        )
    }));
    assert!(result.is_err());
    assert_eq!(dialog.phase(), Phase::Closed);
    assert_eq!(doc_holders(&bg), 0);
    assert_eq!(page.events().len(), 0);
    assert_eq!(page_state(&page.document().borrow()), before);

    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(dialog.open(FormOptions::new()).expect("usable again"));
    show(page);
    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(outcome.get(), Some(None));
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn teardown_while_pending_resolves_cancel() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));

    // Still Opening.
    dialog.dispose();
    awaiter.run();
    assert_eq!(outcome.get(), Some(false));
    assert_eq!(doc_holders(&bg), 0);
    assert_eq!(page.scheduler().run_until_idle(), 0);
}

#[test]
fn teardown_while_closing_keeps_decision() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));
    show(page);
    dialog.controller().control().expect("live").confirm();
    assert_eq!(dialog.phase(), Phase::Closing);

    drop(dialog);
    awaiter.run();
    assert_eq!(outcome.get(), Some(true));
    assert_eq!(outcome.resolutions(), 1);
    assert_eq!(doc_holders(&bg), 0);
    assert_eq!(active(page), Some(bg.trigger));
}

#[test]
fn listener_is_gone_once_closing() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let _handle = dialog.open(ConfirmOptions::new()).expect("opens");
    assert_eq!(page.events().len(), 0);
    show(page);
    assert_eq!(page.events().len(), 1);

    escape(page);
    assert_eq!(dialog.phase(), Phase::Closing);
    assert_eq!(page.events().len(), 0);
    assert!(!tab(page).is_consumed());
}

// ============================================================================
// Re-entry
// ============================================================================

#[test]
fn reject_policy_refuses_second_open() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let first = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));

    let err = dialog.open(ConfirmOptions::new()).expect_err("rejected");
    assert_eq!(err, DialogError::AlreadyOpen { phase: Phase::Opening });
    show(page);
    let err = dialog.open(ConfirmOptions::new()).expect_err("rejected");
    assert_eq!(err, DialogError::AlreadyOpen { phase: Phase::Visible });
    assert_eq!(doc_holders(&bg), 1);

    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(first.get(), Some(false));
}

#[test]
fn queue_policy_runs_invocations_in_order() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page).with_reentry(ReentryPolicy::Queue);
    let mut awaiter = Awaiter::new();
    let first = awaiter.watch(dialog.open(ConfirmOptions::new().title("One")).expect("opens"));
    let second = awaiter.watch(dialog.open(ConfirmOptions::new().title("Two")).expect("queued"));
    assert_eq!(dialog.controller().queued(), 1);
    show(page);

    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(first.get(), Some(false));
    assert!(!second.is_resolved());
    assert_eq!(dialog.phase(), Phase::Visible);
    assert_eq!(dialog.controller().queued(), 0);
    let panel = dialog.controller().nodes().expect("mounted").panel;
    assert!(find_by_text(page, panel, "Two").is_some());

    click(page, action_button(page, panel, ModalAction::Confirm).expect("confirm"));
    settle(page);
    awaiter.run();
    assert_eq!(second.get(), Some(true));
    assert_eq!(doc_holders(&bg), 0);
}

// ============================================================================
// Content shapes
// ============================================================================

#[test]
fn dialog_without_tabbables_focuses_panel_and_holds_tab() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let ctl = ModalController::<bool>::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(
        ctl.open(ModalRequest::new(
            ModalConfig::default(),
            |scope: ContentScope<'_, bool>| {
                let note = scope
                    .document
                    .create_with_text(ElementKind::Paragraph, "Saving…");
                scope.document.append_child(scope.nodes.panel, note);
            },
        ))
        .expect("opens"),
    );
    show(page);
    let panel = ctl.nodes().expect("mounted").panel;
    assert_eq!(active(page), Some(panel));

    assert!(tab(page).is_consumed());
    assert_eq!(active(page), Some(panel));

    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(outcome.get(), Some(false));
    assert_eq!(active(page), Some(bg.trigger));
}

#[test]
fn clicks_inside_content_do_not_close() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = FormDialog::<()>::new(page);
    let paragraph = Rc::new(RefCell::new(None::<NodeId>));
    let options = {
        let paragraph = Rc::clone(&paragraph);
        FormOptions::new().render_form(move |scope: FormScope<'_, ()>| {
            let text = scope
                .document
                .create_with_text(ElementKind::Paragraph, "Fill in the fields");
            scope.document.append_child(scope.container, text);
            *paragraph.borrow_mut() = Some(text);
        })
    };
    let _handle = dialog.open(options).expect("opens");
    show(page);
    let nodes = dialog.controller().nodes().expect("mounted");
    let text = paragraph.borrow().expect("render fn ran");

    assert!(!click(page, text).is_consumed());
    assert!(!click(page, nodes.panel).is_consumed());
    assert_eq!(dialog.phase(), Phase::Visible);
}

// ============================================================================
// Page hygiene
// ============================================================================

#[test]
fn repeated_invocations_keep_the_document_bounded() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let baseline = page.document().borrow().len();
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let mut slots = None;

    for round in 0..1000 {
        let outcome = awaiter.watch(
            dialog
                .open(ConfirmOptions::new().title("Again?").message("Still sure?"))
                .expect("opens"),
        );
        show(page);
        assert!(page.document().borrow().len() > baseline);
        escape(page);
        settle(page);
        awaiter.run();
        assert_eq!(outcome.get(), Some(false));

        let doc = page.document().borrow();
        assert_eq!(doc.len(), baseline, "round {round}");
        let first = *slots.get_or_insert(doc.capacity());
        assert_eq!(doc.capacity(), first, "round {round}");
    }
}

#[test]
fn stale_shell_ids_do_not_alias_the_next_dialog() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();

    let first = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));
    show(page);
    let old = dialog.controller().nodes().expect("mounted");
    let old_confirm = action_button(page, old.panel, ModalAction::Confirm).expect("confirm");
    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(first.get(), Some(false));

    let second = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));
    show(page);
    let new = dialog.controller().nodes().expect("mounted");
    assert_eq!(new.panel.index(), old.panel.index());
    assert_ne!(new.panel, old.panel);

    // A click through a stale id lands nowhere.
    assert!(!click(page, old_confirm).is_consumed());
    assert_eq!(dialog.phase(), Phase::Visible);
    assert_eq!(page.document().borrow().kind(old.panel), None);

    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(second.get(), Some(false));
}

#[test]
fn late_body_children_are_masked_while_open() {
    let bg = BackgroundPage::new();
    let page = &bg.page;
    let before = page_state(&page.document().borrow());
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));
    show(page);

    let toast = {
        let mut doc = page.document().borrow_mut();
        let toast = doc.create_with_text(ElementKind::Button, "Undo");
        let body = doc.body();
        doc.append_child(body, toast);
        toast
    };
    assert!(tab(page).is_consumed());
    {
        let doc = page.document().borrow();
        assert!(doc.has_flags(toast, NodeFlags::ARIA_HIDDEN | NodeFlags::INERT));
        assert!(!doc.is_focusable(toast));
    }
    assert_ne!(active(page), Some(toast));

    escape(page);
    settle(page);
    awaiter.run();
    assert_eq!(outcome.get(), Some(false));
    {
        let mut doc = page.document().borrow_mut();
        assert!(!doc.flags(toast).intersects(NodeFlags::ARIA_HIDDEN | NodeFlags::INERT));
        assert!(doc.is_focusable(toast));
        doc.remove(toast);
    }
    assert_eq!(page_state(&page.document().borrow()), before);
}

// ============================================================================
// Arbitrary input
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn arbitrary_input_keeps_invariants(input in steps(32)) {
        let bg = BackgroundPage::new();
        let page = &bg.page;
        let before = page_state(&page.document().borrow());
        let dialog = ConfirmDialog::new(page);
        let mut awaiter = Awaiter::new();
        let outcome = awaiter.watch(dialog.open(ConfirmOptions::new()).expect("opens"));
        show(page);
        let nodes = dialog.controller().nodes().expect("mounted");
        let clicks = ClickTargets {
            backdrop: nodes.backdrop,
            panel: nodes.panel,
            background: bg.home_link,
        };

        for step in input {
            step.apply(page, &clicks);
            let phase = dialog.phase();
            prop_assert_eq!(doc_holders(&bg), usize::from(phase.is_live()));
            if phase == Phase::Visible {
                let doc = page.document().borrow();
                let focused = doc.active_element();
                prop_assert!(focused.is_some_and(|node| doc.contains(nodes.panel, node)));
            }
        }

        dialog.dispose();
        settle(page);
        awaiter.run();
        prop_assert_eq!(outcome.resolutions(), 1);
        prop_assert_eq!(doc_holders(&bg), 0);
        prop_assert_eq!(page.events().len(), 0);
        prop_assert_eq!(page_state(&page.document().borrow()), before);
    }
}
