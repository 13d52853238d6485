#![no_main]
#![forbid(unsafe_code)]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modalkit_core::{ElementKind, Event, KeyCode, KeyEvent, Modifiers, Page};
use modalkit_widgets::modal::guard::holders;
use modalkit_widgets::modal::{
    ConfirmDialog, ConfirmOptions, EnterPolicy, ModalConfig, Phase, ReentryPolicy,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Key { code: u8, shift: bool },
    ClickBackdrop,
    ClickPanel,
    ClickOutside,
    Tick,
    Advance(u16),
    Open,
    Hide,
    Show,
    Confirm,
    Cancel,
    Dispose,
}

#[derive(Debug, Arbitrary)]
struct Input {
    escape_to_close: bool,
    close_on_backdrop: bool,
    content_owned_enter: bool,
    queue: bool,
    ops: Vec<Op>,
}

fn key(code: u8) -> KeyCode {
    match code % 6 {
        0 => KeyCode::Tab,
        1 => KeyCode::Enter,
        2 => KeyCode::Escape,
        3 => KeyCode::Char(' '),
        4 => KeyCode::Char(char::from(b'a' + code % 26)),
        _ => KeyCode::Backspace,
    }
}

fuzz_target!(|input: Input| {
    let page = Page::new();
    let outside = {
        let mut doc = page.document().borrow_mut();
        let body = doc.body();
        let button = doc.create_with_text(ElementKind::Button, "Open");
        doc.append_child(body, button);
        doc.focus(button);
        button
    };
    let doc_id = page.document().borrow().id();

    let enter_policy = if input.content_owned_enter {
        EnterPolicy::ContentOwned
    } else {
        EnterPolicy::ConfirmShortcut
    };
    let config = ModalConfig::default()
        .escape_to_close(input.escape_to_close)
        .close_on_backdrop(input.close_on_backdrop)
        .enter_policy(enter_policy);
    let policy = if input.queue {
        ReentryPolicy::Queue
    } else {
        ReentryPolicy::Reject
    };
    let dialog = ConfirmDialog::new(&page).with_reentry(policy);
    let mut handles = Vec::new();

    for op in input.ops.into_iter().take(256) {
        let nodes = dialog.controller().nodes();
        match op {
            Op::Key { code, shift } => {
                let mut event = KeyEvent::new(key(code));
                if shift {
                    event = event.with_modifiers(Modifiers::SHIFT);
                }
                let _ = page.dispatch(event);
            }
            Op::ClickBackdrop => {
                if let Some(nodes) = nodes {
                    let _ = page.dispatch(Event::click(nodes.backdrop));
                }
            }
            Op::ClickPanel => {
                if let Some(nodes) = nodes {
                    let _ = page.dispatch(Event::click(nodes.panel));
                }
            }
            Op::ClickOutside => {
                let _ = page.dispatch(Event::click(outside));
            }
            Op::Tick => {
                page.tick();
            }
            Op::Advance(ms) => {
                page.advance(Duration::from_millis(u64::from(ms)));
            }
            Op::Open => {
                let options = ConfirmOptions::new().config(config.clone());
                if let Ok(handle) = dialog.open(options) {
                    handles.push(handle);
                }
            }
            Op::Hide => {
                if let Some(control) = dialog.controller().control() {
                    control.hide();
                }
            }
            Op::Show => {
                if let Some(control) = dialog.controller().control() {
                    control.show();
                }
            }
            Op::Confirm => {
                if let Some(control) = dialog.controller().control() {
                    control.confirm();
                }
            }
            Op::Cancel => {
                if let Some(control) = dialog.controller().control() {
                    control.cancel();
                }
            }
            Op::Dispose => dialog.dispose(),
        }

        let phase = dialog.phase();
        assert_eq!(holders(doc_id), usize::from(phase.is_live()));
        if phase == Phase::Closed {
            assert_eq!(page.events().len(), 0);
        }
    }

    dialog.dispose();
    page.scheduler().run_until_idle();
    assert_eq!(holders(doc_id), 0);
    for mut handle in handles {
        assert!(handle.try_outcome().is_some());
    }
});
