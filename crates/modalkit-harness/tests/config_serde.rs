#![forbid(unsafe_code)]

//! Dialog configuration loaded from JSON, as a host app would ship it.

use std::time::Duration;

use modalkit_harness::{Awaiter, BackgroundPage, action_button, active, escape, show};
use modalkit_widgets::modal::{
    ConfirmDialog, ConfirmOptions, EnterPolicy, InitialFocus, ModalAction, Phase, StyleTokens,
    TransitionConfig,
};

#[test]
fn transition_uses_millisecond_fields() {
    let config: TransitionConfig =
        serde_json::from_str(r#"{"enter_ms":0,"exit_ms":50}"#).expect("valid json");
    assert_eq!(config.enter, Duration::ZERO);
    assert_eq!(config.exit, Duration::from_millis(50));
    assert_eq!(
        serde_json::to_value(config).expect("serializes"),
        serde_json::json!({ "enter_ms": 0, "exit_ms": 50 })
    );
}

#[test]
fn partial_style_tokens_keep_defaults() {
    let tokens: StyleTokens =
        serde_json::from_str(r#"{"panel":"sheet","backdrop":"scrim"}"#).expect("valid json");
    let defaults = StyleTokens::default();
    assert_eq!(tokens.panel, "sheet");
    assert_eq!(tokens.backdrop, "scrim");
    assert_eq!(tokens.title, defaults.title);
    assert_eq!(tokens.confirm_button, defaults.confirm_button);
}

#[test]
fn policies_use_snake_case_names() {
    let focus: InitialFocus = serde_json::from_str(r#""confirm""#).expect("valid json");
    assert_eq!(focus, InitialFocus::Confirm);
    let enter: EnterPolicy = serde_json::from_str(r#""content_owned""#).expect("valid json");
    assert_eq!(enter, EnterPolicy::ContentOwned);
    assert_eq!(
        serde_json::to_string(&InitialFocus::FirstCandidate).expect("serializes"),
        r#""first_candidate""#
    );
    assert!(serde_json::from_str::<InitialFocus>(r#""nowhere""#).is_err());
}

#[test]
fn loaded_settings_drive_a_dialog() {
    let transition: TransitionConfig =
        serde_json::from_str(r#"{"enter_ms":0,"exit_ms":50}"#).expect("valid json");
    let focus: InitialFocus = serde_json::from_str(r#""confirm""#).expect("valid json");
    let tokens: StyleTokens = serde_json::from_str(r#"{"panel":"sheet"}"#).expect("valid json");

    let bg = BackgroundPage::new();
    let page = &bg.page;
    let dialog = ConfirmDialog::new(page);
    let mut awaiter = Awaiter::new();
    let outcome = awaiter.watch(
        dialog
            .open(
                ConfirmOptions::new()
                    .transition(transition)
                    .initial_focus(focus)
                    .style(tokens),
            )
            .expect("opens"),
    );
    show(page);
    let panel = dialog.controller().nodes().expect("mounted").panel;
    assert!(page.document().borrow().has_class(panel, "sheet"));
    assert_eq!(active(page), action_button(page, panel, ModalAction::Confirm));

    escape(page);
    page.advance(Duration::from_millis(49));
    awaiter.run();
    assert!(!outcome.is_resolved());
    page.advance(Duration::from_millis(1));
    awaiter.run();
    assert_eq!(outcome.get(), Some(false));
    assert_eq!(dialog.phase(), Phase::Closed);
}
