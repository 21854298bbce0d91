use std::time::Duration;
use step_recorder::capture::Mode;
use step_recorder::dom::{DomElement, DomEvent};
use step_recorder::steps::Interaction;
use step_recorder::testing::TestHelper;
use step_recorder::SelectionOverlay;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn interactions(recorder: &step_recorder::testing::TestRecorder) -> Vec<Interaction> {
    recorder.steps().iter().map(|s| s.interaction).collect()
}

#[test]
fn hover_commits_only_after_full_delay() {
    let mut recorder = TestHelper::recording();
    let link = DomElement::new("a", "n1").with_text_content("Pricing");

    recorder.handle_event(DomEvent::MouseOver(link.clone()));
    recorder.advance(ms(2999));
    assert!(recorder.steps().is_empty());

    recorder.advance(ms(1));
    assert_eq!(interactions(&recorder), vec![Interaction::Hover]);
    assert_eq!(recorder.steps()[0].text_content, "Pricing");
}

#[test]
fn moving_away_cancels_hover() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::MouseOver(TestHelper::button("n1", "One")));
    recorder.advance(ms(2000));
    recorder.handle_event(DomEvent::MouseOver(TestHelper::button("n2", "Two")));
    recorder.advance(ms(2999));
    assert!(recorder.steps().is_empty());

    recorder.advance(ms(1));
    assert_eq!(recorder.steps().len(), 1);
    assert_eq!(recorder.steps()[0].text_content, "Two");
}

#[test]
fn typing_commits_once_with_final_value() {
    let mut recorder = TestHelper::recording();
    TestHelper::type_text(&mut recorder, "n3", "abc", ms(100));
    recorder.advance(ms(500));

    assert_eq!(recorder.steps().len(), 1);
    let step = &recorder.steps()[0];
    assert_eq!(step.interaction, Interaction::Input);
    assert_eq!(step.input_value.as_deref(), Some("abc"));
    assert_eq!(step.input_type.as_deref(), Some("text"));
}

#[test]
fn continued_typing_replaces_pending_value() {
    let mut recorder = TestHelper::recording();
    TestHelper::type_text(&mut recorder, "n3", "abc", ms(100));
    recorder.handle_event(DomEvent::Input(TestHelper::text_input("n3", "abcd")));
    recorder.advance(ms(499));
    assert!(recorder.steps().is_empty());

    recorder.advance(ms(1));
    let values: Vec<_> = recorder
        .steps()
        .iter()
        .filter_map(|s| s.input_value.clone())
        .collect();
    assert_eq!(values, vec!["abcd".to_string()]);
}

#[test]
fn drag_gesture_records_grab_pair_without_click() {
    let mut recorder = TestHelper::recording();
    let card = TestHelper::draggable("n4", "Card A");
    TestHelper::drag(&mut recorder, &card);

    assert_eq!(
        interactions(&recorder),
        vec![Interaction::GrabStart, Interaction::GrabRelease]
    );
}

#[test]
fn plain_press_records_only_click() {
    let mut recorder = TestHelper::recording();
    let save = TestHelper::button("n5", "Save");
    TestHelper::drag(&mut recorder, &save);

    assert_eq!(interactions(&recorder), vec![Interaction::Click]);
}

#[test]
fn removing_a_step_renumbers_descriptor() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::Click(TestHelper::button("n1", "One")));
    recorder.handle_event(DomEvent::Click(TestHelper::button("n2", "Two")));
    recorder.handle_event(DomEvent::Click(TestHelper::button("n3", "Three")));

    let middle = recorder.steps()[1].id;
    assert!(recorder.remove_step(middle));

    assert_eq!(
        recorder.descriptor(),
        "1. [CLICK] <button> text=\"One\"\n2. [CLICK] <button> text=\"Three\""
    );
}

#[test]
fn display_hotkey_ignored_while_typing() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(TestHelper::key("d", TestHelper::text_input("n6", "")));
    assert_eq!(recorder.mode(), Mode::Recording);
    assert!(!recorder.overlay().is_active());

    recorder.handle_event(TestHelper::key("d", TestHelper::body()));
    assert_eq!(recorder.mode(), Mode::SelectingDisplay);
    assert!(recorder.overlay().is_active());
}

#[test]
fn display_selection_from_idle_appends_one_step() {
    let mut recorder = TestHelper::recorder();
    recorder.handle_event(TestHelper::key("d", TestHelper::body()));
    assert_eq!(recorder.mode(), Mode::SelectingDisplay);

    let heading = DomElement::new("h1", "n7").with_text_content("Welcome");
    recorder.handle_event(DomEvent::Click(heading.clone()));
    assert!(recorder.steps().is_empty());

    recorder.on_element_selected(&heading);
    assert_eq!(recorder.mode(), Mode::Idle);
    assert_eq!(interactions(&recorder), vec![Interaction::Display]);
    assert_eq!(recorder.overlay().deactivations(), 1);
}

#[test]
fn idle_events_leave_store_unchanged() {
    let mut recorder = TestHelper::recorder();
    let button = TestHelper::button("n1", "Go");
    recorder.handle_event(DomEvent::Click(button.clone()));
    recorder.handle_event(DomEvent::MouseOver(button.clone()));
    recorder.handle_event(DomEvent::Input(TestHelper::text_input("n2", "x")));
    recorder.handle_event(DomEvent::Change(TestHelper::select("n3", "us", "United States")));
    recorder.handle_event(TestHelper::key("u", TestHelper::body()));
    recorder.advance(ms(5000));

    assert!(recorder.steps().is_empty());
}

#[test]
fn escape_cancels_selection_without_step() {
    let mut recorder = TestHelper::recording();
    recorder.start_display_capture();
    recorder.handle_event(TestHelper::key("Escape", TestHelper::body()));

    assert_eq!(recorder.mode(), Mode::Recording);
    assert!(recorder.steps().is_empty());
}

#[test]
fn select_change_records_option_label() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::Change(TestHelper::select("n8", "us", "United States")));

    let step = &recorder.steps()[0];
    assert_eq!(step.input_value.as_deref(), Some("United States"));
    assert_eq!(step.input_type.as_deref(), Some("select"));
}

#[test]
fn cleared_store_serializes_empty() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::Click(TestHelper::button("n1", "One")));
    recorder.clear_steps();
    assert_eq!(recorder.descriptor(), "");
}

#[test]
fn url_capture_line() {
    let mut recorder = TestHelper::recording();
    recorder.set_location("https://example.com/path");
    recorder.handle_event(TestHelper::key("u", TestHelper::body()));

    assert_eq!(
        recorder.descriptor(),
        "1. [URL] URL: https://example.com/path"
    );
}

#[test]
fn stopping_drops_pending_debounces() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::MouseOver(TestHelper::button("n1", "One")));
    recorder.handle_event(DomEvent::Input(TestHelper::text_input("n2", "half")));
    recorder.stop_recording();
    recorder.advance(ms(5000));

    assert_eq!(recorder.mode(), Mode::Idle);
    assert!(recorder.steps().is_empty());
}

#[test]
fn clearing_a_field_commits_nothing() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::Input(TestHelper::text_input("n2", "a")));
    recorder.advance(ms(100));
    recorder.handle_event(DomEvent::Input(TestHelper::text_input("n2", "")));
    recorder.advance(ms(500));

    assert!(recorder.steps().is_empty());
    assert!(recorder.state().input.pending().is_none());
}

#[test]
fn grab_suppresses_only_the_next_click() {
    let mut recorder = TestHelper::recording();
    let card = TestHelper::draggable("n4", "Card A");
    TestHelper::drag(&mut recorder, &card);
    recorder.handle_event(DomEvent::Click(card.clone()));

    assert_eq!(
        interactions(&recorder),
        vec![
            Interaction::GrabStart,
            Interaction::GrabRelease,
            Interaction::Click
        ]
    );
}

#[test]
fn click_elsewhere_after_grab_is_recorded() {
    let mut recorder = TestHelper::recording();
    let card = TestHelper::draggable("n4", "Card A");
    recorder.handle_event(DomEvent::MouseDown(card.clone()));
    recorder.handle_event(DomEvent::MouseUp(card));
    recorder.handle_event(DomEvent::Click(TestHelper::button("n5", "Save")));

    assert_eq!(
        interactions(&recorder),
        vec![
            Interaction::GrabStart,
            Interaction::GrabRelease,
            Interaction::Click
        ]
    );
    assert_eq!(recorder.steps()[2].text_content, "Save");
}

#[test]
fn starting_selection_drops_pending_hover() {
    let mut recorder = TestHelper::recording();
    recorder.handle_event(DomEvent::MouseOver(TestHelper::button("n1", "One")));
    recorder.advance(ms(1000));

    assert!(recorder.start_display_capture());
    assert!(recorder.cancel_display_capture());
    assert_eq!(recorder.mode(), Mode::Recording);
    recorder.advance(ms(3000));

    assert!(recorder.steps().is_empty());
    assert_eq!(recorder.scheduler().pending_count(), 0);
}
