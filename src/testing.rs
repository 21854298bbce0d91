//! Fixtures for driving a [`Recorder`] deterministically.

use crate::capture::Recorder;
use crate::core::{Config, TrackingOverlay};
use crate::dom::{DomElement, DomEvent, KeyPress};
use crate::utils::VirtualClock;
use std::time::Duration;

pub type TestRecorder = Recorder<VirtualClock, TrackingOverlay>;

pub struct TestHelper;

impl TestHelper {
    /// Recorder on a virtual clock with default settings, not yet recording.
    pub fn recorder() -> TestRecorder {
        Self::recorder_with(&Config::default())
    }

    pub fn recorder_with(config: &Config) -> TestRecorder {
        Recorder::new(config, VirtualClock::default(), TrackingOverlay::new())
    }

    pub fn recording() -> TestRecorder {
        let mut recorder = Self::recorder();
        recorder.start_recording();
        recorder
    }

    pub fn body() -> DomElement {
        DomElement::new("body", "body")
    }

    pub fn button(key: &str, label: &str) -> DomElement {
        DomElement::new("button", key).with_text_content(label)
    }

    pub fn text_input(key: &str, value: &str) -> DomElement {
        DomElement::new("input", key)
            .with_attribute("type", "text")
            .with_input_type("text")
            .with_value(value)
    }

    /// `<select>` with the given option chosen.
    pub fn select(key: &str, value: &str, label: &str) -> DomElement {
        DomElement::new("select", key)
            .with_value(value)
            .with_selected_label(label)
    }

    pub fn draggable(key: &str, label: &str) -> DomElement {
        DomElement::new("div", key)
            .with_text_content(label)
            .set_draggable(true)
    }

    pub fn key(key: &str, target: DomElement) -> DomEvent {
        DomEvent::KeyDown(KeyPress::new(key, target))
    }

    /// Emits one `input` event per prefix of `text`, `gap` apart.
    pub fn type_text(recorder: &mut TestRecorder, key: &str, text: &str, gap: Duration) {
        let mut typed = String::new();
        for c in text.chars() {
            typed.push(c);
            recorder.handle_event(DomEvent::Input(Self::text_input(key, &typed)));
            recorder.advance(gap);
        }
    }

    /// Full drag gesture: pointer down, pointer up, then the trailing click.
    pub fn drag(recorder: &mut TestRecorder, element: &DomElement) {
        recorder.handle_event(DomEvent::MouseDown(element.clone()));
        recorder.handle_event(DomEvent::MouseUp(element.clone()));
        recorder.handle_event(DomEvent::Click(element.clone()));
    }
}
