use crate::dom::EventKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Idle,
    Recording,
    SelectingDisplay,
}

/// Listeners attached, in capture phase, for the whole time recording is on.
pub const CAPTURE_LISTENERS: [EventKind; 8] = [
    EventKind::Click,
    EventKind::MouseOver,
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::Input,
    EventKind::Change,
    EventKind::Focus,
    EventKind::Blur,
];

/// The capture listener set. It exists as a whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSubscription {
    listeners: Vec<EventKind>,
    capture_phase: bool,
}

impl CaptureSubscription {
    fn attach() -> Self {
        Self {
            listeners: CAPTURE_LISTENERS.to_vec(),
            capture_phase: true,
        }
    }

    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.contains(&kind)
    }

    pub fn listeners(&self) -> &[EventKind] {
        &self.listeners
    }

    pub fn capture_phase(&self) -> bool {
        self.capture_phase
    }
}

/// Recording and display selection are independent toggles; the reported mode
/// gives selection precedence and falls back to whichever recording state was
/// active when it began.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeController {
    subscription: Option<CaptureSubscription>,
    selecting: bool,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        if self.selecting {
            Mode::SelectingDisplay
        } else {
            self.resume_mode()
        }
    }

    /// Mode to return to once a display selection ends.
    pub fn resume_mode(&self) -> Mode {
        if self.subscription.is_some() {
            Mode::Recording
        } else {
            Mode::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn subscription(&self) -> Option<&CaptureSubscription> {
        self.subscription.as_ref()
    }

    /// Returns false when already recording.
    pub fn start_recording(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }
        self.subscription = Some(CaptureSubscription::attach());
        true
    }

    /// Returns false when not recording.
    pub fn stop_recording(&mut self) -> bool {
        self.subscription.take().is_some()
    }

    pub fn begin_selection(&mut self) -> bool {
        if self.selecting {
            return false;
        }
        self.selecting = true;
        true
    }

    pub fn end_selection(&mut self) -> bool {
        std::mem::replace(&mut self.selecting, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_recording_toggle() {
        let mut modes = ModeController::new();
        assert_eq!(modes.mode(), Mode::Idle);
        assert!(modes.subscription().is_none());

        assert!(modes.start_recording());
        assert!(!modes.start_recording());
        assert_eq!(modes.mode(), Mode::Recording);
        let sub = modes.subscription().unwrap();
        assert_eq!(sub.listeners().len(), CAPTURE_LISTENERS.len());
        assert!(sub.capture_phase());
        assert!(!sub.listens_to(EventKind::KeyDown));

        assert!(modes.stop_recording());
        assert!(!modes.stop_recording());
        assert_eq!(modes.mode(), Mode::Idle);
    }

    #[test]
    fn test_selection_returns_to_previous_mode() {
        let mut modes = ModeController::new();
        assert!(modes.begin_selection());
        assert!(!modes.begin_selection());
        assert_eq!(modes.mode(), Mode::SelectingDisplay);
        assert_eq!(modes.resume_mode(), Mode::Idle);
        assert!(modes.end_selection());
        assert_eq!(modes.mode(), Mode::Idle);

        modes.start_recording();
        modes.begin_selection();
        assert_eq!(modes.resume_mode(), Mode::Recording);
        modes.end_selection();
        assert_eq!(modes.mode(), Mode::Recording);
    }

    #[test]
    fn test_recording_toggled_while_selecting() {
        let mut modes = ModeController::new();
        modes.begin_selection();
        modes.start_recording();

        assert_eq!(modes.mode(), Mode::SelectingDisplay);
        assert!(modes.is_recording());
        modes.end_selection();
        assert_eq!(modes.mode(), Mode::Recording);
    }
}
