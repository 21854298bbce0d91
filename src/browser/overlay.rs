use crate::core::SelectionOverlay;

/// Overlay state mirrored into the page by the recording session.
///
/// Activation changes are queued and applied by the session on its next poll,
/// since the page can only be reached asynchronously.
#[derive(Debug, Default)]
pub struct PageOverlay {
    active: bool,
    synced: bool,
}

impl PageOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Desired page state when it differs from what the page last reported.
    pub fn take_request(&mut self) -> Option<bool> {
        if self.active == self.synced {
            return None;
        }
        self.synced = self.active;
        Some(self.active)
    }

    /// Forces the next `take_request` to resend the current state, e.g. after navigation.
    pub fn mark_stale(&mut self) {
        self.synced = !self.active;
    }
}

impl SelectionOverlay for PageOverlay {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_only_on_change() {
        let mut overlay = PageOverlay::new();
        assert_eq!(overlay.take_request(), None);

        overlay.activate();
        assert_eq!(overlay.take_request(), Some(true));
        assert_eq!(overlay.take_request(), None);

        overlay.deactivate();
        overlay.activate();
        assert_eq!(overlay.take_request(), None);

        overlay.deactivate();
        assert_eq!(overlay.take_request(), Some(false));
    }

    #[test]
    fn test_mark_stale_resends() {
        let mut overlay = PageOverlay::new();
        overlay.activate();
        overlay.take_request();
        overlay.mark_stale();
        assert_eq!(overlay.take_request(), Some(true));
    }
}
