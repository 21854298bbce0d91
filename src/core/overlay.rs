/// Element selection overlay shown while picking an element for a display assertion.
///
/// The overlay reports the chosen element by calling `Recorder::on_element_selected`
/// exactly once per selection.
pub trait SelectionOverlay {
    fn activate(&mut self);

    fn deactivate(&mut self);

    fn is_active(&self) -> bool;
}

/// Overlay that only tracks its activation state. Used headless and in tests.
#[derive(Debug, Default, Clone)]
pub struct TrackingOverlay {
    active: bool,
    activations: usize,
    deactivations: usize,
}

impl TrackingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activations(&self) -> usize {
        self.activations
    }

    pub fn deactivations(&self) -> usize {
        self.deactivations
    }
}

impl SelectionOverlay for TrackingOverlay {
    fn activate(&mut self) {
        self.active = true;
        self.activations += 1;
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.deactivations += 1;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
