use crate::capture::classify::{has_drag_affordance, select_value};
use crate::capture::debounce::{HoverDebouncer, InputDebouncer, PendingInput};
use crate::capture::hotkeys::{HotkeyAction, HotkeyCommand, HotkeyConfig, HotkeyDispatcher};
use crate::capture::mode::{CaptureSubscription, Mode, ModeController};
use crate::core::config::RecorderConfig;
use crate::core::{Config, Scheduler, SelectionOverlay, TimerId};
use crate::dom::{DomElement, DomEvent, KeyPress};
use crate::steps::{describe, Interaction, Step, StepId, StepStore};
use crate::utils::timers::VirtualClock;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// Element remembered from a grab-start pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabState {
    pub element: DomElement,
    pub released: bool,
}

/// Everything the classifiers consult between events.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureState {
    pub typing: bool,
    pub grab: Option<GrabState>,
    pub hover: HoverDebouncer,
    pub input: InputDebouncer,
}

impl CaptureState {
    fn new(config: &RecorderConfig) -> Self {
        Self {
            typing: false,
            grab: None,
            hover: HoverDebouncer::new(config.hover_delay()),
            input: InputDebouncer::new(config.input_debounce()),
        }
    }
}

type StepObserver = Box<dyn FnMut(&[Step]) + Send>;

/// The interaction capture engine.
///
/// Feed it page events with [`Recorder::handle_event`], timer expiries with
/// [`Recorder::on_timer`] and overlay selections with
/// [`Recorder::on_element_selected`]. All work happens synchronously inside
/// those calls.
pub struct Recorder<S: Scheduler, O: SelectionOverlay> {
    config: RecorderConfig,
    scheduler: S,
    overlay: O,
    modes: ModeController,
    hotkeys: HotkeyDispatcher,
    store: StepStore,
    state: CaptureState,
    location: String,
    observers: Vec<StepObserver>,
    event_time: Option<DateTime<Utc>>,
}

impl<S: Scheduler, O: SelectionOverlay> Recorder<S, O> {
    pub fn new(config: &Config, scheduler: S, overlay: O) -> Self {
        Self::with_parts(
            config.recorder.clone(),
            config.hotkeys.clone(),
            scheduler,
            overlay,
        )
    }

    pub fn with_parts(
        config: RecorderConfig,
        hotkeys: HotkeyConfig,
        scheduler: S,
        overlay: O,
    ) -> Self {
        let state = CaptureState::new(&config);
        Self {
            config,
            scheduler,
            overlay,
            modes: ModeController::new(),
            hotkeys: HotkeyDispatcher::new(hotkeys),
            store: StepStore::new(),
            state,
            location: String::new(),
            observers: Vec::new(),
            event_time: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn is_recording(&self) -> bool {
        self.modes.is_recording()
    }

    pub fn is_selecting(&self) -> bool {
        self.modes.is_selecting()
    }

    pub fn subscription(&self) -> Option<&CaptureSubscription> {
        self.modes.subscription()
    }

    pub fn steps(&self) -> &[Step] {
        self.store.steps()
    }

    pub fn store(&self) -> &StepStore {
        &self.store
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn hotkeys(&self) -> &HotkeyConfig {
        self.hotkeys.config()
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotkeyConfig {
        self.hotkeys.config_mut()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Current page URL, used by URL assertions.
    pub fn set_location(&mut self, url: impl Into<String>) {
        self.location = url.into();
    }

    /// Registers a callback run with the full step list after every change.
    pub fn on_steps_change(&mut self, observer: impl FnMut(&[Step]) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn descriptor(&self) -> String {
        describe(self.store.steps())
    }

    pub fn toggle_recording(&mut self) -> Mode {
        if self.modes.is_recording() {
            self.stop_recording();
        } else {
            self.start_recording();
        }
        self.mode()
    }

    pub fn start_recording(&mut self) {
        if self.modes.start_recording() {
            if self.modes.is_selecting() {
                debug!("recording started while a display selection is pending");
            }
            info!("recording started");
        }
    }

    /// Detaches the capture listeners. Pending hover and input values are dropped.
    pub fn stop_recording(&mut self) {
        if !self.modes.stop_recording() {
            return;
        }
        self.state.hover.reset(&mut self.scheduler);
        self.state.input.cancel(&mut self.scheduler);
        self.state.typing = false;
        self.state.grab = None;
        info!(steps = self.store.len(), "recording stopped");
    }

    /// Enters `SelectingDisplay` and shows the overlay. No-op if already selecting.
    pub fn start_display_capture(&mut self) -> bool {
        if !self.modes.begin_selection() {
            return false;
        }
        self.state.hover.reset(&mut self.scheduler);
        self.overlay.activate();
        info!(
            "select an element to capture (hotkey '{}'), Escape cancels",
            self.hotkeys.config().get(HotkeyCommand::Display)
        );
        true
    }

    pub fn cancel_display_capture(&mut self) -> bool {
        if !self.modes.end_selection() {
            return false;
        }
        self.overlay.deactivate();
        debug!(mode = ?self.mode(), "display capture cancelled");
        true
    }

    /// Overlay callback: the user picked `element` for a display assertion.
    pub fn on_element_selected(&mut self, element: &DomElement) -> Option<StepId> {
        if !self.modes.is_selecting() {
            debug!("selection reported while not selecting, ignored");
            return None;
        }
        if element.in_panel {
            debug!("selection inside control panel, ignored");
            return None;
        }

        let id = self.commit_element(Interaction::Display, element);
        self.modes.end_selection();
        self.overlay.deactivate();
        Some(id)
    }

    /// Appends a URL assertion for the current location.
    pub fn record_url(&mut self) -> StepId {
        let url = self.location.clone();
        self.record_url_at(url)
    }

    pub fn record_url_at(&mut self, url: impl Into<String>) -> StepId {
        let (id, timestamp) = self.store.allocate(self.event_now());
        self.append(Step::url(id, url, timestamp))
    }

    pub fn remove_step(&mut self, id: StepId) -> bool {
        let removed = self.store.remove(id);
        if removed {
            debug!(%id, "step removed");
            self.notify();
        }
        removed
    }

    pub fn clear_steps(&mut self) {
        self.store.clear();
        debug!("steps cleared");
        self.notify();
    }

    pub fn handle_event(&mut self, event: DomEvent) {
        let now = self.scheduler.now();
        self.handle_event_at(event, now);
    }

    /// Handles an event that happened at `at`, possibly before it was delivered.
    ///
    /// Debounce windows and step timestamps start from `at`. Times ahead of the
    /// scheduler clock are treated as now.
    pub fn handle_event_at(&mut self, event: DomEvent, at: DateTime<Utc>) {
        self.event_time = Some(at.min(self.scheduler.now()));
        self.dispatch_event(event);
        self.event_time = None;
    }

    fn dispatch_event(&mut self, event: DomEvent) {
        if event.target().in_panel {
            return;
        }

        if let DomEvent::KeyDown(press) = &event {
            self.handle_key(press);
            return;
        }

        let kind = event.kind();
        match self.modes.subscription() {
            Some(subscription) if subscription.listens_to(kind) => {}
            _ => return,
        }

        match event {
            DomEvent::Focus(el) => self.handle_focus(&el),
            DomEvent::Blur(_) => self.state.typing = false,
            _ if self.modes.is_selecting() => {
                debug!(?kind, "suppressed while selecting");
            }
            DomEvent::Click(el) => self.handle_click(&el),
            DomEvent::MouseOver(el) => self.handle_mouse_over(&el),
            DomEvent::MouseDown(el) => self.handle_mouse_down(&el),
            DomEvent::MouseUp(el) => self.handle_mouse_up(&el),
            DomEvent::Input(el) => self.handle_input(&el),
            DomEvent::Change(el) => self.handle_change(&el),
            DomEvent::KeyDown(_) => {}
        }
    }

    /// A timer scheduled by this recorder elapsed. Stale ids are ignored.
    pub fn on_timer(&mut self, timer: TimerId) {
        if let Some(element) = self.state.hover.fire(timer) {
            if self.modes.is_recording() && !self.modes.is_selecting() {
                self.commit_element(Interaction::Hover, &element);
            }
            return;
        }

        if let Some(pending) = self.state.input.fire(timer) {
            self.commit_pending_input(pending);
        }
    }

    fn handle_key(&mut self, press: &KeyPress) {
        match self.hotkeys.dispatch(press, self.mode()) {
            Some(HotkeyAction::StartDisplayCapture) => {
                self.start_display_capture();
            }
            Some(HotkeyAction::RecordUrl) => {
                self.record_url();
            }
            Some(HotkeyAction::CancelDisplayCapture) => {
                self.cancel_display_capture();
            }
            None => {}
        }
    }

    fn handle_click(&mut self, el: &DomElement) {
        if let Some(grab) = self.state.grab.take() {
            if grab.element.is_same_node(el) {
                debug!("click after grab on the same element suppressed");
                return;
            }
        }
        self.commit_element(Interaction::Click, el);
    }

    fn handle_mouse_over(&mut self, el: &DomElement) {
        if self.state.typing {
            return;
        }
        let since = self.event_now();
        self.state.hover.hover_at(el, since, &mut self.scheduler);
    }

    fn handle_mouse_down(&mut self, el: &DomElement) {
        if !has_drag_affordance(el) {
            self.state.grab = None;
            return;
        }
        self.commit_element(Interaction::GrabStart, el);
        self.state.grab = Some(GrabState {
            element: el.clone(),
            released: false,
        });
    }

    fn handle_mouse_up(&mut self, el: &DomElement) {
        let release = match self.state.grab.as_mut() {
            Some(grab) if !grab.released => {
                grab.released = true;
                true
            }
            _ => false,
        };
        if release {
            self.commit_element(Interaction::GrabRelease, el);
        }
    }

    fn handle_input(&mut self, el: &DomElement) {
        if !el.is_text_entry() || el.is_select() {
            return;
        }
        let value = el.value.clone().unwrap_or_default();
        let since = self.event_now();
        if let Some(flushed) = self
            .state
            .input
            .keystroke_at(el, value, since, &mut self.scheduler)
        {
            self.commit_pending_input(flushed);
        }
    }

    fn handle_change(&mut self, el: &DomElement) {
        if !el.is_select() {
            return;
        }
        let value = select_value(el);
        self.commit_input(el, value);
    }

    fn handle_focus(&mut self, el: &DomElement) {
        if el.is_typing_target() {
            self.state.typing = true;
            self.state.hover.reset(&mut self.scheduler);
        }
    }

    fn commit_pending_input(&mut self, pending: PendingInput) {
        if pending.value.is_empty() {
            debug!("empty input value discarded");
            return;
        }
        self.commit_input(&pending.element, pending.value);
    }

    fn commit_input(&mut self, el: &DomElement, value: String) -> StepId {
        let (id, timestamp) = self.store.allocate(self.event_now());
        self.append(Step::input(id, el, value, timestamp))
    }

    fn commit_element(&mut self, interaction: Interaction, el: &DomElement) -> StepId {
        let (id, timestamp) = self.store.allocate(self.event_now());
        let step = Step::for_element(id, interaction, el, self.config.text_limit, timestamp);
        self.append(step)
    }

    fn append(&mut self, step: Step) -> StepId {
        let id = step.id;
        info!(interaction = %step.interaction, %id, "{}", step.summary());
        self.store.append(step);
        self.notify();
        id
    }

    fn event_now(&self) -> DateTime<Utc> {
        self.event_time.unwrap_or_else(|| self.scheduler.now())
    }

    fn notify(&mut self) {
        let steps = self.store.steps();
        for observer in self.observers.iter_mut() {
            observer(steps);
        }
    }
}

impl<O: SelectionOverlay> Recorder<VirtualClock, O> {
    /// Moves the virtual clock forward, firing due timers in deadline order.
    pub fn advance(&mut self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        let target = self.scheduler.now() + by;
        while let Some(timer) = self.scheduler.pop_due(target) {
            self.on_timer(timer);
        }
        self.scheduler.set_now(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackingOverlay;
    use std::sync::{Arc, Mutex};

    fn recorder() -> Recorder<VirtualClock, TrackingOverlay> {
        Recorder::new(
            &Config::default(),
            VirtualClock::default(),
            TrackingOverlay::new(),
        )
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn interactions<S: Scheduler, O: SelectionOverlay>(rec: &Recorder<S, O>) -> Vec<Interaction> {
        rec.steps().iter().map(|s| s.interaction).collect()
    }

    #[test]
    fn test_events_ignored_while_idle() {
        let mut rec = recorder();
        let button = DomElement::new("button", "n1");
        rec.handle_event(DomEvent::Click(button.clone()));
        rec.handle_event(DomEvent::MouseOver(button));
        rec.advance(ms(5000));
        assert!(rec.steps().is_empty());
    }

    #[test]
    fn test_click_recorded_while_recording() {
        let mut rec = recorder();
        rec.start_recording();
        rec.handle_event(DomEvent::Click(
            DomElement::new("button", "n1").with_text_content("Save"),
        ));
        assert_eq!(interactions(&rec), vec![Interaction::Click]);
        assert_eq!(rec.steps()[0].text_content, "Save");
    }

    #[test]
    fn test_panel_events_ignored() {
        let mut rec = recorder();
        rec.start_recording();
        let panel_button = DomElement::new("button", "p1").set_in_panel(true);
        rec.handle_event(DomEvent::Click(panel_button.clone()));
        rec.handle_event(DomEvent::KeyDown(KeyPress::new("d", panel_button)));
        assert!(rec.steps().is_empty());
        assert_eq!(rec.mode(), Mode::Recording);
    }

    #[test]
    fn test_focus_cancels_hover_and_blocks_new_ones() {
        let mut rec = recorder();
        rec.start_recording();
        let link = DomElement::new("a", "n1");
        rec.handle_event(DomEvent::MouseOver(link.clone()));
        rec.advance(ms(1000));
        rec.handle_event(DomEvent::Focus(DomElement::new("input", "n2")));
        rec.advance(ms(5000));
        assert!(rec.steps().is_empty());

        rec.handle_event(DomEvent::MouseOver(DomElement::new("div", "n3")));
        rec.advance(ms(5000));
        assert!(rec.steps().is_empty());

        rec.handle_event(DomEvent::Blur(DomElement::new("input", "n2")));
        rec.handle_event(DomEvent::MouseOver(link));
        rec.advance(ms(3000));
        assert_eq!(interactions(&rec), vec![Interaction::Hover]);
    }

    #[test]
    fn test_stop_recording_discards_pending() {
        let mut rec = recorder();
        rec.start_recording();
        rec.handle_event(DomEvent::MouseOver(DomElement::new("a", "n1")));
        rec.handle_event(DomEvent::Input(
            DomElement::new("input", "n2").with_value("half"),
        ));
        rec.stop_recording();
        rec.advance(ms(5000));

        assert!(rec.steps().is_empty());
        assert_eq!(rec.scheduler().pending_count(), 0);
        assert!(rec.subscription().is_none());
    }

    #[test]
    fn test_display_capture_flow() {
        let mut rec = recorder();
        rec.start_recording();
        assert!(rec.start_display_capture());
        assert!(!rec.start_display_capture());
        assert!(rec.overlay().is_active());

        let heading = DomElement::new("h1", "n1").with_text_content("Welcome");
        rec.handle_event(DomEvent::Click(heading.clone()));
        rec.handle_event(DomEvent::MouseDown(heading.clone().set_draggable(true)));
        assert!(rec.steps().is_empty());

        let id = rec.on_element_selected(&heading).unwrap();
        assert_eq!(rec.store().get(id).unwrap().interaction, Interaction::Display);
        assert!(!rec.overlay().is_active());
        assert_eq!(rec.mode(), Mode::Recording);
        assert!(rec.on_element_selected(&heading).is_none());
    }

    #[test]
    fn test_escape_cancels_selection_without_step() {
        let mut rec = recorder();
        let body = DomElement::new("body", "n0");
        rec.handle_event(DomEvent::KeyDown(KeyPress::new("d", body.clone())));
        assert_eq!(rec.mode(), Mode::SelectingDisplay);

        rec.handle_event(DomEvent::KeyDown(KeyPress::new("Escape", body)));
        assert_eq!(rec.mode(), Mode::Idle);
        assert!(rec.steps().is_empty());
        assert_eq!(rec.overlay().deactivations(), 1);
    }

    #[test]
    fn test_selection_in_panel_keeps_selecting() {
        let mut rec = recorder();
        rec.start_display_capture();
        let panel = DomElement::new("div", "p").set_in_panel(true);
        assert!(rec.on_element_selected(&panel).is_none());
        assert_eq!(rec.mode(), Mode::SelectingDisplay);
    }

    #[test]
    fn test_url_hotkey_uses_location() {
        let mut rec = recorder();
        rec.start_recording();
        rec.set_location("https://example.com/path");
        rec.handle_event(DomEvent::KeyDown(KeyPress::new(
            "U",
            DomElement::new("body", "n0"),
        )));
        assert_eq!(rec.descriptor(), "1. [URL] URL: https://example.com/path");
    }

    #[test]
    fn test_select_change_commits_immediately() {
        let mut rec = recorder();
        rec.start_recording();
        let select = DomElement::new("select", "n1")
            .with_value("fr")
            .with_selected_label("France");
        rec.handle_event(DomEvent::Input(select.clone()));
        rec.handle_event(DomEvent::Change(select));

        assert_eq!(rec.steps().len(), 1);
        assert_eq!(rec.steps()[0].input_value.as_deref(), Some("France"));
        assert_eq!(rec.steps()[0].input_type.as_deref(), Some("select"));
        rec.advance(ms(1000));
        assert_eq!(rec.steps().len(), 1);
    }

    #[test]
    fn test_non_text_entry_input_ignored() {
        let mut rec = recorder();
        rec.start_recording();
        rec.handle_event(DomEvent::Input(
            DomElement::new("div", "n1")
                .set_content_editable(true)
                .with_value("x"),
        ));
        rec.advance(ms(1000));
        assert!(rec.steps().is_empty());
    }

    #[test]
    fn test_observer_sees_every_change() {
        let mut rec = recorder();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        rec.on_steps_change(move |steps| sink.lock().unwrap().push(steps.len()));

        let id = rec.record_url_at("https://a");
        rec.record_url_at("https://b");
        rec.remove_step(id);
        rec.remove_step(id);
        rec.clear_steps();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_late_delivered_events_keep_their_own_time() {
        let mut rec = recorder();
        rec.start_recording();
        let base = rec.scheduler().now();
        let field = DomElement::new("input", "n1").with_input_type("text");

        rec.handle_event(DomEvent::Input(field.clone().with_value("a")));
        rec.advance(ms(400));
        rec.handle_event_at(
            DomEvent::Input(field.with_value("ab")),
            base + chrono::Duration::milliseconds(350),
        );
        rec.advance(ms(449));
        assert!(rec.steps().is_empty());

        rec.advance(ms(1));
        assert_eq!(rec.steps().len(), 1);
        assert_eq!(rec.steps()[0].input_value.as_deref(), Some("ab"));
    }

    #[test]
    fn test_hover_window_starts_at_event_time() {
        let mut rec = recorder();
        rec.start_recording();
        let base = rec.scheduler().now();
        rec.advance(ms(100));
        rec.handle_event_at(DomEvent::MouseOver(DomElement::new("a", "n1")), base);

        rec.advance(ms(2899));
        assert!(rec.steps().is_empty());
        rec.advance(ms(1));
        assert_eq!(interactions(&rec), vec![Interaction::Hover]);
    }

    #[test]
    fn test_event_time_ahead_of_clock_is_clamped() {
        let mut rec = recorder();
        rec.start_recording();
        let now = rec.scheduler().now();
        rec.handle_event_at(
            DomEvent::Click(DomElement::new("button", "n1")),
            now + chrono::Duration::seconds(10),
        );
        assert_eq!(rec.steps()[0].timestamp, now);
    }

    #[test]
    fn test_recording_toggle_during_selection_tolerated() {
        let mut rec = recorder();
        rec.start_display_capture();
        assert_eq!(rec.toggle_recording(), Mode::SelectingDisplay);
        assert!(rec.is_recording());
        rec.cancel_display_capture();
        assert_eq!(rec.mode(), Mode::Recording);
        assert_eq!(rec.toggle_recording(), Mode::Idle);
    }
}
