pub mod browser;
pub mod capture;
pub mod core;
pub mod dom;
pub mod errors;
pub mod generation;
pub mod steps;
pub mod testing;
pub mod utils;

pub use browser::{PageOverlay, RecordingSession};
pub use capture::{HotkeyAction, HotkeyCommand, HotkeyConfig, Mode, Recorder};
pub use crate::core::{BrowserTrait, Config, Scheduler, SelectionOverlay, TimerId, TrackingOverlay};
pub use dom::{DomElement, DomEvent, KeyPress};
pub use errors::{RecorderError, Result};
pub use generation::{GenerationRequest, GenerationState, Generator, HttpGenerationBackend};
pub use steps::{describe, Interaction, Step, StepId, StepStore};
pub use utils::{TokioScheduler, VirtualClock};

#[cfg(feature = "chrome")]
pub use browser::ChromeBrowser;
