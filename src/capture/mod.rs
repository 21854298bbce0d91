pub mod classify;
pub mod debounce;
pub mod hotkeys;
pub mod mode;
pub mod recorder;

pub use hotkeys::{HotkeyAction, HotkeyCommand, HotkeyConfig, HotkeyDispatcher};
pub use mode::{CaptureSubscription, Mode, ModeController};
pub use recorder::{CaptureState, GrabState, Recorder};
