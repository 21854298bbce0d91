pub mod capture_script;
#[cfg(feature = "chrome")]
pub mod chrome;
pub mod overlay;
pub mod session;

#[cfg(feature = "chrome")]
pub use chrome::ChromeBrowser;
pub use capture_script::{PageEvent, RawPageEvent};
pub use overlay::PageOverlay;
pub use session::{LiveRecorder, RecordingSession};
