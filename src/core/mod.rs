pub mod browser;
pub mod config;
pub mod overlay;
pub mod scheduler;

pub use browser::BrowserTrait;
pub use config::Config;
pub use overlay::{SelectionOverlay, TrackingOverlay};
pub use scheduler::{Scheduler, TimerId};
