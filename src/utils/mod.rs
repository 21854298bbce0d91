pub mod javascript;
pub mod timers;

pub use javascript::JavaScriptRunner;
pub use timers::{TokioScheduler, VirtualClock};
