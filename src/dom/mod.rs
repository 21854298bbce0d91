pub mod element;
pub mod event;

pub use element::DomElement;
pub use event::{DomEvent, EventKind, KeyPress};
