use crate::dom::DomElement;
use serde::{Deserialize, Serialize};

/// Raw page event delivered to the capture engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Click(DomElement),
    MouseOver(DomElement),
    MouseDown(DomElement),
    MouseUp(DomElement),
    Input(DomElement),
    Change(DomElement),
    Focus(DomElement),
    Blur(DomElement),
    KeyDown(KeyPress),
}

/// Kinds of listeners the capture subscription attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    MouseOver,
    MouseDown,
    MouseUp,
    Input,
    Change,
    Focus,
    Blur,
    KeyDown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyPress {
    pub key: String,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub alt_key: bool,
    pub target: DomElement,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, target: DomElement) -> Self {
        Self {
            key: key.into(),
            target,
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn has_modifier(&self) -> bool {
        self.ctrl_key || self.meta_key || self.alt_key
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Click(_) => EventKind::Click,
            DomEvent::MouseOver(_) => EventKind::MouseOver,
            DomEvent::MouseDown(_) => EventKind::MouseDown,
            DomEvent::MouseUp(_) => EventKind::MouseUp,
            DomEvent::Input(_) => EventKind::Input,
            DomEvent::Change(_) => EventKind::Change,
            DomEvent::Focus(_) => EventKind::Focus,
            DomEvent::Blur(_) => EventKind::Blur,
            DomEvent::KeyDown(_) => EventKind::KeyDown,
        }
    }

    pub fn target(&self) -> &DomElement {
        match self {
            DomEvent::Click(el)
            | DomEvent::MouseOver(el)
            | DomEvent::MouseDown(el)
            | DomEvent::MouseUp(el)
            | DomEvent::Input(el)
            | DomEvent::Change(el)
            | DomEvent::Focus(el)
            | DomEvent::Blur(el) => el,
            DomEvent::KeyDown(press) => &press.target,
        }
    }
}
