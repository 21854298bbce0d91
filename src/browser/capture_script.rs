//! Page-side half of the recorder: an injected script that snapshots event
//! targets into a queue which the session drains by polling.

use crate::dom::{DomElement, DomEvent, KeyPress};
use crate::utils::JavaScriptRunner;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const INSTALL_TEMPLATE: &str = r#"
(function(panelSelector) {
    const existing = window.__stepRecorder;
    if (existing && existing.installed) {
        existing.panelSelector = panelSelector;
        return false;
    }

    const state = {
        installed: true,
        panelSelector: panelSelector,
        queue: [],
        capture: false,
        overlay: false,
        nextKey: 1,
        highlighted: null,
    };
    window.__stepRecorder = state;

    const keys = new WeakMap();
    function keyOf(el) {
        let key = keys.get(el);
        if (!key) {
            key = 'n' + state.nextKey++;
            keys.set(el, key);
        }
        return key;
    }

    function inPanel(el) {
        if (!state.panelSelector) return false;
        try {
            return !!el.closest(state.panelSelector);
        } catch (e) {
            return false;
        }
    }

    function describe(el) {
        const attributes = {};
        for (const attr of Array.from(el.attributes || [])) {
            attributes[attr.name] = attr.value;
        }
        let selectedLabel = null;
        if (el.tagName === 'SELECT' && el.selectedIndex >= 0) {
            const option = el.options[el.selectedIndex];
            selectedLabel = option ? option.text : null;
        }
        let cursor = null;
        try {
            cursor = getComputedStyle(el).cursor;
        } catch (e) {}
        return {
            id: keyOf(el),
            tagName: el.tagName.toLowerCase(),
            elementId: el.id || null,
            className: typeof el.className === 'string' ? el.className : null,
            textContent: el.textContent,
            attributes: attributes,
            inputType: el.tagName === 'INPUT' ? el.type : el.getAttribute('type'),
            value: 'value' in el && el.value != null ? String(el.value) : null,
            selectedLabel: selectedLabel,
            draggable: el.draggable === true,
            insideDraggable: !!el.closest('[draggable=true]'),
            cursor: cursor,
            contentEditable: el.isContentEditable === true,
            inPanel: inPanel(el),
        };
    }

    function push(type, target, extra) {
        if (!(target instanceof Element)) return;
        const event = { type: type, at: Date.now(), location: location.href, target: describe(target) };
        state.queue.push(Object.assign(event, extra || {}));
    }

    const handlers = {};
    for (const type of ['click', 'mouseover', 'mousedown', 'mouseup', 'input', 'change', 'focus', 'blur']) {
        handlers[type] = (e) => push(type, e.target);
    }

    state.setCapture = function(on) {
        if (on === state.capture) return state.capture;
        for (const type of Object.keys(handlers)) {
            if (on) {
                document.addEventListener(type, handlers[type], true);
            } else {
                document.removeEventListener(type, handlers[type], true);
            }
        }
        state.capture = on;
        return state.capture;
    };

    document.addEventListener('keydown', (e) => push('keydown', e.target, {
        key: e.key,
        ctrlKey: e.ctrlKey,
        metaKey: e.metaKey,
        altKey: e.altKey,
    }), true);

    function clearHighlight() {
        if (state.highlighted) {
            state.highlighted.el.style.outline = state.highlighted.outline;
            state.highlighted = null;
        }
    }

    window.addEventListener('mousemove', (e) => {
        if (!state.overlay || !(e.target instanceof Element) || inPanel(e.target)) return;
        if (state.highlighted && state.highlighted.el === e.target) return;
        clearHighlight();
        state.highlighted = { el: e.target, outline: e.target.style.outline };
        e.target.style.outline = '2px solid #8b5cf6';
    }, true);

    window.addEventListener('click', (e) => {
        if (!state.overlay || !(e.target instanceof Element) || inPanel(e.target)) return;
        e.preventDefault();
        e.stopImmediatePropagation();
        clearHighlight();
        push('select', e.target);
    }, true);

    state.setOverlay = function(on) {
        state.overlay = on;
        document.documentElement.style.cursor = on ? 'crosshair' : '';
        if (!on) clearHighlight();
        return state.overlay;
    };

    state.drain = function() {
        const events = state.queue;
        state.queue = [];
        return events;
    };

    return true;
})(__PANEL_SELECTOR__)
"#;

pub const DRAIN_SCRIPT: &str =
    "window.__stepRecorder && window.__stepRecorder.installed ? window.__stepRecorder.drain() : null";

/// Installs the recorder into the current document. Re-running it only updates
/// the panel selector.
pub fn install_script(panel_selector: &str) -> String {
    INSTALL_TEMPLATE.replace(
        "__PANEL_SELECTOR__",
        &JavaScriptRunner::string_literal(panel_selector),
    )
}

pub fn set_capture_script(on: bool) -> String {
    format!("window.__stepRecorder ? window.__stepRecorder.setCapture({}) : null", on)
}

pub fn set_overlay_script(on: bool) -> String {
    format!("window.__stepRecorder ? window.__stepRecorder.setOverlay({}) : null", on)
}

/// Queue entry as written by the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Page clock in epoch milliseconds when the event fired.
    #[serde(default)]
    pub at: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub target: DomElement,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub alt_key: bool,
}

/// What the session does with one drained entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Dom(DomEvent),
    Selected(DomElement),
}

impl RawPageEvent {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.at
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
    }

    /// `None` for event types this recorder does not know.
    pub fn into_page_event(self) -> Option<PageEvent> {
        let target = self.target;
        let event = match self.event_type.as_str() {
            "click" => DomEvent::Click(target),
            "mouseover" => DomEvent::MouseOver(target),
            "mousedown" => DomEvent::MouseDown(target),
            "mouseup" => DomEvent::MouseUp(target),
            "input" => DomEvent::Input(target),
            "change" => DomEvent::Change(target),
            "focus" => DomEvent::Focus(target),
            "blur" => DomEvent::Blur(target),
            "keydown" => DomEvent::KeyDown(KeyPress {
                key: self.key.unwrap_or_default(),
                ctrl_key: self.ctrl_key,
                meta_key: self.meta_key,
                alt_key: self.alt_key,
                target,
            }),
            "select" => return Some(PageEvent::Selected(target)),
            _ => return None,
        };
        Some(PageEvent::Dom(event))
    }
}
