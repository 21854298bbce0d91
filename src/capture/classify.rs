//! Element predicates used to turn raw events into interactions.

use crate::dom::DomElement;

pub const DRAGGABLE_CLASS: &str = "draggable";

/// True when a pointer-down on `element` starts a grab.
pub fn has_drag_affordance(element: &DomElement) -> bool {
    element.draggable
        || element.attribute("draggable") == Some("true")
        || is_range_input(element)
        || element.inside_draggable
        || element.has_class(DRAGGABLE_CLASS)
        || element
            .cursor
            .as_deref()
            .is_some_and(|cursor| cursor.contains("grab"))
}

pub fn is_range_input(element: &DomElement) -> bool {
    element.tag_name == "input"
        && element
            .input_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("range"))
}

/// Value committed for a select list change: the option label, else its value.
pub fn select_value(element: &DomElement) -> String {
    element
        .selected_label
        .clone()
        .filter(|label| !label.is_empty())
        .or_else(|| element.value.clone())
        .unwrap_or_default()
}
