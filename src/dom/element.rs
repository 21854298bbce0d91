use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of an event target, taken in the page at the moment the event fired.
///
/// Every field degrades to an empty/`false` default so a partially described node
/// still produces a best-effort step instead of aborting the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomElement {
    /// Page-assigned node key, stable for the lifetime of the node.
    pub id: String,
    pub tag_name: String,
    pub element_id: Option<String>,
    /// `className` when it is a plain string; vector-graphic nodes leave this empty.
    pub class_name: Option<String>,
    pub text_content: Option<String>,
    pub attributes: HashMap<String, String>,
    pub input_type: Option<String>,
    pub value: Option<String>,
    pub selected_label: Option<String>,
    pub draggable: bool,
    pub inside_draggable: bool,
    pub cursor: Option<String>,
    pub content_editable: bool,
    pub in_panel: bool,
}

impl DomElement {
    pub fn new(tag_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into().to_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_element_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_selected_label(mut self, label: impl Into<String>) -> Self {
        self.selected_label = Some(label.into());
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn set_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn set_inside_draggable(mut self, inside: bool) -> Self {
        self.inside_draggable = inside;
        self
    }

    pub fn set_content_editable(mut self, editable: bool) -> Self {
        self.content_editable = editable;
        self
    }

    pub fn set_in_panel(mut self, in_panel: bool) -> Self {
        self.in_panel = in_panel;
        self
    }

    pub fn is_same_node(&self, other: &DomElement) -> bool {
        !self.id.is_empty() && self.id == other.id
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Raw class list. Falls back to the `class` attribute when `className` was not a string.
    pub fn class_list(&self) -> String {
        self.class_name
            .clone()
            .or_else(|| self.attributes.get("class").cloned())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().split_whitespace().any(|c| c == class)
    }

    pub fn test_id(&self) -> Option<String> {
        self.attribute("data-testid")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn dom_id(&self) -> Option<String> {
        self.element_id.clone().filter(|id| !id.is_empty())
    }

    /// Text content cut to `limit` characters.
    pub fn truncated_text(&self, limit: usize) -> String {
        self.text_content
            .as_deref()
            .map(|text| text.chars().take(limit).collect())
            .unwrap_or_default()
    }

    /// Inputs and text areas: elements a user types free text into.
    pub fn is_typing_target(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "textarea")
    }

    /// Elements whose value changes are captured as input steps.
    pub fn is_text_entry(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "textarea" | "select")
    }

    pub fn is_select(&self) -> bool {
        self.tag_name == "select"
    }

    /// Input type reported in input steps.
    pub fn reported_input_type(&self) -> String {
        match self.tag_name.as_str() {
            "input" => self
                .input_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "text".to_string()),
            "textarea" => "textarea".to_string(),
            "select" => "select".to_string(),
            _ => "text".to_string(),
        }
    }
}
