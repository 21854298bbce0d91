use crate::dom::DomElement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-unique step identifier; capture time in epoch millis, strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interaction {
    Click,
    Hover,
    GrabStart,
    GrabRelease,
    Input,
    Display,
    Url,
}

impl Interaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interaction::Click => "click",
            Interaction::Hover => "hover",
            Interaction::GrabStart => "grabStart",
            Interaction::GrabRelease => "grabRelease",
            Interaction::Input => "input",
            Interaction::Display => "display",
            Interaction::Url => "url",
        }
    }

    /// Upper-cased name used in descriptor lines, e.g. `GRABSTART`.
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded interaction. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub interaction: Interaction,
    pub tag_name: String,
    pub class_name: String,
    pub text_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub const WINDOW_TAG: &str = "window";

impl Step {
    /// Element-targeted step (click, hover, grab, display).
    pub fn for_element(
        id: StepId,
        interaction: Interaction,
        element: &DomElement,
        text_limit: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            interaction,
            tag_name: element.tag_name.to_lowercase(),
            class_name: element.class_list(),
            text_content: element.truncated_text(text_limit),
            url: None,
            input_value: None,
            input_type: None,
            test_id: element.test_id(),
            element_id: element.dom_id(),
            timestamp,
        }
    }

    pub fn input(
        id: StepId,
        element: &DomElement,
        value: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            interaction: Interaction::Input,
            tag_name: element.tag_name.to_lowercase(),
            class_name: element.class_list(),
            text_content: String::new(),
            url: None,
            input_value: Some(value.into()),
            input_type: Some(element.reported_input_type()),
            test_id: element.test_id(),
            element_id: element.dom_id(),
            timestamp,
        }
    }

    pub fn url(id: StepId, url: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            interaction: Interaction::Url,
            tag_name: WINDOW_TAG.to_string(),
            class_name: String::new(),
            text_content: String::new(),
            url: Some(url.into()),
            input_value: None,
            input_type: None,
            test_id: None,
            element_id: None,
            timestamp,
        }
    }

    /// Short human-readable description shown when a step is captured.
    pub fn summary(&self) -> String {
        match self.interaction {
            Interaction::Url => self.url.clone().unwrap_or_default(),
            Interaction::Input => {
                let value = self.input_value.as_deref().unwrap_or_default();
                format!("<{}> \"{}\"", self.tag_name, ellipsize(value, 30))
            }
            _ => {
                let identifier = if let Some(test_id) = &self.test_id {
                    format!("[data-testid=\"{}\"]", test_id)
                } else if let Some(element_id) = &self.element_id {
                    format!("#{}", element_id)
                } else if !self.text_content.is_empty() {
                    format!("\"{}\"", ellipsize(self.text_content.trim(), 30))
                } else {
                    String::new()
                };

                if identifier.is_empty() {
                    format!("<{}>", self.tag_name)
                } else {
                    format!("<{}> {}", self.tag_name, identifier)
                }
            }
        }
    }
}

fn ellipsize(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
