//! Canonical text form of a step sequence, the request body for test generation.
//!
//! One line per step, numbered from 1 in store order:
//! `<index>. [<INTERACTION>] <details>`. Whitespace runs inside attribute
//! values collapse to one space so a step never spans lines.

use crate::steps::{Interaction, Step};

pub fn describe(steps: &[Step]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| describe_step(i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_step(index: usize, step: &Step) -> String {
    let mut parts = vec![format!("{}. [{}]", index, step.interaction.label())];

    match step.interaction {
        Interaction::Url => {
            parts.push(format!("URL: {}", step.url.as_deref().unwrap_or_default()));
        }
        Interaction::Input => {
            parts.push(format!("<{}>", step.tag_name));
            push_attr(&mut parts, "data-testid", step.test_id.as_deref());
            push_attr(&mut parts, "id", step.element_id.as_deref());
            push_attr(&mut parts, "type", step.input_type.as_deref());
            push_attr(&mut parts, "class", Some(step.class_name.as_str()));
            push_attr(&mut parts, "value", step.input_value.as_deref());
        }
        _ => {
            parts.push(format!("<{}>", step.tag_name));
            push_attr(&mut parts, "data-testid", step.test_id.as_deref());
            push_attr(&mut parts, "id", step.element_id.as_deref());
            push_attr(&mut parts, "class", Some(step.class_name.as_str()));
            push_attr(&mut parts, "text", Some(step.text_content.as_str()));
        }
    }

    parts.join(" ")
}

fn push_attr(parts: &mut Vec<String>, name: &str, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if !value.is_empty() {
        parts.push(format!("{}=\"{}\"", name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomElement;
    use crate::steps::{StepId, StepStore};
    use chrono::{DateTime, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(describe(&[]), "");
    }

    #[test]
    fn test_single_url_line() {
        let step = Step::url(StepId(1), "https://example.com/path", at(1));
        assert_eq!(describe(&[step]), "1. [URL] URL: https://example.com/path");
    }

    #[test]
    fn test_element_details_order() {
        let el = DomElement::new("button", "n1")
            .with_attribute("data-testid", "submit")
            .with_element_id("go")
            .with_class_name("btn btn-primary")
            .with_text_content("Submit");
        let step = Step::for_element(StepId(1), Interaction::Click, &el, 100, at(1));

        assert_eq!(
            describe_step(3, &step),
            r#"3. [CLICK] <button> data-testid="submit" id="go" class="btn btn-primary" text="Submit""#
        );
    }

    #[test]
    fn test_input_details_skip_missing() {
        let el = DomElement::new("input", "n1").with_input_type("email");
        let step = Step::input(StepId(1), &el, "me@example.com", at(1));

        assert_eq!(
            describe_step(1, &step),
            r#"1. [INPUT] <input> type="email" value="me@example.com""#
        );
    }

    #[test]
    fn test_multiline_text_and_value_stay_on_one_line() {
        let card = DomElement::new("li", "n1").with_text_content("\n  Card A\n\t  todo  \n");
        let click = Step::for_element(StepId(1), Interaction::Click, &card, 100, at(1));
        let notes = DomElement::new("textarea", "n2");
        let input = Step::input(StepId(2), &notes, "first line\r\nsecond line", at(2));

        let descriptor = describe(&[click, input]);
        assert_eq!(
            descriptor,
            "1. [CLICK] <li> text=\"Card A todo\"\n2. [INPUT] <textarea> type=\"textarea\" value=\"first line second line\""
        );
        assert_eq!(descriptor.lines().count(), 2);
    }

    #[test]
    fn test_bare_element_and_grab_label() {
        let step = Step::for_element(
            StepId(1),
            Interaction::GrabStart,
            &DomElement::new("div", "n1"),
            100,
            at(1),
        );
        assert_eq!(describe_step(2, &step), "2. [GRABSTART] <div>");
    }

    #[test]
    fn test_renumbers_after_remove() {
        let mut store = StepStore::new();
        let mut ids = vec![];
        for (ms, url) in [(1, "https://a"), (2, "https://b"), (3, "https://c")] {
            let (id, ts) = store.allocate(at(ms));
            store.append(Step::url(id, url, ts));
            ids.push(id);
        }
        store.remove(ids[0]);

        assert_eq!(
            describe(store.steps()),
            "1. [URL] URL: https://b\n2. [URL] URL: https://c"
        );
    }
}
