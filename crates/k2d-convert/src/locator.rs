use std::collections::BTreeMap;

use k2d_core::{Locator, LocatorKind};
use serde_json::Value;

use crate::value_utils::{as_sequence, member_text, param_value, sanitize};

/// Synthesizes locators for a recorded element, most specific first: exact
/// id (CSS + direct DOM lookup), then inner-text, then a compound attribute
/// selector. The playback runtime tries them in order until one matches.
pub fn locate_element(element: Option<&Value>) -> Vec<Locator> {
    let mut locators = Vec::new();
    let Some(element) = element else {
        return locators;
    };

    let tags = as_sequence(element.get("tag"));
    let Some(tag) = tags.first() else {
        return locators;
    };

    let tag_name = member_text(tag, "type")
        .map(|name| name.to_lowercase())
        .unwrap_or_default();
    let attrs = element_attributes(tag);

    if let Some(id) = attrs.get("id").filter(|id| !id.is_empty()) {
        // Colons are legal in Keynote ids but must be escaped for CSS.
        locators.push(Locator(
            LocatorKind::Css,
            format!("#{}", id.replace(':', "\\:")),
        ));
        locators.push(Locator(
            LocatorKind::Dom,
            format!("document.getElementById(\"{}\")", id),
        ));
    }

    if !tag_name.is_empty() {
        if let Some(inner_text) = attrs.get("innerText").filter(|text| !text.is_empty()) {
            locators.push(Locator(
                LocatorKind::Css,
                format!("{}:contains(\"{}\")", tag_name, inner_text),
            ));
        }

        let mut selector = String::new();
        for key in ["type", "href", "name"] {
            if let Some(value) = attrs.get(key).filter(|value| !value.is_empty()) {
                selector.push_str(&format!("[{}=\"{}\"]", key, value));
            }
        }
        if !selector.is_empty() {
            locators.push(Locator(LocatorKind::Css, format!("{}{}", tag_name, selector)));
        }
    }

    locators
}

/// Flat attribute map of the element's first tag definition. Attribute
/// entries are Name/Value parameter pairs nested under `attributes` groups;
/// later occurrences of a name overwrite earlier ones.
fn element_attributes(tag: &Value) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();

    for group in as_sequence(tag.get("attributes")) {
        for attribute in as_sequence(group.get("attribute")) {
            let name = param_value(attribute, "Name")
                .map(|value| sanitize(&value))
                .unwrap_or_default();
            let value = param_value(attribute, "Value")
                .map(|value| sanitize(&value))
                .unwrap_or_default();
            attrs.insert(name, value);
        }
    }

    attrs
}
