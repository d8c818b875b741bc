use k2d_core::Key2DynError;
use roxmltree::{Document, Node, NodeType};
use serde_json::{Map, Value};

/// Parses Keynote script XML into a loosely typed tree.
///
/// Conventions match what the downstream converter expects:
/// - attributes merge into the owning element's object, no separate bucket;
/// - sibling elements sharing a name collapse to a single value when there
///   is one occurrence and to an array when there are several;
/// - an element with only text content becomes a plain string, while text
///   next to attributes or child elements lands under the `"_"` key;
/// - an empty element becomes the empty string.
///
/// Returns the subtree rooted at the document's `script` element, or an
/// empty object when the root carries a different name. A missing `script`
/// root is tolerated on purpose; only malformed XML is an error.
pub fn parse_script_source(source: &str) -> Result<Value, Key2DynError> {
    let document = Document::parse(source)
        .map_err(|error| Key2DynError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(Key2DynError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    if root.tag_name().name() != "script" {
        return Ok(Value::Object(Map::new()));
    }

    Ok(element_to_value(root))
}

fn element_to_value(node: Node<'_, '_>) -> Value {
    let mut map = Map::new();

    for attribute in node.attributes() {
        map.insert(
            attribute.name().to_string(),
            Value::String(attribute.value().to_string()),
        );
    }

    let mut text = String::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => {
                let name = child.tag_name().name().to_string();
                merge_child(&mut map, name, element_to_value(child));
            }
            NodeType::Text => {
                let value = child.text().unwrap_or_default();
                // Whitespace-only segments between elements carry no data;
                // CDATA payloads keep their embedded tabs and newlines.
                if !value.trim().is_empty() {
                    text.push_str(value);
                }
            }
            _ => {}
        }
    }

    if !text.is_empty() {
        if map.is_empty() {
            return Value::String(text);
        }
        map.insert("_".to_string(), Value::String(text));
    }

    if map.is_empty() {
        return Value::String(String::new());
    }

    Value::Object(map)
}

fn merge_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        None => {
            map.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}
