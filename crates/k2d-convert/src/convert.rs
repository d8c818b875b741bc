use k2d_core::{Action, DnsOverride, ScriptModel, Step, Target};
use serde_json::Value;

use crate::locator::locate_element;
use crate::value_utils::{
    as_sequence, described_name, member_text, param_value, sanitize, sanitized_param,
};

/// Converts a parsed Keynote tree into the intermediate Script Model.
///
/// Total and pure: missing fields degrade to defaults, unrecognized step or
/// validation types are skipped, and no input shape causes a failure.
pub fn convert_script(tree: &Value) -> ScriptModel {
    let mut script = ScriptModel::with_defaults();

    script.name = described_name(tree);

    for action in as_sequence(tree.get("actions").and_then(|actions| actions.get("action"))) {
        script.steps.push(convert_step(action));
    }

    let cookies = as_sequence(tree.get("cookies").and_then(|cookies| cookies.get("cookie")))
        .into_iter()
        .map(cookie_action)
        .collect::<Vec<_>>();
    if !cookies.is_empty() {
        if script.steps.is_empty() {
            script.steps.push(Step::empty());
        }
        let first = &mut script.steps[0];
        let mut actions = cookies;
        actions.append(&mut first.actions);
        first.actions = actions;
    }

    for host in as_sequence(tree.get("hosts").and_then(|hosts| hosts.get("host"))) {
        script.dns.push(dns_override(host));
    }

    script
}

fn convert_step(action: &Value) -> Step {
    let mut actions = as_sequence(action.get("step"))
        .into_iter()
        .filter_map(map_recorded_step)
        .collect::<Vec<_>>();

    // Non-browser (compound/group) actions imply a completion wait even
    // without an explicit completion marker.
    let action_type = member_text(action, "type");
    if action.get("completion").is_some() || action_type.as_deref() != Some("Browser") {
        actions.push(Action::Wait {
            criteria: "page_complete".to_string(),
        });
    }

    for validation in as_sequence(
        action
            .get("validation")
            .and_then(|validation| validation.get("validate")),
    ) {
        if let Some(validate) = validate_action(validation) {
            actions.push(validate);
        }
    }

    Step {
        description: described_name(action),
        url: None,
        actions,
    }
}

/// Recorded step kinds recognized by the converter. Anything else maps to
/// `Unknown` and produces no action, so unrecognized Keynote extensions do
/// not abort a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    Navigate,
    Click,
    Text,
    Select,
    Script,
    Unknown,
}

impl StepKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "Navigate" => Self::Navigate,
            "Click" => Self::Click,
            "Text" => Self::Text,
            "Select" => Self::Select,
            "Script" => Self::Script,
            _ => Self::Unknown,
        }
    }
}

fn map_recorded_step(step: &Value) -> Option<Action> {
    let tag = member_text(step, "type").unwrap_or_default();
    match StepKind::from_tag(&tag) {
        StepKind::Navigate => Some(navigate_action(step)),
        StepKind::Click => Some(Action::Click {
            target: element_target(step),
        }),
        StepKind::Text => Some(form_fill_action(step)),
        StepKind::Select => Some(select_action(step)),
        StepKind::Script => Some(custom_action(step)),
        StepKind::Unknown => None,
    }
}

fn navigate_action(step: &Value) -> Action {
    let mut url = sanitized_param(step, "URL");

    if let Some(query) = step.get("query") {
        url.push('?');
        url.push_str(&query_string(query));
    }

    let post_data = step
        .get("postData")
        .map(post_data_string)
        .filter(|data| !data.is_empty());

    Action::Navigate {
        url,
        target_window: step
            .get("context")
            .map(|context| window_address(Some(context))),
        post_data,
    }
}

fn form_fill_action(step: &Value) -> Action {
    Action::SetInputValue {
        target: element_target(step),
        value: sanitized_param(step, "Text"),
        encrypted: false,
    }
}

fn select_action(step: &Value) -> Action {
    let (option_indexes, text_values) = if step.get("parameter").is_some() {
        (
            vec![sanitized_param(step, "Index")],
            vec![sanitized_param(step, "Text")],
        )
    } else {
        (Vec::new(), Vec::new())
    };

    Action::SelectOption {
        target: element_target(step),
        option_indexes,
        text_values,
    }
}

fn custom_action(step: &Value) -> Action {
    let mut js_code = String::new();
    if let Some(code) = step.get("code") {
        if member_text(code, "language").as_deref() == Some("JavaScript") {
            // Code bodies keep their tabs and newlines; sanitizing would
            // corrupt the script text.
            js_code = param_value(code, "Code").unwrap_or_default();
        }
    }

    Action::ExecuteJs {
        target_window: window_address(step.get("context")),
        js_code,
    }
}

fn validate_action(validation: &Value) -> Option<Action> {
    // Text validations only; other validation types have no GSL counterpart.
    if member_text(validation, "type").as_deref() != Some("RequiredText") {
        return None;
    }

    Some(Action::Validate {
        criteria: "step_match".to_string(),
        r#match: sanitized_param(validation, "Text"),
    })
}

fn cookie_action(cookie: &Value) -> Action {
    let scheme = if is_secure(cookie) { "https://" } else { "http://" };
    let mut url = scheme.to_string();
    // Domain and Path concatenate with no separator, byte-compatible with
    // the upstream exporter.
    url.push_str(&sanitized_param(cookie, "Domain"));
    url.push_str(&sanitized_param(cookie, "Path"));

    Action::SetCookie {
        url,
        name: sanitized_param(cookie, "Name"),
        value: sanitized_param(cookie, "Value"),
    }
}

fn is_secure(cookie: &Value) -> bool {
    member_text(cookie, "secure")
        .and_then(|text| text.trim().parse::<f64>().ok())
        .map(|flag| flag > 0.0)
        .unwrap_or(false)
}

fn dns_override(host: &Value) -> DnsOverride {
    let mut entry = DnsOverride {
        host: member_text(host, "name").unwrap_or_default(),
        map_to: None,
        dest1: None,
    };

    if let Some(address) = param_value(host, "ipaddress") {
        entry.map_to = Some("ip".to_string());
        entry.dest1 = Some(sanitize(&address));
    }

    entry
}

fn element_target(step: &Value) -> Target {
    Target {
        target_window: window_address(step.get("context")),
        locators: locate_element(step.get("element")),
    }
}

/// Window/frame addressing string, e.g. `gomez_top[2].frames[3]`. The frame
/// suffix appears only for frame indexes that parse as integers above zero.
pub(crate) fn window_address(context: Option<&Value>) -> String {
    let window = context
        .and_then(|context| member_text(context, "window"))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "0".to_string());
    let mut address = format!("gomez_top[{}]", window);

    if let Some(frame) = context.and_then(|context| member_text(context, "frame")) {
        let frame = frame.trim();
        if frame.parse::<i64>().map(|index| index > 0).unwrap_or(false) {
            address.push_str(&format!(".frames[{}]", frame));
        }
    }

    address
}

pub(crate) fn query_string(query: &Value) -> String {
    as_sequence(Some(query))
        .into_iter()
        .map(|entry| {
            format!(
                "{}={}",
                sanitized_param(entry, "Name"),
                sanitized_param(entry, "Value")
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Joins `input[type=Data]` Name/Value pairs as a form-encoded body string.
pub(crate) fn post_data_string(post_data: &Value) -> String {
    as_sequence(post_data.get("input"))
        .into_iter()
        .filter(|input| member_text(input, "type").as_deref() == Some("Data"))
        .map(|input| {
            format!(
                "{}={}",
                sanitized_param(input, "Name"),
                sanitized_param(input, "Value")
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
