use serde::{Deserialize, Serialize};

pub const GSL_VERSION_SETTING: &str = "http://www.gomez.com/settings/gsl_version";
pub const BROWSER_VERSION_SETTING: &str = "http://www.gomez.com/settings/browser_version";
pub const IP_MODE_SETTING: &str = "http://www.gomez.com/settings/ip_mode";

pub const DEFAULT_GSL_VERSION: &str = "2";
pub const DEFAULT_BROWSER_VERSION: &str = "IE10";
pub const DEFAULT_IP_MODE: &str = "IPv6_preferred";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigParam {
    pub name: String,
    pub value: String,
}

impl ConfigParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsOverride {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest1: Option<String>,
}

/// Intermediate, format-neutral representation of a monitoring script.
/// Produced by the converter, consumed by the GSL serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptModel {
    pub name: String,
    pub client_certs: Vec<String>,
    pub configurations: Vec<ConfigParam>,
    pub steps: Vec<Step>,
    pub dns: Vec<DnsOverride>,
    pub enable_flash: bool,
    pub enable_for_mobile: bool,
    pub headers: Vec<ConfigParam>,
    pub ip_mode: String,
    pub parameters: Vec<ConfigParam>,
}

impl ScriptModel {
    pub fn with_defaults() -> Self {
        Self {
            name: String::new(),
            client_certs: Vec::new(),
            configurations: vec![
                ConfigParam::new(GSL_VERSION_SETTING, DEFAULT_GSL_VERSION),
                ConfigParam::new(BROWSER_VERSION_SETTING, DEFAULT_BROWSER_VERSION),
            ],
            steps: Vec::new(),
            dns: Vec::new(),
            enable_flash: false,
            enable_for_mobile: false,
            headers: Vec::new(),
            ip_mode: DEFAULT_IP_MODE.to_string(),
            parameters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub actions: Vec<Action>,
}

impl Step {
    pub fn empty() -> Self {
        Self {
            description: String::new(),
            url: None,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Css,
    Dom,
}

/// Serializes as a two-element array, e.g. `["css", "#login"]`, which is the
/// shape the Gomez playback runtime expects inside `post_script` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator(pub LocatorKind, pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target_window: String,
    pub locators: Vec<Locator>,
}

/// One atomic playback instruction. The `type` tag discriminates variants in
/// the embedded JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "navigate", rename_all = "camelCase")]
    Navigate {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_window: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        post_data: Option<String>,
    },
    #[serde(rename = "click")]
    Click { target: Target },
    #[serde(rename = "setInputValue")]
    SetInputValue {
        target: Target,
        value: String,
        encrypted: bool,
    },
    #[serde(rename = "selectOption", rename_all = "camelCase")]
    SelectOption {
        target: Target,
        option_indexes: Vec<String>,
        text_values: Vec<String>,
    },
    #[serde(rename = "executeJS", rename_all = "camelCase")]
    ExecuteJs {
        target_window: String,
        js_code: String,
    },
    #[serde(rename = "wait")]
    Wait { criteria: String },
    #[serde(rename = "validate")]
    Validate { criteria: String, r#match: String },
    #[serde(rename = "setCookie")]
    SetCookie {
        url: String,
        name: String,
        value: String,
    },
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn wait_action_serializes_with_type_tag_first() {
        let action = Action::Wait {
            criteria: "network".to_string(),
        };
        let json = serde_json::to_string(&action).expect("action json");
        assert_eq!(json, r#"{"type":"wait","criteria":"network"}"#);
    }

    #[test]
    fn locator_serializes_as_kind_expression_pair() {
        let locator = Locator(LocatorKind::Css, "#login".to_string());
        let json = serde_json::to_string(&locator).expect("locator json");
        assert_eq!(json, r##"["css","#login"]"##);

        let dom = Locator(LocatorKind::Dom, "document.getElementById(\"x\")".to_string());
        let json = serde_json::to_string(&dom).expect("locator json");
        assert!(json.starts_with(r#"["dom","#));
    }

    #[test]
    fn action_field_names_stay_camel_case() {
        let action = Action::SelectOption {
            target: Target {
                target_window: "gomez_top[0]".to_string(),
                locators: Vec::new(),
            },
            option_indexes: vec!["1".to_string()],
            text_values: vec!["First".to_string()],
        };
        let json = serde_json::to_string(&action).expect("action json");
        assert!(json.contains(r#""type":"selectOption""#));
        assert!(json.contains(r#""targetWindow":"gomez_top[0]""#));
        assert!(json.contains(r#""optionIndexes":["1"]"#));
        assert!(json.contains(r#""textValues":["First"]"#));
    }

    #[test]
    fn validate_action_serializes_match_field() {
        let action = Action::Validate {
            criteria: "step_match".to_string(),
            r#match: "Welcome".to_string(),
        };
        let json = serde_json::to_string(&action).expect("action json");
        assert_eq!(json, r#"{"type":"validate","criteria":"step_match","match":"Welcome"}"#);
    }

    #[test]
    fn navigate_action_omits_absent_optional_fields() {
        let action = Action::Navigate {
            url: "http://example.com".to_string(),
            target_window: None,
            post_data: None,
        };
        let json = serde_json::to_string(&action).expect("action json");
        assert_eq!(json, r#"{"type":"navigate","url":"http://example.com"}"#);
    }

    #[test]
    fn script_model_defaults_match_gomez_settings() {
        let script = ScriptModel::with_defaults();
        assert_eq!(script.configurations.len(), 2);
        assert_eq!(script.configurations[0].name, GSL_VERSION_SETTING);
        assert_eq!(script.configurations[0].value, "2");
        assert_eq!(script.configurations[1].name, BROWSER_VERSION_SETTING);
        assert_eq!(script.configurations[1].value, "IE10");
        assert_eq!(script.ip_mode, "IPv6_preferred");
        assert!(script.steps.is_empty());
        assert!(!script.enable_flash);
        assert!(!script.enable_for_mobile);

        let json = serde_json::to_value(&script).expect("model json");
        assert!(json.get("clientCerts").is_some());
        assert!(json.get("enableForMobile").is_some());
        assert!(json.get("ipMode").is_some());
    }
}
