use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use k2d_core::{Key2DynError, ScriptModel, DEFAULT_IP_MODE, IP_MODE_SETTING};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// PageRequest url emitted when a step never recorded one. The real page
/// address lives inside the base64 `post_script` payload either way.
pub const FALLBACK_PAGE_URL: &str = "about:blank";

/// Serializes a Script Model into Gomez/Dynatrace transaction XML.
///
/// Each step's action list is JSON-encoded, base64-wrapped, and embedded as
/// the `post_script` attribute of its `PageRequest`. The output is not
/// validated against the target schema.
pub fn gslify(script: &ScriptModel) -> Result<String, Key2DynError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(map_write)?;

    let mut transaction = BytesStart::new("Transaction");
    transaction.push_attribute(("name", script.name.as_str()));
    transaction.push_attribute(("doObjectDownloads", "true"));
    transaction.push_attribute(("doPageSummary", "false"));
    writer
        .write_event(Event::Start(transaction))
        .map_err(map_write)?;

    writer
        .write_event(Event::Start(BytesStart::new("Configuration")))
        .map_err(map_write)?;
    for config in &script.configurations {
        write_param(&mut writer, &config.name, &config.value)?;
    }
    // Always appended, even when the model already carries an ip_mode
    // entry; the Gomez importer accepts the duplicate.
    write_param(&mut writer, IP_MODE_SETTING, DEFAULT_IP_MODE)?;
    writer
        .write_event(Event::End(BytesEnd::new("Configuration")))
        .map_err(map_write)?;

    for step in &script.steps {
        let actions_json = serde_json::to_string(&step.actions).map_err(map_write)?;
        let encoded = Base64.encode(actions_json);

        let mut request = BytesStart::new("PageRequest");
        request.push_attribute(("url", step.url.as_deref().unwrap_or(FALLBACK_PAGE_URL)));
        request.push_attribute(("displayName", step.description.as_str()));
        request.push_attribute(("method", "GET"));
        request.push_attribute(("post_script", encoded.as_str()));
        writer
            .write_event(Event::Empty(request))
            .map_err(map_write)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Transaction")))
        .map_err(map_write)?;

    String::from_utf8(writer.into_inner()).map_err(map_write)
}

fn write_param(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &str,
) -> Result<(), Key2DynError> {
    let mut param = BytesStart::new("Param");
    param.push_attribute(("name", name));
    param.push_attribute(("value", value));
    writer.write_event(Event::Empty(param)).map_err(map_write)
}

fn map_write(error: impl std::fmt::Display) -> Key2DynError {
    Key2DynError::new("GSL_WRITE_ERROR", error.to_string())
}
