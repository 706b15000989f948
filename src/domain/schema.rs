//! # Action Schema
//!
//! Validates raw plan items into [`Action`] values and renders the schema as text
//! for the planning instruction.
//!
//! Validation is strict: the discriminator must match one of the ten kinds exactly,
//! required fields must be present with the right shape, and only `cwd` has a default.

use serde_json::Value;

use crate::domain::error::SchemaError;
use crate::domain::types::{Action, ActionKind, DEFAULT_CWD};

/// Field name and shape, as shown to the planner.
type FieldSpec = (&'static str, &'static str);

fn fields(kind: ActionKind) -> &'static [FieldSpec] {
    match kind {
        ActionKind::WriteFiles => &[("files", "record<string, string>")],
        ActionKind::CreateFile | ActionKind::AppendFile => {
            &[("path", "string"), ("content", "string")]
        }
        ActionKind::ReadFile | ActionKind::Mkdir | ActionKind::RemovePath => &[("path", "string")],
        ActionKind::RenamePath => &[("from", "string"), ("to", "string")],
        ActionKind::RunCommand => &[("cmd", "string"), ("cwd", "string (optional)")],
        ActionKind::RunCommands => &[("cmds", "string[]"), ("cwd", "string (optional)")],
        ActionKind::GpUrl => &[("port", "integer")],
    }
}

/// Parse one raw plan item.
pub fn parse(raw: &Value) -> Result<Action, SchemaError> {
    let object = raw
        .as_object()
        .ok_or_else(|| SchemaError::new(format!("expected an object, got {}", type_name(raw))))?;

    let tag = match object.get("action") {
        None => return Err(SchemaError::new("missing `action` field")),
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(SchemaError::new(format!(
                "`action` must be a string, got {}",
                type_name(other)
            )));
        }
    };

    let kind: ActionKind = tag.parse()?;

    serde_json::from_value(raw.clone())
        .map_err(|e| SchemaError::new(format!("{}: {}", kind, e)))
}

/// Parse a whole plan. The first invalid item fails the plan.
pub fn parse_plan(raw: &[Value]) -> Result<Vec<Action>, SchemaError> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| parse(item).map_err(|e| e.at(index)))
        .collect()
}

/// Text rendering of the schema, one line per action kind.
pub fn describe() -> String {
    let mut out = String::from("Each action is a JSON object discriminated by its \"action\" field:\n");
    for kind in ActionKind::ALL {
        let body = fields(kind)
            .iter()
            .map(|(name, shape)| format!("\"{}\": {}", name, shape))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("- {{ \"action\": \"{}\", {} }}\n", kind, body));
    }
    out.push_str(&format!(
        "Omitted \"cwd\" defaults to \"{}\". Unknown actions are rejected.\n",
        DEFAULT_CWD
    ));
    out
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
