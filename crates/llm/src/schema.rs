//! Output Schema
//!
//! A declarative description of the structured value a mediator call must
//! produce: ordered field name -> {kind, optional}. One recursive visitor
//! derives the example skeleton appended to prompts, and the same shape
//! drives validation of the parsed response, so every AI-assisted feature
//! shares a single mechanism instead of per-feature example literals.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The type a schema field declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaKind {
    /// UTF-8 text.
    String,
    /// Any finite number.
    Number,
    /// A whole number.
    Integer,
    /// true/false.
    Boolean,
    /// Homogeneous sequence of the element kind.
    Array { element: Box<SchemaKind> },
    /// Free-form string-keyed object.
    Map,
    /// Nested object with its own declared fields.
    Object { schema: OutputSchema },
}

impl SchemaKind {
    /// Short name used in prompt field listings and mismatch messages.
    fn display_name(&self) -> String {
        match self {
            SchemaKind::String => "string".to_string(),
            SchemaKind::Number => "number".to_string(),
            SchemaKind::Integer => "integer".to_string(),
            SchemaKind::Boolean => "boolean".to_string(),
            SchemaKind::Array { element } => format!("array of {}", element.display_name()),
            SchemaKind::Map => "object".to_string(),
            SchemaKind::Object { .. } => "object".to_string(),
        }
    }

    /// One representative value for this kind.
    fn example(&self) -> Value {
        match self {
            SchemaKind::String => json!("example"),
            SchemaKind::Number => json!(0.5),
            SchemaKind::Integer => json!(1),
            SchemaKind::Boolean => json!(true),
            SchemaKind::Array { element } => Value::Array(vec![element.example()]),
            SchemaKind::Map => Value::Object(Map::new()),
            SchemaKind::Object { schema } => schema.example(),
        }
    }

    /// Check a parsed value against this kind. `path` locates the value in
    /// mismatch messages.
    fn check(&self, value: &Value, path: &str) -> Result<(), String> {
        match self {
            SchemaKind::String => value
                .is_string()
                .then_some(())
                .ok_or_else(|| mismatch(path, "string", value)),
            SchemaKind::Number => value
                .is_number()
                .then_some(())
                .ok_or_else(|| mismatch(path, "number", value)),
            SchemaKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
                Value::Number(n) if n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false) => Ok(()),
                _ => Err(mismatch(path, "integer", value)),
            },
            SchemaKind::Boolean => value
                .is_boolean()
                .then_some(())
                .ok_or_else(|| mismatch(path, "boolean", value)),
            SchemaKind::Array { element } => match value {
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        element.check(item, &format!("{}[{}]", path, i))?;
                    }
                    Ok(())
                }
                _ => Err(mismatch(path, "array", value)),
            },
            SchemaKind::Map => value
                .is_object()
                .then_some(())
                .ok_or_else(|| mismatch(path, "object", value)),
            SchemaKind::Object { schema } => schema.check(value, path),
        }
    }
}

fn mismatch(path: &str, expected: &str, actual: &Value) -> String {
    let actual_kind = match actual {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{}: expected {}, got {}", path, expected, actual_kind)
}

/// One declared field of an output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: SchemaKind,
    /// Optional fields may be absent or null in the response.
    #[serde(default)]
    pub optional: bool,
    /// Shown in the prompt field listing to steer the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Declarative schema for one structured-output call: an ordered set of
/// named fields. Field order is preserved so example skeletons and prompt
/// listings are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema name, used for registry lookup and diagnostics.
    pub name: String,
    pub fields: Vec<(String, FieldSpec)>,
}

impl OutputSchema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, kind: SchemaKind) -> Self {
        self.fields.push((
            name.into(),
            FieldSpec {
                kind,
                optional: false,
                description: None,
            },
        ));
        self
    }

    /// Add an optional field.
    pub fn optional_field(mut self, name: impl Into<String>, kind: SchemaKind) -> Self {
        self.fields.push((
            name.into(),
            FieldSpec {
                kind,
                optional: true,
                description: None,
            },
        ));
        self
    }

    /// Attach a description to the most recently added field.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        if let Some((_, spec)) = self.fields.last_mut() {
            spec.description = Some(description.into());
        }
        self
    }

    /// Build the example skeleton: one representative value per field.
    pub fn example(&self) -> Value {
        let mut object = Map::new();
        for (name, spec) in &self.fields {
            object.insert(name.clone(), spec.kind.example());
        }
        Value::Object(object)
    }

    /// Validate a parsed response value against this schema.
    ///
    /// Required fields must be present and non-null; optional fields may be
    /// absent or null. Unknown extra fields are tolerated - models often
    /// volunteer them and rejecting costs an attempt for nothing.
    pub fn validate_value(&self, value: &Value) -> Result<(), String> {
        self.check(value, "$")
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), String> {
        let Value::Object(object) = value else {
            return Err(mismatch(path, "object", value));
        };
        for (name, spec) in &self.fields {
            let field_path = format!("{}.{}", path, name);
            match object.get(name) {
                None | Some(Value::Null) => {
                    if !spec.optional {
                        return Err(format!("{}: required field is missing", field_path));
                    }
                }
                Some(field_value) => spec.kind.check(field_value, &field_path)?,
            }
        }
        Ok(())
    }

    /// The formatting constraints appended to every mediated prompt: field
    /// listing, hard output rules, and the example skeleton.
    pub fn format_instructions(&self) -> String {
        let mut listing = String::new();
        for (name, spec) in &self.fields {
            let requirement = if spec.optional { "optional" } else { "required" };
            listing.push_str(&format!(
                "- {} ({}, {})",
                name,
                spec.kind.display_name(),
                requirement
            ));
            if let Some(description) = &spec.description {
                listing.push_str(&format!(": {}", description));
            }
            listing.push('\n');
        }

        let example = serde_json::to_string_pretty(&self.example())
            .unwrap_or_else(|_| "{}".to_string());

        format!(
            "Respond with a single JSON object and nothing else.\n\
             Rules:\n\
             - Output JSON only: no prose, no explanations, no markdown fences.\n\
             - Include every required field; omit unknown fields.\n\
             - Use exactly these fields:\n{}\n\
             Example of the expected shape (values are placeholders):\n{}",
            listing, example
        )
    }
}
