use serde_json::{Map, Value};

/// Document-level condition evaluated by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Top-level field's text rendering equals `value`
    Equals { field: String, value: String },
    /// Case-insensitive substring match against any of `fields`
    Contains { fields: Vec<String>, needle: String },
    /// Both fields are numbers and `field <= bound`
    AtMostField { field: String, bound: String },
}

impl Predicate {
    /// In-process evaluation; stores that cannot push predicates down use this
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        match self {
            Predicate::Equals { field, value } => {
                doc.get(field).and_then(text_of).as_deref() == Some(value.as_str())
            }
            Predicate::Contains { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|f| {
                    doc.get(f)
                        .and_then(text_of)
                        .map(|t| t.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
            Predicate::AtMostField { field, bound } => {
                match (doc.get(field).and_then(Value::as_f64), doc.get(bound).and_then(Value::as_f64)) {
                    (Some(v), Some(b)) => v <= b,
                    _ => false,
                }
            }
        }
    }
}

/// Text rendering of a JSON value, matching PostgreSQL's `->>` operator
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
