use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;

/// A single normalized query value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(u32),
    Bool(bool),
    Text(String),
}

/// How a recognized field is coerced
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Positive integer; anything else becomes `default`
    PositiveInt { default: u32 },
    /// `true` iff the raw value is exactly "true"
    ExactTrue,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "page", kind: FieldKind::PositiveInt { default: DEFAULT_PAGE } },
    FieldSpec { name: "limit", kind: FieldKind::PositiveInt { default: DEFAULT_LIMIT } },
    FieldSpec { name: "lowStock", kind: FieldKind::ExactTrue },
    FieldSpec { name: "critical", kind: FieldKind::ExactTrue },
];

impl FieldSpec {
    fn lookup(name: &str) -> Option<&'static FieldSpec> {
        FIELDS.iter().find(|f| f.name == name)
    }

    fn default_value(&self) -> Option<QueryValue> {
        match self.kind {
            FieldKind::PositiveInt { default } => Some(QueryValue::Int(default)),
            FieldKind::ExactTrue => None,
        }
    }

    fn coerce(&self, raw: &str) -> QueryValue {
        match self.kind {
            FieldKind::PositiveInt { default } => {
                QueryValue::Int(parse_positive_int(raw).unwrap_or(default))
            }
            FieldKind::ExactTrue => QueryValue::Bool(raw == "true"),
        }
    }
}

/// Lenient base-10 parse: surrounding whitespace and a leading `+` are
/// accepted, parsing stops at the first non-digit. Zero, negatives, empty
/// input and `u32` overflow yield `None`.
fn parse_positive_int(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    match unsigned[..digits_end].parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

/// Typed, defaulted view of a list route's query string.
///
/// Always holds `page` and `limit` as positive integers. Normalization never
/// rejects input: malformed values silently fall back to field defaults, so
/// this is not a validation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedQuery {
    values: BTreeMap<String, QueryValue>,
}

impl Default for NormalizedQuery {
    fn default() -> Self {
        let values = FIELDS
            .iter()
            .filter_map(|f| f.default_value().map(|v| (f.name.to_string(), v)))
            .collect();
        Self { values }
    }
}

impl NormalizedQuery {
    /// Defaults overlaid with `params`
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self::default().overlay(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Decode a raw query string (without the leading `?`). Repeated keys:
    /// the last occurrence wins.
    pub fn from_query_str(raw: &str) -> Self {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        Self::default().overlay(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Overlay raw key/value pairs on top of `self`. Keys not present keep
    /// their current value.
    pub fn overlay<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, raw) in pairs {
            let value = match FieldSpec::lookup(key) {
                Some(spec) => spec.coerce(raw),
                None => QueryValue::Text(raw.to_string()),
            };
            self.values.insert(key.to_string(), value);
        }
        self
    }

    pub fn page(&self) -> u32 {
        self.int("page").unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.int("limit").unwrap_or(DEFAULT_LIMIT)
    }

    /// Number of documents to skip for the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Boolean flag value; `None` when the key was never supplied
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(QueryValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Pass-through string value
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(QueryValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Keys that are not part of the recognized field table
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(k, v)| match v {
            QueryValue::Text(s) => Some((k.as_str(), s.as_str())),
            _ => None,
        })
    }

    fn int(&self, key: &str) -> Option<u32> {
        match self.values.get(key) {
            Some(QueryValue::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for NormalizedQuery {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query_str(parts.uri.query().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_query_yields_only_pagination_defaults() {
        let q = NormalizedQuery::from_query_str("");
        assert_eq!(serde_json::to_value(&q).unwrap(), json!({"page": 1, "limit": 50}));
    }

    #[test]
    fn non_numeric_pagination_falls_back() {
        let q = NormalizedQuery::from_query_str("page=abc&limit=");
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 50);
    }

    #[test]
    fn pagination_never_drops_below_one() {
        for raw in ["page=0&limit=0", "page=-3&limit=-1", "page=99999999999&limit=%20"] {
            let q = NormalizedQuery::from_query_str(raw);
            assert!(q.page() >= 1, "{}", raw);
            assert!(q.limit() >= 1, "{}", raw);
        }
    }

    #[test]
    fn lenient_integer_prefix() {
        assert_eq!(parse_positive_int("12abc"), Some(12));
        assert_eq!(parse_positive_int(" 7 "), Some(7));
        assert_eq!(parse_positive_int("+3"), Some(3));
        assert_eq!(parse_positive_int("1.9"), Some(1));
        assert_eq!(parse_positive_int("abc"), None);
        assert_eq!(parse_positive_int("-2"), None);
    }

    #[test]
    fn flags_require_exact_true() {
        let q = NormalizedQuery::from_query_str("lowStock=true&critical=1");
        assert_eq!(q.flag("lowStock"), Some(true));
        assert_eq!(q.flag("critical"), Some(false));

        let q = NormalizedQuery::from_query_str("lowStock=TRUE");
        assert_eq!(q.flag("lowStock"), Some(false));
    }

    #[test]
    fn absent_flag_keeps_base_value() {
        let base = NormalizedQuery::default().overlay([("critical", "true")]);
        let q = base.overlay([("page", "2")]);
        assert_eq!(q.flag("critical"), Some(true));
        assert_eq!(q.flag("lowStock"), None);
        assert_eq!(q.page(), 2);
    }

    #[test]
    fn unknown_keys_pass_through_verbatim() {
        let q = NormalizedQuery::from_query_str("status=open&search=Acme%20Corp&page=3");
        let extra: Vec<_> = q.passthrough().collect();
        assert_eq!(extra, vec![("search", "Acme Corp"), ("status", "open")]);
        assert_eq!(q.offset(), 100);
    }

    #[test]
    fn last_repeated_key_wins() {
        let q = NormalizedQuery::from_query_str("limit=5&limit=10");
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn from_params_matches_query_string() {
        let mut params = HashMap::new();
        params.insert("limit".to_string(), "20".to_string());
        params.insert("lowStock".to_string(), "true".to_string());
        assert_eq!(
            NormalizedQuery::from_params(&params),
            NormalizedQuery::from_query_str("limit=20&lowStock=true")
        );
    }
}
