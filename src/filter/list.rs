use crate::types::{Flag, Resource};

use super::{NormalizedQuery, Predicate};

/// Pass-through keys that are never turned into equality predicates
const RESERVED_KEYS: &[&str] = &["search", "sort"];

/// Keys starting with this are client-side markers such as cache busters
const RESERVED_PREFIX: char = '_';

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key) || key.starts_with(RESERVED_PREFIX)
}

/// Store-facing shape of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub offset: u64,
    pub limit: u32,
    pub predicates: Vec<Predicate>,
}

impl ListQuery {
    /// Translate a normalized query into pagination and predicates for
    /// `resource`. Flags the resource does not define are ignored.
    pub fn for_resource(resource: Resource, query: &NormalizedQuery) -> Self {
        let mut predicates = Vec::new();

        for flag in Flag::ALL {
            if query.flag(flag.key()) == Some(true) {
                if let Some(p) = resource.flag_predicate(flag) {
                    predicates.push(p);
                }
            }
        }

        if let Some(needle) = query.text("search").filter(|s| !s.is_empty()) {
            predicates.push(Predicate::Contains {
                fields: resource.search_fields().iter().map(|f| f.to_string()).collect(),
                needle: needle.to_string(),
            });
        }

        for (key, value) in query.passthrough() {
            if is_reserved(key) {
                continue;
            }
            predicates.push(Predicate::Equals {
                field: key.to_string(),
                value: value.to_string(),
            });
        }

        Self {
            offset: query.offset(),
            limit: query.limit(),
            predicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_applies_to_products_only() {
        let q = NormalizedQuery::from_query_str("lowStock=true");
        assert_eq!(ListQuery::for_resource(Resource::Products, &q).predicates.len(), 1);
        assert!(ListQuery::for_resource(Resource::Customers, &q).predicates.is_empty());
    }

    #[test]
    fn false_flags_add_nothing() {
        let q = NormalizedQuery::from_query_str("critical=yes");
        assert!(ListQuery::for_resource(Resource::ServiceTickets, &q).predicates.is_empty());
    }

    #[test]
    fn passthrough_becomes_equality_except_reserved() {
        let q = NormalizedQuery::from_query_str("status=open&sort=name&search=&page=2&limit=10");
        let lq = ListQuery::for_resource(Resource::Leads, &q);
        assert_eq!(lq.offset, 10);
        assert_eq!(lq.limit, 10);
        assert_eq!(
            lq.predicates,
            vec![Predicate::Equals { field: "status".into(), value: "open".into() }]
        );
    }

    #[test]
    fn underscore_keys_never_filter() {
        let q = NormalizedQuery::from_query_str("_t=123&__debug=1&status=open");
        let lq = ListQuery::for_resource(Resource::Products, &q);
        assert_eq!(
            lq.predicates,
            vec![Predicate::Equals { field: "status".into(), value: "open".into() }]
        );
    }

    #[test]
    fn search_uses_resource_fields() {
        let q = NormalizedQuery::from_query_str("search=widget");
        let lq = ListQuery::for_resource(Resource::Products, &q);
        match &lq.predicates[0] {
            Predicate::Contains { fields, needle } => {
                assert_eq!(fields, &vec!["name".to_string(), "sku".to_string(), "category".to_string()]);
                assert_eq!(needle, "widget");
            }
            other => panic!("unexpected predicate {:?}", other),
        }
    }
}
