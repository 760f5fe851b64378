pub mod list;
pub mod normalize;
pub mod predicate;

pub use list::ListQuery;
pub use normalize::{NormalizedQuery, QueryValue, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use predicate::Predicate;
