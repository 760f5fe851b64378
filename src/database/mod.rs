pub mod manager;
pub mod memory;
pub mod postgres;
pub mod store;

pub use manager::{connect_lazy, open_store};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{strip_system_fields, Document, DocumentStore, Page, StoreError, SYSTEM_FIELDS};
