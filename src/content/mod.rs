pub mod store;
pub mod sqlite_store;

pub use store::{Category, ContentStore, DailyRecord, Entry, StoreError};
pub use sqlite_store::SqliteContentStore;
