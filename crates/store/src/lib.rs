pub mod memory;
pub mod sqlite;

pub use memory::MemoryTradeStore;
pub use sqlite::SqliteTradeStore;
