pub mod catalog;
pub mod engine;
pub mod script;

pub use catalog::SchemaCatalog;
pub use engine::{ReseedEngine, RESET_TABLES};
pub use script::{is_database_selection, is_transaction_control, split_statements};
