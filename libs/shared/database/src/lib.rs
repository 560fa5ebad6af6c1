pub mod pool;
pub mod repository;
pub mod state;

pub use pool::DbPool;
pub use state::AppState;
