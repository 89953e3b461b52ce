// Database Module
// Process-wide PostgreSQL pool shared by the handlers and the health probe

mod error;
mod pool;

pub use error::DbError;
pub use pool::DbPool;
