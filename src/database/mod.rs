/*!
 * SQLite persistence for the translation cache.
 *
 * - `connection`: thread-safe connection handle with async access
 * - `schema`: versioned schema and cache table creation
 * - `repository`: the SQLite-backed cache store
 */

pub mod connection;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::SqliteCache;
