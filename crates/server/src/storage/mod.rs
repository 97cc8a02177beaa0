// Storage layer for the Hushboard server
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - Database: implements UserStore and SessionStore on PostgreSQL
// - StorageBackend: picks the backend at startup and hands out trait objects
// - password: Argon2id hashing for local credentials

pub mod backend;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use repositories::Database;
