// Identity Core
//
// This crate provides the storage-agnostic identity model for Hushboard.
//
// Key design decisions:
// - Uses traits (UserStore, SessionStore) for pluggable backends
// - A User carries either a local credential or a federated id; the two are never merged
// - Sessions reference users by id only
// - Errors form one taxonomy shared by stores, verifier and gate

pub mod error;
pub mod traits;
pub mod user;

// In-memory implementations for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use error::{Error, Result};
pub use memory::{InMemorySessionStore, InMemoryUserStore};
pub use traits::{SessionStore, UserStore};
pub use user::{IdentityKind, NewUser, Principal, SessionRecord, User};
