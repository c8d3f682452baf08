//! SurrealDB repository implementations.

mod revocation;
mod user;

pub use revocation::SurrealRevocationStore;
pub use user::SurrealUserRepository;
