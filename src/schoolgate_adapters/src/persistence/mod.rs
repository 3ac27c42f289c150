pub mod hashmap_account_store;
pub mod hashmap_revocation_store;
pub mod postgres_account_store;
pub mod postgres_revocation_store;
pub mod redis_revocation_store;
pub mod revocation_backend;

pub use hashmap_account_store::HashMapAccountStore;
pub use hashmap_revocation_store::HashMapRevocationStore;
pub use postgres_account_store::PostgresAccountStore;
pub use postgres_revocation_store::PostgresRevocationStore;
pub use redis_revocation_store::RedisRevocationStore;
pub use revocation_backend::{RevocationBackend, RevocationBackendKind};
