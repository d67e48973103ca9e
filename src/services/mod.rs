// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use cache::{CacheKey, FeedRegistry, ViewerCache};
pub use memory::InMemoryProfileStore;
pub use postgres::PgProfileStore;
pub use store::{ProfileStore, StoreError};
pub use supabase::SupabaseClient;
