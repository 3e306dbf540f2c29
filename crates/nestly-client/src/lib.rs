pub mod clerk;
pub mod storage;

pub use clerk::ClerkDirectory;
pub use storage::SupabaseStorage;
