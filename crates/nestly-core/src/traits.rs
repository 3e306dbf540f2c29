use std::future::Future;

use crate::error::AppError;
use crate::identity::DirectoryUser;

/// Looks up users in the external identity provider.
pub trait IdentityDirectory: Send + Sync + Clone {
    /// Fetch a user by identity-provider id. Returns `None` if unknown.
    fn get_user(
        &self,
        clerk_id: &str,
    ) -> impl Future<Output = Result<Option<DirectoryUser>, AppError>> + Send;
}

/// Stores uploaded files and hands back their public URL.
pub trait ObjectStore: Send + Sync + Clone {
    fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn public_url(&self, path: &str) -> String;
}
