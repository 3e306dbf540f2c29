//! Test utilities: mock implementations of the external-service traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::identity::DirectoryUser;
use crate::traits::{IdentityDirectory, ObjectStore};

// ---------------------------------------------------------------------------
// MockIdentityDirectory
// ---------------------------------------------------------------------------

/// In-memory identity directory keyed by identity-provider id.
#[derive(Clone, Default)]
pub struct MockIdentityDirectory {
    users: Arc<Mutex<HashMap<String, DirectoryUser>>>,
    error: Arc<Mutex<Option<AppError>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose next lookup fails with `error`.
    pub fn failing(error: AppError) -> Self {
        let directory = Self::default();
        *directory.error.lock().unwrap() = Some(error);
        directory
    }

    pub fn with_user(self, user: DirectoryUser) -> Self {
        self.users.lock().unwrap().insert(user.id.clone(), user);
        self
    }

    /// Ids looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl IdentityDirectory for MockIdentityDirectory {
    async fn get_user(&self, clerk_id: &str) -> Result<Option<DirectoryUser>, AppError> {
        self.lookups.lock().unwrap().push(clerk_id.to_string());
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.users.lock().unwrap().get(clerk_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// MockObjectStore
// ---------------------------------------------------------------------------

/// Object store that records uploads as `(path, content_type, bytes)`.
#[derive(Clone)]
pub struct MockObjectStore {
    base_url: String,
    objects: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockObjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// A store whose next upload fails with `error`.
    pub fn failing(error: AppError) -> Self {
        let store = Self::new("https://storage.invalid");
        *store.error.lock().unwrap() = Some(error);
        store
    }

    pub fn objects(&self) -> Vec<(String, String, Vec<u8>)> {
        self.objects.lock().unwrap().clone()
    }
}

impl ObjectStore for MockObjectStore {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.objects
            .lock()
            .unwrap()
            .push((path.to_string(), content_type.to_string(), bytes));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
