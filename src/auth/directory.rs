use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::IdentityRecord;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Directory lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

/// Read-only lookup of identity records by email
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DirectoryError>;
}

/// Directory backed by the `users` collection
#[derive(Clone)]
pub struct StoreDirectory {
    store: Arc<dyn DocumentStore>,
}

impl StoreDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserDirectory for StoreDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DirectoryError> {
        let user = self
            .store
            .find_one(Collection::Users, &Filter::eq("email", email))
            .await?;

        Ok(user.map(|user| IdentityRecord {
            email: email.to_string(),
            role: user
                .get("role")
                .and_then(|role| role.as_str())
                .map(str::to_string),
        }))
    }
}
