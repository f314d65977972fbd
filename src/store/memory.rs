use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ensure_id, merge_patch, Collection, DeleteResult, Document, DocumentStore, Filter,
    InsertResult, Page, StoreError, UpdateResult,
};

/// Process-local document store used for development runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let documents = match collections.get(&collection) {
            Some(documents) => documents,
            None => return Ok(Vec::new()),
        };

        let matching = documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .skip(page.skip.unwrap_or(0) as usize);

        Ok(match page.limit {
            Some(limit) => matching.take(limit as usize).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertResult, StoreError> {
        let id = ensure_id(&mut document)?;

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if documents.iter().any(|doc| Filter::by_id(&id).matches(doc)) {
            return Err(StoreError::DuplicateId(id));
        }
        if let Some(field) = collection.unique_field() {
            if let Some(value) = document.get(field).filter(|value| value.is_string()) {
                if documents.iter().any(|doc| doc.get(field) == Some(value)) {
                    return Err(StoreError::UniqueViolation(field));
                }
            }
        }
        documents.push(document);

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|doc| filter.matches(doc)));

        Ok(match target {
            Some(document) => {
                let modified = merge_patch(document, patch);
                UpdateResult {
                    acknowledged: true,
                    matched_count: 1,
                    modified_count: u64::from(modified),
                }
            }
            None => UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            },
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(documents) => match documents.iter().position(|doc| filter.matches(doc)) {
                Some(index) => {
                    documents.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn sum(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<f64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| filter.matches(doc))
                    .filter_map(|doc| doc.get(field).and_then(|value| value.as_f64()))
                    .sum()
            })
            .unwrap_or(0.0))
    }
}
