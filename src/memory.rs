// src/memory.rs

use async_trait::async_trait;
use mongodb::bson::Document;
use std::sync::atomic::{AtomicBool, Ordering};
//
use crate::db::{Result, SalesStore, StoreError};

/// Sales held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    documents: Vec<Document>,
    unavailable: AtomicBool,
}

impl InMemorySalesStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents, unavailable: AtomicBool::new(false) }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl SalesStore for InMemorySalesStore {
    async fn find_all(&self) -> Result<Vec<Document>> {
        self.check()?;

        Ok(self.documents.clone())
    }

    async fn find_by_key_suffix(&self, suffix: &str) -> Result<Vec<Document>> {
        self.check()?;

        let suffix = suffix.to_lowercase();

        Ok(self
            .documents
            .iter()
            .filter(|document| {
                document
                    .get_str("key")
                    .map(|key| key.to_lowercase().ends_with(&suffix))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn filters_by_key_suffix_ignoring_case() {
        let store = InMemorySalesStore::new(vec![
            doc! { "key": "NDC-DECEMBER-2022" },
            doc! { "key": "ndc-december-2023" },
            doc! { "key": "MCK-December-2022" },
            doc! { "sale": 1 },
        ]);

        let found = store.find_by_key_suffix("-DECEMBER-2022").await.unwrap();
        let keys = found.iter().map(|d| d.get_str("key").unwrap()).collect::<Vec<_>>();

        assert_eq!(keys, vec!["NDC-DECEMBER-2022", "MCK-December-2022"]);
        assert_eq!(store.find_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn reports_unavailable() {
        let store = InMemorySalesStore::default();
        store.set_unavailable(true);

        assert!(matches!(store.find_all().await, Err(StoreError::Unavailable(_))));
        assert!(store.find_by_key_suffix("-MAY-2022").await.is_err());
    }
}
