// src/db.rs

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{bson::{doc, Document}, Client, Collection};
use thiserror::Error;
//
use crate::config::Config;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read access to the sales collection.
#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Document>>;

    /// Documents whose `key` ends with `suffix`, ignoring case.
    async fn find_by_key_suffix(&self, suffix: &str) -> Result<Vec<Document>>;
}

#[derive(Clone, Debug)]
pub struct DB {
    pub client: Client,
    pub database: String,
}

impl DB {
    pub async fn new(config: &Config) -> mongodb::error::Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;

        Ok(Self { client, database: config.database.clone() })
    }

    pub fn sales(&self, collection_name: &str) -> MongoSalesStore {
        let collection = self.client.database(&self.database).collection::<Document>(collection_name);

        MongoSalesStore { collection }
    }
}

#[derive(Clone, Debug)]
pub struct MongoSalesStore {
    collection: Collection<Document>,
}

impl MongoSalesStore {
    async fn find(&self, filter: Option<Document>) -> Result<Vec<Document>> {
        let cursor = self.collection.find(filter, None).await?;

        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }
}

#[async_trait]
impl SalesStore for MongoSalesStore {
    async fn find_all(&self) -> Result<Vec<Document>> {
        self.find(None).await
    }

    async fn find_by_key_suffix(&self, suffix: &str) -> Result<Vec<Document>> {
        self.find(Some(key_suffix_filter(suffix))).await
    }
}

pub fn key_suffix_filter(suffix: &str) -> Document {
    doc! { "key": { "$regex": format!("{}$", regex::escape(suffix)), "$options": "i" } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn pattern(filter: &Document) -> regex::Regex {
        let key = filter.get_document("key").unwrap();
        assert_eq!(key.get_str("$options").unwrap(), "i");

        RegexBuilder::new(key.get_str("$regex").unwrap())
            .case_insensitive(true)
            .build()
            .unwrap()
    }

    #[test]
    fn key_filter_matches_suffix_ignoring_case() {
        let re = pattern(&key_suffix_filter("-DECEMBER-2022"));

        assert!(re.is_match("NDC-DECEMBER-2022"));
        assert!(re.is_match("ndc-december-2022"));
        assert!(!re.is_match("NDC-DECEMBER-20223"));
        assert!(!re.is_match("NDC-NOVEMBER-2022"));
    }

    #[test]
    fn key_filter_escapes_regex_syntax() {
        let re = pattern(&key_suffix_filter("-MAY-20.2"));

        assert!(re.is_match("NDC-MAY-20.2"));
        assert!(!re.is_match("NDC-MAY-2012"));
    }
}
