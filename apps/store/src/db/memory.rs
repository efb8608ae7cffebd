//! In-memory document database
//!
//! Same contract as the Postgres backend, including domain-id uniqueness.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::filter::Filter;
use super::traits::{
    Collection, DocumentDatabase, InsertResult, ReplaceOptions, ReplaceResult, StoredDocument,
};
use crate::{Error, Result};

/// storage_id -> document, ordered like the Postgres `ORDER BY storage_id`
type Documents = BTreeMap<String, JsonValue>;

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    collections: Arc<RwLock<HashMap<String, Documents>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentDatabase for MemoryDatabase {
    type Collection = MemoryCollection;

    fn collection(&self, name: &str) -> MemoryCollection {
        MemoryCollection {
            name: name.to_string(),
            collections: Arc::clone(&self.collections),
        }
    }
}

#[derive(Clone)]
pub struct MemoryCollection {
    name: String,
    collections: Arc<RwLock<HashMap<String, Documents>>>,
}

impl MemoryCollection {
    fn duplicate(&self, key: &str) -> Error {
        Error::DuplicateKey {
            collection: self.name.clone(),
            key: key.to_string(),
        }
    }

    /// Storage key of another document already using `document`'s domain id
    fn id_taken_by<'a>(
        docs: &'a Documents,
        document: &JsonValue,
        except: Option<&str>,
    ) -> Option<&'a str> {
        let id = document.get("id").and_then(|v| v.as_str())?;
        docs.iter()
            .find(|(storage_id, doc)| {
                Some(storage_id.as_str()) != except
                    && doc.get("id").and_then(|v| v.as_str()) == Some(id)
            })
            .map(|(storage_id, _)| storage_id.as_str())
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(&self.name).map_or(0, |docs| docs.len() as u64))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&self.name).and_then(|docs| {
            docs.iter()
                .find(|(_, doc)| filter.matches(doc))
                .map(|(storage_id, doc)| StoredDocument::new(storage_id.clone(), doc.clone()))
        }))
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&self.name)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(storage_id, doc)| StoredDocument::new(storage_id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, document: StoredDocument) -> Result<InsertResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(self.name.clone()).or_default();

        if docs.contains_key(&document.storage_id) {
            return Err(self.duplicate(&document.storage_id));
        }
        if Self::id_taken_by(docs, &document.document, None).is_some() {
            return Err(self.duplicate(document.resource_id().unwrap_or_default()));
        }

        docs.insert(document.storage_id.clone(), document.document.clone());
        Ok(InsertResult {
            inserted: vec![document],
        })
    }

    async fn find_one_and_replace(
        &self,
        filter: &Filter,
        document: StoredDocument,
        options: ReplaceOptions,
    ) -> Result<ReplaceResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(self.name.clone()).or_default();

        let matched = docs
            .iter()
            .find(|(_, doc)| filter.matches(doc))
            .map(|(storage_id, _)| storage_id.clone());

        match matched {
            Some(storage_id) => {
                if Self::id_taken_by(docs, &document.document, Some(&storage_id)).is_some() {
                    return Err(self.duplicate(document.resource_id().unwrap_or_default()));
                }
                docs.insert(storage_id.clone(), document.document.clone());
                Ok(ReplaceResult {
                    value: Some(StoredDocument::new(storage_id, document.document)),
                    upserted: false,
                })
            }
            None if options.upsert => {
                if docs.contains_key(&document.storage_id) {
                    return Err(self.duplicate(&document.storage_id));
                }
                if Self::id_taken_by(docs, &document.document, None).is_some() {
                    return Err(self.duplicate(document.resource_id().unwrap_or_default()));
                }
                docs.insert(document.storage_id.clone(), document.document.clone());
                Ok(ReplaceResult {
                    value: Some(document),
                    upserted: true,
                })
            }
            None => Ok(ReplaceResult {
                value: None,
                upserted: false,
            }),
        }
    }

    async fn remove(&self, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&self.name) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|_, doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }
}
