use async_trait::async_trait;
use medreq_store::{
    db::{
        Collection, DocumentDatabase, Filter, InsertResult, ReplaceOptions, ReplaceResult,
        StoredDocument,
    },
    Error, Result,
};

/// A database whose every collection call fails with a storage error
#[derive(Clone)]
pub struct FailingDatabase {
    message: String,
}

impl FailingDatabase {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl DocumentDatabase for FailingDatabase {
    type Collection = FailingCollection;

    fn collection(&self, name: &str) -> FailingCollection {
        FailingCollection {
            name: name.to_string(),
            message: self.message.clone(),
        }
    }
}

pub struct FailingCollection {
    name: String,
    message: String,
}

impl FailingCollection {
    fn fail<T>(&self) -> Result<T> {
        Err(Error::Storage(self.message.clone()))
    }
}

#[async_trait]
impl Collection for FailingCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64> {
        self.fail()
    }

    async fn find_one(&self, _filter: &Filter) -> Result<Option<StoredDocument>> {
        self.fail()
    }

    async fn find(&self, _filter: &Filter) -> Result<Vec<StoredDocument>> {
        self.fail()
    }

    async fn insert(&self, _document: StoredDocument) -> Result<InsertResult> {
        self.fail()
    }

    async fn find_one_and_replace(
        &self,
        _filter: &Filter,
        _document: StoredDocument,
        _options: ReplaceOptions,
    ) -> Result<ReplaceResult> {
        self.fail()
    }

    async fn remove(&self, _filter: &Filter) -> Result<u64> {
        self.fail()
    }
}
