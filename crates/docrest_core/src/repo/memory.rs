//! Process-local document store.

use super::{new_document_id, DocumentRepository, RepoError, RepoResult};
use crate::model::document::{Document, DocumentId};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Map-backed repository; `find_all` returns documents in id order.
pub struct InMemoryDocumentRepository<D> {
    documents: Mutex<BTreeMap<DocumentId, D>>,
}

impl<D> Default for InMemoryDocumentRepository<D> {
    fn default() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<D> InMemoryDocumentRepository<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, BTreeMap<DocumentId, D>>> {
        self.documents
            .lock()
            .map_err(|_| RepoError::LockPoisoned("in-memory document store"))
    }
}

impl<D: Document> DocumentRepository<D> for InMemoryDocumentRepository<D> {
    fn save(&self, mut document: D) -> RepoResult<D> {
        if !document.has_id() {
            document.set_id(new_document_id());
        }
        let id = document.id().unwrap_or_default().to_string();
        self.lock()?.insert(id, document.clone());
        Ok(document)
    }

    fn find_one(&self, id: &str) -> RepoResult<Option<D>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn find_all(&self) -> RepoResult<Vec<D>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.lock()?.remove(id);
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryDocumentRepository;
    use crate::model::document::{Document, DocumentMeta};
    use crate::repo::DocumentRepository;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Memo {
        meta: DocumentMeta,
        text: String,
    }

    impl Document for Memo {
        fn meta(&self) -> &DocumentMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut DocumentMeta {
            &mut self.meta
        }
    }

    #[test]
    fn save_assigns_id_once_and_replaces_on_resave() {
        let repo = InMemoryDocumentRepository::<Memo>::new();

        let mut saved = repo
            .save(Memo {
                text: "first".to_string(),
                ..Memo::default()
            })
            .unwrap();
        let id = saved.id().expect("repository should assign an id").to_string();

        saved.text = "second".to_string();
        let resaved = repo.save(saved).unwrap();
        assert_eq!(resaved.id(), Some(id.as_str()));
        assert_eq!(repo.len().unwrap(), 1);
        assert_eq!(repo.find_one(&id).unwrap().unwrap().text, "second");
    }

    #[test]
    fn delete_of_unknown_id_succeeds() {
        let repo = InMemoryDocumentRepository::<Memo>::new();
        repo.delete("missing").unwrap();
        assert!(repo.find_one("missing").unwrap().is_none());
    }

    #[test]
    fn delete_all_empties_store() {
        let repo = InMemoryDocumentRepository::<Memo>::new();
        repo.save(Memo::default()).unwrap();
        repo.save(Memo::default()).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 2);

        repo.delete_all().unwrap();
        assert!(repo.is_empty().unwrap());
    }
}
