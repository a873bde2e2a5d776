//! # Record Storage
//!
//! A [`ResourceActor`](crate::ResourceActor) keeps its working set in memory and writes every
//! committed record through a [`Storage`] backend before acknowledging the request.
//!
//! - [`MemoryStorage`] keeps nothing and is what [`ResourceActor::new`](crate::ResourceActor::new) uses.
//! - [`SledStorage`] keeps one sled tree per entity, each record CBOR-encoded with `minicbor`
//!   under the string form of its id.
//!
//! Backends are synchronous: the actor is the only writer, and sled calls are short.

use crate::entity::ActorEntity;
use std::marker::PhantomData;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("Failed to encode record {key}: {reason}")]
    Encode { key: String, reason: String },
    #[error("Failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Write-through persistence for one entity type.
pub trait Storage<T: ActorEntity>: Send + 'static {
    /// Every stored record, in any order.
    fn load(&self) -> Result<Vec<T>, StorageError>;

    /// Insert or replace `item`.
    fn persist(&mut self, item: &T) -> Result<(), StorageError>;

    fn remove(&mut self, id: &T::Id) -> Result<(), StorageError>;
}

/// Volatile backend. Records live only as long as the actor.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStorage;

impl<T: ActorEntity> Storage<T> for MemoryStorage {
    fn load(&self) -> Result<Vec<T>, StorageError> {
        Ok(Vec::new())
    }

    fn persist(&mut self, _item: &T) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&mut self, _id: &T::Id) -> Result<(), StorageError> {
        Ok(())
    }
}

/// sled-backed storage. One tree per entity type.
pub struct SledStorage<T> {
    tree: sled::Tree,
    _entity: PhantomData<fn() -> T>,
}

impl<T> SledStorage<T> {
    /// Opens (or creates) the tree `name` inside `db`.
    pub fn open(db: &sled::Db, name: &str) -> Result<Self, StorageError> {
        let tree = db.open_tree(name)?;
        debug!(tree = name, records = tree.len(), "Opened sled tree");
        Ok(Self {
            tree,
            _entity: PhantomData,
        })
    }
}

impl<T> Storage<T> for SledStorage<T>
where
    T: ActorEntity + minicbor::Encode<()> + for<'b> minicbor::Decode<'b, ()>,
{
    fn load(&self) -> Result<Vec<T>, StorageError> {
        let mut items = Vec::with_capacity(self.tree.len());
        for entry in self.tree.iter() {
            let (_, value) = entry?;
            items.push(minicbor::decode::<T>(&value)?);
        }
        Ok(items)
    }

    fn persist(&mut self, item: &T) -> Result<(), StorageError> {
        let key = item.id().to_string();
        let bytes = minicbor::to_vec(item).map_err(|e| StorageError::Encode {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.tree.insert(key.as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&mut self, id: &T::Id) -> Result<(), StorageError> {
        self.tree.remove(id.to_string().as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}
