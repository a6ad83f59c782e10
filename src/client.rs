//! Client and transaction bindings of mutations.
//!
//! A [`Client`] owns the schema registry and hands out mutations. A [`Tx`] is a
//! transactional view of the same client; mutations built from it remember the
//! transaction so that hooks and the persistence engine can resolve the right
//! connection. Neither type opens connections: that belongs to the
//! transaction manager.

use alloc::sync::Arc;
use core::fmt::{self, Display};
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::errors::Error;
use crate::{EntityType, Id, Mutation, Op, Schema};

/// Mutation over an entity type from the client's registry.
pub type EntityMutation = Mutation<Arc<EntityType>>;

/// Identifier of a transaction handed out by a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(u64);

impl TxId {
    /// The raw identifier.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

#[derive(Debug)]
struct ClientInner {
    schema: Schema,
    next_tx: AtomicU64,
}

/// Entry point for building mutations.
///
/// Cloning is cheap; clones share the schema registry.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    tx: Option<TxId>,
}

impl Client {
    /// Creates a client over a schema registry.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                schema,
                next_tx: AtomicU64::new(1),
            }),
            tx: None,
        }
    }

    /// The schema registry.
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Returns whether this client is bound to a transaction.
    #[inline]
    #[must_use]
    pub fn is_transactional(&self) -> bool {
        self.tx.is_some()
    }

    /// Returns the same client without its transaction binding.
    #[must_use]
    pub fn without_tx(&self) -> Client {
        Client {
            inner: Arc::clone(&self.inner),
            tx: None,
        }
    }

    /// Opens a transaction handle.
    ///
    /// # Errors
    ///
    /// * `NestedTransaction` - If this client is already transactional.
    ///
    pub fn begin(&self) -> Result<Tx, Error> {
        if self.tx.is_some() {
            return Err(Error::NestedTransaction);
        }
        let id = TxId(self.inner.next_tx.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(tx = id.get(), "opened transaction handle");
        Ok(Tx {
            client: Client {
                inner: Arc::clone(&self.inner),
                tx: Some(id),
            },
            id,
        })
    }

    fn targeting(&self, entity: &str, op: Op, id: Id) -> Result<EntityMutation, Error> {
        let schema = self.inner.schema.entity(entity)?;
        Ok(Mutation::targeting(schema, op, id, self.clone()))
    }

    /// Starts a create mutation.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If `entity` is not registered.
    ///
    pub fn create(&self, entity: &str) -> Result<EntityMutation, Error> {
        let schema = self.inner.schema.entity(entity)?;
        Ok(Mutation::create(schema, self.clone()))
    }

    /// Starts an update mutation for the node `id`.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If `entity` is not registered.
    ///
    pub fn update(&self, entity: &str, id: impl Into<Id>) -> Result<EntityMutation, Error> {
        self.targeting(entity, Op::Update, id.into())
    }

    /// Starts an update mutation for exactly the node `id`.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If `entity` is not registered.
    ///
    pub fn update_one(&self, entity: &str, id: impl Into<Id>) -> Result<EntityMutation, Error> {
        self.targeting(entity, Op::UpdateOne, id.into())
    }

    /// Starts a delete mutation for the node `id`.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If `entity` is not registered.
    ///
    pub fn delete(&self, entity: &str, id: impl Into<Id>) -> Result<EntityMutation, Error> {
        self.targeting(entity, Op::Delete, id.into())
    }

    /// Starts a delete mutation for exactly the node `id`.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If `entity` is not registered.
    ///
    pub fn delete_one(&self, entity: &str, id: impl Into<Id>) -> Result<EntityMutation, Error> {
        self.targeting(entity, Op::DeleteOne, id.into())
    }
}

/// A transaction handle.
///
/// Dereferences to the transactional [`Client`], so mutations can be started
/// directly from it.
#[derive(Debug, Clone)]
pub struct Tx {
    client: Client,
    id: TxId,
}

impl Tx {
    pub(crate) fn from_client(client: &Client) -> Result<Tx, Error> {
        let id = client.tx.ok_or(Error::NotInTransaction)?;
        Ok(Tx {
            client: client.clone(),
            id,
        })
    }

    /// The transaction identifier.
    #[must_use]
    pub fn id(&self) -> TxId {
        self.id
    }

    /// The transactional client.
    #[must_use]
    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

impl Deref for Tx {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}

impl PartialEq for Tx {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client.inner, &other.client.inner) && self.id == other.id
    }
}

impl Eq for Tx {}
