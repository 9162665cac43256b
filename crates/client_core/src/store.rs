//! Venue store contract and the command/outcome pair used to run it off the UI thread.

use async_trait::async_trait;
use shared::{
    domain::{Venue, VenueFields, VenueId},
    error::{FetchError, WriteError, WriteOp},
};
use thiserror::Error;

#[async_trait]
pub trait VenueStore: Send + Sync {
    /// Every venue in the collection. `Ok(vec![])` means the store answered
    /// and holds no venues.
    async fn list_all(&self) -> Result<Vec<Venue>, FetchError>;
    async fn create(&self, fields: &VenueFields) -> Result<VenueId, WriteError>;
    /// Writes name, address and hours. `fields.location` is ignored.
    async fn update(&self, id: &VenueId, fields: &VenueFields) -> Result<(), WriteError>;
    async fn delete(&self, id: &VenueId) -> Result<(), WriteError>;
}

pub struct MissingVenueStore;

#[async_trait]
impl VenueStore for MissingVenueStore {
    async fn list_all(&self) -> Result<Vec<Venue>, FetchError> {
        Err(FetchError::new("venue store is unavailable"))
    }

    async fn create(&self, _fields: &VenueFields) -> Result<VenueId, WriteError> {
        Err(WriteError::transport(WriteOp::Create, "venue store is unavailable"))
    }

    async fn update(&self, _id: &VenueId, _fields: &VenueFields) -> Result<(), WriteError> {
        Err(WriteError::transport(WriteOp::Update, "venue store is unavailable"))
    }

    async fn delete(&self, _id: &VenueId) -> Result<(), WriteError> {
        Err(WriteError::transport(WriteOp::Delete, "venue store is unavailable"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    Refresh,
    Create(VenueFields),
    Update { id: VenueId, fields: VenueFields },
    Delete { id: VenueId },
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreOutcome {
    Listed(Result<Vec<Venue>, FetchError>),
    Created(Result<VenueId, WriteError>),
    Updated {
        id: VenueId,
        result: Result<(), WriteError>,
    },
    Deleted {
        id: VenueId,
        result: Result<(), WriteError>,
    },
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl StoreOutcome {
    pub fn error(&self) -> Option<StoreError> {
        match self {
            Self::Listed(Err(err)) => Some(err.clone().into()),
            Self::Created(Err(err))
            | Self::Updated {
                result: Err(err), ..
            }
            | Self::Deleted {
                result: Err(err), ..
            } => Some(err.clone().into()),
            _ => None,
        }
    }
}

pub async fn execute(store: &dyn VenueStore, command: StoreCommand) -> StoreOutcome {
    match command {
        StoreCommand::Refresh => StoreOutcome::Listed(store.list_all().await),
        StoreCommand::Create(fields) => StoreOutcome::Created(store.create(&fields).await),
        StoreCommand::Update { id, fields } => {
            let result = store.update(&id, &fields).await;
            StoreOutcome::Updated { id, result }
        }
        StoreCommand::Delete { id } => {
            let result = store.delete(&id).await;
            StoreOutcome::Deleted { id, result }
        }
    }
}
