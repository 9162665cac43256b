//! Process-local venue store for demos and tests.

use async_trait::async_trait;
use shared::{
    domain::{Venue, VenueFields, VenueId},
    error::{FetchError, WriteError, WriteOp},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::VenueStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub list: u32,
    pub create: u32,
    pub update: u32,
    pub delete: u32,
}

impl StoreCalls {
    pub fn writes(&self) -> u32 {
        self.create + self.update + self.delete
    }
}

#[derive(Default)]
struct Inner {
    venues: Vec<Venue>,
    calls: StoreCalls,
    fetch_failure: Option<String>,
    write_failure: Option<String>,
}

#[derive(Default)]
pub struct InMemoryVenueStore {
    inner: Mutex<Inner>,
}

impl InMemoryVenueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                venues,
                ..Inner::default()
            }),
        }
    }

    pub async fn calls(&self) -> StoreCalls {
        self.inner.lock().await.calls
    }

    pub async fn venues(&self) -> Vec<Venue> {
        self.inner.lock().await.venues.clone()
    }

    /// Makes every subsequent `list_all` fail with `message`; `None` heals.
    pub async fn fail_fetches(&self, message: Option<&str>) {
        self.inner.lock().await.fetch_failure = message.map(str::to_string);
    }

    pub async fn fail_writes(&self, message: Option<&str>) {
        self.inner.lock().await.write_failure = message.map(str::to_string);
    }
}

#[async_trait]
impl VenueStore for InMemoryVenueStore {
    async fn list_all(&self) -> Result<Vec<Venue>, FetchError> {
        let mut inner = self.inner.lock().await;
        inner.calls.list += 1;
        if let Some(message) = &inner.fetch_failure {
            return Err(FetchError::new(message.clone()));
        }
        Ok(inner.venues.clone())
    }

    async fn create(&self, fields: &VenueFields) -> Result<VenueId, WriteError> {
        let mut inner = self.inner.lock().await;
        inner.calls.create += 1;
        if let Some(message) = &inner.write_failure {
            return Err(WriteError::transport(WriteOp::Create, message.clone()));
        }

        let id = VenueId::new(Uuid::new_v4().simple().to_string());
        inner.venues.push(Venue {
            id: id.clone(),
            name: fields.name.clone(),
            address: fields.address.clone(),
            hours: fields.hours.clone(),
            lat: fields.location.map(|at| at.lat),
            lng: fields.location.map(|at| at.lng),
        });
        Ok(id)
    }

    async fn update(&self, id: &VenueId, fields: &VenueFields) -> Result<(), WriteError> {
        let mut inner = self.inner.lock().await;
        inner.calls.update += 1;
        if let Some(message) = &inner.write_failure {
            return Err(WriteError::transport(WriteOp::Update, message.clone()));
        }

        let venue = inner
            .venues
            .iter_mut()
            .find(|venue| &venue.id == id)
            .ok_or_else(|| WriteError::NotFound(id.clone()))?;
        venue.name = fields.name.clone();
        venue.address = fields.address.clone();
        venue.hours = fields.hours.clone();
        Ok(())
    }

    async fn delete(&self, id: &VenueId) -> Result<(), WriteError> {
        let mut inner = self.inner.lock().await;
        inner.calls.delete += 1;
        if let Some(message) = &inner.write_failure {
            return Err(WriteError::transport(WriteOp::Delete, message.clone()));
        }
        inner.venues.retain(|venue| &venue.id != id);
        Ok(())
    }
}
