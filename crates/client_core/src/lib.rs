//! Client-side state for the venue map: store access, marker sync, viewport
//! mirroring, the placing/editing mode machine and the session that ties
//! them to a map widget.

pub mod config;
pub mod firestore;
pub mod map;
pub mod markers;
pub mod memory;
pub mod mode;
pub mod session;
pub mod store;
pub mod viewport;

use std::sync::Arc;

pub use config::{load_settings, MapSettings, Settings, SettingsError, StoreBackend, StoreSettings};
pub use firestore::FirestoreVenueStore;
pub use map::{HeadlessMap, MapEvent, MapOptions, MapWidget, MarkerId};
pub use markers::MarkerSync;
pub use memory::InMemoryVenueStore;
pub use mode::{compose_hours, parse_hours, Draft, FormData, Mode, ModeMachine};
pub use session::{drive, ConfirmPrompt, FetchStatus, MapSession, SubmitError};
pub use store::{execute, MissingVenueStore, StoreCommand, StoreError, StoreOutcome, VenueStore};
pub use viewport::ViewportController;

/// Builds the store selected by `settings.backend`.
pub fn connect_store(settings: &StoreSettings) -> Arc<dyn VenueStore> {
    match settings.backend {
        StoreBackend::Firestore => {
            tracing::info!(
                base_url = %settings.base_url,
                project = %settings.project_id,
                collection = %settings.collection,
                "store: using firestore backend"
            );
            Arc::new(FirestoreVenueStore::new(settings))
        }
        StoreBackend::Memory => {
            tracing::info!("store: using in-memory backend");
            Arc::new(InMemoryVenueStore::new())
        }
    }
}
