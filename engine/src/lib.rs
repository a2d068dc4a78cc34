//! Surgical Inventory Engine
//!
//! Inventory ledger, stock movement records and analytics for an orthopedic
//! implant distributor. All state is held in memory; callers pass a
//! [`Session`] describing the acting user to every command.

pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorDetail};
pub use services::{AnalyticsService, DirectoryService, InventoryService, RecordService};
pub use session::Session;
pub use store::{SharedStore, Snapshot, Store};

/// All services wired around one shared store
#[derive(Clone)]
pub struct Engine {
    pub config: Config,
    store: SharedStore,
    pub inventory: InventoryService,
    pub records: RecordService,
    pub directory: DirectoryService,
    pub analytics: AnalyticsService,
}

impl Engine {
    /// Start with an empty store
    pub fn new(config: Config) -> AppResult<Self> {
        Self::from_snapshot(config, Snapshot::default())
    }

    /// Start from previously exported or seeded data
    pub fn from_snapshot(config: Config, snapshot: Snapshot) -> AppResult<Self> {
        config.validate()?;

        tracing::info!(
            environment = %config.environment,
            items = snapshot.items.len(),
            transactions = snapshot.transactions.len(),
            "Initializing surgical inventory engine"
        );

        let store = SharedStore::new(Store::from(snapshot));
        Ok(Self {
            inventory: InventoryService::new(store.clone(), config.inventory.clone()),
            records: RecordService::new(store.clone(), config.records.clone()),
            directory: DirectoryService::new(store.clone()),
            analytics: AnalyticsService::new(store.clone(), config.inventory.clone()),
            store,
            config,
        })
    }

    /// Export the current state
    pub fn snapshot(&self) -> AppResult<Snapshot> {
        let store = self.store.read()?;
        Ok(Snapshot::from(&*store))
    }
}
