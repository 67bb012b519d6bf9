use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use trek_catalog::{AddOnCatalog, FeePolicy, PricingEngine};
use trek_core::{AvailabilityService, BookingStore, CatalogReader};
use trek_shared::models::events::BookingCreatedEvent;
use trek_store::{
    Config, DbClient, HttpAvailabilityService, InMemoryBookingStore, InMemoryCatalog, InMemorySchedule,
    StoreBookingRepository, StoreCatalogRepository, StoreScheduleRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub availability: Arc<dyn AvailabilityService>,
    pub bookings: Arc<dyn BookingStore>,
    /// Operator fee policy applied when re-pricing submitted bookings
    pub pricing: PricingEngine,
    /// Add-ons an operator booking may carry
    pub add_ons: Arc<AddOnCatalog>,
    pub events_tx: broadcast::Sender<BookingCreatedEvent>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        availability: Arc<dyn AvailabilityService>,
        bookings: Arc<dyn BookingStore>,
        fee_policy: FeePolicy,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(100);
        Self {
            catalog,
            availability,
            bookings,
            pricing: PricingEngine::new(fee_policy),
            add_ons: Arc::new(AddOnCatalog::default()),
            events_tx,
        }
    }

    /// Postgres-backed stores when a database is configured, in-memory ones
    /// otherwise. A configured availability URL takes precedence over local
    /// schedule data.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fee_policy = config.pricing.fee_policy();

        let (catalog, schedule, bookings): (
            Arc<dyn CatalogReader>,
            Arc<dyn AvailabilityService>,
            Arc<dyn BookingStore>,
        ) = match DbClient::from_config(&config.database).await? {
            Some(db) => {
                db.migrate().await?;
                info!("Using Postgres stores");
                (
                    Arc::new(StoreCatalogRepository::new(db.pool.clone())) as Arc<dyn CatalogReader>,
                    Arc::new(StoreScheduleRepository::new(db.pool.clone())) as Arc<dyn AvailabilityService>,
                    Arc::new(StoreBookingRepository::new(db.pool.clone())) as Arc<dyn BookingStore>,
                )
            }
            None => {
                warn!("No database configured, using in-memory stores");
                (
                    Arc::new(InMemoryCatalog::new()) as Arc<dyn CatalogReader>,
                    Arc::new(InMemorySchedule::new()) as Arc<dyn AvailabilityService>,
                    Arc::new(InMemoryBookingStore::new()) as Arc<dyn BookingStore>,
                )
            }
        };

        let availability: Arc<dyn AvailabilityService> = match &config.availability.base_url {
            Some(url) => {
                info!("Reading availability from {}", url);
                Arc::new(HttpAvailabilityService::new(url))
            }
            None => schedule,
        };

        Ok(Self::new(catalog, availability, bookings, fee_policy))
    }
}
