pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod http;
pub mod memory;
pub mod schedule_repo;

pub use app_config::Config;
pub use booking_repo::StoreBookingRepository;
pub use catalog_repo::StoreCatalogRepository;
pub use database::DbClient;
pub use http::{HttpAvailabilityService, HttpBookingStore};
pub use memory::{InMemoryBookingStore, InMemoryCart, InMemoryCatalog, InMemorySchedule};
pub use schedule_repo::StoreScheduleRepository;
