//! Infrastructure layer: event store, record tables, configuration and the
//! packed-picking service with its entry wizard.

pub mod config;
pub mod context;
pub mod error;
pub mod event_store;
pub mod packed_picking;
pub mod pickings;
pub mod records;
pub mod store;
pub mod wizard;


pub use config::{ConfigError, PackingConfig};
pub use context::StockContext;
pub use error::PackingError;
pub use event_store::{InMemoryEventStore, PublishingEventStore};
pub use packed_picking::{MoveRequest, PackedPickingOptions, PackedPickingService};
pub use pickings::{PICKING_AGGREGATE_TYPE, PickingRepository};
pub use records::{StagedRecords, StockRecords};
pub use wizard::{PackProductsWizard, PackProductsWizardLine};
