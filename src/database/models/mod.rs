pub mod observation;
pub mod stock;
pub mod symbol;

pub use observation::{NewObservation, StockObservation};
pub use stock::{CatalogEntry, NewCatalogEntry, Stock};
pub use symbol::Symbol;
