/// Repository implementations over the catalog and history ledger
///
/// Repositories receive already-canonical [`Symbol`](crate::database::models::Symbol)
/// values and check out one pooled connection per call.

pub mod catalog_repository;
pub mod ledger_repository;

pub use catalog_repository::{CatalogRepository, CatalogRepositoryImpl};
pub use ledger_repository::{LedgerRepository, LedgerRepositoryImpl};
