//! Loads electrochemical cell test data (tab-delimited time series) and the
//! matching experiment metadata (spreadsheet rows), joins them by cell
//! identifier, validates both sides, and derives a mass-normalized capacity
//! column.
//!
//! The pipeline per cell is fetch -> validate -> normalize; see
//! [`loader::Loader`]. Remote access (Google Drive file listing/download,
//! Google Sheets partition reads) lives behind the [`loader::RawTableStore`]
//! and [`loader::MetadataStore`] traits so the core stays testable with
//! in-memory fakes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod meta;
pub mod process;

pub use catalog::{build_catalog, CellCatalog, CellId, FileDescriptor};
pub use loader::{Loader, NormalizedCellData};
pub use meta::MetadataRecord;
pub use process::{CellValue, RawTable};
