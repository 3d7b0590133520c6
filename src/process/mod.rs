// src/process/mod.rs
//! Pure in-memory stages of the pipeline: header cleanup, tab-delimited
//! parsing, validation, and capacity normalization. No I/O happens here.

pub mod headers;
pub mod normalize;
pub mod table;
pub mod validate;

pub use headers::clean_header;
pub use normalize::{add_normalized_capacity, NORMALIZED_COLUMN};
pub use table::{parse_tab_table, CellValue, RawTable};
pub use validate::{check_capacity_column, check_mass_field, validate};
