//! Shared vocabulary of the ETF analytics workspace: instrument ids, the raw
//! provider table, and the date-indexed tables every stage hands to the next.

pub mod enums;
pub mod error;
pub mod stats;
pub mod structs;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use enums::PriceField;
pub use error::CoreError;
pub use structs::{Instrument, PriceBar, RawPriceTable};
pub use table::{DateTable, SparseTable, ValueTable};
