//! # Data Cleaning
//!
//! Turns the raw provider table into the aligned closing-price table and the
//! daily and monthly return tables every downstream engine consumes.
//!
//! - [`Aligner`]: strict intersection-of-availability alignment of closes.
//! - [`ReturnEngine`]: simple daily returns and compounded monthly returns.

pub mod aligner;
pub mod error;
pub mod returns;

pub use aligner::Aligner;
pub use error::CleaningError;
pub use returns::{ReturnEngine, Returns};
