//! Sources of already-known financial figures to reverse look up.

pub mod csv;

pub use self::csv::CsvReverseDictionary;

use crate::core::types::{FinancialReport, Outcome};
use anyhow::Result;
use futures::stream::BoxStream;

pub type ReportStream = BoxStream<'static, Result<FinancialReport>>;

pub trait ReverseDictionary: Send + Sync {
    /// Opens the source. Reports are produced lazily, in source order, and
    /// the stream cannot be restarted.
    fn get(&self) -> Outcome<ReportStream>;
}
