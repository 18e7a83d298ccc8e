pub mod core;
pub mod db;
pub mod dictionary;
pub mod lookup;
pub mod storage;
pub mod utils;

// Re-exports
pub use crate::core::service::ReverseLookupService;
pub use crate::core::types::{
    AccountItem, AccountingStandard, FinancialReport, Outcome, ReverseLookupResult, SecuritiesCode,
};
pub use crate::core::LookupError;
