pub mod config;
pub mod error;
pub mod init;
pub mod service;
pub mod types;

pub use error::LookupError;
pub use types::{
    AccountItem, AccountingStandard, FinancialReport, Outcome, ReverseLookupResult, SecuritiesCode,
};
