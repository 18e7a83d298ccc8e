use super::query::QueryTemplate;
use crate::core::error::LookupError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a normalized account is disclosed, which decides the query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountClassification {
    DividendPerShare,
    OperatingCashFlow,
    ProfitAndLoss,
    Instant,
}

impl AccountClassification {
    pub fn template(&self) -> QueryTemplate {
        match self {
            AccountClassification::DividendPerShare => QueryTemplate::NonConsolidatedDuration,
            AccountClassification::OperatingCashFlow => QueryTemplate::UnbalancedDuration,
            AccountClassification::ProfitAndLoss => QueryTemplate::CreditDuration,
            AccountClassification::Instant => QueryTemplate::CreditInstant,
        }
    }
}

const CLASSIFIED_ACCOUNTS: &[(&str, AccountClassification)] = &[
    (
        "DividendPaidPerShareSummaryOfBusinessResults",
        AccountClassification::DividendPerShare,
    ),
    (
        "NetCashProvidedByUsedInOperatingActivities",
        AccountClassification::OperatingCashFlow,
    ),
    ("NetSales", AccountClassification::ProfitAndLoss),
    ("GrossProfit", AccountClassification::ProfitAndLoss),
    ("OperatingIncome", AccountClassification::ProfitAndLoss),
    ("OrdinaryIncome", AccountClassification::ProfitAndLoss),
    (
        "ProfitLossAttributableToOwnersOfParent",
        AccountClassification::ProfitAndLoss,
    ),
    ("ComprehensiveIncome", AccountClassification::ProfitAndLoss),
    ("TotalAssets", AccountClassification::Instant),
    ("NetAssets", AccountClassification::Instant),
    ("Liabilities", AccountClassification::Instant),
];

pub static ACCOUNT_CLASSIFICATIONS: Lazy<HashMap<&'static str, AccountClassification>> =
    Lazy::new(|| CLASSIFIED_ACCOUNTS.iter().copied().collect());

pub fn classify(account: &str) -> Result<AccountClassification, LookupError> {
    ACCOUNT_CLASSIFICATIONS
        .get(account)
        .copied()
        .ok_or_else(|| LookupError::unsupported(account))
}
