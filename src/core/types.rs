use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

/// Result of an operation that may legitimately have nothing to produce.
///
/// `Aborted` is not a defect: it carries the human-readable reason so the
/// caller can report it and stop cleanly.
#[derive(Debug)]
pub enum Outcome<T> {
    Succeeded(T),
    Aborted(String),
}

impl<T> Outcome<T> {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Outcome::Aborted(reason.into())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted(_))
    }
}

/// Four-digit listing code as published by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecuritiesCode(pub u32);

impl SecuritiesCode {
    /// The company master stores codes with a trailing check digit slot,
    /// so `1301` is looked up as `13010`.
    pub fn company_master_code(&self) -> String {
        format!("{}0", self.0)
    }
}

impl fmt::Display for SecuritiesCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecuritiesCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(SecuritiesCode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingStandard {
    Japanese,
    UsGaap,
    Ifrs,
}

impl fmt::Display for AccountingStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountingStandard::Japanese => write!(f, "Japanese"),
            AccountingStandard::UsGaap => write!(f, "US GAAP"),
            AccountingStandard::Ifrs => write!(f, "IFRS"),
        }
    }
}

impl FromStr for AccountingStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "JAPANESE" | "JP GAAP" | "JPGAAP" | "J-GAAP" | "日本基準" => {
                Ok(AccountingStandard::Japanese)
            }
            "US GAAP" | "USGAAP" | "US-GAAP" | "米国基準" => Ok(AccountingStandard::UsGaap),
            "IFRS" | "国際会計基準" => Ok(AccountingStandard::Ifrs),
            other => Err(format!("unknown accounting standard: {}", other)),
        }
    }
}

/// Known figures of one filing, keyed by normalized account name.
///
/// A `None` amount means the account was not reported for the period and is
/// never looked up. Accounts are visited in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialReport {
    pub securities_code: SecuritiesCode,
    pub accounting_standard: AccountingStandard,
    pub fiscal_year: NaiveDate,
    pub account_amounts: BTreeMap<String, Option<Decimal>>,
}

impl FinancialReport {
    pub fn new(
        securities_code: SecuritiesCode,
        accounting_standard: AccountingStandard,
        fiscal_year: NaiveDate,
        account_amounts: BTreeMap<String, Option<Decimal>>,
    ) -> Self {
        Self {
            securities_code,
            accounting_standard,
            fiscal_year,
            account_amounts,
        }
    }

    /// Accounts that carry an amount, in visiting order.
    pub fn reported_amounts(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.account_amounts
            .iter()
            .filter_map(|(name, amount)| amount.map(|amount| (name.as_str(), amount)))
    }

    pub fn has_account(&self, name: &str) -> bool {
        self.account_amounts.contains_key(name)
    }
}

/// A normalized account name paired with the XBRL element a filer used for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseLookupResult {
    pub normalized_name: String,
    pub original_name: String,
    pub securities_code: SecuritiesCode,
    pub fiscal_year: NaiveDate,
}

impl ReverseLookupResult {
    pub fn new(
        normalized_name: impl Into<String>,
        original_name: impl Into<String>,
        securities_code: SecuritiesCode,
        fiscal_year: NaiveDate,
    ) -> Self {
        Self {
            normalized_name: normalized_name.into(),
            original_name: original_name.into(),
            securities_code,
            fiscal_year,
        }
    }
}

/// Persisted mapping row. `(normalized_name, original_name)` is unique in
/// the output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountItem {
    pub normalized_name: String,
    pub original_name: String,
    pub securities_code: SecuritiesCode,
    pub fiscal_year: NaiveDate,
}

impl AccountItem {
    /// Unit separator: account and element names never contain it.
    const KEY_SEPARATOR: char = '\u{1f}';

    pub fn dedup_key(&self) -> String {
        format!(
            "{}{}{}",
            self.normalized_name,
            Self::KEY_SEPARATOR,
            self.original_name
        )
    }
}

impl From<ReverseLookupResult> for AccountItem {
    fn from(result: ReverseLookupResult) -> Self {
        Self {
            normalized_name: result.normalized_name,
            original_name: result.original_name,
            securities_code: result.securities_code,
            fiscal_year: result.fiscal_year,
        }
    }
}
