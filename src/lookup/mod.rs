//! Recovers the XBRL element a filer used for each known figure of a report.

pub mod classification;
pub mod memory;
pub mod query;

pub use classification::{classify, AccountClassification};
pub use memory::MemoryReportItemStore;
pub use query::{LookupParams, QueryTemplate};

use crate::core::types::{FinancialReport, ReverseLookupResult};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only access to tagged report items.
#[async_trait]
pub trait ReportItemStore: Send + Sync {
    /// Runs `template` with `params` bound and returns the `xbrl_name` column
    /// of every row, nulls included.
    async fn find_xbrl_names(
        &self,
        template: QueryTemplate,
        params: &LookupParams,
    ) -> Result<Vec<Option<String>>>;
}

#[async_trait]
impl<S: ReportItemStore + ?Sized> ReportItemStore for Arc<S> {
    async fn find_xbrl_names(
        &self,
        template: QueryTemplate,
        params: &LookupParams,
    ) -> Result<Vec<Option<String>>> {
        (**self).find_xbrl_names(template, params).await
    }
}

#[async_trait]
pub trait ReverseLookup: Send + Sync {
    async fn lookup(&self, report: &FinancialReport) -> Result<Vec<ReverseLookupResult>>;
}

pub struct ReverseLookupResolver<S> {
    store: S,
}

impl<S: ReportItemStore> ReverseLookupResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ReportItemStore> ReverseLookup for ReverseLookupResolver<S> {
    async fn lookup(&self, report: &FinancialReport) -> Result<Vec<ReverseLookupResult>> {
        // Classify everything up front so an unsupported account fails the
        // report before any query runs.
        let plan = report
            .reported_amounts()
            .map(|(account, amount)| classify(account).map(|c| (account, amount, c.template())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::new();
        for (account, amount, template) in plan {
            let params = LookupParams::for_report(report, amount);
            let names = self.store.find_xbrl_names(template, &params).await?;
            log::debug!(
                "{} {} {}: {} candidate(s) via {} query",
                report.securities_code,
                report.fiscal_year,
                account,
                names.len(),
                template
            );

            for name in names.into_iter().flatten() {
                let name = name.trim();
                // A name the report already tags is not a discovery.
                if name.is_empty() || report.has_account(name) {
                    continue;
                }
                results.push(ReverseLookupResult::new(
                    account,
                    name,
                    report.securities_code,
                    report.fiscal_year,
                ));
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LookupError;
    use crate::core::types::{AccountingStandard, SecuritiesCode};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn fiscal_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 31).unwrap()
    }

    fn report(amounts: &[(&str, Option<i64>)]) -> FinancialReport {
        FinancialReport::new(
            SecuritiesCode(1301),
            AccountingStandard::Japanese,
            fiscal_year(),
            amounts
                .iter()
                .map(|(name, amount)| (name.to_string(), amount.map(Decimal::from)))
                .collect(),
        )
    }

    fn params(amount: i64) -> LookupParams {
        LookupParams::new(Decimal::from(amount), SecuritiesCode(1301), fiscal_year())
    }

    #[tokio::test]
    async fn test_net_sales_resolves_to_summary_element() {
        let store = MemoryReportItemStore::new();
        store.insert(
            QueryTemplate::CreditDuration,
            params(262_519_000_000),
            vec![Some("NetSalesSummaryOfBusinessResults".to_string())],
        );
        let resolver = ReverseLookupResolver::new(store);

        let results = resolver
            .lookup(&report(&[("NetSales", Some(262_519_000_000))]))
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![ReverseLookupResult::new(
                "NetSales",
                "NetSalesSummaryOfBusinessResults",
                SecuritiesCode(1301),
                fiscal_year()
            )]
        );
    }

    #[tokio::test]
    async fn test_names_already_in_report_are_suppressed() {
        let store = MemoryReportItemStore::new();
        store.insert(
            QueryTemplate::CreditDuration,
            params(100),
            vec![
                Some("TotalAssets".to_string()),
                Some("NetSalesOfCompletedConstructionContracts".to_string()),
            ],
        );
        let resolver = ReverseLookupResolver::new(store);

        let results = resolver
            .lookup(&report(&[("NetSales", Some(100)), ("TotalAssets", Some(500))]))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].original_name, "NetSalesOfCompletedConstructionContracts");
    }

    #[tokio::test]
    async fn test_padded_names_are_trimmed_before_suppression() {
        let store = MemoryReportItemStore::new();
        store.insert(
            QueryTemplate::CreditDuration,
            params(100),
            vec![
                Some(" TotalAssets ".to_string()),
                Some("NetSalesSummaryOfBusinessResults  ".to_string()),
            ],
        );
        let resolver = ReverseLookupResolver::new(store);

        let results = resolver
            .lookup(&report(&[("NetSales", Some(100)), ("TotalAssets", None)]))
            .await
            .unwrap();

        let names: Vec<_> = results.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, vec!["NetSalesSummaryOfBusinessResults"]);
    }

    #[tokio::test]
    async fn test_null_and_blank_names_are_dropped() {
        let store = MemoryReportItemStore::new();
        store.insert(
            QueryTemplate::CreditInstant,
            params(42),
            vec![None, Some(String::new()), Some("  ".to_string())],
        );
        let resolver = ReverseLookupResolver::new(store);

        let results = resolver
            .lookup(&report(&[("NetAssets", Some(42))]))
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unreported_accounts_are_not_queried() {
        let store = Arc::new(MemoryReportItemStore::new());
        let resolver = ReverseLookupResolver::new(store.clone());

        resolver
            .lookup(&report(&[("NetSales", None), ("Liabilities", Some(7))]))
            .await
            .unwrap();

        assert_eq!(store.calls(), vec![(QueryTemplate::CreditInstant, params(7))]);
    }

    #[tokio::test]
    async fn test_each_classification_selects_its_template() {
        let store = Arc::new(MemoryReportItemStore::new());
        let resolver = ReverseLookupResolver::new(store.clone());

        resolver
            .lookup(&report(&[
                ("DividendPaidPerShareSummaryOfBusinessResults", Some(70)),
                ("NetCashProvidedByUsedInOperatingActivities", Some(9_410_000_000)),
                ("OrdinaryIncome", Some(3_608_000_000)),
                ("TotalAssets", Some(111_184_000_000)),
            ]))
            .await
            .unwrap();

        let templates: Vec<_> = store.calls().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            templates,
            vec![
                QueryTemplate::NonConsolidatedDuration,
                QueryTemplate::UnbalancedDuration,
                QueryTemplate::CreditDuration,
                QueryTemplate::CreditInstant,
            ]
        );
    }

    #[tokio::test]
    async fn test_unsupported_account_fails_before_querying() {
        let store = Arc::new(MemoryReportItemStore::new());
        store.insert(
            QueryTemplate::CreditDuration,
            params(100),
            vec![Some("NetSalesSummaryOfBusinessResults".to_string())],
        );
        let resolver = ReverseLookupResolver::new(store.clone());

        let err = resolver
            .lookup(&report(&[("NetSales", Some(100)), ("ROE", Some(8))]))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<LookupError>(),
            Some(&LookupError::unsupported("ROE"))
        );
        assert!(store.calls().is_empty());
    }
}
