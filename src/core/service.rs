use super::types::{AccountItem, Outcome};
use crate::dictionary::ReverseDictionary;
use crate::lookup::ReverseLookup;
use crate::storage::AccountItemsRepository;
use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Drives one reverse lookup run: dictionary, then resolver per report, then
/// the repository.
pub struct ReverseLookupService {
    dictionary: Arc<dyn ReverseDictionary>,
    resolver: Arc<dyn ReverseLookup>,
    repository: Arc<dyn AccountItemsRepository>,
}

impl ReverseLookupService {
    pub fn new(
        dictionary: Arc<dyn ReverseDictionary>,
        resolver: Arc<dyn ReverseLookup>,
        repository: Arc<dyn AccountItemsRepository>,
    ) -> Self {
        Self {
            dictionary,
            resolver,
            repository,
        }
    }

    /// An aborted dictionary is logged and ends the run without touching the
    /// repository. Lookup, store and output failures propagate.
    pub async fn handle(&self) -> Result<()> {
        let reports = match self.dictionary.get() {
            Outcome::Succeeded(reports) => reports,
            Outcome::Aborted(reason) => {
                log::warn!("{}", reason);
                return Ok(());
            }
        };

        let resolver = self.resolver.as_ref();
        let items = reports
            .and_then(move |report| async move {
                let results = resolver.lookup(&report).await?;
                log::debug!(
                    "{} {}: {} reverse lookup result(s)",
                    report.securities_code,
                    report.fiscal_year,
                    results.len()
                );
                Ok::<_, anyhow::Error>(stream::iter(
                    results
                        .into_iter()
                        .map(|result| Ok::<_, anyhow::Error>(AccountItem::from(result))),
                ))
            })
            .try_flatten()
            .boxed();

        self.repository.add(items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        AccountingStandard, FinancialReport, ReverseLookupResult, SecuritiesCode,
    };
    use crate::dictionary::ReportStream;
    use crate::storage::{AccountItemStream, MemoryAccountItemsRepository};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn fiscal_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 31).unwrap()
    }

    fn report(code: u32) -> FinancialReport {
        FinancialReport::new(
            SecuritiesCode(code),
            AccountingStandard::Japanese,
            fiscal_year(),
            BTreeMap::new(),
        )
    }

    struct VecDictionary(Vec<FinancialReport>);

    impl ReverseDictionary for VecDictionary {
        fn get(&self) -> Outcome<ReportStream> {
            Outcome::Succeeded(stream::iter(self.0.clone().into_iter().map(Ok)).boxed())
        }
    }

    struct AbortedDictionary;

    impl ReverseDictionary for AbortedDictionary {
        fn get(&self) -> Outcome<ReportStream> {
            Outcome::aborted("dictionary aborted")
        }
    }

    /// Answers every report with two fixed results and remembers who asked.
    #[derive(Default)]
    struct RecordingLookup {
        seen: Mutex<Vec<SecuritiesCode>>,
    }

    #[async_trait]
    impl ReverseLookup for RecordingLookup {
        async fn lookup(&self, report: &FinancialReport) -> Result<Vec<ReverseLookupResult>> {
            self.seen.lock().unwrap().push(report.securities_code);
            Ok(vec![
                ReverseLookupResult::new("NetSales", "hoge", report.securities_code, fiscal_year()),
                ReverseLookupResult::new("ROE", "fuga", report.securities_code, fiscal_year()),
            ])
        }
    }

    /// Takes one item and notes how many reports were looked up by then.
    struct FirstItemRepository {
        lookup: Arc<RecordingLookup>,
        lookups_at_first_item: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl AccountItemsRepository for FirstItemRepository {
        async fn add(&self, mut items: AccountItemStream<'_>) -> Result<()> {
            items.try_next().await?;
            let lookups = self.lookup.seen.lock().unwrap().len();
            *self.lookups_at_first_item.lock().unwrap() = Some(lookups);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reports_are_looked_up_only_as_items_are_pulled() {
        let lookup = Arc::new(RecordingLookup::default());
        let repository = Arc::new(FirstItemRepository {
            lookup: lookup.clone(),
            lookups_at_first_item: Mutex::new(None),
        });
        let reports = (0..100).map(|i| report(1000 + i)).collect();
        let service = ReverseLookupService::new(
            Arc::new(VecDictionary(reports)),
            lookup.clone(),
            repository.clone(),
        );

        service.handle().await.unwrap();

        assert_eq!(*repository.lookups_at_first_item.lock().unwrap(), Some(1));
        assert_eq!(lookup.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_looks_up_each_report_once_in_order() {
        let lookup = Arc::new(RecordingLookup::default());
        let repository = Arc::new(MemoryAccountItemsRepository::new());
        let service = ReverseLookupService::new(
            Arc::new(VecDictionary(vec![report(1111), report(1112)])),
            lookup.clone(),
            repository.clone(),
        );

        service.handle().await.unwrap();

        assert_eq!(
            *lookup.seen.lock().unwrap(),
            vec![SecuritiesCode(1111), SecuritiesCode(1112)]
        );
        assert_eq!(repository.add_calls(), 1);
    }

    #[tokio::test]
    async fn test_results_reach_repository_in_emission_order() {
        let repository = Arc::new(MemoryAccountItemsRepository::new());
        let service = ReverseLookupService::new(
            Arc::new(VecDictionary(vec![report(1111)])),
            Arc::new(RecordingLookup::default()),
            repository.clone(),
        );

        service.handle().await.unwrap();

        let items = repository.items();
        assert_eq!(items.len(), 2);
        assert_eq!(
            (items[0].normalized_name.as_str(), items[0].original_name.as_str()),
            ("NetSales", "hoge")
        );
        assert_eq!(
            (items[1].normalized_name.as_str(), items[1].original_name.as_str()),
            ("ROE", "fuga")
        );
    }

    #[tokio::test]
    async fn test_abort_skips_repository() {
        let lookup = Arc::new(RecordingLookup::default());
        let repository = Arc::new(MemoryAccountItemsRepository::new());
        let service =
            ReverseLookupService::new(Arc::new(AbortedDictionary), lookup.clone(), repository.clone());

        service.handle().await.unwrap();

        assert_eq!(repository.add_calls(), 0);
        assert!(lookup.seen.lock().unwrap().is_empty());
    }
}
