use super::query::{LookupParams, QueryTemplate};
use super::ReportItemStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

type RowKey = (QueryTemplate, LookupParams);

/// Report items held in memory, keyed by the exact query that would find them.
///
/// A lock poisoned by a panicking caller is recovered, since every write
/// leaves the maps consistent.
#[derive(Default)]
pub struct MemoryReportItemStore {
    rows: RwLock<HashMap<RowKey, Vec<Option<String>>>>,
    calls: RwLock<Vec<RowKey>>,
}

impl MemoryReportItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: QueryTemplate, params: LookupParams, names: Vec<Option<String>>) {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((template, params))
            .or_default()
            .extend(names);
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<RowKey> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReportItemStore for MemoryReportItemStore {
    async fn find_xbrl_names(
        &self,
        template: QueryTemplate,
        params: &LookupParams,
    ) -> Result<Vec<Option<String>>> {
        let key = (template, params.clone());
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());

        Ok(self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
