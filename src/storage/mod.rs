//! Persistent output for resolved account items.

pub mod csv;
pub mod memory;

pub use self::csv::CsvAccountItemsRepository;
pub use self::memory::MemoryAccountItemsRepository;

use crate::core::types::AccountItem;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashSet;

pub type AccountItemStream<'a> = BoxStream<'a, Result<AccountItem>>;

#[async_trait]
pub trait AccountItemsRepository: Send + Sync {
    /// Drains `items`, persisting each `(normalized, original)` pair at most
    /// once per run. The first occurrence wins.
    async fn add(&self, items: AccountItemStream<'_>) -> Result<()>;
}

/// Dedup keys of everything persisted so far in this run. Grows with the
/// number of distinct rows and is never persisted.
#[derive(Debug, Default)]
pub struct WriteHistory {
    keys: HashSet<String>,
}

impl WriteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops items already written by an earlier chunk, then repeats within
    /// `chunk`, keeping first-seen order.
    pub fn unwritten(&self, chunk: Vec<AccountItem>) -> Vec<AccountItem> {
        let mut seen = HashSet::new();
        chunk
            .into_iter()
            .filter(|item| {
                let key = item.dedup_key();
                !self.keys.contains(&key) && seen.insert(key)
            })
            .collect()
    }

    pub fn record<'a>(&mut self, items: impl IntoIterator<Item = &'a AccountItem>) {
        self.keys.extend(items.into_iter().map(AccountItem::dedup_key));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
