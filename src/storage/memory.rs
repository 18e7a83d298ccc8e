use super::{AccountItemStream, AccountItemsRepository, WriteHistory};
use crate::core::types::AccountItem;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Keeps accepted items in memory under the same dedup rules as the CSV sink.
#[derive(Default)]
pub struct MemoryAccountItemsRepository {
    items: Mutex<Vec<AccountItem>>,
    history: Mutex<WriteHistory>,
    add_calls: AtomicUsize,
}

impl MemoryAccountItemsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<AccountItem> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountItemsRepository for MemoryAccountItemsRepository {
    async fn add(&self, items: AccountItemStream<'_>) -> Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let received: Vec<AccountItem> = items.try_collect().await?;

        let mut history = self
            .history
            .lock()
            .map_err(|_| anyhow!("write history poisoned"))?;
        let distinct = history.unwritten(received);
        history.record(&distinct);

        self.items
            .lock()
            .map_err(|_| anyhow!("account items poisoned"))?
            .extend(distinct);
        Ok(())
    }
}
