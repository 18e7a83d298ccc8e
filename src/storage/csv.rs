use super::{AccountItemStream, AccountItemsRepository, WriteHistory};
use crate::core::types::{AccountItem, SecuritiesCode};
use crate::utils::dirs;
use ::csv::{Writer, WriterBuilder};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{TryChunksError, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Items buffered per write. Bounds memory on the write path; the write
/// history still grows with the output.
pub const CHUNK_SIZE: usize = 5000;

pub const HEADER: [&str; 4] = ["NormalizedName", "OriginalName", "SecuritiesCode", "FiscalYear"];

/// One line of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountItemRow {
    #[serde(rename = "NormalizedName")]
    pub normalized_name: String,
    #[serde(rename = "OriginalName")]
    pub original_name: String,
    #[serde(rename = "SecuritiesCode")]
    pub securities_code: SecuritiesCode,
    #[serde(rename = "FiscalYear", with = "date_format")]
    pub fiscal_year: NaiveDate,
}

impl From<&AccountItem> for AccountItemRow {
    fn from(item: &AccountItem) -> Self {
        Self {
            normalized_name: item.normalized_name.clone(),
            original_name: item.original_name.clone(),
            securities_code: item.securities_code,
            fiscal_year: item.fiscal_year,
        }
    }
}

impl From<AccountItemRow> for AccountItem {
    fn from(row: AccountItemRow) -> Self {
        Self {
            normalized_name: row.normalized_name,
            original_name: row.original_name,
            securities_code: row.securities_code,
            fiscal_year: row.fiscal_year,
        }
    }
}

struct WriterState {
    // Lent to the blocking pool while a chunk is written.
    writer: Option<Writer<File>>,
    header_written: bool,
    history: WriteHistory,
    written: usize,
    skipped: usize,
}

/// Deduplicating CSV sink. Owns its output file exclusively for the run.
pub struct CsvAccountItemsRepository {
    path: PathBuf,
    chunk_size: usize,
    state: Mutex<WriterState>,
}

impl CsvAccountItemsRepository {
    /// Replaces whatever is at `path` with an empty file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        dirs::ensure_parent_dir(&path)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }

        let writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(File::create(&path)?);

        Ok(Self {
            path,
            chunk_size: CHUNK_SIZE,
            state: Mutex::new(WriterState {
                writer: Some(writer),
                header_written: false,
                history: WriteHistory::new(),
                written: 0,
                skipped: 0,
            }),
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn written_count(&self) -> usize {
        self.state.lock().await.written
    }

    pub async fn skipped_count(&self) -> usize {
        self.state.lock().await.skipped
    }
}

#[async_trait]
impl AccountItemsRepository for CsvAccountItemsRepository {
    async fn add(&self, items: AccountItemStream<'_>) -> Result<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if !state.header_written {
            with_writer(state, |writer| {
                writer.write_record(HEADER)?;
                writer.flush()?;
                Ok(())
            })
            .await?;
            state.header_written = true;
        }

        let mut chunks = items.try_chunks(self.chunk_size);
        while let Some(chunk) = chunks
            .try_next()
            .await
            .map_err(|TryChunksError(_, e)| e)?
        {
            let received = chunk.len();
            let distinct = state.history.unwritten(chunk);
            let distinct = with_writer(state, move |writer| {
                for item in &distinct {
                    writer.serialize(AccountItemRow::from(item))?;
                }
                writer.flush()?;
                Ok(distinct)
            })
            .await?;
            state.history.record(&distinct);

            state.written += distinct.len();
            state.skipped += received - distinct.len();
            log::debug!(
                "Wrote {} of {} account item(s) to {}",
                distinct.len(),
                received,
                self.path.display()
            );
        }

        log::info!(
            "{}: {} account item(s) written, {} duplicate(s) skipped",
            self.path.display(),
            state.written,
            state.skipped
        );
        Ok(())
    }
}

/// Runs `f` against the output writer on the blocking pool and takes the
/// writer back afterwards.
async fn with_writer<R, F>(state: &mut WriterState, f: F) -> Result<R>
where
    F: FnOnce(&mut Writer<File>) -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let mut writer = state
        .writer
        .take()
        .ok_or_else(|| anyhow!("output writer was lost by an earlier failed write"))?;
    let (writer, result) = tokio::task::spawn_blocking(move || {
        let result = f(&mut writer);
        (writer, result)
    })
    .await?;
    state.writer = Some(writer);
    result
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};
    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
