use super::config::LookupConfig;
use crate::db::{self, PgReportItemStore};
use crate::dictionary::CsvReverseDictionary;
use crate::storage::CsvAccountItemsRepository;
use anyhow::Result;

/// `RUST_LOG` wins; otherwise info and above.
pub fn initialize_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub async fn initialize_report_store(config: &LookupConfig) -> Result<PgReportItemStore> {
    let pool = db::get_pool(&config.database_url, config.max_connections).await?;
    log::info!("Connected to report item store");
    Ok(PgReportItemStore::new(pool))
}

pub fn initialize_dictionary(config: &LookupConfig) -> CsvReverseDictionary {
    CsvReverseDictionary::new(&config.dictionary_path, config.dictionary_encoding.clone())
}

pub fn initialize_repository(config: &LookupConfig) -> Result<CsvAccountItemsRepository> {
    CsvAccountItemsRepository::create(&config.output_path)
}
