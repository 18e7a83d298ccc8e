use crate::lookup::{LookupParams, QueryTemplate, ReportItemStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{query_scalar, Pool, Postgres};

/// Report items loaded into Postgres by the filing importer. Never written to
/// from here.
pub struct PgReportItemStore {
    pool: Pool<Postgres>,
}

impl PgReportItemStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportItemStore for PgReportItemStore {
    async fn find_xbrl_names(
        &self,
        template: QueryTemplate,
        params: &LookupParams,
    ) -> Result<Vec<Option<String>>> {
        query_scalar::<_, Option<String>>(template.sql())
            .bind(params.amount)
            .bind(&params.securities_code)
            .bind(params.fiscal_year)
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }
}

pub async fn get_pool(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(Into::into)
}
