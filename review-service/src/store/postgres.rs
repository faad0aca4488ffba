use anyhow::Result;
use sos_client::{
    db,
    domain::{FeederType, Interruption, Reading, ReadingTable, TimeSlot, YearMonth},
};
use sqlx::postgres::PgPool;
use time::Date;

use super::ReadingStore;

/// Reading store over a pgwire connection pool (QuestDB or Postgres).
///
/// Every query checks a connection out of the pool for its own duration, so
/// connections go back to the pool on success and on error alike.
pub struct PgReadingStore {
    pool: PgPool,
    database_key: String,
}

impl PgReadingStore {
    pub fn new(pool: PgPool, database_key: impl Into<String>) -> Self {
        Self {
            pool,
            database_key: database_key.into(),
        }
    }
}

fn record_rows(query: &'static str, rows: usize) {
    metrics::counter!("review_store_rows_total", "query" => query).increment(rows as u64);
}

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    fn database_key(&self) -> &str {
        &self.database_key
    }

    async fn readings_at(&self, table: ReadingTable, date: Date, slot: TimeSlot) -> Result<Vec<Reading>> {
        let rows = db::readings_at(&self.pool, table, date, slot).await?;
        record_rows("readings_at", rows.len());
        tracing::debug!(%table, %date, %slot, rows = rows.len(), "fetched readings at slot");
        Ok(rows)
    }

    async fn readings_on(&self, table: ReadingTable, date: Date) -> Result<Vec<Reading>> {
        let rows = db::readings_on(&self.pool, table, date).await?;
        record_rows("readings_on", rows.len());
        tracing::debug!(%table, %date, rows = rows.len(), "fetched day readings");
        Ok(rows)
    }

    async fn readings_on_dates_at(
        &self,
        table: ReadingTable,
        dates: &[Date],
        slot: TimeSlot,
    ) -> Result<Vec<Reading>> {
        let rows = db::readings_on_dates_at(&self.pool, table, dates, slot).await?;
        record_rows("readings_on_dates_at", rows.len());
        tracing::debug!(%table, %slot, dates = dates.len(), rows = rows.len(), "fetched boundary readings");
        Ok(rows)
    }

    async fn readings_for_codes_on(
        &self,
        table: ReadingTable,
        date: Date,
        codes: &[String],
    ) -> Result<Vec<Reading>> {
        let rows = db::readings_for_codes_on(&self.pool, table, date, codes).await?;
        record_rows("readings_for_codes_on", rows.len());
        tracing::debug!(%table, %date, codes = ?codes, rows = rows.len(), "fetched code readings");
        Ok(rows)
    }

    async fn readings_for_code_in_month(
        &self,
        table: ReadingTable,
        code: &str,
        month: YearMonth,
    ) -> Result<Vec<Reading>> {
        let rows = db::readings_for_code_in_month(&self.pool, table, code, month).await?;
        record_rows("readings_for_code_in_month", rows.len());
        tracing::debug!(%table, code, %month, rows = rows.len(), "fetched month readings");
        Ok(rows)
    }

    async fn display_order(&self, table: ReadingTable) -> Result<Vec<String>> {
        let codes = db::display_order(&self.pool, table).await?;
        tracing::debug!(%table, codes = codes.len(), "loaded display order");
        Ok(codes)
    }

    async fn interruptions(&self, month: YearMonth, feeder_type: FeederType) -> Result<Vec<Interruption>> {
        let rows = db::interruptions_started_in(&self.pool, month, feeder_type).await?;
        record_rows("interruptions", rows.len());
        tracing::debug!(%month, %feeder_type, rows = rows.len(), "fetched interruptions");
        Ok(rows)
    }
}
