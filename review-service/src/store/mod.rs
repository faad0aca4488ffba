use anyhow::Result;
use sos_client::domain::{FeederType, Interruption, Reading, ReadingTable, TimeSlot, YearMonth};
use time::Date;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgReadingStore;

/// Read-only access to substation readings, reference order lists and
/// interruption records.
///
/// Implementations return rows as typed records; they do not filter invalid
/// readings, which is left to the reports.
#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    /// Identifies the backing database for order-list caching.
    fn database_key(&self) -> &str;

    async fn readings_at(&self, table: ReadingTable, date: Date, slot: TimeSlot) -> Result<Vec<Reading>>;

    /// A whole day's readings in slot order.
    async fn readings_on(&self, table: ReadingTable, date: Date) -> Result<Vec<Reading>>;

    /// Readings at `slot` on any of `dates`, in store order.
    async fn readings_on_dates_at(
        &self,
        table: ReadingTable,
        dates: &[Date],
        slot: TimeSlot,
    ) -> Result<Vec<Reading>>;

    /// A day's readings for the given codes, in slot order.
    async fn readings_for_codes_on(
        &self,
        table: ReadingTable,
        date: Date,
        codes: &[String],
    ) -> Result<Vec<Reading>>;

    async fn readings_for_code_in_month(
        &self,
        table: ReadingTable,
        code: &str,
        month: YearMonth,
    ) -> Result<Vec<Reading>>;

    /// Codes of `table` in master-table order.
    async fn display_order(&self, table: ReadingTable) -> Result<Vec<String>>;

    /// Interruptions that started within `month`, oldest first.
    async fn interruptions(&self, month: YearMonth, feeder_type: FeederType) -> Result<Vec<Interruption>>;
}
