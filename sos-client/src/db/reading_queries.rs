use anyhow::{Context, Result};
use sqlx::PgPool;
use time::Date;

use crate::domain::{display_date, Reading, ReadingRow, ReadingTable, TimeSlot, YearMonth};

fn select_readings(table: ReadingTable) -> String {
    format!(
        r#"
        SELECT
            {code} AS code,
            dateobserved,
            timeobserved,
            current,
            voltage,
            emc_export,
            emc_import,
            mf_export,
            mf_import
        FROM {table}
        "#,
        code = table.code_column(),
        table = table.table_name(),
    )
}

fn into_readings(table: ReadingTable, rows: Vec<ReadingRow>) -> Result<Vec<Reading>> {
    rows.into_iter()
        .map(|row| {
            let code = row.code.clone();
            Reading::try_from(row)
                .with_context(|| format!("malformed row for '{code}' in {}", table.table_name()))
        })
        .collect()
}

/// All readings of one table taken at `date` / `slot`.
pub async fn readings_at(
    pool: &PgPool,
    table: ReadingTable,
    date: Date,
    slot: TimeSlot,
) -> Result<Vec<Reading>> {
    let sql = format!(
        "{} WHERE dateobserved = $1 AND timeobserved = $2",
        select_readings(table)
    );

    let rows = sqlx::query_as::<_, ReadingRow>(&sql)
        .bind(display_date(date))
        .bind(slot.to_string())
        .fetch_all(pool)
        .await?;

    into_readings(table, rows)
}

/// Every reading of one table for a whole day, in slot order.
pub async fn readings_on(pool: &PgPool, table: ReadingTable, date: Date) -> Result<Vec<Reading>> {
    let sql = format!(
        "{} WHERE dateobserved = $1 ORDER BY timeobserved",
        select_readings(table)
    );

    let rows = sqlx::query_as::<_, ReadingRow>(&sql)
        .bind(display_date(date))
        .fetch_all(pool)
        .await?;

    into_readings(table, rows)
}

/// Readings at one slot across a list of dates.
///
/// Rows come back in store order; callers relying on first-seen order get
/// whatever order the store produces.
pub async fn readings_on_dates_at(
    pool: &PgPool,
    table: ReadingTable,
    dates: &[Date],
    slot: TimeSlot,
) -> Result<Vec<Reading>> {
    let sql = format!(
        "{} WHERE timeobserved = $1 AND dateobserved = ANY($2)",
        select_readings(table)
    );
    let dates: Vec<String> = dates.iter().copied().map(display_date).collect();

    let rows = sqlx::query_as::<_, ReadingRow>(&sql)
        .bind(slot.to_string())
        .bind(dates)
        .fetch_all(pool)
        .await?;

    into_readings(table, rows)
}

/// One day's readings restricted to a few codes, in slot order.
pub async fn readings_for_codes_on(
    pool: &PgPool,
    table: ReadingTable,
    date: Date,
    codes: &[String],
) -> Result<Vec<Reading>> {
    let sql = format!(
        "{} WHERE dateobserved = $1 AND {} = ANY($2) ORDER BY timeobserved",
        select_readings(table),
        table.code_column(),
    );

    let rows = sqlx::query_as::<_, ReadingRow>(&sql)
        .bind(display_date(date))
        .bind(codes)
        .fetch_all(pool)
        .await?;

    into_readings(table, rows)
}

/// A single code's readings over a calendar month.
///
/// The stored date is `DD-MM-YYYY`, so the month key is rebuilt from
/// substrings rather than compared as a date.
pub async fn readings_for_code_in_month(
    pool: &PgPool,
    table: ReadingTable,
    code: &str,
    month: YearMonth,
) -> Result<Vec<Reading>> {
    let sql = format!(
        r#"{} WHERE {} = $1
          AND substr(dateobserved, 7, 4) || '-' || substr(dateobserved, 4, 2) = $2"#,
        select_readings(table),
        table.code_column(),
    );

    let rows = sqlx::query_as::<_, ReadingRow>(&sql)
        .bind(code)
        .bind(month.to_string())
        .fetch_all(pool)
        .await?;

    into_readings(table, rows)
}
