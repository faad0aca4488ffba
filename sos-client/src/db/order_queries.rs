use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::domain::ReadingTable;

/// Codes of a reading table in the display order of its master table.
pub async fn display_order(pool: &PgPool, table: ReadingTable) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT {code} FROM {master} ORDER BY {rank}",
        code = table.master_code_column(),
        master = table.master_table(),
        rank = table.master_rank_column(),
    );

    let codes = sqlx::query_scalar::<_, String>(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("loading display order from {}", table.master_table()))?;

    Ok(codes)
}
