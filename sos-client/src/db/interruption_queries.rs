use anyhow::Result;
use sqlx::PgPool;
use time::{PrimitiveDateTime, Time};

use crate::domain::{FeederType, Interruption, InterruptionRow, YearMonth};

/// Interruptions of one feeder class that started within `month`, oldest first.
pub async fn interruptions_started_in(
    pool: &PgPool,
    month: YearMonth,
    feeder_type: FeederType,
) -> Result<Vec<Interruption>> {
    let from = PrimitiveDateTime::new(month.first_day(), Time::MIDNIGHT);
    let until = PrimitiveDateTime::new(month.next().first_day(), Time::MIDNIGHT);

    let rows = sqlx::query_as::<_, InterruptionRow>(
        r#"
        SELECT
            feedercode,
            started,
            ended,
            dateto,
            responsibleby,
            belongsto,
            relays,
            remarks,
            grpslno
        FROM intrpns
        WHERE fdrtype = $1
          AND started >= $2
          AND started <  $3
        ORDER BY started
        "#,
    )
    .bind(feeder_type.tag())
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Interruption::from).collect())
}
