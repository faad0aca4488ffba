use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sos_client::domain::{FeederType, Interruption, ReadingTable, Responsibility, ScheduleClass, YearMonth};
use time::PrimitiveDateTime;

use super::{numeric::percent, ReviewEngine, ReviewError};

/// One closed interruption as listed in the monthly review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterruptionDetail {
    pub code: String,
    pub started: PrimitiveDateTime,
    pub ended: PrimitiveDateTime,
    pub duration_minutes: i64,
    pub responsible_party: Responsibility,
    pub schedule_class: ScheduleClass,
    pub relay_info: Option<String>,
    pub remarks: Option<String>,
}

impl From<&Interruption> for InterruptionDetail {
    fn from(i: &Interruption) -> Self {
        InterruptionDetail {
            code: i.code.clone(),
            started: i.started,
            ended: i.ended,
            duration_minutes: i.duration_minutes(),
            responsible_party: i.responsible_party.clone(),
            schedule_class: i.schedule_class.clone(),
            relay_info: i.relay_info.clone(),
            remarks: i.remarks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterruptionSummary {
    pub code: String,
    pub ksebl_duration: i64,
    pub others_duration: i64,
    pub scheduled_duration: i64,
    pub unscheduled_duration: i64,
    pub total_duration: i64,
    pub availability_percent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutageCounts {
    pub code: String,
    pub scheduled_duration: i64,
    pub unscheduled_duration: i64,
    pub scheduled_count: u32,
    pub unscheduled_count: u32,
}

/// Per-code outage minutes for a month.
///
/// Responsibility and schedule buckets are independent of each other, so a
/// row counts towards one of each (or neither, for unrecognised values) and
/// always towards the total.
pub fn summarize_interruptions(interruptions: &[InterruptionDetail], month: YearMonth) -> Vec<InterruptionSummary> {
    let month_minutes = Decimal::from(month.minutes());
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<InterruptionSummary> = Vec::new();

    for row in interruptions {
        let i = *index.entry(row.code.as_str()).or_insert_with(|| {
            out.push(InterruptionSummary {
                code: row.code.clone(),
                ksebl_duration: 0,
                others_duration: 0,
                scheduled_duration: 0,
                unscheduled_duration: 0,
                total_duration: 0,
                availability_percent: Decimal::ZERO,
            });
            out.len() - 1
        });
        let summary = &mut out[i];
        let minutes = row.duration_minutes;

        summary.total_duration += minutes;
        match row.responsible_party {
            Responsibility::Ksebl => summary.ksebl_duration += minutes,
            Responsibility::Others => summary.others_duration += minutes,
            Responsibility::Other(_) => {}
        }
        match row.schedule_class {
            ScheduleClass::Scheduled => summary.scheduled_duration += minutes,
            ScheduleClass::Unscheduled => summary.unscheduled_duration += minutes,
            ScheduleClass::Other(_) => {}
        }
    }

    for summary in &mut out {
        let available = month_minutes - Decimal::from(summary.total_duration);
        summary.availability_percent = percent(available, month_minutes).unwrap_or_default();
    }

    out
}

/// Scheduled and unscheduled outage counts per code, counting each group of
/// fragments sharing a group id as one outage.
///
/// Codes keep first-seen order.
pub fn outage_counts(interruptions: &[Interruption]) -> Vec<OutageCounts> {
    let mut codes: Vec<&str> = Vec::new();
    let mut groups: HashMap<(&str, &ScheduleClass, Option<i64>), i64> = HashMap::new();

    for i in interruptions {
        if !codes.contains(&i.code.as_str()) {
            codes.push(i.code.as_str());
        }
        *groups
            .entry((i.code.as_str(), &i.schedule_class, i.group_id))
            .or_insert(0) += i.duration_minutes();
    }

    let mut by_code: HashMap<&str, OutageCounts> = HashMap::new();
    for ((code, class, _), minutes) in groups {
        let counts = by_code.entry(code).or_default();
        match class {
            ScheduleClass::Scheduled => {
                counts.scheduled_duration += minutes;
                counts.scheduled_count += 1;
            }
            ScheduleClass::Unscheduled => {
                counts.unscheduled_duration += minutes;
                counts.unscheduled_count += 1;
            }
            ScheduleClass::Other(_) => {}
        }
    }

    codes
        .into_iter()
        .map(|code| OutageCounts {
            code: code.to_string(),
            ..by_code.remove(code).unwrap_or_default()
        })
        .collect()
}

impl ReviewEngine {
    /// Closed interruptions of `feeder_type` that started in `month`, oldest first.
    pub async fn monthly_interruptions(
        &self,
        month: YearMonth,
        feeder_type: FeederType,
    ) -> Result<Vec<InterruptionDetail>, ReviewError> {
        let rows = self.store().interruptions(month, feeder_type).await?;
        let total = rows.len();
        let details: Vec<InterruptionDetail> = rows
            .iter()
            .filter(|i| i.is_closed())
            .map(InterruptionDetail::from)
            .collect();
        tracing::debug!(%month, %feeder_type, rows = total, closed = details.len(), "interruptions fetched");

        Ok(details)
    }

    pub async fn interruption_summary(
        &self,
        month: YearMonth,
        feeder_type: FeederType,
    ) -> Result<Vec<InterruptionSummary>, ReviewError> {
        let details = self.monthly_interruptions(month, feeder_type).await?;
        Ok(summarize_interruptions(&details, month))
    }

    /// Grouped outage counts of the 11 kV feeders, in feeder display order.
    ///
    /// All rows of the month are counted, whether closed or not.
    pub async fn ht_interruption_counts(&self, month: YearMonth) -> Result<Vec<OutageCounts>, ReviewError> {
        let rows = self.store().interruptions(month, FeederType::Ht).await?;
        let counts = outage_counts(&rows);
        self.in_display_order(ReadingTable::Ht, counts, |c| c.code.as_str())
            .await
    }
}
