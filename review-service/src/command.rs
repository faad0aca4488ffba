use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sos_client::domain::{
    closest_allowed_slot, parse_calendar_date, FeederType, ReadingTable, TimeSlot, YearMonth,
};
use time::{Date, PrimitiveDateTime};

use crate::report::{ReviewEngine, ReviewError};

/// Substation operating-review reports, printed as JSON.
#[derive(Debug, Parser)]
#[command(name = "review-service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub report: ReportRequest,
}

/// A reading time; both parts or neither. When omitted, the latest slot
/// already read is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct PointInTime {
    #[arg(value_name = "YYYY-MM-DD", value_parser = parse_calendar_date, requires = "time")]
    pub date: Option<Date>,
    #[arg(value_name = "HH:MM", value_parser = TimeSlot::parse_allowed)]
    pub time: Option<TimeSlot>,
}

impl PointInTime {
    pub fn resolve(&self, now: PrimitiveDateTime) -> (Date, TimeSlot) {
        match (self.date, self.time) {
            (Some(date), Some(time)) => (date, time),
            _ => {
                let minute = u16::from(now.hour()) * 60 + u16::from(now.minute());
                closest_allowed_slot(now.date(), minute)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ReportRequest {
    /// Hourly energy deltas of one table.
    Hourly {
        #[arg(value_name = "ht|eht|tf")]
        table: ReadingTable,
        #[command(flatten)]
        at: PointInTime,
    },
    /// Hourly deltas of all tables plus the station load.
    HourlyReview {
        #[command(flatten)]
        at: PointInTime,
    },
    /// Daily minimum and maximum current per code.
    DailyCurrent {
        #[arg(value_name = "YYYY-MM-DD", value_parser = parse_calendar_date)]
        date: Date,
        #[arg(value_name = "ht|eht|tf")]
        table: ReadingTable,
    },
    /// Daily extremes of the hourly energy deltas per code.
    DailyEnergy {
        #[arg(value_name = "YYYY-MM-DD", value_parser = parse_calendar_date)]
        date: Date,
        #[arg(value_name = "ht|eht|tf")]
        table: ReadingTable,
    },
    /// Station load peak and minimum for a day.
    Station {
        #[arg(value_name = "YYYY-MM-DD", value_parser = parse_calendar_date)]
        date: Date,
    },
    /// 11 kV incomer load peak and minimum for a day.
    Incomers {
        #[arg(value_name = "YYYY-MM-DD", value_parser = parse_calendar_date)]
        date: Date,
    },
    /// Net energy per code for a month.
    MonthlyEnergy {
        #[arg(value_name = "YYYY-MM")]
        month: YearMonth,
        #[arg(value_name = "ht|eht|tf")]
        table: ReadingTable,
    },
    /// Closed interruptions of a month and their per-code summary.
    Interruptions {
        #[arg(value_name = "YYYY-MM")]
        month: YearMonth,
        #[arg(value_name = "HTs|EHTs|TFs")]
        feeder_type: FeederType,
    },
    /// Grouped outage counts of the 11 kV feeders.
    HtInterruptions {
        #[arg(value_name = "YYYY-MM")]
        month: YearMonth,
    },
    /// Mode current and spread of one feeder; defaults to last month and the
    /// configured mode feeder.
    Mode {
        #[arg(value_name = "YYYY-MM")]
        month: Option<YearMonth>,
        #[arg(value_name = "CODE")]
        code: Option<String>,
    },
}

impl ReportRequest {
    /// Metric label and subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hourly { .. } => "hourly",
            Self::HourlyReview { .. } => "hourly-review",
            Self::DailyCurrent { .. } => "daily-current",
            Self::DailyEnergy { .. } => "daily-energy",
            Self::Station { .. } => "station",
            Self::Incomers { .. } => "incomers",
            Self::MonthlyEnergy { .. } => "monthly-energy",
            Self::Interruptions { .. } => "interruptions",
            Self::HtInterruptions { .. } => "ht-interruptions",
            Self::Mode { .. } => "mode",
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ReviewError> {
    Ok(serde_json::to_value(value)?)
}

/// Runs one report and returns it as JSON.
///
/// `now` is the local wall-clock time, used where the request leaves the
/// reading time or month out.
pub async fn execute(
    engine: &ReviewEngine,
    request: &ReportRequest,
    now: PrimitiveDateTime,
) -> Result<serde_json::Value, ReviewError> {
    let report = request.name();
    let started = Instant::now();

    let value = match request {
        ReportRequest::Hourly { table, at } => {
            let (date, slot) = at.resolve(now);
            to_json(engine.hourly_delta(*table, date, slot).await?)
        }
        ReportRequest::HourlyReview { at } => {
            let (date, slot) = at.resolve(now);
            to_json(engine.hourly_review(date, slot).await?)
        }
        ReportRequest::DailyCurrent { date, table } => to_json(engine.daily_current_stats(*date, *table).await?),
        ReportRequest::DailyEnergy { date, table } => {
            to_json(engine.daily_energy_delta_stats(*date, *table).await?)
        }
        ReportRequest::Station { date } => to_json(engine.station_peak_min(*date).await?),
        ReportRequest::Incomers { date } => to_json(engine.incomers_peak_min(*date).await?),
        ReportRequest::MonthlyEnergy { month, table } => to_json(engine.monthly_energy(*month, *table).await?),
        ReportRequest::Interruptions { month, feeder_type } => {
            let details = engine.monthly_interruptions(*month, *feeder_type).await?;
            let summary = crate::report::interruptions::summarize_interruptions(&details, *month);
            to_json(serde_json::json!({ "interruptions": details, "summary": summary }))
        }
        ReportRequest::HtInterruptions { month } => to_json(engine.ht_interruption_counts(*month).await?),
        ReportRequest::Mode { month, code } => {
            let month = month.unwrap_or_else(|| YearMonth::of(now.date()).previous());
            to_json(engine.mode_threshold(month, code.as_deref()).await?)
        }
    }?;

    let elapsed = started.elapsed();
    metrics::counter!("review_reports_total", "report" => report).increment(1);
    metrics::histogram!("review_report_duration_seconds", "report" => report).record(elapsed.as_secs_f64());
    tracing::info!(report, elapsed_ms = elapsed.as_millis() as u64, "report finished");

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{current, engine, slot};
    use crate::store::MemoryStore;
    use clap::error::ErrorKind;
    use time::macros::{date, datetime};

    const NOW: PrimitiveDateTime = datetime!(2025-03-10 14:20);

    fn parse(args: &[&str]) -> Result<ReportRequest, clap::Error> {
        let argv = std::iter::once("review-service").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.report)
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn omitted_time_resolves_to_latest_slot() {
        let request = parse(&["hourly-review"]).unwrap();
        let ReportRequest::HourlyReview { at } = request else {
            panic!("unexpected request {request:?}");
        };

        assert_eq!(at, PointInTime::default());
        assert_eq!(at.resolve(NOW), (date!(2025 - 03 - 10), slot("14:00")));
        assert_eq!(
            at.resolve(datetime!(2025-01-01 00:40)),
            (date!(2024 - 12 - 31), slot("24:00"))
        );
    }

    #[test]
    fn explicit_arguments_are_parsed() {
        assert_eq!(
            parse(&["hourly", "eht", "2025-02-01", "18:30"]).unwrap(),
            ReportRequest::Hourly {
                table: ReadingTable::Eht,
                at: PointInTime {
                    date: Some(date!(2025 - 02 - 01)),
                    time: Some(slot("18:30")),
                },
            }
        );
        assert_eq!(
            parse(&["interruptions", "2025-06", "TFs"]).unwrap(),
            ReportRequest::Interruptions {
                month: YearMonth::new(2025, 6).unwrap(),
                feeder_type: FeederType::Tf,
            }
        );
        assert_eq!(
            parse(&["mode", "2025-01", "FDR 7"]).unwrap(),
            ReportRequest::Mode {
                month: Some(YearMonth::new(2025, 1).unwrap()),
                code: Some("FDR 7".to_string()),
            }
        );
        assert_eq!(
            parse(&["mode"]).unwrap(),
            ReportRequest::Mode {
                month: None,
                code: None,
            }
        );
    }

    #[test]
    fn bad_input_is_rejected() {
        let kind = |args: &[&str]| parse(args).unwrap_err().kind();

        assert_eq!(kind(&["weekly"]), ErrorKind::InvalidSubcommand);
        assert_eq!(kind(&["station"]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["hourly", "ht", "2025-03-10"]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["station", "10-03-2025"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["hourly", "ht", "2025-03-10", "10:30"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["daily-current", "2025-03-10", "lt"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["ht-interruptions", "2025-13"]), ErrorKind::ValueValidation);
    }

    #[tokio::test]
    async fn execute_renders_report_as_json() {
        let day = date!(2025 - 03 - 10);
        let store = MemoryStore::new().with_readings(
            ReadingTable::Ht,
            [current("F1", day, "01:00", "12.5"), current("F1", day, "02:00", "20")],
        );
        let engine = engine(store);

        let value = execute(
            &engine,
            &ReportRequest::DailyCurrent {
                date: day,
                table: ReadingTable::Ht,
            },
            NOW,
        )
        .await
        .unwrap();

        assert_eq!(value[0]["code"], "F1");
        assert_eq!(value[0]["min"], "12.5");
        assert_eq!(value[0]["min_time"], "01:00");
        assert_eq!(value[0]["max_time"], "02:00");
    }

    #[tokio::test]
    async fn omitted_mode_month_is_previous_month() {
        let store = MemoryStore::new().with_readings(
            ReadingTable::Ht,
            [
                current("TOWN ABC", date!(2025 - 02 - 03), "19:00", "40"),
                current("TOWN ABC", date!(2025 - 03 - 03), "19:00", "90"),
            ],
        );
        let engine = engine(store);

        let value = execute(&engine, &ReportRequest::Mode { month: None, code: None }, NOW)
            .await
            .unwrap();

        assert_eq!(value["mode_current"], "40");
        assert_eq!(value["peak_period"], "night");
    }

    #[tokio::test]
    async fn interruptions_report_carries_details_and_summary() {
        let engine = engine(MemoryStore::new());
        let value = execute(
            &engine,
            &ReportRequest::Interruptions {
                month: YearMonth::new(2025, 6).unwrap(),
                feeder_type: FeederType::Eht,
            },
            NOW,
        )
        .await
        .unwrap();

        assert_eq!(value["interruptions"], serde_json::json!([]));
        assert_eq!(value["summary"], serde_json::json!([]));
    }
}
