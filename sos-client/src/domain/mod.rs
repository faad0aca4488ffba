pub mod calendar;
pub mod interruption;
pub mod reading;
pub mod slot;
pub mod table;

pub use calendar::{display_date, parse_calendar_date, parse_display_date, YearMonth};
pub use interruption::{Interruption, InterruptionRow, Responsibility, ScheduleClass};
pub use reading::{Reading, ReadingRow};
pub use slot::{closest_allowed_slot, TimeSlot};
pub use table::{FeederType, ReadingTable};

/// Input that does not match one of the fixed textual formats.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date '{0}'")]
    Date(String),
    #[error("invalid time slot '{0}'")]
    Slot(String),
    #[error("invalid month '{0}', expected YYYY-MM")]
    Month(String),
    #[error("unknown reading table '{0}', expected ht, eht or tf")]
    Table(String),
    #[error("unknown feeder type '{0}', expected HTs, EHTs or TFs")]
    FeederType(String),
}
