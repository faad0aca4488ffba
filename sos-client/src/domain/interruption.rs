use std::fmt;

use time::PrimitiveDateTime;

/// Raw `intrpns` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InterruptionRow {
    pub feedercode: String,
    pub started: PrimitiveDateTime,
    pub ended: PrimitiveDateTime,
    pub dateto: Option<PrimitiveDateTime>,
    pub responsibleby: Option<String>,
    pub belongsto: Option<String>,
    pub relays: Option<String>,
    pub remarks: Option<String>,
    pub grpslno: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Responsibility {
    Ksebl,
    Others,
    Other(String),
}

impl From<&str> for Responsibility {
    fn from(s: &str) -> Self {
        match s.trim() {
            "KSEBL" => Self::Ksebl,
            "Others" => Self::Others,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ksebl => f.write_str("KSEBL"),
            Self::Others => f.write_str("Others"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScheduleClass {
    Scheduled,
    Unscheduled,
    Other(String),
}

impl From<&str> for ScheduleClass {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Scheduled" => Self::Scheduled,
            "Un Scheduled" => Self::Unscheduled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ScheduleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => f.write_str("Scheduled"),
            Self::Unscheduled => f.write_str("Un Scheduled"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Responsibility {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ScheduleClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A recorded outage of one feeder or transformer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interruption {
    pub code: String,
    pub started: PrimitiveDateTime,
    pub ended: PrimitiveDateTime,
    /// End-of-range marker; equals `ended` once the record is final.
    pub closed_at: Option<PrimitiveDateTime>,
    pub responsible_party: Responsibility,
    pub schedule_class: ScheduleClass,
    pub relay_info: Option<String>,
    pub remarks: Option<String>,
    /// Fragments of one physical outage share a group id.
    pub group_id: Option<i64>,
}

impl Interruption {
    pub fn duration_minutes(&self) -> i64 {
        (self.ended - self.started).whole_minutes()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at == Some(self.ended)
    }
}

impl From<InterruptionRow> for Interruption {
    fn from(row: InterruptionRow) -> Self {
        Interruption {
            code: row.feedercode,
            started: row.started,
            ended: row.ended,
            closed_at: row.dateto,
            responsible_party: row
                .responsibleby
                .as_deref()
                .map(Responsibility::from)
                .unwrap_or_else(|| Responsibility::Other(String::new())),
            schedule_class: row
                .belongsto
                .as_deref()
                .map(ScheduleClass::from)
                .unwrap_or_else(|| ScheduleClass::Other(String::new())),
            relay_info: row.relays,
            remarks: row.remarks,
            group_id: row.grpslno,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row() -> InterruptionRow {
        InterruptionRow {
            feedercode: "1PLPM".to_string(),
            started: datetime!(2025-06-03 10:15:00),
            ended: datetime!(2025-06-03 11:50:30),
            dateto: Some(datetime!(2025-06-03 11:50:30)),
            responsibleby: Some("KSEBL".to_string()),
            belongsto: Some("Un Scheduled".to_string()),
            relays: Some("O/C".to_string()),
            remarks: None,
            grpslno: Some(4),
        }
    }

    #[test]
    fn duration_is_whole_minutes() {
        let i = Interruption::from(row());
        assert_eq!(i.duration_minutes(), 95);
        assert_eq!(i.responsible_party, Responsibility::Ksebl);
        assert_eq!(i.schedule_class, ScheduleClass::Unscheduled);
    }

    #[test]
    fn provisional_record_is_not_closed() {
        let mut r = row();
        r.dateto = Some(datetime!(2025-06-30 23:59:00));
        assert!(!Interruption::from(r).is_closed());

        let mut r = row();
        r.dateto = None;
        assert!(!Interruption::from(r).is_closed());

        assert!(Interruption::from(row()).is_closed());
    }
}
