//! Callback data carried by inline buttons.

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Which selection the calendar is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarMode {
    /// A single day report.
    #[default]
    Day,
    /// First day of a period.
    PeriodFrom,
    /// Last day of a period.
    PeriodTo,
}

impl CalendarMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::PeriodFrom => "PERIOD_FROM",
            Self::PeriodTo => "PERIOD_TO",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DAY" => Some(Self::Day),
            "PERIOD_FROM" => Some(Self::PeriodFrom),
            "PERIOD_TO" => Some(Self::PeriodTo),
            _ => None,
        }
    }
}

impl fmt::Display for CalendarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year and month shown by a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` for a month outside `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.split_once('-')?;
        Self::new(y.trim().parse().ok()?, m.trim().parse().ok()?)
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Parsed inline button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Today,
    Day,
    Period,
    BackMain,
    /// Inert calendar cell.
    Noop,
    PrevMonth { month: YearMonth, mode: CalendarMode },
    NextMonth { month: YearMonth, mode: CalendarMode },
    SetDay { day: NaiveDate, mode: CalendarMode },
    Unknown,
}

impl CallbackAction {
    /// Parses callback data.
    ///
    /// A missing mode means [`CalendarMode::Day`]; a missing or malformed
    /// SET date means `today`.
    #[must_use]
    pub fn parse(data: &str, today: NaiveDate) -> Self {
        match data {
            "TODAY" => return Self::Today,
            "DAY" => return Self::Day,
            "PERIOD" => return Self::Period,
            "BACK_MAIN" => return Self::BackMain,
            _ => {}
        }

        let Some(rest) = data.strip_prefix("CAL:") else {
            return Self::Unknown;
        };
        let parts: Vec<&str> = rest.split(':').collect();
        let mode = parts
            .get(2)
            .and_then(|m| CalendarMode::parse(m))
            .unwrap_or_default();

        match parts.first().copied() {
            Some("NOP") => Self::Noop,
            Some(action @ ("PREV" | "NEXT")) => {
                let Some(month) = parts.get(1).and_then(|ym| YearMonth::parse(ym)) else {
                    return Self::Unknown;
                };
                if action == "PREV" {
                    Self::PrevMonth { month, mode }
                } else {
                    Self::NextMonth { month, mode }
                }
            }
            Some("SET") => {
                let day = parts
                    .get(1)
                    .and_then(|iso| NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok())
                    .unwrap_or(today);
                Self::SetDay { day, mode }
            }
            _ => Self::Unknown,
        }
    }

    /// Encodes the action back into callback data.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Today => "TODAY".to_owned(),
            Self::Day => "DAY".to_owned(),
            Self::Period => "PERIOD".to_owned(),
            Self::BackMain => "BACK_MAIN".to_owned(),
            Self::Noop | Self::Unknown => "CAL:NOP".to_owned(),
            Self::PrevMonth { month, mode } => format!("CAL:PREV:{month}:{mode}"),
            Self::NextMonth { month, mode } => format!("CAL:NEXT:{month}:{mode}"),
            Self::SetDay { day, mode } => format!("CAL:SET:{day}:{mode}"),
        }
    }
}
