//! Date ranges and report requests.

use std::fmt;

use chrono::{Days, NaiveDate};

/// Half-open day range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Range covering exactly one day.
    #[must_use]
    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, next_day(day))
    }

    /// Last day included in the range.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        if self.to > self.from {
            self.to.pred_opt().unwrap_or(self.from)
        } else {
            self.from
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRequest {
    Day(NaiveDate),
    /// Period between two chosen days, as picked in the calendar.
    Period { from: NaiveDate, to: NaiveDate },
}

impl ReportRequest {
    /// Caption attached to the sent document.
    #[must_use]
    pub fn caption(&self) -> String {
        match self {
            Self::Day(day) => format!("Отчёт ДДС — {day}"),
            Self::Period { from, to } => format!("Отчёт ДДС — период {from} — {to}"),
        }
    }

    /// Resolves the ranges to fetch.
    #[must_use]
    pub fn plan(&self) -> DayReportPlan {
        match *self {
            Self::Day(day) => DayReportPlan::for_day(day),
            Self::Period { from, to } => DayReportPlan::for_period(from, to),
        }
    }
}

/// Ranges fetched for one report: the requested range and the day before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayReportPlan {
    pub previous: DateRange,
    pub current: DateRange,
}

impl DayReportPlan {
    /// `current = [d, d+1)`, `previous = [d-1, d)`.
    #[must_use]
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            previous: DateRange::new(prev_day(day), day),
            current: DateRange::single_day(day),
        }
    }

    /// `current = [from, to)`, widened to one day when `from >= to`.
    #[must_use]
    pub fn for_period(from: NaiveDate, to: NaiveDate) -> Self {
        let to = if from >= to { next_day(from) } else { to };
        Self {
            previous: DateRange::new(prev_day(from), from),
            current: DateRange::new(from, to),
        }
    }

    /// Output file name, `"{from}_ДДС.xlsx"`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_ДДС.xlsx", self.current.from)
    }
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(day)
}

fn prev_day(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(1)).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_plan() {
        let plan = DayReportPlan::for_day(date(2024, 3, 1));
        assert_eq!(plan.current, DateRange::new(date(2024, 3, 1), date(2024, 3, 2)));
        assert_eq!(plan.previous, DateRange::new(date(2024, 2, 29), date(2024, 3, 1)));
        assert_eq!(plan.file_name(), "2024-03-01_ДДС.xlsx");
    }

    #[test]
    fn test_period_plan() {
        let plan = DayReportPlan::for_period(date(2024, 1, 10), date(2024, 1, 20));
        assert_eq!(plan.current, DateRange::new(date(2024, 1, 10), date(2024, 1, 20)));
        assert_eq!(plan.previous, DateRange::new(date(2024, 1, 9), date(2024, 1, 10)));
    }

    #[test]
    fn test_period_plan_reversed_bounds_collapse_to_one_day() {
        let plan = DayReportPlan::for_period(date(2024, 1, 20), date(2024, 1, 10));
        assert_eq!(plan.current, DateRange::single_day(date(2024, 1, 20)));

        let same = DayReportPlan::for_period(date(2024, 1, 20), date(2024, 1, 20));
        assert_eq!(same.current, DateRange::single_day(date(2024, 1, 20)));
    }

    #[test]
    fn test_year_boundary() {
        let plan = DayReportPlan::for_day(date(2024, 1, 1));
        assert_eq!(plan.previous.from, date(2023, 12, 31));
        assert_eq!(plan.current.last_day(), date(2024, 1, 1));
    }

    #[test]
    fn test_captions() {
        assert_eq!(
            ReportRequest::Day(date(2024, 5, 1)).caption(),
            "Отчёт ДДС — 2024-05-01"
        );
        assert_eq!(
            ReportRequest::Period {
                from: date(2024, 5, 1),
                to: date(2024, 5, 7)
            }
            .caption(),
            "Отчёт ДДС — период 2024-05-01 — 2024-05-07"
        );
    }
}
