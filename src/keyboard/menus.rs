//! Main menu and month calendar layouts.

use chrono::{Datelike, NaiveDate};

use super::callback::{CalendarMode, CallbackAction, YearMonth};

/// A button with its callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

impl InlineButton {
    #[must_use]
    pub fn new(text: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            text: text.into(),
            data: action.encode(),
        }
    }
}

/// Rows of inline buttons, independent of the Telegram client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Finds a button by its callback data.
    #[cfg(test)]
    pub fn find(&self, data: &str) -> Option<&InlineButton> {
        self.rows.iter().flatten().find(|b| b.data == data)
    }
}

/// Menu shown after `/start` and after each report.
#[must_use]
pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard {
        rows: vec![
            vec![
                InlineButton::new("📅 За сегодня", CallbackAction::Today),
                InlineButton::new("📆 Выбрать день", CallbackAction::Day),
            ],
            vec![InlineButton::new("🗓️ Выбрать период", CallbackAction::Period)],
        ],
    }
}

/// Month calendar with Monday-first weeks.
#[must_use]
pub fn calendar(month: YearMonth, mode: CalendarMode) -> InlineKeyboard {
    let header = vec![
        InlineButton::new("←", CallbackAction::PrevMonth { month, mode }),
        InlineButton::new(
            format!("{:02}.{}", month.month, month.year),
            CallbackAction::Noop,
        ),
        InlineButton::new("→", CallbackAction::NextMonth { month, mode }),
    ];

    let mut rows = vec![header];
    let mut week = Vec::with_capacity(7);

    if let Some(first) = NaiveDate::from_ymd_opt(month.year, month.month, 1) {
        for _ in 0..first.weekday().num_days_from_monday() {
            week.push(InlineButton::new(" ", CallbackAction::Noop));
        }

        for day in first.iter_days().take_while(|d| d.month() == month.month) {
            week.push(InlineButton::new(
                day.day().to_string(),
                CallbackAction::SetDay { day, mode },
            ));
            if week.len() == 7 {
                rows.push(std::mem::take(&mut week));
            }
        }
    }

    if !week.is_empty() {
        rows.push(week);
    }
    rows.push(vec![InlineButton::new("Назад", CallbackAction::BackMain)]);

    InlineKeyboard { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_layout() {
        let menu = main_menu();
        assert_eq!(menu.rows.len(), 2);
        assert_eq!(menu.rows[0][0].data, "TODAY");
        assert_eq!(menu.rows[0][1].data, "DAY");
        assert_eq!(menu.rows[1][0].data, "PERIOD");
    }

    #[test]
    fn test_calendar_header_and_footer() {
        let cal = calendar(YearMonth { year: 2024, month: 3 }, CalendarMode::PeriodFrom);
        let header = &cal.rows[0];
        assert_eq!(header[0].data, "CAL:PREV:2024-03:PERIOD_FROM");
        assert_eq!(header[1].text, "03.2024");
        assert_eq!(header[1].data, "CAL:NOP");
        assert_eq!(header[2].data, "CAL:NEXT:2024-03:PERIOD_FROM");

        let footer = cal.rows.last().unwrap();
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].data, "BACK_MAIN");
    }

    #[test]
    fn test_calendar_leading_blanks() {
        // 1 March 2024 is a Friday: four blanks before it
        let cal = calendar(YearMonth { year: 2024, month: 3 }, CalendarMode::Day);
        let first_week = &cal.rows[1];
        assert_eq!(first_week.len(), 7);
        assert!(first_week[..4].iter().all(|b| b.text == " " && b.data == "CAL:NOP"));
        assert_eq!(first_week[4].text, "1");
        assert_eq!(first_week[4].data, "CAL:SET:2024-03-01:DAY");
    }

    #[test]
    fn test_calendar_contains_every_day_once() {
        let cal = calendar(YearMonth { year: 2024, month: 2 }, CalendarMode::Day);
        let days: Vec<_> = cal
            .rows
            .iter()
            .flatten()
            .filter(|b| b.data.starts_with("CAL:SET:"))
            .collect();
        assert_eq!(days.len(), 29);
        assert!(cal.find("CAL:SET:2024-02-29:DAY").is_some());
    }

    #[test]
    fn test_calendar_last_week_not_padded() {
        // April 2024 starts on Monday, 30 days: 4 full weeks + 2 days
        let cal = calendar(YearMonth { year: 2024, month: 4 }, CalendarMode::Day);
        // header + 5 weeks + footer
        assert_eq!(cal.rows.len(), 7);
        assert_eq!(cal.rows[1][0].text, "1");
        assert_eq!(cal.rows[5].len(), 2);
    }
}
