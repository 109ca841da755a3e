//! Cash-flow report for one day or period against the preceding day.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{ACCOUNT_FINANCIAL, ACCOUNT_OPERATIONAL, CashflowTable, Movement};

/// Report comparing the requested range with the day before it.
#[derive(Debug, Clone)]
pub struct CashflowReport {
    /// First day of the requested range.
    pub date_from: NaiveDate,
    /// Exclusive end of the requested range.
    pub date_to: NaiveDate,
    pub previous: CashflowTable,
    pub current: CashflowTable,
    /// Movements of the requested range, for the detailed sheet.
    pub movements: Vec<Movement>,
}

impl CashflowReport {
    /// Builds a report from raw movements.
    #[must_use]
    pub fn new(
        date_from: NaiveDate,
        date_to: NaiveDate,
        previous: &[Movement],
        current: Vec<Movement>,
    ) -> Self {
        Self {
            date_from,
            date_to,
            previous: CashflowTable::from_movements(previous),
            current: CashflowTable::from_movements(&current),
            movements: current,
        }
    }

    /// Sorted union of categories from both tables.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<String> {
        let mut all = self.current.categories();
        all.extend(self.previous.categories());
        all
    }

    /// Renders one table as `"{cat}: Опер=..., Фин=..."` lines under a title.
    #[must_use]
    pub fn render_day_table(&self, table: &CashflowTable, title: &str) -> String {
        let mut lines = vec![title.to_owned()];
        for cat in self.categories() {
            lines.push(format!(
                "{cat}: Опер={:.2}, Фин={:.2}",
                table.get(ACCOUNT_OPERATIONAL, &cat),
                table.get(ACCOUNT_FINANCIAL, &cat)
            ));
        }
        lines.join("\n")
    }

    /// Text for the current range, titled with its first day.
    #[must_use]
    pub fn current_text(&self) -> String {
        self.render_day_table(&self.current, &format!("ДДС за {}", self.date_from))
    }

    /// Text for the preceding day.
    #[must_use]
    pub fn previous_text(&self) -> String {
        let prev_day = self.date_from.pred_opt().unwrap_or(self.date_from);
        self.render_day_table(&self.previous, &format!("ДДС за {prev_day}"))
    }

    /// One `"{acc} / {cat}: {v}"` line per pivot row of the current range.
    #[must_use]
    pub fn render_period_lines(&self) -> String {
        let last_day = self.date_to.pred_opt().unwrap_or(self.date_to);
        let mut lines = vec![format!("ДДС за период {} — {}", self.date_from, last_day)];
        for (acc, cat, value) in self.current.rows() {
            lines.push(format!("{acc} / {cat}: {value:.2}"));
        }
        lines.join("\n")
    }

    /// Movements grouped by date, account and category.
    #[must_use]
    pub fn detailed_rows(&self) -> Vec<(Option<NaiveDate>, String, String, f64)> {
        let mut grouped: BTreeMap<(Option<NaiveDate>, String, String), f64> = BTreeMap::new();
        for m in &self.movements {
            *grouped
                .entry((m.date, m.account.clone(), m.category.clone()))
                .or_insert(0.0) += m.amount;
        }
        grouped
            .into_iter()
            .map(|((date, acc, cat), v)| (date, acc, cat, v))
            .collect()
    }

    /// Renders the detailed rows as `"{date} | {acc} | {cat}: {v}"`.
    #[must_use]
    pub fn render_detailed_lines(&self) -> String {
        let last_day = self.date_to.pred_opt().unwrap_or(self.date_to);
        let mut lines = vec![format!(
            "Детальный ДДС за период {} — {}",
            self.date_from, last_day
        )];
        for (date, acc, cat, value) in self.detailed_rows() {
            let date = date.map_or_else(|| "—".to_owned(), |d| d.to_string());
            lines.push(format!("{date} | {acc} | {cat}: {value:.2}"));
        }
        lines.join("\n")
    }
}
