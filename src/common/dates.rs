// src/common/dates.rs

use chrono::{Datelike, Months, NaiveDate};

use crate::common::error::AppError;

/// Mês de referência no formato "AAAA-MM" (chave do `monthlyPayments`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidMonth(value.to_string());

        if value.len() != 7 {
            return Err(invalid());
        }
        let first_day =
            NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
        Ok(Self { first_day })
    }

    pub fn of(date: NaiveDate) -> Self {
        // o dia 1 sempre existe
        Self {
            first_day: NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }

    /// Dia do mês limitado ao último dia (ex.: dia 31 em fevereiro).
    pub fn day_clamped(&self, day: u32) -> NaiveDate {
        let last = self.last_day();
        let day = day.clamp(1, last.day());
        NaiveDate::from_ymd_opt(last.year(), last.month(), day).unwrap_or(last)
    }

    pub fn key(&self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_bounds_a_month() {
        let month = Month::parse("2024-02").unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(month.day_clamped(31), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(month.key(), "2024-02");
    }

    #[test]
    fn rejects_malformed_months() {
        for value in ["2024-13", "2024-1", "24-01", "2024/01", ""] {
            assert!(matches!(Month::parse(value), Err(AppError::InvalidMonth(_))), "{value}");
        }
    }
}
