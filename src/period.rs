// src/period.rs

use chrono::Month;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PeriodError {
    #[error("Month not found")]
    UnknownMonth,
    #[error("Year not found")]
    UnknownYear,
}

/// A calendar month of a supported year, as encoded at the end of a sale `key`.
#[derive(Clone, Debug, PartialEq)]
pub struct Period {
    pub month: Month,
    pub year: String,
}

impl Period {
    // month is checked before year
    pub fn parse(month: &str, year: &str, supported_years: &[String]) -> Result<Self, PeriodError> {
        let month = parse_month(month).ok_or(PeriodError::UnknownMonth)?;

        if !supported_years.iter().any(|supported| supported == year) {
            return Err(PeriodError::UnknownYear);
        }

        Ok(Self { month, year: year.to_string() })
    }

    /// e.g. `-DECEMBER-2022`, matched case-insensitively against the end of `key`
    pub fn key_suffix(&self) -> String {
        format!("-{}-{}", self.month.name().to_uppercase(), self.year)
    }
}

pub fn parse_month(name: &str) -> Option<Month> {
    (1..=12u8)
        .filter_map(|number| Month::try_from(number).ok())
        .find(|month| month.name().eq_ignore_ascii_case(name))
}
