use crate::Result;
use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Anything that happened on a specific day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// A reporting window for the ledger and the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Default for Period {
    fn default() -> Self {
        Period::Day(today())
    }
}

impl Period {
    pub fn this_month() -> Self {
        let today = today();
        Period::Month {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn this_year() -> Self {
        Period::Year(today().year())
    }

    pub fn year(&self) -> i32 {
        match self {
            Period::Day(date) => date.year(),
            Period::Month { year, .. } => *year,
            Period::Year(year) => *year,
        }
    }

    /// True if `date` falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Period::Day(day) => *day == date,
            Period::Month { year, month } => date.year() == *year && date.month() == *month,
            Period::Year(year) => date.year() == *year,
        }
    }

    /// Keeps the items that fall inside this period, preserving order.
    pub fn filter<'a, T: Dated>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|t| self.contains(t.date())).collect()
    }

    /// The year-long period that contains this one.
    pub fn enclosing_year(&self) -> Period {
        Period::Year(self.year())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day(date) => write!(f, "ngày {}", date.format("%d/%m/%Y")),
            Period::Month { year, month } => write!(f, "tháng {month}/{year}"),
            Period::Year(year) => write!(f, "năm {year}"),
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    /// Accepts `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [_, _, _] => {
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?;
                Ok(Period::Day(date))
            }
            [year, month] => {
                let year: i32 = year
                    .parse()
                    .with_context(|| format!("Invalid year in '{s}'"))?;
                let month: u32 = month
                    .parse()
                    .with_context(|| format!("Invalid month in '{s}'"))?;
                if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
                    bail!("Invalid month '{s}', expected YYYY-MM");
                }
                Ok(Period::Month { year, month })
            }
            [year] => {
                let year: i32 = year
                    .parse()
                    .with_context(|| format!("Invalid year '{s}', expected YYYY"))?;
                Ok(Period::Year(year))
            }
            _ => bail!("Invalid period '{s}', expected YYYY-MM-DD, YYYY-MM or YYYY"),
        }
    }
}

/// The local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
