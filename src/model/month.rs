use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the twelve fixed periods of the year, in calendar order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

serde_plain::derive_display_from_serialize!(Month);

impl Month {
    pub const COUNT: usize = 12;

    pub const ALL: [Month; Month::COUNT] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub const FIRST: Month = Month::January;
    pub const LAST: Month = Month::December;

    /// Zero-based position in the year.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(ix: usize) -> Option<Month> {
        Month::ALL.get(ix).copied()
    }

    /// The month before this one, `None` for January.
    pub fn previous(self) -> Option<Month> {
        self.index().checked_sub(1).and_then(Month::from_index)
    }

    /// January through `self`, inclusive.
    pub fn through(self) -> impl Iterator<Item = Month> {
        Month::ALL.into_iter().take(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Three letter abbreviation, e.g. `Jan`.
    pub fn abbreviation(self) -> &'static str {
        &self.name()[..3]
    }
}

/// Accepts the full name, the three letter abbreviation or the month number (1-12), ignoring
/// case.
impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<usize>() {
            return match number.checked_sub(1).and_then(Month::from_index) {
                Some(month) => Ok(month),
                None => bail!("Month number must be between 1 and 12, got {number}"),
            };
        }
        let lower = trimmed.to_lowercase();
        match Month::ALL.iter().find(|m| {
            m.name().to_lowercase() == lower || m.abbreviation().to_lowercase() == lower
        }) {
            Some(month) => Ok(*month),
            None => bail!("Invalid month '{s}'"),
        }
    }
}
