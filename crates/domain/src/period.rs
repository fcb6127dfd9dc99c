// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Period keys scoping official sequence numbers.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use time::{Month, OffsetDateTime};

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// A month + year bucket.
///
/// Rendered as `<ROMAN-MONTH>/<YEAR>`, e.g. `IX/2026`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    month: Month,
    year: i32,
}

impl Period {
    #[must_use]
    pub const fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// Returns the period containing the given instant.
    #[must_use]
    pub const fn containing(at: OffsetDateTime) -> Self {
        Self {
            month: at.month(),
            year: at.year(),
        }
    }

    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month as an uppercase Roman numeral.
    #[must_use]
    pub const fn roman_month(&self) -> &'static str {
        ROMAN_MONTHS[self.month as usize - 1]
    }

    /// Returns the persisted key (`IX/2026`).
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.roman_month(), self.year)
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, u8::from(self.month)).cmp(&(other.year, u8::from(other.month)))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPeriod(s.to_string());

        let (roman, year) = s.split_once('/').ok_or_else(invalid)?;
        let index: usize = ROMAN_MONTHS
            .iter()
            .position(|candidate| *candidate == roman)
            .ok_or_else(invalid)?;
        let month: Month = u8::try_from(index + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        Ok(Self { month, year })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
