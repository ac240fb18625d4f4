use std::{fmt, str::FromStr};

/// Named lookback windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PeriodSelection {
    Yesterday,
    LastWeek,
    LastMonth,
    #[default]
    ThisMonth,
    ThisYear,
}

impl PeriodSelection {
    pub const ALL: [PeriodSelection; 5] = [
        PeriodSelection::Yesterday,
        PeriodSelection::LastWeek,
        PeriodSelection::LastMonth,
        PeriodSelection::ThisMonth,
        PeriodSelection::ThisYear,
    ];

    /// Stable identifier used in query strings and config.
    pub fn id(self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::LastWeek => "last_week",
            Self::LastMonth => "last_month",
            Self::ThisMonth => "this_month",
            Self::ThisYear => "this_year",
        }
    }

    /// Label shown on the dashboard's period selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Yesterday => "Kemarin",
            Self::LastWeek => "1 Minggu Terakhir",
            Self::LastMonth => "1 Bulan Terakhir",
            Self::ThisMonth => "Bulan Ini",
            Self::ThisYear => "Tahun Ini",
        }
    }

    /// Parse an id or a selector label. Anything else yields `None`, which the
    /// period filter treats as "no filtering".
    pub fn parse(input: &str) -> Option<Self> {
        input.parse().ok()
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for PeriodSelection {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PeriodSelection::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(trimmed) || p.label() == trimmed)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}
