use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A selectable chart window, always ending at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalToken {
    ThirtyMinutes,
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
    /// Fixed 30 days, not calendar aware.
    OneMonth,
}

/// Concrete unix-seconds window for a backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalRange {
    pub start: i64,
    pub end: i64,
}

impl IntervalToken {
    pub const ALL: [Self; 8] = [
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::ThreeHours,
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30min",
            Self::OneHour => "1h",
            Self::ThreeHours => "3h",
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1m",
        }
    }

    #[must_use]
    pub fn window_seconds(self) -> i64 {
        match self {
            Self::ThirtyMinutes => 1_800,
            Self::OneHour => 3_600,
            Self::ThreeHours => 10_800,
            Self::SixHours => 21_600,
            Self::TwelveHours => 43_200,
            Self::OneDay => 86_400,
            Self::OneWeek => 604_800,
            Self::OneMonth => 2_592_000,
        }
    }

    /// Largest sampling gap drawn as a continuous line for this window.
    ///
    /// Shorter windows break the line on smaller gaps.
    #[must_use]
    pub fn gap_threshold_seconds(self) -> i64 {
        match self {
            Self::ThirtyMinutes => 120,
            Self::OneHour => 300,
            Self::ThreeHours => 600,
            Self::SixHours => 1_200,
            Self::TwelveHours => 1_800,
            Self::OneDay => 3_600,
            Self::OneWeek => 10_800,
            Self::OneMonth => 43_200,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30 Minuten",
            Self::OneHour => "1 Stunde",
            Self::ThreeHours => "3 Stunden",
            Self::SixHours => "6 Stunden",
            Self::TwelveHours => "12 Stunden",
            Self::OneDay => "1 Tag",
            Self::OneWeek => "1 Woche",
            Self::OneMonth => "1 Monat",
        }
    }

    /// Parse a token, falling back to the one-month window for anything unrecognized.
    #[must_use]
    pub fn parse_or_default(token: &str) -> Self {
        token.parse().unwrap_or_else(|_| {
            tracing::debug!(token, "Unknown interval token, using 1m window");
            Self::OneMonth
        })
    }

    #[must_use]
    pub fn resolve(self, now: i64) -> IntervalRange {
        IntervalRange {
            start: now - self.window_seconds(),
            end: now,
        }
    }
}

impl fmt::Display for IntervalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown interval token: {0}")]
pub struct UnknownInterval(pub String);

impl FromStr for IntervalToken {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownInterval(s.to_string()))
    }
}

/// Window for a raw token ending at `now`. Unknown tokens get the `1m` window.
#[must_use]
pub fn resolve(token: &str, now: i64) -> IntervalRange {
    IntervalToken::parse_or_default(token).resolve(now)
}

/// Window ending at the current wall-clock time, recomputed on every call.
#[must_use]
pub fn resolve_now(token: IntervalToken) -> IntervalRange {
    token.resolve(chrono::Utc::now().timestamp())
}

/// Gap threshold for a raw token; unknown tokens use the tightest dashboard value.
#[must_use]
pub fn gap_threshold_for(token: &str) -> i64 {
    token
        .parse::<IntervalToken>()
        .map_or(600, IntervalToken::gap_threshold_seconds)
}
