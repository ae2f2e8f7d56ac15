//! Bar interval parsing.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minutes(u32),
    Hours(u32),
    Days(u32),
}

impl Interval {
    pub fn as_duration(&self) -> chrono::Duration {
        match self {
            Interval::Minutes(n) => chrono::Duration::minutes(*n as i64),
            Interval::Hours(n) => chrono::Duration::hours(*n as i64),
            Interval::Days(n) => chrono::Duration::days(*n as i64),
        }
    }

    /// Whether the Yahoo v8 chart endpoint serves bars at this interval.
    pub fn is_yahoo_chart_interval(&self) -> bool {
        matches!(
            self,
            Interval::Minutes(1 | 2 | 5 | 15 | 30 | 60 | 90) | Interval::Hours(1) | Interval::Days(1 | 5)
        )
    }

    /// Upper bound on the bars `lookback` can hold at this interval.
    pub fn bars_in(&self, lookback: chrono::Duration) -> i64 {
        lookback.num_minutes() / self.as_duration().num_minutes()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minutes(n) => write!(f, "{}m", n),
            Interval::Hours(n) => write!(f, "{}h", n),
            Interval::Days(n) => write!(f, "{}d", n),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in interval '{}'", s))?;
        let (num, unit) = s.split_at(split);
        let n: u32 = num
            .parse()
            .map_err(|_| format!("invalid interval count in '{}'", s))?;
        if n == 0 {
            return Err(format!("interval '{}' must be positive", s));
        }
        match unit {
            "m" | "min" => Ok(Interval::Minutes(n)),
            "h" => Ok(Interval::Hours(n)),
            "d" => Ok(Interval::Days(n)),
            _ => Err(format!("unknown interval unit '{}'", unit)),
        }
    }
}
