use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::error::CoreError;

/// Time window of a chart.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
pub enum ChartRange {
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    Hour,
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Month,
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    Quarter,
    #[serde(rename = "180d")]
    #[strum(serialize = "180d")]
    HalfYear,
    #[serde(rename = "1Y")]
    #[strum(serialize = "1Y")]
    Year,
    #[serde(rename = "All")]
    #[strum(serialize = "All")]
    All,
}

impl ChartRange {
    /// Number of points a series for this range carries.
    pub fn points(self) -> usize {
        match self {
            Self::Hour => 12,
            Self::Day => 24,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::HalfYear => 180,
            Self::Year => 365,
            Self::All => 730,
        }
    }

    /// Spacing between consecutive points.
    pub fn interval(self) -> TimeDelta {
        match self {
            Self::Hour => TimeDelta::minutes(5),
            Self::Day => TimeDelta::hours(1),
            _ => TimeDelta::days(1),
        }
    }

    pub fn label_format(self) -> LabelFormat {
        match self {
            Self::Hour | Self::Day => LabelFormat::Time,
            _ => LabelFormat::Date,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl FromStr for ChartRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Self::Hour),
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            "180d" => Ok(Self::HalfYear),
            "1Y" | "1y" => Ok(Self::Year),
            "All" | "all" => Ok(Self::All),
            other => Err(CoreError::InvalidRange {
                range: other.to_owned(),
            }),
        }
    }
}

/// How a point's `ts` label is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// `HH:MM`
    Time,
    /// `YYYY-MM-DD`
    Date,
}

impl LabelFormat {
    pub fn render(self, at: &DateTime<Utc>) -> String {
        match self {
            Self::Time => at.format("%H:%M").to_string(),
            Self::Date => at.format("%Y-%m-%d").to_string(),
        }
    }

    /// Whether `label` has this format's shape.
    pub fn matches(self, label: &str) -> bool {
        match self {
            Self::Time => label.len() == 5 && NaiveTime::parse_from_str(label, "%H:%M").is_ok(),
            Self::Date => {
                label.len() == 10 && NaiveDate::parse_from_str(label, "%Y-%m-%d").is_ok()
            }
        }
    }
}

/// Which of the two charted series. Display value is the upstream `type`
/// query parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SeriesKind {
    Netflow,
    Total,
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub ts: String,
    /// BTC.
    pub value: f64,
    pub coverage_pct: f64,
}

/// A chart series, oldest point first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub kind: SeriesKind,
    pub range: ChartRange,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }
}
