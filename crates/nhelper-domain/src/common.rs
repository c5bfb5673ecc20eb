//! Shared traits, ratios, and enums for report primitives.

use std::{cmp::Ordering, fmt};

use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// Category assigned to records that arrive without any category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Exposes the categories an entity belongs to.
///
/// Membership is many-to-many: an entity listing N categories contributes to
/// N category buckets.
pub trait Categorized {
    fn categories(&self) -> &[String];
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Deduplicates categories while keeping their first-seen order, falling back
/// to [`UNCATEGORIZED`] when nothing usable remains.
pub fn normalize_categories<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut categories: Vec<String> = Vec::new();
    for entry in raw {
        let trimmed = entry.as_ref().trim();
        if trimmed.is_empty() || categories.iter().any(|known| known == trimmed) {
            continue;
        }
        categories.push(trimmed.to_string());
    }
    if categories.is_empty() {
        categories.push(UNCATEGORIZED.to_string());
    }
    categories
}

/// Result of dividing two quantities where the divisor may be zero.
///
/// Division by zero is not clamped: it yields [`Ratio::Undefined`] and every
/// consumer decides how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ratio {
    Defined(f64),
    #[default]
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        let value = numerator / denominator;
        if value.is_finite() {
            Ratio::Defined(value)
        } else {
            Ratio::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(value) => Some(value),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Defined(_))
    }

    /// Numeric fallback used where a number is mandatory.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// Total order where `Undefined` sorts below every defined value.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ratio::Defined(a), Ratio::Defined(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Ratio::Defined(_), Ratio::Undefined) => Ordering::Greater,
            (Ratio::Undefined, Ratio::Defined(_)) => Ordering::Less,
            (Ratio::Undefined, Ratio::Undefined) => Ordering::Equal,
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.map(|v| Ratio::of(v, 1.0)).unwrap_or(Ratio::Undefined))
    }
}

/// Granularity of a report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    #[default]
    Day,
    Week,
    Month,
    /// Any label that is not a known kind. Produces the degenerate window.
    Unrecognized,
}

impl PeriodKind {
    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| PeriodKind::from_label(&v))
            .unwrap_or_default()
    }

    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => PeriodKind::Day,
            "week" => PeriodKind::Week,
            "month" => PeriodKind::Month,
            _ => PeriodKind::Unrecognized,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodKind::Day => "day",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for PeriodKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(PeriodKind::from_value(value))
    }
}

/// Field used to order task category groups, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSortKey {
    #[default]
    EstimatedSecondsSum,
    ActualSecondsSum,
    Concentration,
}

impl TaskSortKey {
    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| TaskSortKey::from_label(&v))
            .unwrap_or_default()
    }

    /// Accepts the camelCase names plus the legacy client labels.
    pub fn from_label(value: &str) -> Self {
        match value.trim() {
            "actualSecondsSum" | "actualTime" => TaskSortKey::ActualSecondsSum,
            "concentration" | "degreeConcentration" => TaskSortKey::Concentration,
            _ => TaskSortKey::EstimatedSecondsSum,
        }
    }
}

impl<'de> Deserialize<'de> for TaskSortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(TaskSortKey::from_value(value))
    }
}

/// Whether a bill adds to or subtracts from the net total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    #[default]
    Expenditure,
}

impl Direction {
    const INCOME_MARKER: &'static str = "收入";
    const EXPENDITURE_MARKER: &'static str = "支出";

    /// Reads the workspace's income/expenditure marker. Anything that is not
    /// an income marker counts as expenditure.
    pub fn from_marker(marker: &str) -> Self {
        let trimmed = marker.trim();
        if trimmed == Self::INCOME_MARKER || trimmed.eq_ignore_ascii_case("income") {
            Direction::Income
        } else {
            Direction::Expenditure
        }
    }

    /// Marker written back to the workspace.
    pub fn marker(self) -> &'static str {
        match self {
            Direction::Income => Self::INCOME_MARKER,
            Direction::Expenditure => Self::EXPENDITURE_MARKER,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::Income => 1.0,
            Direction::Expenditure => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Income => "Income",
            Direction::Expenditure => "Expenditure",
        };
        f.write_str(label)
    }
}
