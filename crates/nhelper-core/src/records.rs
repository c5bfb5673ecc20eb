//! Decoding of loosely-typed workspace records.
//!
//! Records arrive as JSON objects whose properties carry a `type` tag. Each
//! property is decoded into [`RawProperty`] on access; shapes that do not
//! match decode to [`RawProperty::Unsupported`] and the typed accessors fall
//! back to empty values.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::window_service::local_midnight;

/// A record as returned by the record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawProperty {
    Title {
        #[serde(default)]
        title: Vec<RawText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RawText>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Select {
        #[serde(default)]
        select: Option<RawOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<RawOption>,
    },
    Date {
        #[serde(default)]
        date: Option<RawDate>,
    },
    Formula {
        formula: RawFormula,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawFormula {
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    String {
        #[serde(default)]
        string: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub plain_text: Option<String>,
    #[serde(default)]
    pub text: Option<RawTextContent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTextContent {
    #[serde(default)]
    pub content: String,
}

impl RawText {
    fn as_str(&self) -> &str {
        self.plain_text
            .as_deref()
            .or_else(|| self.text.as_ref().map(|text| text.content.as_str()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDate {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

impl RawRecord {
    /// Decodes one property; missing or malformed properties are `Unsupported`.
    pub fn property(&self, name: &str) -> RawProperty {
        self.properties
            .get(name)
            .and_then(|value| RawProperty::deserialize(value).ok())
            .unwrap_or(RawProperty::Unsupported)
    }

    /// Text of a title, rich text, select, url or string formula property.
    pub fn text(&self, name: &str) -> String {
        match self.property(name) {
            RawProperty::Title { title: runs } | RawProperty::RichText { rich_text: runs } => {
                runs.iter().map(RawText::as_str).collect()
            }
            RawProperty::Select { select } => select.map(|option| option.name).unwrap_or_default(),
            RawProperty::Url { url } => url.unwrap_or_default(),
            RawProperty::Formula {
                formula: RawFormula::String { string },
            } => string.unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Option names of a multi-select or select property.
    pub fn labels(&self, name: &str) -> Vec<String> {
        match self.property(name) {
            RawProperty::MultiSelect { multi_select } => {
                multi_select.into_iter().map(|option| option.name).collect()
            }
            RawProperty::Select { select } => select.into_iter().map(|option| option.name).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of a number or numeric formula property, `0.0` otherwise.
    pub fn number(&self, name: &str) -> f64 {
        match self.property(name) {
            RawProperty::Number { number }
            | RawProperty::Formula {
                formula: RawFormula::Number { number },
            } => number.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Start and optional end of a date property. All-day values start at
    /// local midnight in `tz`.
    pub fn date_range(
        &self,
        name: &str,
        tz: Tz,
    ) -> Option<(DateTime<Utc>, Option<DateTime<Utc>>)> {
        match self.property(name) {
            RawProperty::Date { date: Some(date) } => {
                let start = parse_instant(&date.start, tz)?;
                let end = date.end.as_deref().and_then(|end| parse_instant(end, tz));
                Some((start, end))
            }
            _ => None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_time
            .as_deref()
            .and_then(|value| parse_instant(value, Tz::UTC))
    }
}

/// Parses RFC 3339 timestamps and bare `YYYY-MM-DD` dates (as local midnight
/// in `tz`).
pub fn parse_instant(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| local_midnight(tz, date))
}
