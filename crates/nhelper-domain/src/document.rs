//! Publisher-neutral document model: typed page properties plus a block tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A styled run of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub code: bool,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: None,
            bold: false,
            code: false,
        }
    }

    /// Plain text when `url` is empty.
    pub fn linked(content: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            link: if url.is_empty() { None } else { Some(url) },
            ..Self::plain(content)
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }
}

/// One table row: a list of cells, each a list of text runs.
pub type TableRow = Vec<Vec<RichText>>;

/// Renderable content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    TableOfContents,
    Divider,
    Heading { level: u8, text: Vec<RichText> },
    Paragraph { text: Vec<RichText> },
    BulletedListItem { text: Vec<RichText> },
    NumberedListItem { text: Vec<RichText> },
    Quote { text: Vec<RichText> },
    Code { language: String, text: String },
    Table {
        width: usize,
        has_column_header: bool,
        rows: Vec<TableRow>,
    },
}

impl Block {
    /// Headings are clamped to levels 1..=3.
    pub fn heading(level: u8, content: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            text: vec![RichText::plain(content)],
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Block::Paragraph {
            text: vec![RichText::plain(content)],
        }
    }

    pub fn bullet(content: impl Into<String>) -> Self {
        Block::BulletedListItem {
            text: vec![RichText::plain(content)],
        }
    }

    /// Builds a table from a header row and body rows; short rows are padded
    /// with empty cells to the header width.
    pub fn table(header: &[&str], rows: Vec<TableRow>) -> Self {
        let width = header.len();
        let mut all_rows = Vec::with_capacity(rows.len() + 1);
        all_rows.push(
            header
                .iter()
                .map(|label| vec![RichText::plain(*label)])
                .collect::<TableRow>(),
        );
        for mut row in rows {
            row.truncate(width);
            while row.len() < width {
                row.push(Vec::new());
            }
            all_rows.push(row);
        }
        Block::Table {
            width,
            has_column_header: true,
            rows: all_rows,
        }
    }
}

/// Typed page property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Number(f64),
    Select(String),
    MultiSelect(Vec<String>),
    Date {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    Url(String),
}

/// Properties plus ordered content blocks, ready for a publisher.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub properties: BTreeMap<String, PropertyValue>,
    pub content_blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.properties.get(name) {
            Some(PropertyValue::Number(value)) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_short_rows() {
        let table = Block::table(&["A", "B", "C"], vec![vec![vec![RichText::plain("x")]]]);
        match table {
            Block::Table { width, rows, .. } => {
                assert_eq!(width, 3);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1].len(), 3);
                assert!(rows[1][2].is_empty());
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn linked_text_drops_empty_url() {
        assert_eq!(RichText::linked("x", "").link, None);
        assert_eq!(
            RichText::linked("x", "https://example.com").link.as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(
            Block::heading(7, "Deep"),
            Block::Heading {
                level: 3,
                text: vec![RichText::plain("Deep")]
            }
        );
    }
}
