//! JSON wire encoding of document properties, blocks and query filters.

use std::{borrow::Cow, collections::BTreeMap};

use nhelper_core::RecordFilter;
use nhelper_domain::{format_iso8601, Block, PropertyValue, RichText};
use serde_json::{json, Map, Value};

/// Longest text content the API accepts in one rich text object.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Most elements the API accepts in any block or rich text array, nested
/// arrays included.
pub const MAX_ARRAY_LEN: usize = 100;

const DEFAULT_CODE_LANGUAGE: &str = "plain text";

pub fn encode_properties(properties: &BTreeMap<String, PropertyValue>) -> Value {
    let encoded: Map<String, Value> = properties
        .iter()
        .map(|(name, value)| (name.clone(), encode_property(value)))
        .collect();
    Value::Object(encoded)
}

pub fn encode_property(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(text) => json!({ "title": plain_runs(text) }),
        PropertyValue::RichText(text) => json!({ "rich_text": plain_runs(text) }),
        PropertyValue::Number(number) => {
            let number = if number.is_finite() { json!(number) } else { Value::Null };
            json!({ "number": number })
        }
        PropertyValue::Select(name) => json!({ "select": { "name": name } }),
        PropertyValue::MultiSelect(names) => {
            let options: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
            json!({ "multi_select": options })
        }
        PropertyValue::Date { start, end } => json!({
            "date": {
                "start": start.format("%Y-%m-%d").to_string(),
                "end": end.map(|day| day.format("%Y-%m-%d").to_string()),
            }
        }),
        PropertyValue::Url(url) => {
            let url = if url.is_empty() { Value::Null } else { json!(url) };
            json!({ "url": url })
        }
    }
}

/// Encodes blocks for upload. Tables with more rows than one request may
/// carry continue in further tables that repeat the header row, and text
/// with too many runs continues in further blocks of the same type.
pub fn encode_blocks(blocks: &[Block]) -> Vec<Value> {
    blocks
        .iter()
        .flat_map(split_table)
        .flat_map(|block| split_rich_text(encode_block(&block)))
        .collect()
}

fn split_table(block: &Block) -> Vec<Cow<'_, Block>> {
    let Block::Table {
        width,
        has_column_header,
        rows,
    } = block
    else {
        return vec![Cow::Borrowed(block)];
    };
    if rows.len() <= MAX_ARRAY_LEN {
        return vec![Cow::Borrowed(block)];
    }
    let (header, body) = match rows.split_first() {
        Some((header, body)) if *has_column_header => (Some(header), body),
        _ => (None, rows.as_slice()),
    };
    let per_table = MAX_ARRAY_LEN - usize::from(header.is_some());
    body.chunks(per_table)
        .map(|chunk| {
            let mut part = Vec::with_capacity(chunk.len() + 1);
            part.extend(header.cloned());
            part.extend_from_slice(chunk);
            Cow::Owned(Block::Table {
                width: *width,
                has_column_header: *has_column_header,
                rows: part,
            })
        })
        .collect()
}

fn split_rich_text(block: Value) -> Vec<Value> {
    let Some(kind) = block["type"].as_str().map(str::to_string) else {
        return vec![block];
    };
    let runs = match block[kind.as_str()]["rich_text"].as_array() {
        Some(runs) if runs.len() > MAX_ARRAY_LEN => runs.clone(),
        _ => return vec![block],
    };
    runs.chunks(MAX_ARRAY_LEN)
        .map(|chunk| {
            let mut part = block.clone();
            part[kind.as_str()]["rich_text"] = Value::Array(chunk.to_vec());
            part
        })
        .collect()
}

pub fn encode_block(block: &Block) -> Value {
    match block {
        Block::TableOfContents => typed("table_of_contents", json!({})),
        Block::Divider => typed("divider", json!({})),
        Block::Heading { level, text } => {
            let kind = match *level {
                1 => "heading_1",
                2 => "heading_2",
                _ => "heading_3",
            };
            typed(kind, json!({ "rich_text": encode_rich_text(text) }))
        }
        Block::Paragraph { text } => typed("paragraph", json!({ "rich_text": encode_rich_text(text) })),
        Block::BulletedListItem { text } => typed(
            "bulleted_list_item",
            json!({ "rich_text": encode_rich_text(text) }),
        ),
        Block::NumberedListItem { text } => typed(
            "numbered_list_item",
            json!({ "rich_text": encode_rich_text(text) }),
        ),
        Block::Quote { text } => typed("quote", json!({ "rich_text": encode_rich_text(text) })),
        Block::Code { language, text } => {
            let language = if language.trim().is_empty() {
                DEFAULT_CODE_LANGUAGE
            } else {
                language.as_str()
            };
            typed(
                "code",
                json!({ "rich_text": plain_runs(text), "language": language }),
            )
        }
        Block::Table {
            width,
            has_column_header,
            rows,
        } => {
            let children: Vec<Value> = rows
                .iter()
                .map(|row| {
                    let cells: Vec<Value> = row.iter().map(|cell| encode_rich_text(cell)).collect();
                    typed("table_row", json!({ "cells": cells }))
                })
                .collect();
            typed(
                "table",
                json!({
                    "table_width": width,
                    "has_column_header": has_column_header,
                    "has_row_header": false,
                    "children": children,
                }),
            )
        }
    }
}

/// Encodes text runs, splitting runs longer than [`MAX_TEXT_CHARS`].
pub fn encode_rich_text(runs: &[RichText]) -> Value {
    let mut encoded = Vec::with_capacity(runs.len());
    for run in runs {
        for chunk in split_chars(&run.content, MAX_TEXT_CHARS) {
            let link = run
                .link
                .as_ref()
                .map(|url| json!({ "url": url }))
                .unwrap_or(Value::Null);
            encoded.push(json!({
                "type": "text",
                "text": { "content": chunk, "link": link },
                "annotations": { "bold": run.bold, "code": run.code },
            }));
        }
    }
    Value::Array(encoded)
}

/// An `and` of the filter's date conditions on its field.
pub fn encode_filter(filter: &RecordFilter) -> Value {
    let bounds = [
        ("after", filter.after),
        ("before", filter.before),
        ("on_or_after", filter.on_or_after),
        ("on_or_before", filter.on_or_before),
    ];
    let conditions: Vec<Value> = bounds
        .into_iter()
        .filter_map(|(operator, instant)| {
            instant.map(|instant| {
                let mut condition = Map::new();
                condition.insert(operator.to_string(), json!(format_iso8601(instant)));
                json!({ "property": filter.field, "date": condition })
            })
        })
        .collect();
    json!({ "and": conditions })
}

fn typed(kind: &str, body: Value) -> Value {
    let mut block = Map::new();
    block.insert("object".into(), json!("block"));
    block.insert("type".into(), json!(kind));
    block.insert(kind.into(), body);
    Value::Object(block)
}

fn plain_runs(text: &str) -> Value {
    encode_rich_text(&[RichText::plain(text)])
}

fn split_chars(text: &str, max: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max).map(|chunk| chunk.iter().collect()).collect()
}
