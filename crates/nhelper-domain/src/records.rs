//! Drafts for the records this service writes, and the todo listing shape.

use serde::{Deserialize, Serialize};

use crate::common::Direction;

/// A todo page to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoDraft {
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// A todo page as listed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
    pub url: String,
}

/// A bill page to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDraft {
    pub name: String,
    pub method: String,
    pub categories: Vec<String>,
    pub amount: f64,
    pub description: String,
    pub direction: Direction,
}

/// A note page to create; `content` is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub tags: Vec<String>,
    pub url: String,
    pub content: String,
}
