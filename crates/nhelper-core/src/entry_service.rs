//! Listing and creation of todo, bill and note records.

use std::{collections::BTreeMap, sync::Arc};

use nhelper_domain::{BillDraft, NoteDraft, PropertyValue, TodoDraft, TodoItem};
use tracing::info;

use crate::{
    collaborators::{
        require_collection, DocumentPublisher, MarkdownConverter, PublishedDocument, RecordSource,
    },
    records::RawRecord,
    schema::{bill_fields, note_fields, todo_fields},
    CoreError,
};

pub type Properties = BTreeMap<String, PropertyValue>;

/// Collection ids for the record kinds this service writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCollections {
    pub todo: String,
    pub bill: String,
    pub note: String,
}

pub struct EntryService {
    records: Arc<dyn RecordSource>,
    publisher: Arc<dyn DocumentPublisher>,
    converter: Arc<dyn MarkdownConverter>,
    collections: EntryCollections,
}

impl EntryService {
    pub fn new(
        records: Arc<dyn RecordSource>,
        publisher: Arc<dyn DocumentPublisher>,
        converter: Arc<dyn MarkdownConverter>,
        collections: EntryCollections,
    ) -> Self {
        Self {
            records,
            publisher,
            converter,
            collections,
        }
    }

    pub async fn list_todos(&self) -> Result<Vec<TodoItem>, CoreError> {
        let collection = require_collection(&self.collections.todo, "todo")?;
        let records = self.records.query_records(collection, None).await?;
        Ok(records.iter().map(todo_item).collect())
    }

    pub async fn add_todo(&self, draft: &TodoDraft) -> Result<PublishedDocument, CoreError> {
        let properties = Self::todo_properties(draft)?;
        let collection = require_collection(&self.collections.todo, "todo")?;
        let published = self
            .publisher
            .create_document(collection, &properties, &[])
            .await?;
        info!("created todo `{}`", draft.name);
        Ok(published)
    }

    pub async fn add_bill(&self, draft: &BillDraft) -> Result<PublishedDocument, CoreError> {
        let properties = Self::bill_properties(draft)?;
        let collection = require_collection(&self.collections.bill, "bill")?;
        let published = self
            .publisher
            .create_document(collection, &properties, &[])
            .await?;
        info!(
            "created {} bill `{}` ({:.2})",
            draft.direction, draft.name, draft.amount
        );
        Ok(published)
    }

    /// Creates a note whose body is the draft's markdown content.
    pub async fn add_note(&self, draft: &NoteDraft) -> Result<PublishedDocument, CoreError> {
        let properties = Self::note_properties(draft)?;
        let collection = require_collection(&self.collections.note, "note")?;
        let blocks = self.converter.convert(&draft.content);
        let published = self
            .publisher
            .create_document(collection, &properties, &blocks)
            .await?;
        info!("created note `{}` with {} blocks", draft.title, blocks.len());
        Ok(published)
    }

    pub fn todo_properties(draft: &TodoDraft) -> Result<Properties, CoreError> {
        let name = required(&draft.name, "name")?;
        let tags = required_list(&draft.tags, "tags")?;
        let mut properties = Properties::new();
        properties.insert(todo_fields::NAME.into(), PropertyValue::Title(name));
        properties.insert(todo_fields::TAGS.into(), PropertyValue::MultiSelect(tags));
        properties.insert(
            todo_fields::DESCRIPTION.into(),
            PropertyValue::RichText(draft.description.clone()),
        );
        Ok(properties)
    }

    pub fn bill_properties(draft: &BillDraft) -> Result<Properties, CoreError> {
        let name = required(&draft.name, "name")?;
        let method = required(&draft.method, "method")?;
        let categories = required_list(&draft.categories, "type")?;
        if !draft.amount.is_finite() {
            return Err(CoreError::Validation("amount must be a finite number".into()));
        }
        let mut properties = Properties::new();
        properties.insert(bill_fields::NAME.into(), PropertyValue::Title(name));
        properties.insert(bill_fields::METHOD.into(), PropertyValue::Select(method));
        properties.insert(
            bill_fields::CATEGORIES.into(),
            PropertyValue::MultiSelect(categories),
        );
        properties.insert(
            bill_fields::AMOUNT.into(),
            PropertyValue::Number(draft.amount.abs()),
        );
        properties.insert(
            bill_fields::DESCRIPTION.into(),
            PropertyValue::RichText(draft.description.clone()),
        );
        properties.insert(
            bill_fields::DIRECTION.into(),
            PropertyValue::Select(draft.direction.marker().into()),
        );
        Ok(properties)
    }

    pub fn note_properties(draft: &NoteDraft) -> Result<Properties, CoreError> {
        let title = required(&draft.title, "title")?;
        let url = required(&draft.url, "url")?;
        required(&draft.content, "content")?;
        let tags: Vec<String> = draft
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        let mut properties = Properties::new();
        properties.insert(note_fields::NAME.into(), PropertyValue::Title(title));
        properties.insert(note_fields::TAGS.into(), PropertyValue::MultiSelect(tags));
        properties.insert(note_fields::URL.into(), PropertyValue::Url(url));
        Ok(properties)
    }
}

fn todo_item(raw: &RawRecord) -> TodoItem {
    TodoItem {
        id: raw.id.clone(),
        name: raw.text(todo_fields::NAME),
        tags: raw.labels(todo_fields::TAGS),
        description: raw.text(todo_fields::DESCRIPTION),
        url: raw.url.clone(),
    }
}

fn required(value: &str, field: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn required_list(values: &[String], field: &str) -> Result<Vec<String>, CoreError> {
    let values: Vec<String> = values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    if values.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(values)
}
