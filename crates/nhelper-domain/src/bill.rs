//! Ledger facts and their aggregated summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;

/// One bill, with `amount` always stored as a non-negative magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFact {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub direction: Direction,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
}

impl BillFact {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        direction: Direction,
        categories: Vec<String>,
    ) -> Self {
        let amount = if amount.is_finite() { amount.abs() } else { 0.0 };
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            direction,
            source_url: String::new(),
            recorded_at: None,
            categories: normalize_categories(categories),
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: Option<DateTime<Utc>>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Positive for income, negative for expenditure.
    pub fn signed_amount(&self) -> f64 {
        self.direction.sign() * self.amount
    }
}

impl NamedEntity for BillFact {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Categorized for BillFact {
    fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl Amounted for BillFact {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Net signed contribution of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub names: Vec<String>,
    pub net_amount: f64,
    /// `net_amount / net_total`, or exactly `0.0` when the net total is zero.
    pub percent_of_net: f64,
}

/// Income/expenditure totals and per-category shares for a bill set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillInfo {
    pub facts: Vec<BillFact>,
    pub income_total: f64,
    pub expenditure_total: f64,
    pub net_total: f64,
    pub category_shares: Vec<CategoryShare>,
}

impl BillInfo {
    pub fn bill_count(&self) -> usize {
        self.facts.len()
    }

    /// Whether the net total is zero for presentation purposes.
    pub fn net_is_zero(&self) -> bool {
        self.net_total.abs() < f64::EPSILON
    }
}
