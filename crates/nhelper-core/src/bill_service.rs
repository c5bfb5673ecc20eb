//! Aggregation of ledger records into income, expenditure and category shares.

use std::collections::HashMap;

use chrono_tz::Tz;
use nhelper_domain::{BillFact, BillInfo, Categorized, CategoryShare, Direction, NamedEntity};

use crate::{records::RawRecord, schema::bill_fields};

/// Turns raw bill records into a [`BillInfo`] summary.
pub struct BillService;

impl BillService {
    /// Reads a bill record. The amount is kept as a magnitude, the direction
    /// comes from the income/expenditure marker (expenditure when absent), and
    /// the timestamp prefers the date property (all-day dates read in `tz`)
    /// over the creation time.
    pub fn normalize(raw: &RawRecord, tz: Tz) -> BillFact {
        let recorded_at = raw
            .date_range(bill_fields::DATE, tz)
            .map(|(start, _)| start)
            .or_else(|| raw.created_at());
        BillFact::new(
            raw.id.clone(),
            raw.text(bill_fields::NAME),
            raw.number(bill_fields::AMOUNT),
            Direction::from_marker(&raw.text(bill_fields::DIRECTION)),
            raw.labels(bill_fields::CATEGORIES),
        )
        .with_source_url(raw.url.clone())
        .with_recorded_at(recorded_at)
    }

    /// Totals income and expenditure and computes each category's signed net
    /// share. Shares keep first-seen category order; a bill listing several
    /// categories contributes its full amount to each.
    pub fn aggregate(facts: Vec<BillFact>) -> BillInfo {
        let income_total: f64 = facts
            .iter()
            .filter(|fact| fact.direction == Direction::Income)
            .map(|fact| fact.amount)
            .sum();
        let expenditure_total: f64 = facts
            .iter()
            .filter(|fact| fact.direction == Direction::Expenditure)
            .map(|fact| fact.amount)
            .sum();
        let net_total = income_total - expenditure_total;

        let mut shares: Vec<CategoryShare> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for fact in &facts {
            for category in fact.categories() {
                let slot = *index.entry(category.clone()).or_insert_with(|| {
                    shares.push(CategoryShare {
                        category: category.clone(),
                        names: Vec::new(),
                        net_amount: 0.0,
                        percent_of_net: 0.0,
                    });
                    shares.len() - 1
                });
                let share = &mut shares[slot];
                share.net_amount += fact.signed_amount();
                share.names.push(fact.name().to_string());
            }
        }

        let net_is_zero = net_total.abs() < f64::EPSILON;
        for share in &mut shares {
            share.percent_of_net = if net_is_zero {
                0.0
            } else {
                share.net_amount / net_total
            };
        }

        BillInfo {
            facts,
            income_total,
            expenditure_total,
            net_total,
            category_shares: shares,
        }
    }
}
