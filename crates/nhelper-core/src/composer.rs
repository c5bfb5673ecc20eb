//! Rendering of task and bill summaries into a publishable document.
//!
//! Composition is pure: the same inputs always produce the same document.
//! Undefined ratios render as [`UNDEFINED_TOKEN`] in text and `0` in numeric
//! properties, so no non-finite value ever reaches the output.

use nhelper_domain::{
    BillFact, BillInfo, Block, PropertyValue, Ratio, ReportDocument, RichText, TableRow,
    TaskCategoryGroup, TaskReport, TimeWindow,
};

use crate::{
    collaborators::{MarkdownConverter, Narrative},
    format::{format_amount, format_percent, format_seconds_to_time, UNDEFINED_TOKEN},
    schema::report_fields,
};

const TASK_COLUMNS: [&str; 4] = ["Task", "Actual", "Estimated", "Concentration"];
const BILL_COLUMNS: [&str; 5] = ["Bill", "Direction", "Categories", "Amount", "Percent"];
const NAME_SEPARATOR: &str = ", ";

/// Presentation switches for composed reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub table_of_contents: bool,
    pub category_delimiter: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            table_of_contents: true,
            category_delimiter: ", ".into(),
        }
    }
}

/// Builds [`ReportDocument`]s from aggregated summaries.
pub struct ReportComposer<'a> {
    converter: &'a dyn MarkdownConverter,
    options: ComposeOptions,
}

impl<'a> ReportComposer<'a> {
    pub fn new(converter: &'a dyn MarkdownConverter, options: ComposeOptions) -> Self {
        Self { converter, options }
    }

    /// Composes the report for `window`. A missing task report or bill
    /// summary zeroes its properties and replaces its section with a short
    /// notice; a missing narrative leaves the narrative section out.
    pub fn compose(
        &self,
        window: &TimeWindow,
        tasks: Option<&TaskReport>,
        bills: Option<&BillInfo>,
        narrative: Option<&Narrative>,
    ) -> ReportDocument {
        let mut document = ReportDocument::default();
        self.fill_properties(&mut document, window, tasks, bills);

        let blocks = &mut document.content_blocks;
        if self.options.table_of_contents {
            blocks.push(Block::TableOfContents);
        }
        blocks.extend(summary_section(tasks, bills));
        blocks.extend(task_section(tasks));
        blocks.extend(self.bill_section(bills));
        if let Some(narrative) = narrative {
            blocks.extend(self.narrative_section(narrative));
        }
        document
    }

    fn fill_properties(
        &self,
        document: &mut ReportDocument,
        window: &TimeWindow,
        tasks: Option<&TaskReport>,
        bills: Option<&BillInfo>,
    ) {
        let properties = &mut document.properties;
        properties.insert(
            report_fields::NAME.into(),
            PropertyValue::Title(window.label()),
        );
        properties.insert(
            report_fields::DATE.into(),
            PropertyValue::Date {
                start: window.first_day,
                end: (!window.is_single_day()).then_some(window.last_day),
            },
        );

        let (actual, estimated, concentration) = tasks
            .map(|report| {
                (
                    report.actual_seconds_sum,
                    report.estimated_seconds_sum,
                    report.concentration.or_zero(),
                )
            })
            .unwrap_or_default();
        properties.insert(report_fields::ACTUAL.into(), PropertyValue::Number(actual));
        properties.insert(
            report_fields::ESTIMATED.into(),
            PropertyValue::Number(estimated),
        );
        properties.insert(
            report_fields::CONCENTRATION.into(),
            PropertyValue::Number(concentration),
        );

        let (count, income, expenditure, net) = bills
            .map(|info| {
                (
                    info.bill_count() as f64,
                    info.income_total,
                    info.expenditure_total,
                    info.net_total,
                )
            })
            .unwrap_or_default();
        properties.insert(report_fields::BILL_COUNT.into(), PropertyValue::Number(count));
        properties.insert(report_fields::INCOME.into(), PropertyValue::Number(income));
        properties.insert(
            report_fields::EXPENDITURE.into(),
            PropertyValue::Number(expenditure),
        );
        properties.insert(report_fields::NET.into(), PropertyValue::Number(net));
    }

    fn bill_section(&self, bills: Option<&BillInfo>) -> Vec<Block> {
        let mut blocks = vec![Block::heading(1, "Bills")];
        let info = match bills {
            Some(info) if !info.facts.is_empty() => info,
            _ => {
                blocks.push(Block::paragraph("No bills recorded."));
                return blocks;
            }
        };

        for share in &info.category_shares {
            let percent = if info.net_is_zero() {
                UNDEFINED_TOKEN.to_string()
            } else {
                format_percent(Ratio::Defined(share.percent_of_net))
            };
            blocks.push(Block::bullet(format!(
                "{}: {}, {} ({})",
                share.category,
                format_amount(share.net_amount),
                percent,
                share.names.join(NAME_SEPARATOR)
            )));
        }

        let mut facts: Vec<&BillFact> = info.facts.iter().collect();
        facts.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        let rows = facts
            .into_iter()
            .map(|fact| self.bill_row(fact, info))
            .collect();
        blocks.push(Block::table(&BILL_COLUMNS, rows));
        blocks
    }

    fn bill_row(&self, fact: &BillFact, info: &BillInfo) -> TableRow {
        let percent = if info.net_is_zero() {
            UNDEFINED_TOKEN.to_string()
        } else {
            format_percent(Ratio::Defined(fact.signed_amount() / info.net_total))
        };
        vec![
            vec![RichText::linked(fact.name.clone(), fact.source_url.clone())],
            vec![RichText::plain(fact.direction.to_string())],
            vec![RichText::plain(
                fact.categories.join(&self.options.category_delimiter),
            )],
            vec![RichText::plain(format_amount(fact.amount))],
            vec![RichText::plain(percent)],
        ]
    }

    fn narrative_section(&self, narrative: &Narrative) -> Vec<Block> {
        let mut blocks = vec![
            Block::Divider,
            Block::heading(1, "Narrative"),
            Block::heading(2, "Summary"),
        ];
        blocks.extend(self.converter.convert(&narrative.summary));
        blocks.push(Block::heading(2, "Rationale"));
        blocks.extend(self.converter.convert(&narrative.rationale));
        blocks
    }
}

fn summary_section(tasks: Option<&TaskReport>, bills: Option<&BillInfo>) -> Vec<Block> {
    let mut blocks = vec![Block::heading(1, "Summary")];
    if let Some(report) = tasks {
        blocks.push(Block::bullet(format!(
            "Concentration: {} ({} / {})",
            format_percent(report.concentration),
            report.actual_seconds_str,
            report.estimated_seconds_str
        )));
    }
    if let Some(info) = bills {
        blocks.push(Block::bullet(format!(
            "Net: {} (income {}, expenditure {}, {} bills)",
            format_amount(info.net_total),
            format_amount(info.income_total),
            format_amount(info.expenditure_total),
            info.bill_count()
        )));
    }
    if tasks.is_none() && bills.is_none() {
        blocks.push(Block::paragraph("No data available for this period."));
    }
    blocks
}

fn task_section(tasks: Option<&TaskReport>) -> Vec<Block> {
    let mut blocks = vec![Block::heading(1, "Tasks")];
    match tasks {
        Some(report) if !report.groups.is_empty() => {
            for group in &report.groups {
                blocks.extend(group_blocks(group));
            }
        }
        _ => blocks.push(Block::paragraph("No tasks recorded.")),
    }
    blocks
}

fn group_blocks(group: &TaskCategoryGroup) -> Vec<Block> {
    let rows = group
        .tasks
        .iter()
        .map(|task| {
            vec![
                vec![RichText::linked(task.name.clone(), task.source_url.clone())],
                vec![RichText::plain(format_seconds_to_time(task.actual_seconds))],
                vec![RichText::plain(format_seconds_to_time(task.estimated_seconds))],
                vec![RichText::plain(format_percent(task.concentration))],
            ]
        })
        .collect();
    vec![
        Block::heading(2, group.category.clone()),
        Block::bullet(format!(
            "{}: {} / {}, {}",
            group.category,
            format_seconds_to_time(group.actual_seconds_sum),
            format_seconds_to_time(group.estimated_seconds_sum),
            format_percent(group.concentration)
        )),
        Block::table(&TASK_COLUMNS, rows),
    ]
}
