//! Property names used in the workspace collections.

/// Tracked tasks read for the task report.
pub mod task_fields {
    pub const NAME: &str = "Name";
    pub const CATEGORIES: &str = "Type";
    pub const DATE: &str = "Date";
    pub const ESTIMATED: &str = "EstimatedTime";
    pub const ACTUAL: &str = "ActualTime";
}

/// Bill ledger entries.
pub mod bill_fields {
    pub const NAME: &str = "Name";
    pub const METHOD: &str = "Method";
    pub const CATEGORIES: &str = "Type";
    pub const AMOUNT: &str = "Amount";
    pub const DESCRIPTION: &str = "Description";
    pub const DIRECTION: &str = "InOrOut";
    pub const DATE: &str = "Date";
}

pub mod todo_fields {
    pub const NAME: &str = "Name";
    pub const TAGS: &str = "Tags";
    pub const DESCRIPTION: &str = "Description";
}

pub mod note_fields {
    pub const NAME: &str = "Name";
    pub const TAGS: &str = "Tags";
    pub const URL: &str = "URL";
}

/// Published report pages.
pub mod report_fields {
    pub const NAME: &str = "Name";
    pub const DATE: &str = "ReportDate";
    pub const ACTUAL: &str = "ActualTime";
    pub const ESTIMATED: &str = "EstimatedTime";
    pub const CONCENTRATION: &str = "Concentration";
    pub const BILL_COUNT: &str = "BillCount";
    pub const INCOME: &str = "Income";
    pub const EXPENDITURE: &str = "Expenditure";
    pub const NET: &str = "NetAmount";
}
