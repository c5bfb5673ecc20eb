use std::{fmt, str::FromStr};

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{de::Deserializer, Deserialize, Serialize};

use crate::ConfigError;

/// Full service configuration. Every field has a default so partial files load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub calendar: CalendarSettings,
    pub notion: NotionSettings,
    pub coze: CozeSettings,
    pub report: ReportPresentation,
}

impl Config {
    /// Overlays values found through `lookup` (normally the process
    /// environment). Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(secret) = get("APP_SECRET") {
            self.server.app_secret = Some(secret);
        }
        if let Some(bind) = get("NOTION_HELPER_BIND") {
            self.server.bind_addr = bind;
        }
        if let Some(timezone) = get("NOTION_HELPER_TIMEZONE") {
            self.calendar.timezone = timezone;
        }
        if let Some(week_start) = get("NOTION_HELPER_WEEK_START") {
            self.calendar.week_start = WeekStart::from_str(&week_start);
        }
        if let Some(token) = get("NOTION_TOKEN") {
            self.notion.token = token;
        }
        if let Some(token) = get("COZE_TOKEN") {
            self.coze.token = token;
        }
        if let Some(workflow) = get("COZE_WORKFLOW_ID") {
            self.coze.workflow_id = Some(workflow);
        }

        let databases = &mut self.notion.databases;
        for (key, slot) in [
            ("NOTION_TODO_DATABASE_ID", &mut databases.todo),
            ("NOTION_BILL_DATABASE_ID", &mut databases.bill),
            ("NOTION_NOTE_DATABASE_ID", &mut databases.note),
            ("NOTION_TASK_DATABASE_ID", &mut databases.task),
            ("NOTION_REPORT_DATABASE_ID", &mut databases.report),
            ("NOTION_DAILY_REPORT_DATABASE_ID", &mut databases.daily_report),
            ("NOTION_WEEKLY_REPORT_DATABASE_ID", &mut databases.weekly_report),
        ] {
            if let Some(id) = get(key) {
                *slot = id;
            }
        }
    }

    /// Parsed report timezone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        let name = self.calendar.timezone.trim();
        name.parse::<Tz>()
            .map_err(|err| ConfigError::Invalid(format!("unknown timezone `{}`: {}", name, err)))
    }

    pub fn week_start(&self) -> Weekday {
        self.calendar.week_start.to_weekday()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Value every request must present in the `request_secret` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            app_secret: None,
        }
    }
}

/// Calendar used for report windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// IANA timezone name.
    pub timezone: String,
    pub week_start: WeekStart,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            timezone: "Asia/Shanghai".into(),
            week_start: WeekStart::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSettings {
    pub token: String,
    pub base_url: String,
    pub version: String,
    pub databases: DatabaseIds,
}

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: "https://api.notion.com".into(),
            version: "2022-06-28".into(),
            databases: DatabaseIds::default(),
        }
    }
}

/// Workspace database ids, one per record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseIds {
    pub todo: String,
    pub bill: String,
    pub note: String,
    pub task: String,
    pub report: String,
    pub daily_report: String,
    pub weekly_report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CozeSettings {
    pub token: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CozeSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: "https://api.coze.cn".into(),
            workflow_id: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPresentation {
    pub table_of_contents: bool,
    pub category_delimiter: String,
}

impl Default for ReportPresentation {
    fn default() -> Self {
        Self {
            table_of_contents: true,
            category_delimiter: ", ".into(),
        }
    }
}

/// First day of a report week. Unknown names fall back to Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| WeekStart::from_str(&v))
            .unwrap_or_default()
    }

    pub fn from_str(value: &str) -> Self {
        match Weekday::from_str(value.trim()) {
            Ok(day) => Self::from_weekday(day),
            Err(_) => WeekStart::Sunday,
        }
    }

    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon => WeekStart::Monday,
            Weekday::Tue => WeekStart::Tuesday,
            Weekday::Wed => WeekStart::Wednesday,
            Weekday::Thu => WeekStart::Thursday,
            Weekday::Fri => WeekStart::Friday,
            Weekday::Sat => WeekStart::Saturday,
            Weekday::Sun => WeekStart::Sunday,
        }
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Tuesday => Weekday::Tue,
            WeekStart::Wednesday => Weekday::Wed,
            WeekStart::Thursday => Weekday::Thu,
            WeekStart::Friday => Weekday::Fri,
            WeekStart::Saturday => Weekday::Sat,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
            WeekStart::Tuesday => "tuesday",
            WeekStart::Wednesday => "wednesday",
            WeekStart::Thursday => "thursday",
            WeekStart::Friday => "friday",
            WeekStart::Saturday => "saturday",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for WeekStart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(WeekStart::from_value(value))
    }
}
