use nhelper_config::{Config, ConfigError, ConfigManager, WeekStart};
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("absent.json"));

    let config = manager.load().expect("load config");
    assert_eq!(config, Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("nested")).expect("manager");

    let mut config = Config::default();
    config.server.app_secret = Some("s3cret".into());
    config.calendar.week_start = WeekStart::Monday;
    config.notion.databases.task = "db-task".into();
    config.coze.workflow_id = Some("wf-1".into());

    manager.save(&config).expect("save config");
    assert!(manager.config_path().exists());
    assert!(!manager.config_path().with_extension("json.tmp").exists());

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, config);
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");

    let result = ConfigManager::new(path).load();
    assert!(matches!(result, Err(ConfigError::Serde(_))));
}

#[test]
fn default_location_ends_with_app_file() {
    let manager = ConfigManager::default_location();
    assert!(manager
        .config_path()
        .ends_with("notion-helper/config.json"));
}
