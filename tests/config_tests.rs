use std::fs;
use std::time::Duration;

use datatool::app::{ConfigMap, Settings, DEFAULT_CONFIG};
use datatool::domain::{Driver, TableNames};
use tempfile::tempdir;

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plugins").join("DataTool").join("config.toml");

    let settings = Settings::load(&path);

    assert_eq!(settings, Settings::default());
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
}

#[test]
fn existing_file_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let contents = "[database]\nhost = \"db.internal\"\n";
    fs::write(&path, contents).unwrap();

    let settings = Settings::load(&path);

    assert_eq!(settings.connection.host, "db.internal");
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}

#[test]
fn absent_player_table_key_resolves_default_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[database]\nserver-table = \"population\"\n").unwrap();

    let settings = Settings::load(&path);

    assert_eq!(settings.tables.server_counter, "population");
    assert_eq!(settings.tables.player_identity, "data_tool_players");
}

#[test]
fn unparsable_file_resolves_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[database\nhost = ").unwrap();

    assert_eq!(Settings::load(&path), Settings::default());
}

#[test]
fn unwritable_location_still_resolves_defaults() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("plugins");
    fs::write(&blocker, "not a directory").unwrap();

    let settings = Settings::load(blocker.join("config.toml"));

    assert_eq!(settings, Settings::default());
}

#[test]
fn invalid_entries_fall_back_individually() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[database]
driver = "sqlite"
database = "telemetry.db"
port = "seventy"
player-table = "players-2024"
sample-interval-secs = 5
pool-size = 100
"#,
    )
    .unwrap();

    let settings = Settings::load(&path);

    assert_eq!(settings.connection.driver, Driver::Sqlite);
    assert_eq!(settings.connection.database, "telemetry.db");
    assert_eq!(settings.connection.port, 3306);
    assert_eq!(settings.connection.pool_size, 1);
    assert_eq!(settings.tables, TableNames::default());
    assert_eq!(settings.sampler.interval, Duration::from_secs(5));
}

#[test]
fn retry_and_executor_keys_are_recognised() {
    let map: ConfigMap = [
        ("username", "collector"),
        ("password", "s3cret"),
        ("connect-attempts", "4"),
        ("connect-backoff-ms", "250"),
        ("worker-threads", "3"),
        ("drain-timeout-ms", "100"),
    ]
    .into_iter()
    .collect();

    let settings = Settings::resolve(&map);

    assert_eq!(settings.connection.username, "collector");
    assert_eq!(settings.connection.password, "s3cret");
    assert_eq!(settings.retry.attempts, 4);
    assert_eq!(settings.retry.initial_backoff, Duration::from_millis(250));
    assert_eq!(settings.executor.worker_threads, 3);
    assert_eq!(settings.executor.drain_timeout, Duration::from_millis(100));
}
