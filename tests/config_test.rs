use std::env;
use std::fs;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::path::PathBuf;
    use steam_stats::config::Config;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        // Test logging defaults
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        // Test analysis defaults
        assert_eq!(config.analysis.finished_state, "finished");
        assert_eq!(config.analysis.top_users_limit, 15);
        assert_eq!(config.analysis.raw_rows_limit, 10_000);
        assert_eq!(config.analysis.max_peak_days, 36_600);

        // Test output defaults
        assert!(config.output.json_pretty);
        assert!(config.output.color);
        assert_eq!(config.output.timestamp_format, "%c");

        // Test path defaults
        assert_eq!(config.paths.data_directory, PathBuf::from("data"));
        assert_eq!(config.paths.log_directory, PathBuf::from("logs"));
    }

    #[test]
    fn test_env_variable_override() {
        env::set_var("STEAM_STATS_RAW_ROWS", "50");
        env::set_var("STEAM_STATS_MAX_PEAK_DAYS", "365");
        env::set_var("STEAM_STATS_FINISHED_STATE", "completed");
        env::set_var("STEAM_STATS_JSON_PRETTY", "false");
        env::set_var("STEAM_STATS_DATA_DIR", "/tmp/steam-stats-data");

        let mut config = Config::default();
        config
            .apply_env_overrides()
            .expect("Failed to apply env overrides");

        assert_eq!(config.analysis.raw_rows_limit, 50);
        assert_eq!(config.analysis.max_peak_days, 365);
        assert_eq!(config.analysis.finished_state, "completed");
        assert!(!config.output.json_pretty);
        assert_eq!(config.paths.data_directory, PathBuf::from("/tmp/steam-stats-data"));

        // Cleanup
        env::remove_var("STEAM_STATS_RAW_ROWS");
        env::remove_var("STEAM_STATS_MAX_PEAK_DAYS");
        env::remove_var("STEAM_STATS_FINISHED_STATE");
        env::remove_var("STEAM_STATS_JSON_PRETTY");
        env::remove_var("STEAM_STATS_DATA_DIR");

        // Same test to avoid racing on the process environment
        env::set_var("STEAM_STATS_TOP_USERS", "many");
        let mut config = Config::default();
        assert!(config.apply_env_overrides().is_err());
        env::remove_var("STEAM_STATS_TOP_USERS");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Test valid config
        assert!(config.validate().is_ok());

        // Test invalid top users limit
        config.analysis.top_users_limit = 0;
        assert!(config.validate().is_err());

        // Reset and test empty finished state
        config = Config::default();
        config.analysis.finished_state = "  ".to_string();
        assert!(config.validate().is_err());

        // Reset and test zero peak day limit
        config = Config::default();
        config.analysis.max_peak_days = 0;
        assert!(config.validate().is_err());

        // Reset and test unknown log format
        config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_logging_creates_log_directory() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.logging.output = "file".to_string();
        config.paths.log_directory = temp_dir.path().join("logs");

        config.validate().expect("Config should be valid");
        assert!(config.paths.log_directory.is_dir());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test-config.toml");

        let test_config = r#"
[logging]
level = "DEBUG"
format = "json"
output = "console"

[analysis]
finished_state = "done"
top_users_limit = 5
raw_rows_limit = 200
max_peak_days = 730

[output]
json_pretty = false
color = false
timestamp_format = "%Y/%m/%d %H:%M"

[paths]
data_directory = "/custom/data"
log_directory = "/custom/logs"
        "#;

        fs::write(&config_path, test_config).expect("Failed to write test config");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");

        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.analysis.finished_state, "done");
        assert_eq!(config.analysis.top_users_limit, 5);
        assert_eq!(config.analysis.max_peak_days, 730);
        assert!(!config.output.color);
        assert_eq!(config.output.timestamp_format, "%Y/%m/%d %H:%M");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_config_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[analysis\ntop_users_limit = ").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_config_save_and_reload() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("saved.toml");

        let mut config = Config::default();
        config.analysis.top_users_limit = 25;
        config.save_to_file(&config_path).expect("Failed to save config");

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[logging]"));
        assert!(content.contains("[analysis]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[paths]"));

        let reloaded = Config::load_from_file(&config_path).expect("Failed to reload config");
        assert_eq!(reloaded.analysis.top_users_limit, 25);
        assert_eq!(reloaded.output.timestamp_format, config.output.timestamp_format);
    }
}
