use einvoice_console::config::{AppConfig, ConfigArgs, LogFormat, resolve_config_file};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("EINVOICE_SERVER__PORT");
        env::remove_var("EINVOICE_API__BASE_URL");
        env::remove_var("EINVOICE_API__TOKEN");
        env::remove_var("EINVOICE_FIRS__USE_SANDBOX");
        env::remove_var("CONFIG_FILE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    let config = AppConfig::load_from(&ConfigArgs::default(), dir.path()).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.token, None);
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.firs.use_sandbox);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("EINVOICE_SERVER__PORT", "9090");
        env::set_var("EINVOICE_FIRS__USE_SANDBOX", "false");
    }

    let config = AppConfig::load_from(&ConfigArgs::default(), dir.path())
        .expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert!(!config.firs.use_sandbox);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    let config_content = r#"
api:
  base_url: "https://einvoice.example.test"
  timeout_secs: 5
server:
  port: 7070
logging:
  format: json
    "#;
    let file_path = dir.path().join("console.yaml");
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    let args = ConfigArgs {
        config: Some(file_path.display().to_string()),
        ..Default::default()
    };
    let config = AppConfig::load_from(&args, dir.path()).expect("Failed to load config from file");
    assert_eq!(config.api.base_url, "https://einvoice.example.test");
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.logging.format, LogFormat::Json);
    // Untouched sections keep their defaults
    assert!(config.firs.use_sandbox);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    let args = ConfigArgs {
        config: Some("does-not-exist.yaml".into()),
        ..Default::default()
    };
    assert!(AppConfig::load_from(&args, dir.path()).is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    assert_eq!(resolve_config_file(None, dir.path()), None);

    fs::write(dir.path().join("config.yaml"), "server:\n  port: 6060\n")
        .expect("Failed to write ./config.yaml");
    assert_eq!(
        resolve_config_file(None, dir.path()),
        Some(dir.path().join("config.yaml"))
    );

    let config = AppConfig::load_from(&ConfigArgs::default(), dir.path()).unwrap();
    assert_eq!(config.server.port, 6060);
}

#[test]
#[serial]
fn test_cli_flags_beat_env_and_file() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yaml"),
        "api:\n  base_url: \"http://from-file.test\"\nserver:\n  port: 6060\n",
    )
    .unwrap();
    unsafe {
        env::set_var("EINVOICE_SERVER__PORT", "9090");
    }

    let args = ConfigArgs {
        api_base_url: Some("http://from-flag.test".into()),
        api_token: Some("tok-1".into()),
        port: Some(4040),
        use_sandbox: Some(false),
        ..Default::default()
    };
    let config = AppConfig::load_from(&args, dir.path()).unwrap();
    assert_eq!(config.api.base_url, "http://from-flag.test");
    assert_eq!(config.api.token.as_deref(), Some("tok-1"));
    assert_eq!(config.server.port, 4040);
    assert!(!config.firs.use_sandbox);

    clear_env_vars();
}

#[test]
#[serial]
fn test_blank_token_is_ignored() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    let args = ConfigArgs {
        api_token: Some("  ".into()),
        ..Default::default()
    };
    let config = AppConfig::load_from(&args, dir.path()).unwrap();
    assert_eq!(config.api.token, None);
}
