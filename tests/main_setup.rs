use portal_shell::{
    AppConfig,
    config::{self, Env},
    error::ConfigError,
};
use serial_test::serial;
use std::{env, panic, time::Duration};

const VARS: [&str; 4] = [
    "APP_ENV",
    "API_BASE_URL",
    "SHELL_BIND_ADDR",
    "SESSION_CHECK_TIMEOUT_MS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the given variables set (and every other shell variable
/// cleared), restoring the original environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(&[], AppConfig::load).expect("local config loads");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:5000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.session_check_timeout, Duration::from_secs(10));
    assert_eq!(
        config.session_endpoint(),
        "http://localhost:5000/check-session-status"
    );
}

#[test]
#[serial]
fn test_production_requires_api_base_url() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert!(matches!(result, Err(ConfigError::Missing("API_BASE_URL"))));
}

#[test]
#[serial]
fn test_production_with_all_variables() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.example.org/v1/"),
            ("SHELL_BIND_ADDR", "127.0.0.1:8080"),
            ("SESSION_CHECK_TIMEOUT_MS", "2500"),
        ],
        AppConfig::load,
    )
    .expect("production config loads");

    assert_eq!(config.env, Env::Production);
    // Trailing slash is dropped so the endpoint never contains `//`.
    assert_eq!(
        config.session_endpoint(),
        "https://api.example.org/v1/check-session-status"
    );
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.session_check_timeout, Duration::from_millis(2500));
}

#[test]
#[serial]
fn test_rejects_non_http_base_url() {
    let result = run_with_env(&[("API_BASE_URL", "ftp://files.example.org")], AppConfig::load);
    assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));

    let result = run_with_env(&[("API_BASE_URL", "not a url")], AppConfig::load);
    assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
}

#[test]
#[serial]
fn test_rejects_bad_timeout() {
    for value in ["soon", "0", "-5"] {
        let result = run_with_env(&[("SESSION_CHECK_TIMEOUT_MS", value)], AppConfig::load);
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { var: "SESSION_CHECK_TIMEOUT_MS", .. })),
            "{value} should be rejected"
        );
    }
}

#[test]
fn test_global_config_is_init_once() {
    let first = AppConfig {
        api_base_url: "http://first.example".to_string(),
        ..AppConfig::default()
    };
    let installed = config::init(first).expect("first init succeeds");
    assert_eq!(installed.api_base_url, "http://first.example");

    let second = AppConfig {
        api_base_url: "http://second.example".to_string(),
        ..AppConfig::default()
    };
    assert!(matches!(
        config::init(second),
        Err(ConfigError::AlreadyInitialized)
    ));
    assert_eq!(
        config::current().map(|c| c.api_base_url.as_str()),
        Some("http://first.example")
    );
}
