use std::{env, fs, time::Duration};

use latchkey_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("latchkey.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[logging]
level = "debug"

[session]
subject_header = "x-remote-user"

[maintenance]
cleanup_interval = "1m"

[auth.oauth]
authorization_code_lifetime = "5m"
access_token_lifetime = "15m"
refresh_token_lifetime = "7d"

[auth.signing]
secret = "config-parsing-test-secret-0123456789abcdef"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert_eq!(cfg.session.subject_header, "x-remote-user");
    assert_eq!(cfg.maintenance.cleanup_interval, Duration::from_secs(60));
    assert_eq!(
        cfg.auth.oauth.authorization_code_lifetime,
        Duration::from_secs(300)
    );
    assert_eq!(cfg.auth.oauth.access_token_lifetime, Duration::from_secs(900));
    assert_eq!(
        cfg.auth.oauth.refresh_token_lifetime,
        Duration::from_secs(7 * 24 * 3600)
    );

    // 2) Env override should win over file
    unsafe {
        env::set_var("LATCHKEY__SERVER__PORT", "9191");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9191);
    // cleanup env var
    unsafe {
        env::remove_var("LATCHKEY__SERVER__PORT");
    }

    // 3) Short signing secret should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[auth.signing]
secret = "too-short"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("auth config error"));

    // 4) Zero lifetime should error
    let zero_path = dir.path().join("zero.toml");
    let zero_toml = r#"
[auth.oauth]
access_token_lifetime = "0s"

[auth.signing]
secret = "config-parsing-test-secret-0123456789abcdef"
"#;
    fs::write(&zero_path, zero_toml).expect("write zero toml");
    assert!(load_config(zero_path.to_str()).is_err());
}
