use std::fs;

use stridecoach::config;

// Environment is process-global, so the whole precedence story lives in one
// test function.
#[test]
fn config_defaults_file_values_and_env_overrides() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("STRIDECOACH_HOME", home.path());
    for var in [
        "BOT_TOKEN",
        "SUPABASE_URL",
        "SUPABASE_SERVICE_KEY",
        "DEEPSEEK_API_KEY",
    ] {
        std::env::remove_var(var);
    }

    // No file yet: pure defaults.
    let cfg = config::load_or_default().unwrap();
    assert_eq!(cfg.telegram.poll_timeout_secs, 30);
    assert_eq!(cfg.generator.model, "deepseek-chat");
    assert!(cfg.generator.api_url.contains("deepseek.com"));
    assert!(cfg.telegram.bot_token.is_empty());
    assert!(cfg.require_transport().is_err());

    // File values are picked up; unset sections keep their defaults.
    fs::create_dir_all(config::config_dir().unwrap()).unwrap();
    fs::write(
        config::config_file_path().unwrap(),
        r#"
[telegram]
bot_token = "file-token"
poll_timeout_secs = 7

[storage]
url = "https://example.supabase.co"
service_key = "file-key"

[generator]
model = "deepseek-reasoner"
timeout_secs = 90
"#,
    )
    .unwrap();

    let cfg = config::load_or_default().unwrap();
    assert_eq!(cfg.telegram.bot_token, "file-token");
    assert_eq!(cfg.telegram.poll_timeout_secs, 7);
    assert_eq!(cfg.storage.url, "https://example.supabase.co");
    assert_eq!(cfg.generator.model, "deepseek-reasoner");
    assert_eq!(cfg.generator.timeout_secs, 90);
    assert!(cfg.generator.api_url.contains("deepseek.com"));
    assert!(cfg.require_transport().is_ok());

    // Environment beats the file for the secret-bearing fields.
    std::env::set_var("BOT_TOKEN", "env-token");
    std::env::set_var("SUPABASE_SERVICE_KEY", "env-key");
    let cfg = config::load_or_default().unwrap();
    assert_eq!(cfg.telegram.bot_token, "env-token");
    assert_eq!(cfg.storage.service_key, "env-key");
    // Non-secret file values survive.
    assert_eq!(cfg.telegram.poll_timeout_secs, 7);

    // Empty env values are treated as unset.
    std::env::set_var("BOT_TOKEN", "   ");
    let cfg = config::load_or_default().unwrap();
    assert_eq!(cfg.telegram.bot_token, "file-token");

    // save() writes somewhere load_or_default() finds again.
    let mut cfg = config::AppConfig::default();
    cfg.generator.timeout_secs = 42;
    config::save(&cfg).unwrap();
    std::env::remove_var("BOT_TOKEN");
    std::env::remove_var("SUPABASE_SERVICE_KEY");
    let loaded = config::load_or_default().unwrap();
    assert_eq!(loaded.generator.timeout_secs, 42);

    std::env::remove_var("STRIDECOACH_HOME");
}
