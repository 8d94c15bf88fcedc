// tests/engine_config.rs
use content_trending::config::engine::{ENV_CONFIG_PATH, ENV_DECAY_K, ENV_INTERVAL_SECS};
use content_trending::EngineConfig;
use std::{env, fs};

fn clear_env() {
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_DECAY_K);
    env::remove_var(ENV_INTERVAL_SECS);
}

#[test]
fn load_from_explicit_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("trending.toml");
    fs::write(
        &p_toml,
        r#"
decay_k = 0.1
keywords_per_item = 3
snapshot_path = "state/hotwords.json"
"#,
    )
    .unwrap();
    let t = EngineConfig::load_from_file(&p_toml).unwrap();
    assert_eq!(t.decay_k, 0.1);
    assert_eq!(t.keywords_per_item, 3);
    assert_eq!(t.interval_secs, 300);

    let p_json = dir.path().join("trending.json");
    fs::write(&p_json, r#"{"interval_secs": 30, "metrics_enabled": false}"#).unwrap();
    let j = EngineConfig::load_from_file(&p_json).unwrap();
    assert_eq!(j.interval_secs, 30);
    assert!(!j.metrics_enabled);

    assert!(EngineConfig::load_from_file(dir.path().join("missing.toml")).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks_then_overrides() {
    // isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) nothing -> defaults
    let d = EngineConfig::load_default().unwrap();
    assert_eq!(d.decay_k, 0.05);
    assert_eq!(d.default_limit, 10);

    // 2) fallback TOML in ./config/
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/trending.toml"), "interval_secs = 42").unwrap();
    assert_eq!(EngineConfig::load_default().unwrap().interval_secs, 42);

    // 3) env path wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"interval_secs": 7}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(EngineConfig::load_default().unwrap().interval_secs, 7);

    // 4) value overrides; invalid ones are sanitized
    env::set_var(ENV_DECAY_K, "0.2");
    env::set_var(ENV_INTERVAL_SECS, "0");
    let o = EngineConfig::load_default().unwrap();
    assert_eq!(o.decay_k, 0.2);
    assert_eq!(o.interval_secs, 300);

    // 5) env path to nowhere is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
    assert!(EngineConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
