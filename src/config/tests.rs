use super::{load_config_file, resolve_settings, types::StatsConfigFile};
use crate::args::CliArgs;
use crate::error::{AppError, ConfigError};
use clap::Parser;
use tempfile::tempdir;

fn cli(extra: &[&str]) -> Result<CliArgs, String> {
    let mut args = vec!["chanstats", "--events", "events.jsonl"];
    args.extend_from_slice(extra);
    CliArgs::try_parse_from(args).map_err(|err| format!("parse failed: {}", err))
}

fn write_config(name: &str, content: &str) -> Result<StatsConfigFile, String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join(name);
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    load_config_file(&path).map_err(|err| format!("load failed: {}", err))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let config = write_config(
        "chanstats.toml",
        r#"
resolution_seconds = 1.5
keep_buckets = 4
auto_evict = false
"#,
    )?;
    let settings = config
        .to_settings()
        .map_err(|err| format!("settings failed: {}", err))?;
    if settings.resolution.as_millis() != 1_500 {
        return Err("Unexpected resolution".to_owned());
    }
    if settings.keep_buckets.map(std::num::NonZeroUsize::get) != Some(4) {
        return Err("Unexpected keep_buckets".to_owned());
    }
    if settings.auto_evict {
        return Err("Expected auto_evict false".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config_with_string_resolution() -> Result<(), String> {
    let config = write_config("chanstats.json", r#"{"resolution": "10"}"#)?;
    let settings = config
        .to_settings()
        .map_err(|err| format!("settings failed: {}", err))?;
    if settings.resolution.as_millis() != 10_000 {
        return Err("Unexpected resolution".to_owned());
    }
    if settings.keep_buckets.is_some() || !settings.auto_evict {
        return Err("Expected default retention settings".to_owned());
    }
    Ok(())
}

#[test]
fn config_rejects_invalid_resolution() -> Result<(), String> {
    let cases = [
        ("zero.toml", "resolution_seconds = 0"),
        ("negative.toml", "resolution_seconds = -3"),
        ("fraction.toml", "resolution_seconds = 0.25"),
        ("text.json", r#"{"resolution_seconds": "soon"}"#),
        ("missing.toml", "keep_buckets = 2"),
    ];
    for (name, content) in cases {
        let config = write_config(name, content)?;
        if config.to_settings().is_ok() {
            return Err(format!("Expected {} to be rejected", name));
        }
    }
    Ok(())
}

#[test]
fn config_rejects_zero_keep_buckets() -> Result<(), String> {
    let config = write_config("keep.toml", "resolution_seconds = 1\nkeep_buckets = 0")?;
    match config.to_settings() {
        Err(ConfigError::KeepBucketsZero) => Ok(()),
        other => Err(format!("Expected KeepBucketsZero, got {:?}", other)),
    }
}

#[test]
fn validated_keep_buckets_reads_the_file_value() -> Result<(), String> {
    let limited = write_config("limited.toml", "keep_buckets = 3")?;
    let keep = limited
        .validated_keep_buckets()
        .map_err(|err| format!("validation failed: {}", err))?;
    if keep.map(std::num::NonZeroUsize::get) != Some(3) {
        return Err(format!("Expected Some(3), got {:?}", keep));
    }
    let unset = write_config("unset.toml", "auto_evict = false")?;
    match unset.validated_keep_buckets() {
        Ok(None) => {}
        other => return Err(format!("Expected Ok(None), got {:?}", other)),
    }
    let zero = write_config("zero.json", r#"{"keep_buckets": 0}"#)?;
    match zero.validated_keep_buckets() {
        Err(ConfigError::KeepBucketsZero) => Ok(()),
        other => Err(format!("Expected KeepBucketsZero, got {:?}", other)),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("chanstats.yaml");
    std::fs::write(&path, "resolution_seconds: 1").map_err(|err| format!("{}", err))?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(format!("Expected unsupported extension, got {:?}", other)),
    }
}

#[test]
fn cli_flags_override_file_values() -> Result<(), String> {
    let config = write_config(
        "chanstats.toml",
        "resolution_seconds = 60\nkeep_buckets = 10\nauto_evict = true",
    )?;
    let args = cli(&["-r", "5", "-k", "2", "--no-auto-evict"])?;
    let settings =
        resolve_settings(Some(&config), &args).map_err(|err| format!("resolve failed: {}", err))?;
    if settings.resolution.as_millis() != 5_000 {
        return Err("CLI resolution should win".to_owned());
    }
    if settings.keep_buckets.map(std::num::NonZeroUsize::get) != Some(2) {
        return Err("CLI keep_buckets should win".to_owned());
    }
    if settings.auto_evict {
        return Err("--no-auto-evict should disable eviction".to_owned());
    }
    Ok(())
}

#[test]
fn file_fills_missing_flags() -> Result<(), String> {
    let config = write_config("chanstats.toml", "resolution_seconds = 2\nkeep_buckets = 7")?;
    let settings = resolve_settings(Some(&config), &cli(&[])?)
        .map_err(|err| format!("resolve failed: {}", err))?;
    if settings.resolution.as_millis() != 2_000
        || settings.keep_buckets.map(std::num::NonZeroUsize::get) != Some(7)
        || !settings.auto_evict
    {
        return Err(format!("Unexpected settings {:?}", settings));
    }
    Ok(())
}

#[test]
fn missing_resolution_everywhere_fails() -> Result<(), String> {
    match resolve_settings(None, &cli(&[])?) {
        Err(ConfigError::MissingResolution) => Ok(()),
        other => Err(format!("Expected MissingResolution, got {:?}", other)),
    }
}
