
use std::ffi::OsStr;
use std::fs;

use serde_json::Value;
use tempfile::tempdir;

use support_cli::run_chanstats;

const EVENTS: &str = r#"{"at": 0, "event": "connection_opened"}
{"at": 0.5, "event": "message_published", "channel": "a"}
{"at": 5, "event": "channel_subscribed", "channel": "a"}
{"at": 6, "event": "multiplexed_ws", "channels": ["a", "b"]}

{"at": 10, "event": "multiplexed_ws_dynamic", "descriptors": [{"prefix": "x"}, {"prefix": "y"}]}
{"at": 11, "event": "connection_closed"}
"#;

fn parse_report(stdout: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(stdout).map_err(|err| format!("invalid report json: {}", err))
}

fn bucket_times(report: &Value) -> Vec<Value> {
    report
        .get("buckets")
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| bucket.get("time").cloned())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn e2e_replay_prints_report() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let events = dir.path().join("events.jsonl");
    fs::write(&events, EVENTS).map_err(|err| format!("write events failed: {}", err))?;

    let output = run_chanstats([
        OsStr::new("--events"),
        events.as_os_str(),
        OsStr::new("--resolution"),
        OsStr::new("5"),
    ])?;
    if !output.status.success() {
        return Err(format!(
            "chanstats failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    let report = parse_report(&output.stdout)?;
    if bucket_times(&report) != [Value::from(0), Value::from(5), Value::from(10)] {
        return Err(format!("Unexpected buckets: {}", report));
    }
    let totals = report
        .get("totals")
        .ok_or_else(|| "Missing totals".to_owned())?;
    if totals.get("active_channels") != Some(&Value::from(2))
        || totals.get("connections") != Some(&Value::from(0))
        || totals.get("subscribed_multiplexed_ws_dynamic") != Some(&Value::from(2))
    {
        return Err(format!("Unexpected totals: {}", totals));
    }
    Ok(())
}

#[test]
fn e2e_replay_applies_retention_and_writes_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let events = dir.path().join("events.jsonl");
    let config = dir.path().join("chanstats.toml");
    let out = dir.path().join("report.json");
    fs::write(&events, EVENTS).map_err(|err| format!("write events failed: {}", err))?;
    fs::write(&config, "resolution_seconds = 5\nkeep_buckets = 2\n")
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_chanstats([
        OsStr::new("--events"),
        events.as_os_str(),
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--output"),
        out.as_os_str(),
        OsStr::new("--pretty"),
    ])?;
    if !output.status.success() {
        return Err(format!(
            "chanstats failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    let written = fs::read(&out).map_err(|err| format!("read report failed: {}", err))?;
    let report = parse_report(&written)?;
    if bucket_times(&report) != [Value::from(5), Value::from(10)] {
        return Err(format!("Expected buckets 5 and 10: {}", report));
    }
    Ok(())
}

#[test]
fn e2e_rejects_sub_second_resolution() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let events = dir.path().join("events.jsonl");
    fs::write(&events, EVENTS).map_err(|err| format!("write events failed: {}", err))?;

    let output = run_chanstats([
        OsStr::new("--events"),
        events.as_os_str(),
        OsStr::new("--resolution"),
        OsStr::new("0.5"),
    ])?;
    if output.status.success() {
        return Err("Expected failure for resolution 0.5".to_owned());
    }
    Ok(())
}
