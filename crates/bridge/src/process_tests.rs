use super::*;
use serde_json::{json, Value};

#[cfg(unix)]
#[test]
fn test_echo_roundtrip() {
    // `cat` echoes each request line back as its reply
    let mut process = JsonLineProcess::new(ProcessConfig::new("cat", &[]));
    assert!(!process.is_running());

    let reply: Value = process.request(&json!({"op": "ping", "n": 1})).unwrap();
    assert_eq!(reply, json!({"op": "ping", "n": 1}));
    assert!(process.is_running());

    let reply: Value = process.request(&json!({"n": 2})).unwrap();
    assert_eq!(reply["n"], 2);
}

#[cfg(unix)]
#[test]
fn test_timeout_kills_and_respawns() {
    let config = ProcessConfig::new("sleep", &["5"]).with_timeout_ms(50);
    let mut process = JsonLineProcess::new(config);

    let err = process.request::<_, Value>(&json!({})).unwrap_err();
    assert!(matches!(err, BridgeError::Timeout(50)));
    assert!(!process.is_running());

    let err = process.request::<_, Value>(&json!({})).unwrap_err();
    assert!(matches!(err, BridgeError::Timeout(50)));
}

#[cfg(unix)]
#[test]
fn test_helper_exit_is_closed() {
    let mut process = JsonLineProcess::new(ProcessConfig::new("true", &[]));
    let err = process.request::<_, Value>(&json!({})).unwrap_err();
    assert!(matches!(err, BridgeError::Closed | BridgeError::Io(_)));
    assert!(!process.is_running());
}

#[cfg(unix)]
#[test]
fn test_non_json_reply() {
    let config = ProcessConfig::new("sh", &["-c", "while read l; do echo nope; done"]);
    let mut process = JsonLineProcess::new(config);
    let err = process.request::<_, Value>(&json!({})).unwrap_err();
    assert!(matches!(err, BridgeError::Json(_)));
}

#[test]
fn test_missing_executable() {
    let mut process = JsonLineProcess::new(ProcessConfig::new("/nonexistent/helper-binary", &[]));
    let err = process.start().unwrap_err();
    assert!(matches!(err, BridgeError::Spawn { .. }));
    assert!(err.to_string().contains("/nonexistent/helper-binary"));
}

#[test]
fn test_process_config_from_json() {
    let config: ProcessConfig =
        serde_json::from_value(json!({"command": "python3", "args": ["rules.py"]})).unwrap();
    assert_eq!(config, ProcessConfig::new("python3", &["rules.py"]));
    assert_eq!(config.timeout_ms, None);
}
