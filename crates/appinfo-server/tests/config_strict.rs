#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use appinfo_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  application: "appinfo"
  prob: { enabled: false } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.server_info, None);
    assert_eq!(cfg.metrics.application, "appinfo");
    assert!(cfg.metrics.probe.enabled);
    assert_eq!(cfg.metrics.probe.program, "openssl");
    assert_eq!(cfg.metrics.probe.args, vec!["version", "-a"]);
    assert_eq!(cfg.metrics.probe.timeout_ms, 5000);
}

#[test]
fn unsupported_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn probe_timeout_out_of_range_rejected() {
    let bad = r#"
version: 1
metrics:
  probe:
    timeout_ms: 10
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn empty_application_rejected() {
    let bad = r#"
version: 1
metrics:
  application: "  "
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn invalid_listen_rejected() {
    let bad = r#"
version: 1
server:
  listen: "not-an-addr"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn missing_file_is_internal() {
    let err = config::load_from_file("/nonexistent/appinfo.yaml").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}

#[test]
fn explicit_path_wins() {
    assert_eq!(config::resolve_path(Some("custom.yaml".into())), "custom.yaml");
}
