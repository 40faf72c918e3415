use satchel_logger::{LevelFilter, Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn console_only_has_no_log_dir() {
    // Both tests share one process-wide subscriber slot; only the first install wins.
    let first = Logger::builder("integration-console-only").level(LevelFilter::INFO).console().init();

    if let Ok(logger) = first {
        assert!(logger.log_dir().is_none(), "console-only logger should not report a log directory");
    }
}

#[test]
#[serial]
fn second_init_returns_subscriber_error() {
    let _first = Logger::builder("integration-init-once").console().init();

    let err = Logger::builder("integration-init-twice")
        .console()
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "expected subscriber error, got {err:?}");
}

#[test]
#[serial]
fn blank_name_is_rejected() {
    let err = Logger::builder("  ").console().init().expect_err("blank name should be rejected");

    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
