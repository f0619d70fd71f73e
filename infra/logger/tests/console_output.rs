use stratus_logger::{LevelFilter, Logger, LoggerError};

// Each file in tests/ runs as its own process, so this is the only global init here.
#[test]
fn console_logger_installs_once() {
    let logger = Logger::builder()
        .name("stratus-console")
        .level(LevelFilter::DEBUG)
        .env_filter("stratus=debug")
        .init()
        .expect("first init should succeed");

    assert!(logger.guard().is_none());
    tracing::debug!(target: "stratus", "console logger ready");

    let err = Logger::builder()
        .name("stratus-console-again")
        .init()
        .expect_err("a second global subscriber must be rejected");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err}");
}
