use tether_logger::{LevelFilter, Logger};

#[test]
fn console_logger_has_no_file_sink() {
    let logger = Logger::builder("tether-console")
        .ansi(false)
        .level(LevelFilter::WARN)
        .init()
        .expect("console logger should install");

    assert!(logger.directory().is_none());
    tracing::warn!(confidence = 70, "virtual machine indicators found");
}
