mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{CounterSink, count_lines};
use sinklog::sinks::Sink;
use sinklog::{Level, Logger};
use tempfile::TempDir;

#[test]
fn factories_register_loggers_by_name() {
    let dir = TempDir::new().unwrap();
    let logger = sinklog::basic_logger("reg-basic", dir.path().join("a.log")).unwrap();
    assert_eq!(logger.name(), "reg-basic");

    let found = sinklog::get("reg-basic").unwrap();
    assert!(Arc::ptr_eq(&logger, &found));

    sinklog::drop_logger("reg-basic");
    assert!(sinklog::get("reg-basic").is_none());
}

#[test]
fn duplicate_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    sinklog::basic_logger("reg-dup", dir.path().join("a.log")).unwrap();
    let second = sinklog::basic_logger("reg-dup", dir.path().join("b.log"));
    assert!(matches!(second, Err(sinklog::Error::LoggerExists(_))));
    sinklog::drop_logger("reg-dup");
}

#[test]
fn initialize_applies_global_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("init.log");
    let logger = sinklog::basic_logger("reg-init", &path).unwrap();

    // Factory-created loggers start from the registry's global level.
    assert_eq!(logger.level(), Level::Info);

    logger.set_pattern("%v");
    logger.info("one");
    logger.debug("filtered");
    logger.flush();
    assert_eq!(count_lines(&path), 1);
    sinklog::drop_logger("reg-init");
}

// Per-name overrides via set_levels and via the config file share the
// registry's override map, so both are exercised here back to back.
#[test]
fn per_name_level_overrides() {
    let mut overrides = HashMap::new();
    overrides.insert("reg-override".to_string(), Level::Error);
    sinklog::set_levels(overrides, None);

    let sink = Arc::new(CounterSink::new());
    let logger = Logger::new("reg-override", [Arc::clone(&sink) as Arc<dyn Sink>]);
    sinklog::initialize_logger(&logger).unwrap();

    assert_eq!(logger.level(), Level::Error);
    logger.warning("dropped");
    logger.error("kept");
    assert_eq!(sink.payloads(), vec!["kept"]);
    sinklog::drop_logger("reg-override");

    let config = sinklog::config::Config::from_toml(
        r#"
        [levels]
        reg-config = "warn"
        "#,
    )
    .unwrap();
    config.apply().unwrap();

    let sink = Arc::new(CounterSink::new());
    let logger = Logger::new("reg-config", [Arc::clone(&sink) as Arc<dyn Sink>]);
    sinklog::initialize_logger(&logger).unwrap();

    assert_eq!(logger.level(), Level::Warning);
    logger.info("dropped");
    logger.warning("kept");
    assert_eq!(sink.payloads(), vec!["kept"]);

    sinklog::drop_logger("reg-config");
    sinklog::set_levels(HashMap::new(), None);
}

#[test]
fn apply_all_visits_registered_loggers() {
    let dir = TempDir::new().unwrap();
    sinklog::basic_logger("reg-visit-a", dir.path().join("a.log")).unwrap();
    sinklog::basic_logger("reg-visit-b", dir.path().join("b.log")).unwrap();

    let seen = parking_lot::Mutex::new(Vec::new());
    sinklog::apply_all(|logger| {
        if logger.name().starts_with("reg-visit-") {
            seen.lock().push(logger.name().to_string());
        }
    });
    let mut seen = seen.into_inner();
    seen.sort();
    assert_eq!(seen, vec!["reg-visit-a", "reg-visit-b"]);

    sinklog::drop_logger("reg-visit-a");
    sinklog::drop_logger("reg-visit-b");
}

#[test]
fn default_logger_is_replaceable() {
    let sink = Arc::new(CounterSink::new());
    let replacement = Logger::new("reg-default", [Arc::clone(&sink) as Arc<dyn Sink>]);
    replacement.set_level(Level::Trace);

    let previous = sinklog::default_logger();
    sinklog::set_default_logger(Arc::clone(&replacement));
    sinklog::info!("through the default");
    if let Some(previous) = previous {
        sinklog::set_default_logger(previous);
    }

    assert_eq!(sink.payloads(), vec!["through the default"]);
}
