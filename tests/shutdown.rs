// Shutdown tears the registry down in a fixed order, so everything here
// runs in one test body.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::CounterSink;
use sinklog::sinks::Sink;
use sinklog::{Logger, OverflowPolicy};

#[test]
fn shutdown_stops_workers_and_drops_loggers() {
    sinklog::init_worker_pool(64, 1).unwrap();

    let sink = Arc::new(CounterSink::new());
    let logger = sinklog::create_async(
        "shutdown-async",
        [Arc::clone(&sink) as Arc<dyn Sink>],
        OverflowPolicy::Block,
    )
    .unwrap();

    sinklog::flush_every(Duration::from_millis(50));

    logger.info("before shutdown");
    sinklog::shutdown();

    // Drain happened during pool teardown.
    assert_eq!(sink.payloads(), vec!["before shutdown"]);
    assert!(sinklog::get("shutdown-async").is_none());
    assert!(sinklog::default_logger().is_none());

    // Logging after shutdown finds no pool; the error handler hears of it
    // and the sink stays quiet.
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
    let seen_by_handler = Arc::clone(&seen);
    logger.set_error_handler(Some(Arc::new(move |msg: &str| {
        seen_by_handler.lock().push(msg.to_string());
    })));
    logger.info("after shutdown");
    assert_eq!(sink.log_count(), 1);
    assert_eq!(seen.lock().len(), 1);

    // Idempotent.
    sinklog::shutdown();

    // The registry keeps working after a shutdown.
    let sink = Arc::new(CounterSink::new());
    let revived = Logger::new("shutdown-revived", [Arc::clone(&sink) as Arc<dyn Sink>]);
    sinklog::register_logger(Arc::clone(&revived)).unwrap();
    revived.info("back again");
    assert_eq!(sink.payloads(), vec!["back again"]);
}
