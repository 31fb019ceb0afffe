//! Logging macros: format arguments, capture the source location, and gate
//! on the compile-time level before touching the runtime.

/// Logs at an explicit level, through the default logger or a given one:
///
/// ```
/// use sinklog::{Level, log};
/// log!(Level::Info, "hello {}", "world");
/// ```
///
/// Calls whose level is below [`STATIC_LEVEL`](crate::STATIC_LEVEL) compile
/// to nothing.
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {{
        if ($level as u8) >= ($crate::STATIC_LEVEL as u8) {
            $logger.log_args(
                Some($crate::SourceLocation::new(file!(), line!(), module_path!())),
                $level,
                format_args!($($arg)+),
            );
        }
    }};
    ($level:expr, $($arg:tt)+) => {{
        if ($level as u8) >= ($crate::STATIC_LEVEL as u8) {
            if let Some(logger) = $crate::default_logger() {
                logger.log_args(
                    Some($crate::SourceLocation::new(file!(), line!(), module_path!())),
                    $level,
                    format_args!($($arg)+),
                );
            }
        }
    }};
}

#[macro_export]
macro_rules! trace {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Trace, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Fatal, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Fatal, $($arg)+)
    };
}
