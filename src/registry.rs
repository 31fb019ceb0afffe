//! Process-wide table of named loggers and global defaults.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{Error, ErrorHandler, Result};
use crate::formatter::{Formatter, PatternFormatter};
use crate::level::Level;
use crate::logger::Logger;
use crate::periodic::PeriodicWorker;
use crate::sinks::ConsoleColorSink;
use crate::thread_pool::ThreadPool;

pub(crate) const DEFAULT_LOGGER_NAME: &str = "default";

struct RegistryInner {
    loggers: HashMap<String, Arc<Logger>>,
    level_overrides: HashMap<String, Level>,
    global_level: Level,
    global_flush_level: Level,
    formatter: Box<dyn Formatter>,
    err_handler: Option<ErrorHandler>,
    automatic_registration: bool,
}

/// Process singleton owning named loggers, the default logger, global
/// settings, the periodic flusher, and the async worker pool.
///
/// Lock order is strict: the logger map mutex may be held while taking sink
/// locks, never the other way around. The flusher and pool each sit behind
/// their own mutex; the pool mutex is never held while taking the map mutex.
pub struct Registry {
    inner: Mutex<RegistryInner>,
    default_logger: ArcSwapOption<Logger>,
    flusher: Mutex<Option<PeriodicWorker>>,
    pool: Mutex<Option<Arc<ThreadPool>>>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::with_default_logger);

impl Registry {
    /// The global registry, created on first use.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    fn with_default_logger() -> Registry {
        let registry = Registry {
            inner: Mutex::new(RegistryInner {
                loggers: HashMap::new(),
                level_overrides: HashMap::new(),
                global_level: Level::Info,
                global_flush_level: Level::Fatal,
                formatter: Box::new(PatternFormatter::default()),
                err_handler: None,
                automatic_registration: true,
            }),
            default_logger: ArcSwapOption::from(None),
            flusher: Mutex::new(None),
            pool: Mutex::new(None),
        };

        let default = Logger::new(
            DEFAULT_LOGGER_NAME,
            [Arc::new(ConsoleColorSink::stdout()) as Arc<dyn crate::sinks::Sink>],
        );
        {
            let mut inner = registry.inner.lock();
            inner
                .loggers
                .insert(DEFAULT_LOGGER_NAME.to_string(), Arc::clone(&default));
        }
        registry.default_logger.store(Some(default));
        registry
    }

    /// Registers an already-configured logger under its name.
    pub fn register_logger(&self, logger: Arc<Logger>) -> Result<()> {
        let mut inner = self.inner.lock();
        register_locked(&mut inner, logger)
    }

    /// Applies the global formatter, level (per-name override or global),
    /// flush level, and error handler to `logger`, then registers it unless
    /// automatic registration is off.
    pub fn initialize_logger(&self, logger: &Arc<Logger>) -> Result<()> {
        let mut inner = self.inner.lock();
        logger.set_formatter(inner.formatter.clone_box());
        if let Some(handler) = &inner.err_handler {
            logger.set_error_handler(Some(handler.clone()));
        }
        let level = inner
            .level_overrides
            .get(logger.name())
            .copied()
            .unwrap_or(inner.global_level);
        logger.set_level(level);
        logger.set_flush_level(inner.global_flush_level);

        if inner.automatic_registration {
            register_locked(&mut inner, Arc::clone(logger))?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.inner.lock().loggers.get(name).cloned()
    }

    /// Default-logger handle used by the free functions; lock-free.
    pub fn default_logger(&self) -> Option<Arc<Logger>> {
        self.default_logger.load_full()
    }

    /// Replaces the default logger. The previous default stays registered
    /// under its name; the new one is not auto-registered.
    pub fn set_default_logger(&self, logger: Option<Arc<Logger>>) {
        self.default_logger.store(logger);
    }

    /// Sets the level on every registered logger and makes it the global
    /// default for future loggers.
    pub fn set_level(&self, level: Level) {
        let mut inner = self.inner.lock();
        for logger in inner.loggers.values() {
            logger.set_level(level);
        }
        inner.global_level = level;
    }

    /// Installs per-name level overrides, optionally replacing the global
    /// level for loggers without an override.
    pub fn set_levels(&self, overrides: HashMap<String, Level>, global: Option<Level>) {
        let mut inner = self.inner.lock();
        inner.level_overrides = overrides;
        if let Some(level) = global {
            inner.global_level = level;
        }
        for (name, logger) in &inner.loggers {
            match inner.level_overrides.get(name) {
                Some(level) => logger.set_level(*level),
                None => {
                    if let Some(level) = global {
                        logger.set_level(level);
                    }
                }
            }
        }
    }

    /// Makes `formatter` the prototype for future loggers and installs a
    /// clone on every registered one.
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        let mut inner = self.inner.lock();
        for logger in inner.loggers.values() {
            logger.set_formatter(formatter.clone_box());
        }
        inner.formatter = formatter;
    }

    /// Compiles `pattern` and applies it as the global formatter.
    pub fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    pub fn set_flush_level(&self, level: Level) {
        let mut inner = self.inner.lock();
        for logger in inner.loggers.values() {
            logger.set_flush_level(level);
        }
        inner.global_flush_level = level;
    }

    pub fn flush_all(&self) {
        let inner = self.inner.lock();
        for logger in inner.loggers.values() {
            logger.flush();
        }
    }

    /// Starts (or restarts) a thread flushing all loggers every `interval`.
    pub fn flush_every(&self, interval: Duration) {
        let mut flusher = self.flusher.lock();
        *flusher = Some(PeriodicWorker::new(
            || Registry::global().flush_all(),
            interval,
        ));
    }

    /// Installs `handler` on every registered logger and on loggers
    /// initialized later.
    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        let mut inner = self.inner.lock();
        for logger in inner.loggers.values() {
            logger.set_error_handler(handler.clone());
        }
        inner.err_handler = handler;
    }

    pub fn set_automatic_registration(&self, automatic: bool) {
        self.inner.lock().automatic_registration = automatic;
    }

    /// Runs `f` on every registered logger. The map lock is held for the
    /// duration; `f` must not call back into the registry.
    pub fn apply_all(&self, f: impl Fn(&Arc<Logger>)) {
        let inner = self.inner.lock();
        for logger in inner.loggers.values() {
            f(logger);
        }
    }

    /// Removes the named logger; clears the default handle if it pointed at
    /// the removed logger.
    pub fn drop_logger(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.loggers.remove(name);
        if let Some(default) = self.default_logger.load_full() {
            if default.name() == name {
                self.default_logger.store(None);
            }
        }
    }

    pub fn drop_all(&self) {
        let mut inner = self.inner.lock();
        inner.loggers.clear();
        self.default_logger.store(None);
    }

    pub fn set_pool(&self, pool: Option<Arc<ThreadPool>>) {
        *self.pool.lock() = pool;
    }

    pub fn pool(&self) -> Option<Arc<ThreadPool>> {
        self.pool.lock().clone()
    }

    /// Returns the worker pool, creating the default one
    /// (8192-slot queue, one worker) on first use.
    pub(crate) fn pool_or_default(&self) -> Result<Arc<ThreadPool>> {
        let mut pool = self.pool.lock();
        if let Some(pool) = pool.as_ref() {
            return Ok(Arc::clone(pool));
        }
        let created = ThreadPool::new(crate::thread_pool::DEFAULT_QUEUE_SIZE, 1)?;
        *pool = Some(Arc::clone(&created));
        Ok(created)
    }

    /// Stops the periodic flusher, drops all loggers, then releases the
    /// worker pool — in that order, so no producer remains when the pool is
    /// torn down. Safe to call more than once.
    pub fn shutdown(&self) {
        *self.flusher.lock() = None;
        self.drop_all();
        *self.pool.lock() = None;
    }
}

fn register_locked(inner: &mut RegistryInner, logger: Arc<Logger>) -> Result<()> {
    let name = logger.name().to_string();
    if inner.loggers.contains_key(&name) {
        return Err(Error::LoggerExists(name));
    }
    inner.loggers.insert(name, logger);
    Ok(())
}
