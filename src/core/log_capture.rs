/// Test logger that counts warnings emitted on the current thread.

use std::cell::Cell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static WARNINGS: Cell<usize> = const { Cell::new(0) };
}

struct CountingLogger;

impl Log for CountingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|w| w.set(w.get() + 1));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CountingLogger = CountingLogger;
static INSTALL: Once = Once::new();

/// Run `f` and return its result with the number of `warn!`/`error!`
/// records it logged. Tests run on separate threads, so counts never mix.
pub(crate) fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Warn);
        }
    });
    WARNINGS.with(|w| w.set(0));
    let out = f();
    (out, WARNINGS.with(Cell::get))
}
