use log::LevelFilter::*;
use std::cell::RefCell;

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Drains the messages logged on this thread since the last call.
pub fn take_log() -> Vec<String> {
    LOG.with(|log| log.replace(Vec::new()))
}

struct BufferedLog;
struct StderrLog;

impl log::Log for BufferedLog {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        LOG.with(|log| {
            log.borrow_mut().push(format!("{}", record.args()));
        });
        #[cfg(test)]
        println!("{}", record.args());
    }

    fn flush(&self) {}
}

impl log::Log for StderrLog {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        #[cfg(not(test))]
        eprintln!("{}", record.args());
    }

    fn flush(&self) {}
}

#[cfg(test)]
static LOGGING_INITIALIZED: std::sync::Mutex<bool> = std::sync::Mutex::new(false);

/// Installs the global logger. Messages go to a per-thread buffer read by `take_log`, warnings and errors are also
/// written to stderr.
pub fn init_logging(verbosity: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    #[cfg(test)]
    {
        let mut lock = LOGGING_INITIALIZED.lock().unwrap();

        if *lock {
            return Ok(());
        }

        *lock = true;
    }

    fern::Dispatch::new()
        .level(verbosity)
        .format(|out, message, record| {
            if record.level() >= Debug {
                let prefix = if record.level() >= Trace { "[TRACE]" } else { "[DEBUG]" };
                out.finish(format_args!("{} {}: {}", prefix, record.target(), message))
            } else if record.level() <= Warn {
                out.finish(format_args!("[{}] {}: {}", record.level(), record.target(), message))
            } else {
                out.finish(format_args!("{}", message))
            }
        })
        .chain(Box::new(BufferedLog) as Box<dyn log::Log>)
        .chain(
            fern::Dispatch::new()
                .level(Warn)
                .chain(Box::new(StderrLog) as Box<dyn log::Log>),
        )
        .apply()
}
