use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::sync::Once;

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use super::settings::LogFormat;

/// Upper bound for a stack trace kept for the recovery middleware.
pub(crate) const MAX_STACK_TRACE_BYTES: usize = 4096;

thread_local! {
    static LAST_PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub(crate) fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(true);
    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

/// Installs a panic hook that records the backtrace of the panicking thread,
/// so the recovery middleware can log where the fault happened.
/// Installing more than once is a no-op.
pub(crate) fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let trace =
                truncate_utf8(&Backtrace::force_capture().to_string(), MAX_STACK_TRACE_BYTES);
            LAST_PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Takes the trace recorded by the panic hook on this thread, if any.
pub(crate) fn take_panic_trace() -> Option<String> {
    LAST_PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

pub(crate) fn truncate_utf8(raw: &str, max_bytes: usize) -> String {
    if raw.len() <= max_bytes {
        return raw.to_string();
    }
    let mut end = max_bytes;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::{MAX_STACK_TRACE_BYTES, install_panic_hook, take_panic_trace, truncate_utf8};

    #[test]
    fn truncate_keeps_short_input() {
        assert_eq!(truncate_utf8("abc", 10), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // "用" is three bytes
        assert_eq!(truncate_utf8("用户名", 4), "用");
        assert_eq!(truncate_utf8("abcdef", 3), "abc");
    }

    #[test]
    fn caught_panic_leaves_a_bounded_trace_on_this_thread() {
        install_panic_hook();
        install_panic_hook();
        assert!(take_panic_trace().is_none());

        let caught = std::panic::catch_unwind(|| panic!("worker failed"));
        assert!(caught.is_err());

        let trace = take_panic_trace().expect("hook records a trace");
        assert!(!trace.is_empty());
        assert!(trace.len() <= MAX_STACK_TRACE_BYTES);
        assert!(take_panic_trace().is_none(), "trace is taken once");
    }
}
