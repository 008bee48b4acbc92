use tracing_subscriber::{fmt, EnvFilter};

/// Output layout for the stderr subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// Timestamps and targets, for the long-running web server.
    Full,
    /// Level and message only, so log lines stay out of the way of prompts.
    Compact,
}

pub fn init_logging(default_level: &str) {
    init_logging_with(default_level, LogStyle::Full);
}

/// Installs the global subscriber once; `RUST_LOG` overrides `default_level`.
pub fn init_logging_with(default_level: &str, style: LogStyle) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    // try_init: tests race on the global dispatcher
    let _ = match style {
        LogStyle::Full => builder.try_init(),
        LogStyle::Compact => builder.without_time().with_target(false).compact().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_a_no_op() {
        init_logging_with("debug", LogStyle::Compact);
        init_logging("info");
        assert!(tracing::dispatcher::has_been_set());
    }
}
