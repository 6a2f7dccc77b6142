use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

fn span_events(filter: &EnvFilter) -> FmtSpan {
    // step durations are reported on span close, only worth it at debug
    match filter.max_level_hint() {
        Some(level) if level >= LevelFilter::DEBUG => FmtSpan::CLOSE,
        _ => FmtSpan::NONE,
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `default_directive`. Later calls are ignored.
pub fn init(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events(&env_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_events_follow_level() {
        assert_eq!(span_events(&EnvFilter::new("debug")), FmtSpan::CLOSE);
        assert_eq!(span_events(&EnvFilter::new("rgbd_synth_rs=trace")), FmtSpan::CLOSE);
        assert_eq!(span_events(&EnvFilter::new("info")), FmtSpan::NONE);
    }

    #[test]
    fn test_init_twice() {
        init(DEFAULT_DIRECTIVE);
        init("debug");
    }
}
