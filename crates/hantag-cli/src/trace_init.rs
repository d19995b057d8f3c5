use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hantag_core=info,hantag_cli=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// With `log_dir`, spans and events go as JSON lines to
/// `<log_dir>/hantag-trace.jsonl`; the returned guard must be held until
/// exit so buffered lines are flushed. Without it, plain text goes to
/// stderr. A second call is a no-op.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, "hantag-trace.jsonl");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = tracing_subscriber::fmt()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_env_filter(env_filter())
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter())
                .try_init();
            None
        }
    }
}
