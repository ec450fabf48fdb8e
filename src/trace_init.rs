//! Opt-in JSON-lines tracing. Without the `trace` feature every call is a
//! no-op and the guard is empty.

use std::io;
use std::path::Path;

pub const TRACE_FILE: &str = "lexis-trace.jsonl";

pub const DEFAULT_FILTER: &str = "lexis_engine=debug,lexis_core=debug,lexis_session=debug";

/// Flushes buffered trace lines when dropped. Hold it until the process
/// is done; lines still queued when it is forgotten are lost.
#[must_use = "dropping the guard stops trace output"]
pub struct TraceGuard {
    #[cfg(feature = "trace")]
    _worker: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Filter directives in effect: `filter` if given, else `RUST_LOG`, else
/// debug for the lexis crates.
pub fn filter_directives(filter: Option<&str>) -> String {
    filter
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a JSON-lines subscriber appending to `log_dir/lexis-trace.jsonl`,
/// creating `log_dir` if needed. If a global subscriber is already set it
/// stays in place and the returned guard is empty.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path, filter: Option<&str>) -> io::Result<TraceGuard> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_new(filter_directives(filter))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, TRACE_FILE);
    let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);

    let installed = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .with_env_filter(env_filter)
        .try_init();
    Ok(TraceGuard {
        _worker: installed.is_ok().then_some(worker),
    })
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path, _filter: Option<&str>) -> io::Result<TraceGuard> {
    Ok(TraceGuard {})
}
