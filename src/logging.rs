use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COACHSCORE_LOG";

/// Logs go to stderr so `--json` output on stdout stays machine readable.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "coachscore=debug"
    } else {
        "coachscore=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
