use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // OASGUARD_LOG_JSON=1 switches to JSON lines for log shippers.
    if std::env::var("OASGUARD_LOG_JSON").map_or(false, |v| v == "1") {
        builder.json().init();
    } else {
        builder.init();
    }

    oasguard::cli::run_cli()
}
