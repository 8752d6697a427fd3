use tracing_subscriber::EnvFilter;
use ytdlp_info::Config;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration from CLI, environment and/or config file
    let config = Config::load()?;
    ytdlp_info::run(config).await
}
