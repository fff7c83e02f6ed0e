use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Signature device service with tamper-evident signing chains")]
struct Args {
    #[clap(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "PORT", default_value = "8080")]
    port: u16,
    #[clap(long, env = "LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sigchain={},info", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    sigchain::run(args.host, args.port).await
}
