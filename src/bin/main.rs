use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cinemood")]
#[command(about = "Mood-based movie recommendations in the terminal", long_about = None)]
struct Args {
    /// Config file (default: cinemood.yaml if it exists)
    #[arg(short, long)]
    config: Option<String>,
    /// Recommendation service base URL, overrides CINEMOOD_ENDPOINT and the config file
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Submit a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,
    /// With --prompt, print the movies as JSON instead of cards
    #[arg(long)]
    json: bool,
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "cinemood=debug" } else { "cinemood=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = cinemood::RunOptions {
        config_path: args.config,
        endpoint: args.endpoint,
        prompt: args.prompt,
        json: args.json,
    };

    match cinemood::run(options).await {
        Ok(cinemood::RunOutcome::Shown) => {}
        Ok(cinemood::RunOutcome::Failed) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
