use clap::Parser;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    let start_time = std::time::Instant::now();
    match job_crawl::crawl(&config, args.fresh).await {
        Ok(summary) => {
            ::log::info!(
                "Crawl complete - {} pages, {} new job IDs ({} total) in {:.2} seconds",
                summary.pages_fetched,
                summary.records_added,
                summary.total_records,
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}
