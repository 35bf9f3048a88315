use clap::Parser;
use image_harvest::{HarvestConfig, HarvestError, HarvestRequest, Harvester};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to harvest configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Search query
    query: String,

    /// Override the number of images
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Only list located URLs
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<(), HarvestError> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration from file
    let config = HarvestConfig::from_file(&args.config)?.with_env_overrides();

    println!("Harvest configuration:");
    println!("  Search URL: {}", config.search_url);
    println!("  Selector: {}", config.selector);
    println!("  Output directory: {}", config.output_dir.display());
    println!("  WebDriver URL: {}", config.browser.webdriver_url);
    println!("  Throttle: {}ms", config.throttle_ms);

    let mut request = HarvestRequest::new(&args.query)?;
    if let Some(count) = args.count {
        println!("Overriding count: {}", count);
        request = request.with_count(count)?;
    }

    let report = Harvester::new(request)
        .with_config(config)
        .with_list_only(args.list)
        .run()
        .await?;

    for locator in &report.locators {
        println!("{}", locator);
    }
    println!(
        "Harvest complete ({:?}): {} located, {} saved, {} failed.",
        report.stop_reason,
        report.locators.len(),
        report.saved(),
        report.failed()
    );

    Ok(())
}
