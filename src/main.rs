use clap::Parser;
use image_harvest::{HarvestReport, Harvester, RetrievalOutcome};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments; a missing query exits here with usage help
    let args = Args::parse();

    let (request, config) = match args.request().and_then(|r| Ok((r, args.config()?))) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    ::log::info!("Starting harvest for query: {}", request.query());
    if !args.json {
        println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL if not using {}",
            config.browser.webdriver_url
        );
    }

    let start_time = std::time::Instant::now();
    let harvester = Harvester::new(request)
        .with_config(config)
        .with_list_only(args.list);

    let report = match harvester.run().await {
        Ok(report) => report,
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    ::log::info!(
        "Harvest finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot encode report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report, args.list);
    }

    ExitCode::SUCCESS
}

fn print_report(report: &HarvestReport, list_only: bool) {
    if list_only {
        for locator in &report.locators {
            println!("{}", locator);
        }
        println!("{} locators from {} fragments", report.locators.len(), report.fragments);
        return;
    }

    for outcome in &report.outcomes {
        match outcome {
            RetrievalOutcome::Saved { path, .. } => println!("saved  {}", path.display()),
            RetrievalOutcome::Failed { url, error, .. } => println!("failed {} ({})", url, error),
        }
    }
    println!(
        "{} saved, {} failed, {} located",
        report.saved(),
        report.failed(),
        report.locators.len()
    );
}
