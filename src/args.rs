use clap::Parser;
use image_harvest::query::{
    DEFAULT_COUNT, FileFormat, ImageColor, ImageSize, ImageType, Region, TimeWindow,
};
use image_harvest::{HarvestConfig, HarvestRequest, Result, SearchFilters};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(about = "Search an image index in a browser and download the results")]
#[command(version)]
pub struct Args {
    /// Search query (multiple words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// How many images to collect and download
    #[arg(short, long, default_value_t = DEFAULT_COUNT as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub count: u64,

    /// Filter results by image size
    #[arg(long, value_enum)]
    pub size: Option<ImageSize>,

    /// Filter results by color
    #[arg(long, value_enum)]
    pub color: Option<ImageColor>,

    /// Filter results by recency
    #[arg(long, value_enum)]
    pub time: Option<TimeWindow>,

    /// Filter results by content type
    #[arg(long = "type", value_enum)]
    pub image_type: Option<ImageType>,

    /// Filter results by region (two-letter country code, e.g. GB)
    #[arg(long, value_parser = parse_region)]
    pub region: Option<Region>,

    /// Filter results by file format
    #[arg(long, value_enum)]
    pub format: Option<FileFormat>,

    /// File name prefix for saved images (default: derived from the query)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Directory to save images into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Delay between downloads in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Print the located URLs instead of downloading them
    #[arg(long)]
    pub list: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_region(s: &str) -> std::result::Result<Region, String> {
    s.parse::<Region>().map_err(|e| e.to_string())
}

impl Args {
    /// Build the request from the query and filter flags
    pub fn request(&self) -> Result<HarvestRequest> {
        let filters = SearchFilters {
            size: self.size,
            color: self.color,
            time: self.time,
            image_type: self.image_type,
            region: self.region.clone(),
            format: self.format,
        };

        let mut request = HarvestRequest::from_tokens(&self.query)?
            .with_count(self.count as usize)?
            .with_filters(filters);
        if let Some(label) = &self.label {
            request = request.with_label(label);
        }
        Ok(request)
    }

    /// Resolve configuration: file, then environment, then flags
    pub fn config(&self) -> Result<HarvestConfig> {
        let config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        let mut config = config.with_env_overrides();

        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(throttle_ms) = self.throttle_ms {
            config.throttle_ms = throttle_ms;
        }
        Ok(config)
    }
}
