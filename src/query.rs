use crate::error::{HarvestError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Number of images harvested when no count is given
pub const DEFAULT_COUNT: usize = 80;

/// Image size filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSize {
    Large,
    Medium,
    Icon,
    #[value(name = "2mp")]
    #[serde(rename = "2mp")]
    LargerThan2Mp,
    #[value(name = "8mp")]
    #[serde(rename = "8mp")]
    LargerThan8Mp,
    #[value(name = "40mp")]
    #[serde(rename = "40mp")]
    LargerThan40Mp,
    #[value(name = "70mp")]
    #[serde(rename = "70mp")]
    LargerThan70Mp,
}

impl ImageSize {
    fn tbs(self) -> &'static str {
        match self {
            ImageSize::Large => "isz:l",
            ImageSize::Medium => "isz:m",
            ImageSize::Icon => "isz:i",
            ImageSize::LargerThan2Mp => "isz:lt,islt:2mp",
            ImageSize::LargerThan8Mp => "isz:lt,islt:8mp",
            ImageSize::LargerThan40Mp => "isz:lt,islt:40mp",
            ImageSize::LargerThan70Mp => "isz:lt,islt:70mp",
        }
    }
}

/// Dominant color filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageColor {
    BlackAndWhite,
    Red,
    Orange,
    Yellow,
    Green,
    Purple,
    Pink,
    Grey,
    White,
    Black,
}

impl ImageColor {
    fn tbs(self) -> String {
        let color = match self {
            ImageColor::BlackAndWhite => return "ic:gray".to_string(),
            ImageColor::Red => "red",
            ImageColor::Orange => "orange",
            ImageColor::Yellow => "yellow",
            ImageColor::Green => "green",
            ImageColor::Purple => "purple",
            ImageColor::Pink => "pink",
            ImageColor::Grey => "gray",
            ImageColor::White => "white",
            ImageColor::Black => "black",
        };
        format!("ic:specific,isc:{}", color)
    }
}

/// Recency window filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    Year,
}

impl TimeWindow {
    fn tbs(self) -> &'static str {
        match self {
            TimeWindow::Day => "qdr:d",
            TimeWindow::Week => "qdr:w",
            TimeWindow::Month => "qdr:m",
            TimeWindow::Year => "qdr:y",
        }
    }
}

/// Content type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageType {
    Face,
    Photo,
    ClipArt,
    LineDrawing,
    Animated,
}

impl ImageType {
    fn tbs(self) -> &'static str {
        match self {
            ImageType::Face => "itp:face",
            ImageType::Photo => "itp:photo",
            ImageType::ClipArt => "itp:clipart",
            ImageType::LineDrawing => "itp:lineart",
            ImageType::Animated => "itp:animated",
        }
    }
}

/// File format filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileFormat {
    Jpg,
    Png,
    Gif,
    Bmp,
    Svg,
    Ico,
}

impl FileFormat {
    fn tbs(self) -> &'static str {
        match self {
            FileFormat::Jpg => "ift:jpg",
            FileFormat::Png => "ift:png",
            FileFormat::Gif => "ift:gif",
            FileFormat::Bmp => "ift:bmp",
            FileFormat::Svg => "ift:svg",
            FileFormat::Ico => "ift:ico",
        }
    }
}

/// Region restriction, stored as an upper-case ISO 3166 two-letter code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl FromStr for Region {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(HarvestError::Usage(format!(
                "region must be a two-letter country code, got `{}`",
                s
            )));
        }
        Ok(Region(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Region {
    type Error = HarvestError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional search filters. Unset filters never reach the target address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ImageColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeWindow>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<ImageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FileFormat>,
}

impl SearchFilters {
    /// Comma-joined `tbs` value, or `None` when no tbs-encoded filter is set
    fn tbs(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(size) = self.size {
            parts.push(size.tbs().to_string());
        }
        if let Some(color) = self.color {
            parts.push(color.tbs());
        }
        if let Some(time) = self.time {
            parts.push(time.tbs().to_string());
        }
        if let Some(image_type) = self.image_type {
            parts.push(image_type.tbs().to_string());
        }
        if let Some(format) = self.format {
            parts.push(format.tbs().to_string());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }
}

/// One invocation's worth of input: what to search for and how many results to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestRequest {
    query: String,
    count: usize,
    label: Option<String>,
    filters: SearchFilters,
}

impl HarvestRequest {
    /// Create a request for `query` with the default count and no filters
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(HarvestError::Usage("a search query is required".to_string()));
        }
        Ok(Self {
            query,
            count: DEFAULT_COUNT,
            label: None,
            filters: SearchFilters::default(),
        })
    }

    /// Create a request from a pre-split token sequence, joined with single spaces
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(joined)
    }

    /// Set the target count; zero is rejected
    pub fn with_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(HarvestError::Usage("count must be at least 1".to_string()));
        }
        self.count = count;
        Ok(self)
    }

    /// Use an explicit filename label instead of deriving one from the query
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = if label.trim().is_empty() {
            None
        } else {
            Some(label)
        };
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Filename label: the explicit one if given, otherwise derived from the query
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => derive_label(&self.query),
        }
    }

    /// Build the image-search address for this request against `search_url`
    pub fn target_url(&self, search_url: &str) -> Result<Url> {
        let mut params: Vec<(&str, String)> = vec![
            ("tbm", "isch".to_string()),
            ("q", self.query.clone()),
        ];
        if let Some(tbs) = self.filters.tbs() {
            params.push(("tbs", tbs));
        }
        if let Some(region) = &self.filters.region {
            params.push(("cr", format!("country{}", region.code())));
        }

        Url::parse_with_params(search_url, &params).map_err(|e| {
            HarvestError::Config(format!("invalid search url `{}`: {}", search_url, e))
        })
    }
}

/// Collapse free text into a PascalCase identifier usable as a filename prefix.
///
/// Words are split on anything that is not alphanumeric. All-caps words are
/// lowered before capitalizing; mixed-case words keep their inner casing.
pub fn derive_label(query: &str) -> String {
    let mut label = String::new();
    for word in query.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let shout = !word.chars().any(char::is_lowercase);
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
        }
        for c in chars {
            if shout {
                label.extend(c.to_lowercase());
            } else {
                label.push(c);
            }
        }
    }

    if label.is_empty() {
        "Harvest".to_string()
    } else {
        label
    }
}
