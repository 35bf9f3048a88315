use crate::error::{HarvestError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Quoted absolute https URI with `images` in its host or path
pub const DEFAULT_LOCATOR_PATTERN: &str = r#""(https://[^"\s]*?images[^"\s]*)""#;

static DEFAULT_LOCATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_LOCATOR_PATTERN).expect("built-in locator pattern compiles")
});

/// Compiled locator regex; the first capture group is the locator
#[derive(Debug, Clone)]
pub struct LocatorPattern {
    regex: Regex,
}

impl LocatorPattern {
    /// Compile a custom pattern. It must contain at least one capture group.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(HarvestError::Config(format!(
                "locator pattern `{}` has no capture group",
                pattern
            )));
        }
        Ok(Self { regex })
    }

    /// First capture group of the first match in `fragment`, if any
    pub fn locate(&self, fragment: &str) -> Option<String> {
        self.regex
            .captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace("&amp;", "&"))
    }
}

impl Default for LocatorPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_LOCATOR.clone(),
        }
    }
}

/// Extracts one locator per matching fragment.
///
/// Fragments that do not match are skipped. Order follows the fragments and
/// repeated locators are kept.
pub fn extract<S: AsRef<str>>(fragments: &[S], pattern: &LocatorPattern) -> Vec<String> {
    let locators = fragments
        .iter()
        .filter_map(|fragment| pattern.locate(fragment.as_ref()))
        .collect::<Vec<String>>();

    ::log::debug!(
        "Extracted {} locators from {} fragments",
        locators.len(),
        fragments.len()
    );
    locators
}
