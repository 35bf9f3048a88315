use crate::error::{HarvestError, Result};
use scraper::{Html, Selector};

/// Returns the outer HTML of every element matching `selector`, in document order
pub fn select_outer_html(html: &str, selector: &str) -> Result<Vec<String>> {
    let css = Selector::parse(selector).map_err(|_| HarvestError::Selector(selector.to_string()))?;
    let doc = Html::parse_document(html);

    let fragments = doc
        .select(&css)
        .map(|element| element.html())
        .collect::<Vec<String>>();

    ::log::trace!("Selector `{}` matched {} elements", selector, fragments.len());

    Ok(fragments)
}
