//! Page title fetching
//!
//! Looks up a title for pages saved without one.

use anyhow::Result;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Fetch the title of a page
///
/// Returns `None` on any failure (network error, non-success status, no
/// usable title); the caller falls back to the placeholder title.
pub async fn fetch_title(url: &str) -> Option<String> {
    match fetch_title_inner(url).await {
        Ok(title) => title,
        Err(e) => {
            debug!(url, error = %e, "Title fetch failed");
            None
        }
    }
}

/// Inner fetch function that can fail
async fn fetch_title_inner(url: &str) -> Result<Option<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent("Mozilla/5.0 (compatible; readlist/1.0)")
        .build()?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        debug!(url, status = %response.status(), "Title fetch got non-success status");
        return Ok(None);
    }

    let html = response.text().await?;
    Ok(parse_title(&html))
}

/// Extract a title from HTML
///
/// Prefers `og:title`, then `twitter:title`, then the `<title>` element.
fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(og_title) = extract_meta_content(&document, "og:title") {
        return Some(og_title);
    }

    if let Some(twitter_title) = extract_meta_content(&document, "twitter:title") {
        return Some(twitter_title);
    }

    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract content from a meta tag by property or name
fn extract_meta_content(document: &Html, property: &str) -> Option<String> {
    ["property", "name"].into_iter().find_map(|attr| {
        let selector = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, property)).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_basic() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <title>  Test Page  </title>
            </head>
            <body></body>
            </html>
        "#;

        assert_eq!(parse_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_parse_title_opengraph() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <title>Fallback Title</title>
                <meta name="twitter:title" content="Twitter Title">
                <meta property="og:title" content="OG Title">
            </head>
            <body></body>
            </html>
        "#;

        // OG takes precedence
        assert_eq!(parse_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn test_parse_title_twitter() {
        let html = r#"
            <html><head>
                <title>Fallback Title</title>
                <meta name="twitter:title" content="Twitter Title">
            </head></html>
        "#;

        assert_eq!(parse_title(html), Some("Twitter Title".to_string()));
    }

    #[test]
    fn test_parse_title_empty() {
        assert!(parse_title("<html><head></head><body></body></html>").is_none());
        assert!(parse_title("<html><head><title>   </title></head></html>").is_none());
    }

    #[test]
    fn test_empty_meta_falls_through() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="  ">
                <title>Real Title</title>
            </head></html>
        "#;

        assert_eq!(parse_title(html), Some("Real Title".to_string()));
    }
}
