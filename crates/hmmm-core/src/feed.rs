//! arXiv "past week" listings, scraped over HTTP.

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::future::join_all;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::item::{Item, SectionHeader, SourceRow};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("unable to parse {what}")]
    Parse { what: String },
}

impl FeedError {
    fn parse(what: impl Into<String>) -> Self {
        Self::Parse { what: what.into() }
    }
}

/// Source of paper listings. One attempt per call; callers treat errors as
/// fatal.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Number of papers currently listed for `category`.
    async fn count(&self, category: &str) -> Result<usize, FeedError>;

    /// The first `count` papers listed for `category`, in listing order.
    async fn fetch(&self, category: &str, count: usize) -> Result<Vec<Item>, FeedError>;

    /// Long-form text (the abstract) for one paper.
    async fn full_text(&self, item: &Item) -> Result<String, FeedError>;
}

pub struct ArxivFeed {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivFeed {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hmmm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn listing_url(&self, category: &str) -> String {
        format!("{}/list/{}/pastweek", self.base_url, category)
    }

    async fn get_html(&self, url: &str) -> Result<String, FeedError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "text/html")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl FeedProvider for ArxivFeed {
    async fn count(&self, category: &str) -> Result<usize, FeedError> {
        let html = self.get_html(&self.listing_url(category)).await?;
        parse_count(&html)
    }

    async fn fetch(&self, category: &str, count: usize) -> Result<Vec<Item>, FeedError> {
        let url = format!("{}?show={}", self.listing_url(category), count);
        let html = self.get_html(&url).await?;
        Ok(parse_listing(&html))
    }

    async fn full_text(&self, item: &Item) -> Result<String, FeedError> {
        let url = format!("{}/abs/{}", self.base_url, item.identifier);
        let html = self.get_html(&url).await?;
        parse_abstract(&html)
    }
}

fn selector(css: &str) -> Result<Selector, FeedError> {
    Selector::parse(css).map_err(|_| FeedError::parse(format!("selector {css}")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Listing size from the "1-N" pager link, or the "Total of N entries" line.
pub fn parse_count(html: &str) -> Result<usize, FeedError> {
    let doc = Html::parse_document(html);
    let pager = selector("#dlpage > small > a:last-child")?;

    if let Some(link) = doc.select(&pager).next() {
        let text = link.text().collect::<String>();
        if let Some(n) = text
            .split('-')
            .nth(1)
            .and_then(|n| n.trim().parse::<usize>().ok())
        {
            return Ok(n);
        }
    }

    let re = Regex::new(r"Total of (\d+) entries").map_err(|_| FeedError::parse("count regex"))?;
    let page_text = doc.root_element().text().collect::<String>();
    re.captures(&page_text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| FeedError::parse("paper count"))
}

/// Papers from a listing page. `dt` entries carry the identifier, the
/// matching `dd` entries carry the title.
pub fn parse_listing(html: &str) -> Vec<Item> {
    let doc = Html::parse_document(html);
    let (Ok(dl), Ok(dt), Ok(dd), Ok(abs_link), Ok(title_div)) = (
        selector("#dlpage > dl"),
        selector("dt"),
        selector("dd"),
        selector("a[title='Abstract']"),
        selector("div.list-title"),
    ) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for list in doc.select(&dl) {
        let ids = list.select(&dt).map(|entry| {
            entry
                .select(&abs_link)
                .next()
                .map(|a| a.text().collect::<String>())
                .and_then(|text| text.split(':').nth(1).map(|id| id.trim().to_string()))
                .unwrap_or_default()
        });
        let titles = list.select(&dd).map(|entry| {
            let raw = entry
                .select(&title_div)
                .next()
                .map(|div| div.text().collect::<String>())
                .unwrap_or_default();
            let title = collapse_whitespace(&raw);
            title
                .strip_prefix("Title:")
                .map(|t| t.trim_start().to_string())
                .unwrap_or(title)
        });

        items.extend(
            ids.zip(titles)
                .filter(|(id, _)| !id.is_empty())
                .map(|(identifier, title)| Item { identifier, title }),
        );
    }
    items
}

/// Abstract text from a paper's abstract page.
pub fn parse_abstract(html: &str) -> Result<String, FeedError> {
    let doc = Html::parse_document(html);
    let quote = selector("blockquote.abstract")?;
    let text = doc
        .select(&quote)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .ok_or_else(|| FeedError::parse("abstract"))?;
    Ok(text
        .strip_prefix("Abstract:")
        .map(|t| t.trim_start().to_string())
        .unwrap_or(text))
}

async fn retrieve_category<F: FeedProvider + ?Sized>(
    feed: &F,
    category: &str,
) -> Result<Vec<Item>, FeedError> {
    let n = feed.count(category).await?;
    debug!(category, count = n, "listing size");
    feed.fetch(category, n).await
}

/// Fetch every category concurrently and assemble the source list in request
/// order: a section header per category, followed by the papers no earlier
/// category already listed. The first failure (in request order) wins.
pub async fn retrieve_categories<F: FeedProvider + ?Sized>(
    feed: &F,
    categories: &[String],
) -> Result<Vec<SourceRow>, FeedError> {
    let results = join_all(categories.iter().map(|c| retrieve_category(feed, c))).await;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (category, result) in categories.iter().zip(results) {
        let papers = result?;
        let total = papers.len();
        let fresh: Vec<Item> = papers
            .into_iter()
            .filter(|p| seen.insert(p.identifier.clone()))
            .collect();

        info!(
            category = %category,
            fresh = fresh.len(),
            duplicates = total - fresh.len(),
            "category retrieved"
        );
        rows.push(SourceRow::Section(SectionHeader {
            category: category.clone(),
            fresh: fresh.len(),
            duplicates: total - fresh.len(),
        }));
        rows.extend(fresh.into_iter().map(SourceRow::Paper));
    }
    Ok(rows)
}
