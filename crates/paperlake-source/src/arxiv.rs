//! arXiv HTML search source.
//!
//! Fetches paginated search result pages and extracts articles from the
//! `li.arxiv-result` markup. A result item that fails to yield an id is
//! still kept with a synthesized `unknown_<offset+index>` id; only
//! page-level failures (HTTP status, unreadable body) are errors.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, warn};

use paperlake_types::{Article, Author};

use crate::error::SourceError;
use crate::source::ArticleSource;

/// arXiv serves search results in pages of 50.
pub const PAGE_SIZE: usize = 50;

/// Pause before surfacing a 429, so an immediate retry by the caller does
/// not hammer the source.
const RATE_LIMIT_WAIT: Duration = Duration::from_secs(5);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "paperlake-ingest/0.3 (contact: admin@example.com)";

const DEFAULT_BASE_URL: &str = "https://arxiv.org/search/";

/// Article source backed by arXiv's HTML search endpoint.
pub struct ArxivSource {
    client: reqwest::Client,
    base_url: String,
    rate_limit_wait: Duration,
}

impl ArxivSource {
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_wait: RATE_LIMIT_WAIT,
        })
    }

    /// Point the source at a different endpoint (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the pause taken before surfacing a rate-limit error.
    pub fn with_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    fn search_url(&self, query: &str, limit: usize, offset: usize) -> String {
        format!(
            "{}?query={}&searchtype=all&abstracts=show&order=-announced_date_first&size={}&start={}",
            self.base_url, query, limit, offset
        )
    }
}

#[async_trait]
impl ArticleSource for ArxivSource {
    fn source_name(&self) -> &str {
        "arxiv_html"
    }

    fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let url = self.search_url(query, limit, offset);
        debug!(url = %url, "Fetching search page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            error!("arXiv rate limit reached (HTTP 429), pausing before surfacing");
            tokio::time::sleep(self.rate_limit_wait).await;
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            error!(status = status.as_u16(), "Unexpected HTTP status from arXiv");
            return Err(SourceError::Http(status.as_u16()));
        }

        let html = response.text().await?;
        parse_search_page(&html, query, limit, offset)
    }
}

fn selector(css: &'static str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::parse(format!("selector '{}': {}", css, e)))
}

/// Extract articles from one search result page.
///
/// Pure over the page text, so layout handling is testable without HTTP.
pub fn parse_search_page(
    html: &str,
    query: &str,
    limit: usize,
    offset: usize,
) -> Result<Vec<Article>, SourceError> {
    let document = Html::parse_document(html);
    let result_sel = selector("li.arxiv-result")?;

    let mut articles = Vec::new();
    for item in document.select(&result_sel).take(limit) {
        let index = articles.len();
        match parse_result_item(&item, query, offset + index) {
            Ok(article) => articles.push(article),
            Err(e) => warn!(error = %e, "Skipping unparseable result item"),
        }
    }

    if articles.is_empty() {
        warn!(query = query, offset = offset, "No results on page");
    }
    Ok(articles)
}

fn parse_result_item(
    item: &ElementRef<'_>,
    query: &str,
    position: usize,
) -> Result<Article, SourceError> {
    let title = select_text(item, "p.title")?.unwrap_or_else(|| "Untitled".to_string());

    // Prefer the pdf link for the id, then the abstract link, then a
    // synthesized placeholder keyed by page position.
    let pdf_link = select_href(item, "p.list-pdf a[href*='/pdf/']")?;
    let mut id = pdf_link
        .as_deref()
        .and_then(|href| href.rsplit('/').next())
        .map(|last| last.trim_end_matches(".pdf").to_string())
        .filter(|s| !s.is_empty());

    let link = select_href(item, "a[href*='/abs/']")?.unwrap_or_default();
    if id.is_none() {
        id = link
            .rsplit('/')
            .next()
            .map(str::to_string)
            .filter(|s| !s.is_empty());
    }
    let id = id.unwrap_or_else(|| format!("unknown_{}", position));

    let authors_sel = selector("p.authors a")?;
    let authors: Vec<Author> = item
        .select(&authors_sel)
        .map(|a| Author::new(element_text(&a)))
        .filter(|a| !a.name.is_empty())
        .collect();

    let summary = select_text(item, "span.abstract-full")?.unwrap_or_default();

    let (published, updated) = parse_submission_dates(item)?;

    let categories_sel = selector("span.primary-subject, span.subjects")?;
    let mut categories: Vec<String> = item
        .select(&categories_sel)
        .map(|tag| element_text(&tag))
        .filter(|c| !c.is_empty())
        .collect();
    if categories.is_empty() {
        categories = vec![query.to_string()];
    }

    Ok(Article {
        id,
        title,
        authors,
        summary,
        published,
        updated,
        categories,
        link,
        pdf_link,
    })
}

/// Parse "Submitted <d> <Month> <Y>[; updated <d> <Month> <Y>]" from the
/// result footer. Missing or unparseable dates fall back to now, matching
/// the lenient handling of the rest of the item fields.
fn parse_submission_dates(
    item: &ElementRef<'_>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), SourceError> {
    let span_sel = selector("span")?;
    let date_text = item
        .select(&span_sel)
        .map(|span| element_text(&span))
        .find(|text| text.contains("Submitted"));

    let Some(date_text) = date_text else {
        let now = Utc::now();
        return Ok((now, now));
    };

    let mut parts = date_text.split(';');
    let published = parts
        .next()
        .and_then(|part| parse_footer_date(part.replace("Submitted", "").trim()));
    let updated = parts
        .next()
        .and_then(|part| parse_footer_date(part.replace("updated", "").trim()));

    match published {
        Some(published) => Ok((published, updated.unwrap_or(published))),
        None => {
            warn!(text = %date_text, "Failed to parse submission dates, using current time");
            let now = Utc::now();
            Ok((now, now))
        }
    }
}

fn parse_footer_date(text: &str) -> Option<DateTime<Utc>> {
    // arXiv renders "5 January, 2024"; tolerate the comma-less form too.
    let cleaned = text.replace(',', "");
    NaiveDate::parse_from_str(cleaned.trim(), "%d %B %Y")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

fn select_text(item: &ElementRef<'_>, css: &'static str) -> Result<Option<String>, SourceError> {
    let sel = selector(css)?;
    Ok(item.select(&sel).next().map(|el| element_text(&el)))
}

fn select_href(item: &ElementRef<'_>, css: &'static str) -> Result<Option<String>, SourceError> {
    let sel = selector(css)?;
    Ok(item
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(absolute_link))
}

fn absolute_link(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("https://arxiv.org{}", href)
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
