use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, HtmlTreeSink, Selector};

use crate::models::{FetchResponse, Headings};

// ── Constants ────────────────────────────────────────────────────────────────

const USER_AGENT: &str = "page-fetch-api/1.0";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Elements whose text is never rendered as page text.
const NON_VISIBLE_TAGS: &[&str] = &["head", "title", "script", "style", "template"];

// ── Lazy static selectors ────────────────────────────────────────────────────

static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

static HEADING_SELS: Lazy<Vec<(String, Selector)>> = Lazy::new(|| {
    (1..=6)
        .map(|level| {
            let tag = format!("h{}", level);
            let sel = Selector::parse(&tag).unwrap();
            (tag, sel)
        })
        .collect()
});

static AUTHOR_NAME_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="author"][content]"#).unwrap());

static AUTHOR_PROPERTY_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="article:author"][content]"#).unwrap());

static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No response was obtained: bad URL, DNS, connect, TLS, timeout or a
    /// body that could not be read.
    #[error("An error occurred while requesting {url}.")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The upstream answered with a non-success status.
    #[error("Error response {status} while requesting {url}.")]
    Status { url: String, status: u16 },
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Per-call settings for the outbound client.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub insecure_tls: bool,
}

// ── Public API ───────────────────────────────────────────────────────────────

pub async fn fetch_page(url: &str, options: FetchOptions) -> Result<FetchResponse, FetchError> {
    tracing::info!(url, "Fetching URL");
    let html = fetch_html(url, options).await?;
    let result = extract_from_html(html, url);
    tracing::info!(url, "Content fetched successfully");
    Ok(result)
}

// ── HTTP fetch ───────────────────────────────────────────────────────────────

async fn fetch_html(url: &str, options: FetchOptions) -> Result<String, FetchError> {
    let request_error = |source: reqwest::Error| {
        tracing::error!(url, error = %source, "Request error");
        FetchError::Request {
            url: url.to_string(),
            source,
        }
    };

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(ACCEPT_HTML),
    );

    let mut builder = reqwest::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .default_headers(headers);

    if options.insecure_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    // Built per call; nothing is pooled across requests.
    let client = builder.build().map_err(request_error)?;

    let response = client.get(url).send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!(url, status = status.as_u16(), "HTTP status error");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(request_error)
}

// ── Field extraction ─────────────────────────────────────────────────────────

/// Parse `html` and pull every output field from it. Never fails: missing
/// structure yields absent or empty fields. The body is moved into the
/// result untouched.
pub fn extract_from_html(html: String, url: &str) -> FetchResponse {
    let document = parse_document(&html);

    let title = extract_title(&document);
    let headings = extract_headings(&document);
    let author = extract_author(&document);
    let images = extract_images(&document);
    let content = extract_visible_text(&document);

    FetchResponse {
        url: url.to_string(),
        title,
        headings,
        author,
        images,
        content,
        html,
    }
}

/// Parse with scripting disabled so `<noscript>` children are real elements.
fn parse_document(html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    html5ever::parse_document(HtmlTreeSink::new(Html::new_document()), opts).one(html)
}

fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SEL)
        .next()
        .map(collect_text)
        .filter(|s| !s.is_empty())
}

fn extract_headings(document: &Html) -> Headings {
    HEADING_SELS
        .iter()
        .map(|(tag, sel)| {
            let texts: Vec<String> = document
                .select(sel)
                .map(|el| collect_text(el).trim().to_string())
                .collect();
            (tag.clone(), texts)
        })
        .collect()
}

/// `name="author"` wins over `property="article:author"`.
fn extract_author(document: &Html) -> Option<String> {
    document
        .select(&AUTHOR_NAME_SEL)
        .next()
        .or_else(|| document.select(&AUTHOR_PROPERTY_SEL).next())
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.to_string())
}

fn extract_images(document: &Html) -> Vec<String> {
    document
        .select(&IMG_SEL)
        .filter_map(|el| el.value().attr("src"))
        .map(|s| s.to_string())
        .collect()
}

fn extract_visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    collect_visible_text(document.root_element(), &mut parts);
    normalize_text(parts.join(" "))
}

// ── DOM utility helpers ──────────────────────────────────────────────────────

/// Concatenate every descendant text node of `el` with no separator. Title and
/// heading text come from here; callers decide whether to trim.
fn collect_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push((&*text.text).to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.push(collect_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

/// Gather each non-blank text node under `el`, skipping non-rendered elements.
fn collect_visible_text<'a>(el: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            Node::Element(element) if NON_VISIBLE_TAGS.contains(&element.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace runs to single spaces and trim.
fn normalize_text(text: String) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
