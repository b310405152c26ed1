use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::ExtractorConfig;
use crate::types::{BeachCatalog, Extraction, Node, RawDocument};

static CONTENT_NODES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, ul").expect("invalid selector: content nodes")
});

static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("invalid selector: paragraphs"));

// Older MediaWiki skins render the section edit links inside the heading.
static RE_EDIT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\[\s*(?:editar|edit)(?:\s*\|\s*editar código-fonte)?\s*\]\s*$")
        .expect("invalid regex: edit link")
});

/// Where subsequent list items go while walking the article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Unset,
    Open(String),
}

impl Cursor {
    /// The transition taken on a heading. It does not depend on the previous
    /// state: a blank or excluded title closes the cursor, anything else
    /// opens it.
    pub fn on_heading(title: &str, config: &ExtractorConfig) -> Cursor {
        if title.is_empty() || config.is_excluded(title) {
            Cursor::Unset
        } else {
            Cursor::Open(title.to_string())
        }
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            Cursor::Unset => None,
            Cursor::Open(name) => Some(name),
        }
    }
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

pub fn clean_heading(text: &str) -> String {
    RE_EDIT_LINK.replace(text.trim(), "").trim().to_string()
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

fn is_nested_list(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|e| e.name() == "li")
}

/// Flattens the article body into headings and lists, in document order.
pub fn content_nodes(region: ElementRef) -> Vec<Node> {
    let mut nodes = Vec::new();

    for element in region.select(&CONTENT_NODES) {
        let name = element.value().name();

        if let Some(level) = heading_level(name) {
            nodes.push(Node::Heading {
                level,
                text: clean_heading(&elem_text(element)),
            });
        } else if !is_nested_list(element) {
            let items = element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
                .map(|li| elem_text(li).trim().to_string())
                .collect();
            nodes.push(Node::List { items });
        }
    }

    nodes
}

pub fn parse_summary(region: ElementRef, max_chars: usize) -> String {
    region
        .select(&PARAGRAPHS)
        .map(|p| elem_text(p).trim().to_string())
        .find(|text| !text.is_empty())
        .map(|text| text.chars().take(max_chars).collect())
        .unwrap_or_default()
}

pub fn build_catalog<I>(nodes: I, config: &ExtractorConfig) -> BeachCatalog
where
    I: IntoIterator<Item = Node>,
{
    let mut catalog = BeachCatalog::new();
    let mut cursor = Cursor::Unset;

    for node in nodes {
        match node {
            Node::Heading { level, text } => {
                cursor = Cursor::on_heading(&text, config);
                match cursor.current() {
                    Some(name) => {
                        catalog.reset(name);
                    }
                    None => log::debug!("Skipping h{} section '{}'", level, text),
                }
            }
            Node::List { items } => match cursor.current() {
                Some(name) => catalog.open(name).beaches.extend(items),
                None => log::debug!(
                    "Skipping list of {} item(s) outside any municipality",
                    items.len()
                ),
            },
        }
    }

    catalog
}

pub fn extract(document: &RawDocument, config: &ExtractorConfig) -> Extraction {
    if !document.is_success() {
        log::warn!("Not extracting from failed fetch (status {})", document.status);
        return Extraction::failure();
    }
    extract_html(&document.body, config)
}

pub fn extract_html(html: &str, config: &ExtractorConfig) -> Extraction {
    let region_selector = match Selector::parse(&config.content_selector) {
        Ok(selector) => selector,
        Err(e) => {
            log::error!(
                "Invalid content selector '{}': {e:?}",
                config.content_selector
            );
            return Extraction::failure();
        }
    };

    let document = Html::parse_document(html);
    let Some(region) = document.select(&region_selector).next() else {
        log::warn!(
            "No content region matching '{}' in document",
            config.content_selector
        );
        return Extraction::failure();
    };

    let summary = parse_summary(region, config.summary_max_chars);
    let catalog = build_catalog(content_nodes(region), config);
    log::debug!(
        "Extracted {} municipalities, summary of {} chars",
        catalog.len(),
        summary.chars().count()
    );

    Extraction { summary, catalog }
}
