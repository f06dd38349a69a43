use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use super::{element_text, resolve, ArticleLink, Category};

static CATEGORY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*='health-topics-category']").unwrap());
static ARTICLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main.content h5 a").unwrap());

/// Categories linked from the health-topics listing, de-duplicated by URL in page order.
pub fn categories(html: &str, page_url: &Url) -> Vec<Category> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for a in doc.select(&CATEGORY_SEL) {
        let Some(url) = a.value().attr("href").and_then(|h| resolve(page_url, h)) else {
            continue;
        };
        let name = element_text(a);
        if name.is_empty() || !seen.insert(url.clone()) {
            continue;
        }
        out.push(Category { name, url });
    }

    out
}

/// Article links on one category page, tagged with that category.
pub fn article_links(html: &str, category: &Category) -> Vec<ArticleLink> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();

    doc.select(&ARTICLE_SEL)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|h| resolve(&category.url, h))
        .filter(|url| seen.insert(url.clone()))
        .map(|url| ArticleLink {
            url,
            category: category.clone(),
        })
        .collect()
}

// ── Tests ──
