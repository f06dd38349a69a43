use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use super::element_text;
use crate::error::ScrapeError;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.entry-content").unwrap());

/// Title and body markup pulled from one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub title: String,
    pub body_html: String,
}

/// First `h1` is the title, `div.entry-content` is the body.
pub fn extract(html: &str, url: &Url) -> Result<ArticlePage, ScrapeError> {
    let doc = Html::parse_document(html);
    let missing = |what| ScrapeError::MissingElement {
        url: url.to_string(),
        what,
    };

    let title = doc
        .select(&TITLE_SEL)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("title"))?;

    let body_html = doc
        .select(&BODY_SEL)
        .next()
        .map(|el| el.inner_html())
        .ok_or_else(|| missing("article body"))?;

    Ok(ArticlePage { title, body_html })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://www.westonaprice.org/health-topics/know-your-fats/the-skinny-on-fats/")
            .unwrap()
    }

    #[test]
    fn article_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/article.html").unwrap();
        let page = extract(&html, &url()).unwrap();
        assert_eq!(page.title, "The Skinny on Fats");
        assert!(page.body_html.contains("<h2>Fat Chemistry</h2>"));
        assert!(!page.body_html.contains("Related Articles"));
    }

    #[test]
    fn missing_body_is_a_parse_error() {
        let err = extract("<html><body><h1>Only a title</h1></body></html>", &url()).unwrap_err();
        assert!(err.is_parse());
        assert!(matches!(err, ScrapeError::MissingElement { what: "article body", .. }));
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        let html = r#"<html><body><div class="entry-content"><p>text</p></div></body></html>"#;
        let err = extract(html, &url()).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement { what: "title", .. }));
    }
}
