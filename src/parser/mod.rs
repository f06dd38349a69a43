pub mod article;
pub mod blocks;
pub mod listing;
pub mod markdown;

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::ElementRef;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A health-topic category as linked from the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: Url,
}

impl Category {
    /// Directory name: last URL path segment, or the label when the URL has none.
    pub fn dir_name(&self) -> String {
        let slug = slug_from_url(&self.url);
        let source = if slug.is_empty() { self.name.as_str() } else { slug };
        crate::filename::sanitize_dir(source)
    }
}

/// One unit of work: an article URL and the category it was listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub url: Url,
    pub category: Category,
}

/// Last non-empty path segment: `/health-topics-category/vaccinations/` → `vaccinations`.
pub fn slug_from_url(url: &Url) -> &str {
    url.path_segments()
        .and_then(|segs| segs.filter(|s| !s.is_empty()).last())
        .unwrap_or("")
}

/// All text under `el`, whitespace collapsed and trimmed.
pub(crate) fn element_text(el: ElementRef) -> String {
    collapse_ws(&el.text().collect::<String>())
}

pub(crate) fn collapse_ws(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Resolve `href` against the page it was found on; absolute hrefs pass through.
pub(crate) fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_ignores_trailing_slash() {
        let url = Url::parse("https://www.westonaprice.org/health-topics-category/vaccinations/")
            .unwrap();
        assert_eq!(slug_from_url(&url), "vaccinations");
        let root = Url::parse("https://www.westonaprice.org/").unwrap();
        assert_eq!(slug_from_url(&root), "");
    }

    #[test]
    fn category_dir_falls_back_to_label() {
        let cat = Category {
            name: "Know Your Fats".into(),
            url: Url::parse("https://www.westonaprice.org/").unwrap(),
        };
        assert_eq!(cat.dir_name(), "Know-Your-Fats");

        let cat = Category {
            name: "Know Your Fats".into(),
            url: Url::parse("https://www.westonaprice.org/health-topics-category/know-your-fats/")
                .unwrap(),
        };
        assert_eq!(cat.dir_name(), "know-your-fats");
    }

    #[test]
    fn resolve_relative_and_skip_fragments() {
        let base = Url::parse("https://www.westonaprice.org/health-topics/").unwrap();
        assert_eq!(
            resolve(&base, "/health-topics/abcs/").unwrap().as_str(),
            "https://www.westonaprice.org/health-topics/abcs/"
        );
        assert_eq!(
            resolve(&base, "https://other.org/x").unwrap().as_str(),
            "https://other.org/x"
        );
        assert!(resolve(&base, "#top").is_none());
        assert!(resolve(&base, "  ").is_none());
    }

    #[test]
    fn collapse_whitespace() {
        assert_eq!(collapse_ws("  Know\n   Your\tFats \u{a0}"), "Know Your Fats");
    }
}
