use std::path::PathBuf;

use thiserror::Error;

/// Why a single page or article was not turned into a file.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} has no {what}")]
    MissingElement { url: String, what: &'static str },

    #[error("{url} has only {chars} characters of content")]
    LowContent { url: String, chars: usize },

    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    /// Parse-side problems: the page was reachable but did not look like an article.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::MissingElement { .. } | Self::LowContent { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_parse_failures() {
        let missing = ScrapeError::MissingElement {
            url: "https://example.com/a".into(),
            what: "title",
        };
        let low = ScrapeError::LowContent {
            url: "https://example.com/a".into(),
            chars: 12,
        };
        let io = ScrapeError::Io {
            path: PathBuf::from("articles/x.md"),
            source: std::io::Error::other("disk full"),
        };
        assert!(missing.is_parse());
        assert!(low.is_parse());
        assert!(!io.is_parse());
        assert_eq!(missing.to_string(), "https://example.com/a has no title");
    }
}
