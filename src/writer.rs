use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use tracing::debug;

use crate::error::ScrapeError;
use crate::filename::sanitize_title;
use crate::parser::markdown::html_to_markdown;
use crate::parser::Category;

/// Converts article bodies and lays them out as `<out_dir>/<category>/<title>.md`.
#[derive(Debug, Clone)]
pub struct Writer {
    out_dir: PathBuf,
    min_body_chars: usize,
}

impl Writer {
    pub fn new(out_dir: impl Into<PathBuf>, min_body_chars: usize) -> Self {
        Self {
            out_dir: out_dir.into(),
            min_body_chars,
        }
    }

    pub fn article_path(&self, category: &Category, title: &str) -> PathBuf {
        self.out_dir
            .join(category.dir_name())
            .join(format!("{}.md", sanitize_title(title)))
    }

    /// Convert `body_html` and write it, overwriting any earlier copy.
    pub fn write(
        &self,
        category: &Category,
        title: &str,
        url: &Url,
        body_html: &str,
    ) -> Result<PathBuf, ScrapeError> {
        let body = html_to_markdown(body_html, Some(url));
        let chars = body.trim().chars().count();
        if chars < self.min_body_chars {
            return Err(ScrapeError::LowContent {
                url: url.to_string(),
                chars,
            });
        }

        let path = self.article_path(category, title);
        if let Some(dir) = path.parent() {
            ensure_directory(dir)?;
        }
        fs::write(&path, render_document(title, url, &body)).map_err(|source| {
            ScrapeError::Io {
                path: path.clone(),
                source,
            }
        })?;

        debug!(path = %path.display(), chars, "wrote article");
        Ok(path)
    }
}

pub fn render_document(title: &str, url: &Url, body: &str) -> String {
    format!("# {title}\n\nSource: {url}\n\n{body}")
}

fn ensure_directory(dir: &Path) -> Result<(), ScrapeError> {
    fs::create_dir_all(dir).map_err(|source| ScrapeError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn category() -> Category {
        Category {
            name: "Know Your Fats".into(),
            url: Url::parse("https://www.westonaprice.org/health-topics-category/know-your-fats/")
                .unwrap(),
        }
    }

    fn article_url() -> Url {
        Url::parse("https://www.westonaprice.org/health-topics/know-your-fats/the-skinny-on-fats/")
            .unwrap()
    }

    #[test]
    fn writes_into_category_directory() {
        let tmp = TempDir::new().unwrap();
        let writer = Writer::new(tmp.path(), 0);
        let path = writer
            .write(
                &category(),
                "The Skinny on Fats",
                &article_url(),
                "<h1>Title</h1><p>Hello <b>world</b></p>",
            )
            .unwrap();

        assert_eq!(
            path,
            tmp.path().join("know-your-fats").join("The-Skinny-on-Fats.md")
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# The Skinny on Fats\n\nSource: https://www.westonaprice.org/health-topics/know-your-fats/the-skinny-on-fats/\n\n# Title\n\nHello **world**\n"
        );
    }

    #[test]
    fn rewriting_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let writer = Writer::new(tmp.path(), 0);
        let html = std::fs::read_to_string("tests/fixtures/article.html").unwrap();
        let page = crate::parser::article::extract(&html, &article_url()).unwrap();

        let first = writer
            .write(&category(), &page.title, &article_url(), &page.body_html)
            .unwrap();
        let first_bytes = fs::read(&first).unwrap();
        let second = writer
            .write(&category(), &page.title, &article_url(), &page.body_html)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, fs::read(&second).unwrap());
    }

    #[test]
    fn low_content_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let writer = Writer::new(tmp.path(), 300);
        let err = writer
            .write(&category(), "Teaser", &article_url(), "<p>Members only.</p>")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::LowContent { chars: 13, .. }));
        assert!(!tmp.path().join("know-your-fats").exists());
    }

    #[test]
    fn long_multibyte_title_is_writable() {
        let tmp = TempDir::new().unwrap();
        let writer = Writer::new(tmp.path(), 0);
        let title = "脂肪".repeat(60);
        let path = writer
            .write(&category(), &title, &article_url(), "<p>Animal fats.</p>")
            .unwrap();
        assert!(path.file_name().unwrap().len() < 255);
        assert!(fs::read_to_string(&path).unwrap().ends_with("Animal fats.\n"));
    }

    #[test]
    fn same_title_in_two_categories_kept_apart() {
        let tmp = TempDir::new().unwrap();
        let writer = Writer::new(tmp.path(), 0);
        let other = Category {
            name: "Vaccinations".into(),
            url: Url::parse("https://www.westonaprice.org/health-topics-category/vaccinations/")
                .unwrap(),
        };
        let a = writer
            .write(&category(), "Overview", &article_url(), "<p>fats</p>")
            .unwrap();
        let b = writer
            .write(&other, "Overview", &article_url(), "<p>shots</p>")
            .unwrap();
        assert_ne!(a, b);
        assert!(fs::read_to_string(a).unwrap().ends_with("fats\n"));
        assert!(fs::read_to_string(b).unwrap().ends_with("shots\n"));
    }
}
