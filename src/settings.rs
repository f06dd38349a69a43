use std::path::PathBuf;

pub const LISTING_URL: &str = "https://www.westonaprice.org/health-topics/";
pub const OUT_DIR: &str = "articles";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const CONCURRENCY: usize = 4;
/// Bodies shorter than this are usually members-only teasers or empty shells.
pub const MIN_BODY_CHARS: usize = 300;

/// Run configuration, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listing_url: String,
    pub out_dir: PathBuf,
    pub user_agent: String,
    pub concurrency: usize,
    pub min_body_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            out_dir: PathBuf::from(OUT_DIR),
            user_agent: USER_AGENT.to_string(),
            concurrency: CONCURRENCY,
            min_body_chars: MIN_BODY_CHARS,
        }
    }
}
