use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::parser::{article, listing, ArticleLink, Category};
use crate::settings::Settings;
use crate::writer::Writer;

/// Counts reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeStats {
    pub categories: usize,
    pub category_errors: usize,
    pub total: usize,
    pub saved: usize,
    /// Reachable pages that did not look like an article.
    pub skipped: usize,
    /// Network, HTTP and filesystem failures.
    pub errors: usize,
}

/// Listing → categories → articles → files. Only an unreachable listing page is fatal.
pub async fn run(settings: &Settings) -> Result<ScrapeStats> {
    let listing_url = Url::parse(&settings.listing_url)
        .with_context(|| format!("invalid listing URL {:?}", settings.listing_url))?;
    let fetcher = Arc::new(Fetcher::new(&settings.user_agent)?);
    let writer = Arc::new(Writer::new(&settings.out_dir, settings.min_body_chars));

    info!("Fetching health topic categories: {}", listing_url);
    let listing_html = fetcher
        .get_html(&listing_url)
        .await
        .with_context(|| format!("cannot reach listing page {listing_url}"))?;

    let categories = listing::categories(&listing_html, &listing_url);
    info!("Total categories found: {}", categories.len());
    if categories.is_empty() {
        warn!("No categories on {}; page layout may have changed", listing_url);
    }

    let (jobs, category_errors) = discover_articles(&fetcher, &categories).await;
    let mut stats = scrape_articles(fetcher, writer, jobs, settings.concurrency).await?;
    stats.categories = categories.len();
    stats.category_errors = category_errors;
    Ok(stats)
}

/// Fetch each category page in turn and collect its article links.
async fn discover_articles(fetcher: &Fetcher, categories: &[Category]) -> (Vec<ArticleLink>, usize) {
    let mut jobs = Vec::new();
    let mut errors = 0usize;

    for category in categories {
        let html = match fetcher.get_html(&category.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(category = %category.name, "Skipping category: {:#}", anyhow::Error::new(e));
                errors += 1;
                continue;
            }
        };
        let links = listing::article_links(&html, category);
        info!(category = %category.name, folder = %category.dir_name(), "Found {} articles", links.len());
        jobs.extend(links);
    }

    (jobs, errors)
}

/// Scrape articles on a bounded pool, collecting outcomes as they arrive.
async fn scrape_articles(
    fetcher: Arc<Fetcher>,
    writer: Arc<Writer>,
    jobs: Vec<ArticleLink>,
    concurrency: usize,
) -> Result<ScrapeStats> {
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let total = jobs.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Workers send outcomes, this loop owns the counters
    let (tx, mut rx) =
        mpsc::channel::<(ArticleLink, Result<PathBuf, ScrapeError>)>(concurrency * 2);

    for job in jobs {
        let fetcher = Arc::clone(&fetcher);
        let writer = Arc::clone(&writer);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };
            let outcome = scrape_article(&fetcher, &writer, &job).await;
            let _ = tx.send((job, outcome)).await;
        });
    }

    // rx closes once every worker has dropped its sender
    drop(tx);

    let mut stats = ScrapeStats {
        total,
        ..Default::default()
    };

    while let Some((job, outcome)) = rx.recv().await {
        match outcome {
            Ok(path) => {
                stats.saved += 1;
                info!(category = %job.category.name, "Saved {}", path.display());
            }
            Err(e) if e.is_parse() => {
                stats.skipped += 1;
                warn!(category = %job.category.name, "Skipping article: {}", e);
            }
            Err(e) => {
                stats.errors += 1;
                warn!(category = %job.category.name, "Failed article: {:#}", anyhow::Error::new(e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} articles ({} saved, {} skipped, {} errors)",
        stats.total, stats.saved, stats.skipped, stats.errors
    );

    Ok(stats)
}

async fn scrape_article(
    fetcher: &Fetcher,
    writer: &Writer,
    job: &ArticleLink,
) -> Result<PathBuf, ScrapeError> {
    let html = fetcher.get_html(&job.url).await?;
    let page = article::extract(&html, &job.url)?;
    writer.write(&job.category, &page.title, &job.url, &page.body_html)
}

// ── Tests ──
