mod error;
mod fetch;
mod filename;
mod parser;
mod pipeline;
mod settings;
mod writer;

use std::path::PathBuf;
use std::time::Instant;

use clap::builder::TypedValueParser;
use clap::Parser;

use settings::Settings;

#[derive(Parser)]
#[command(
    name = "health_topics_scraper",
    about = "Scrape westonaprice.org health topics into Markdown files, one folder per category"
)]
struct Cli {
    /// Page listing the health-topic categories
    #[arg(long, default_value = settings::LISTING_URL)]
    listing_url: String,
    /// Root folder for the category directories
    #[arg(short, long, default_value = settings::OUT_DIR)]
    out_dir: PathBuf,
    /// Articles fetched at the same time (1 = strictly sequential)
    #[arg(short = 'j', long, default_value_t = settings::CONCURRENCY,
          value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    concurrency: usize,
    /// Skip articles whose Markdown body is shorter than this (0 keeps everything)
    #[arg(long, default_value_t = settings::MIN_BODY_CHARS)]
    min_body_chars: usize,
    /// User-Agent header sent with every request
    #[arg(long, default_value = settings::USER_AGENT)]
    user_agent: String,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Self {
            listing_url: cli.listing_url,
            out_dir: cli.out_dir,
            user_agent: cli.user_agent,
            concurrency: cli.concurrency,
            min_body_chars: cli.min_body_chars,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let settings = Settings::from(Cli::parse());

    let stats = pipeline::run(&settings).await?;

    println!(
        "Categories: {} ({} unreachable)",
        stats.categories, stats.category_errors
    );
    println!(
        "Articles:   {} found, {} saved, {} skipped, {} errors",
        stats.total, stats.saved, stats.skipped, stats.errors
    );
    println!("Output:     {}", settings.out_dir.display());

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_means_defaults() {
        let cli = Cli::try_parse_from(["health_topics_scraper"]).unwrap();
        let settings = Settings::from(cli);
        let defaults = Settings::default();
        assert_eq!(settings.listing_url, defaults.listing_url);
        assert_eq!(settings.out_dir, defaults.out_dir);
        assert_eq!(settings.concurrency, defaults.concurrency);
        assert_eq!(settings.min_body_chars, defaults.min_body_chars);
        assert_eq!(settings.user_agent, defaults.user_agent);
    }

    #[test]
    fn zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["health_topics_scraper", "-j", "0"]).is_err());
    }

    #[test]
    fn durations() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
