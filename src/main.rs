use anyhow::{bail, Context};
use bank_browser::{Browser, Config, PageSummary};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Open a page the way a bank adapter would, optionally fill in fields and
/// click through, then print what the resulting page offers.
#[derive(Parser, Debug)]
#[command(name = "bank-probe", version, about)]
struct Cli {
    /// Page to open
    url: String,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fill in a form field before clicking, as NAME=VALUE
    #[arg(long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// Click a submit button or link by its label; repeatable, applied in order
    #[arg(long = "click", value_name = "TEXT")]
    clicks: Vec<String>,

    /// Print the page summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut browser = Browser::new(config.browser.clone())?;
    browser.navigate(&cli.url).await?;
    info!(url = %cli.url, status = ?browser.status(), "page opened");

    for field in &cli.fields {
        let Some((name, value)) = field.split_once('=') else {
            bail!("--field expects NAME=VALUE, got {field:?}");
        };
        browser.enter(name, value)?;
    }

    for label in &cli.clicks {
        if browser.click(label).await?.is_none() {
            warn!(label = %label, "nothing to click");
        }
    }

    let Some(document) = browser.document() else {
        bail!("no page loaded");
    };
    let summary = document.summary();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, browser.status());
    }
    Ok(())
}

fn print_summary(summary: &PageSummary, status: Option<u16>) {
    match status {
        Some(code) => println!("{} [{}]", summary.url, code),
        None => println!("{}", summary.url),
    }
    if !summary.title.is_empty() {
        println!("title: {}", summary.title);
    }

    println!("links ({}):", summary.link_count());
    for link in &summary.links {
        println!("  {:<30} {}", link.text, link.href);
    }

    println!("forms ({}):", summary.forms.len());
    for form in &summary.forms {
        let label = form
            .id
            .as_deref()
            .or(form.name.as_deref())
            .unwrap_or("-");
        println!("  {} {} {}", label, form.method, form.action);
        for (name, value) in &form.fields {
            println!("    {} = {:?}", name, value);
        }
        for submit in &form.submits {
            println!("    [{}]", submit);
        }
    }
}
