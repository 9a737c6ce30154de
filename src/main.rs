#![deny(clippy::all)]
use std::process::exit;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use log::debug;
use nnd_common::{config::AppConfig, Site};
use nnd_core::{
    downloader::Downloader,
    error::QueueError,
    progress::ChannelProgressListener,
    queue::{spawn_queue, Admission, FinishedJob},
};
use nnd_extractors::ExtractorFeatures;
use owo_colors::OwoColorize;

use crate::cli::{extra::site_features, Cli};
use crate::progress_bars::SpinnerRenderer;

mod cli;
mod progress_bars;

/// Notifications waiting to be drawn. Older ones are dropped when it's full.
const PROGRESS_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.sites {
        print_sites()
    }

    env_logger::builder().format_timestamp(None).init();
    color_eyre::install()?;

    if args.mode.is_none() {
        Cli::command().print_help()?;
        exit(2);
    }

    let config = AppConfig::load_or_create(&args.config).await?;
    debug!("Loaded config from {}", args.config.display());

    let jobs = args.jobs()?;
    if jobs.is_empty() {
        println!("{}", "Nothing to download".bold().blue());
        exit(0);
    }

    let mut downloader = Downloader::new(
        config,
        &args.proxies,
        args.output.clone(),
        args.db.clone(),
    )?;
    if args.no_dedup {
        downloader = downloader.without_dedup();
    }

    let (listener, messages) = ChannelProgressListener::channel(PROGRESS_BUFFER);
    let renderer = SpinnerRenderer::new().spawn(messages);

    let queue = spawn_queue(downloader, Arc::new(listener));

    for job in jobs {
        match queue.enqueue(job.clone()).await {
            Ok(Admission::Accepted { .. }) => (),
            Ok(Admission::Rejected) => {
                eprintln!("{} {}", "Skipping duplicate job:".bold().yellow(), job);
            }
            Err(QueueError::InvalidJob { source }) => {
                eprintln!("{} {}", "Skipping invalid job:".bold().red(), source);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let history = queue.finish().await?;
    drop(queue);
    renderer.await?;

    print_results(&history);

    Ok(())
}

fn print_results(history: &[FinishedJob]) {
    let mut downloaded = 0;
    let mut skipped = 0;

    for finished in history {
        let report = &finished.report;
        downloaded += report.downloaded;
        skipped += report.skipped;

        if report.success() {
            println!(
                "{} {} {}",
                finished.job.bold(),
                report.downloaded.to_string().bold().blue(),
                "files downloaded".bold()
            );
        } else {
            println!(
                "{} {} {}",
                finished.job.bold(),
                "failed:".bold().red(),
                report.reason.as_deref().unwrap_or("unknown error").red()
            );
        }

        if let Some(reason) = report.reason.as_deref().filter(|_| report.success()) {
            println!(" - {}", reason.yellow());
        }
    }

    println!(
        "{} {} {}",
        downloaded.to_string().bold().blue(),
        "files".bold().blue(),
        "downloaded".bold()
    );

    if skipped > 0 {
        println!(
            "{} {}",
            skipped.to_string().bold().red(),
            "items were skipped (blacklisted, already downloaded or without a file)."
                .bold()
                .red()
        );
    }
}

fn print_sites() {
    println!(
        "{}\n----------------",
        "Available Sites:".underline().bold().blue()
    );

    for site in Site::ALL {
        let ext_feat = site_features(site);
        let mut features = Vec::with_capacity(5);

        if ext_feat.contains(ExtractorFeatures::TagSearch) {
            features.push("Tag Search");
        }

        if ext_feat.contains(ExtractorFeatures::UrlDownload) {
            features.push("Link Download");
        }

        if ext_feat.contains(ExtractorFeatures::Paginated) {
            features.push("Paginated");
        }

        if ext_feat.contains(ExtractorFeatures::Auth) {
            features.push("Auth");
        }

        if ext_feat.contains(ExtractorFeatures::HardLimit) {
            features.push("Page Limit");
        }

        println!(
            "{:<12} - {} {}\n - {} {}\n - {} {:?}\n",
            format!("[{}]", site),
            "Base URL:".bold().blue(),
            site.base_url().bold().purple().underline(),
            "Job type:".bold().blue(),
            site.mode().bold().yellow(),
            "Available features:".bold().blue(),
            features,
        )
    }

    exit(0)
}
