use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use imgstream_core::{BatchConfig, BatchEvent, BatchRunner, Outcome, TargetFormat};

mod cli;
mod report;

use cli::Cli;
use report::Report;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let target = TargetFormat::from_str(&cli.to).map_err(|e| anyhow::anyhow!(e))?;
    let config = BatchConfig {
        source_dir: cli.source.clone(),
        dest_dir: cli.dest.clone(),
        target,
        quality: cli.quality,
        concurrency: cli.jobs,
    };

    log::debug!("batch config: {config:?}");

    let mut events = BatchRunner::new(config).start();
    let mut pb: Option<ProgressBar> = None;
    let mut report = Report::new();

    while let Some(event) = events.recv().await {
        match event {
            BatchEvent::Started { total } => {
                if total == 0 {
                    println!("No supported files found.");
                } else {
                    println!("Found {total} file(s) to convert.");
                    let bar = ProgressBar::new(total as u64);
                    bar.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                            .unwrap()
                            .progress_chars("█▓░"),
                    );
                    pb = Some(bar);
                }
            }
            BatchEvent::Item(outcome) => {
                if let Some(bar) = &pb {
                    match &outcome {
                        Outcome::Converted {
                            name,
                            initial_size,
                            compressed_size,
                            ..
                        } => bar.set_message(format!(
                            "{name} ({:.1}%)",
                            report::savings_pct(*initial_size, *compressed_size)
                        )),
                        Outcome::Failed { name, .. } => bar.set_message(format!("{name} (error)")),
                    }
                    bar.inc(1);
                }
                report.add(outcome);
            }
            BatchEvent::Fatal(message) => {
                if let Some(bar) = &pb {
                    bar.abandon();
                }
                anyhow::bail!(message);
            }
            BatchEvent::Done => break,
        }
    }

    if let Some(bar) = &pb {
        bar.finish_with_message("Done!");
    }
    report.print_summary();

    Ok(())
}
