//! `mdpress sync`: publish changed manifest documents to the site.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mdpress_sync::{
    pipeline::{self, SyncOptions},
    EntryOutcome, EntryStatus, RunReport,
};

use super::ConfigArgs;

/// Arguments for `mdpress sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Fingerprint store to use instead of the configured one.
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Fetch and convert, but publish nothing and leave fingerprints alone.
    #[arg(long)]
    pub dry_run: bool,

    /// Republish every entry even if its content is unchanged.
    #[arg(long)]
    pub force: bool,

    /// Print the run report as JSON.
    #[arg(long, conflicts_with = "table")]
    pub json: bool,

    /// Print per-entry outcomes as a table.
    #[arg(long)]
    pub table: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (_, cfg) = self.config.load()?;
        let fingerprints = match self.state {
            Some(path) => path,
            None => cfg.fingerprint_path_at(&mdpress_core::config::home()?),
        };

        let options = SyncOptions {
            dry_run: self.dry_run,
            force: self.force,
        };
        let report = pipeline::run(&cfg, &fingerprints, options)
            .with_context(|| format!("sync of {} failed", cfg.source_url))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render report JSON")?
            );
        } else if self.table {
            print_table(&report);
        } else {
            print_results(&report);
        }
        Ok(())
    }
}

fn print_results(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    for outcome in &report.outcomes {
        println!("  {}  {}", marker(&outcome.status), describe(outcome));
    }

    let mark = if report.failed() == 0 {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!("{prefix}{mark} {}", report.summary());
}

fn marker(status: &EntryStatus) -> String {
    match status {
        EntryStatus::Created { .. } => "+".green().bold().to_string(),
        EntryStatus::Updated { .. } => "✎".green().to_string(),
        EntryStatus::WouldPublish => "~".cyan().to_string(),
        EntryStatus::Unchanged => "·".bright_black().to_string(),
        EntryStatus::Failed { .. } => "✗".red().bold().to_string(),
    }
}

fn describe(outcome: &EntryOutcome) -> String {
    let slug = if outcome.slug.is_blank() {
        "(no slug)".to_owned()
    } else {
        outcome.slug.to_string()
    };
    match &outcome.status {
        EntryStatus::Created { id } => format!("{slug} created (#{id})"),
        EntryStatus::Updated { id } => format!("{slug} updated (#{id})"),
        EntryStatus::WouldPublish => format!("{slug} would publish"),
        EntryStatus::Unchanged => format!("{slug} no changes"),
        EntryStatus::Failed { stage, reason } => format!("{slug} {stage} failed: {reason}"),
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "page")]
    page: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_table(report: &RunReport) {
    let rows: Vec<OutcomeRow> = report
        .outcomes
        .iter()
        .map(|o| {
            let (result, page, detail) = match &o.status {
                EntryStatus::Created { id } => ("CREATED", id.to_string(), String::new()),
                EntryStatus::Updated { id } => ("UPDATED", id.to_string(), String::new()),
                EntryStatus::WouldPublish => ("WOULD PUBLISH", String::new(), String::new()),
                EntryStatus::Unchanged => ("UNCHANGED", String::new(), String::new()),
                EntryStatus::Failed { stage, reason } => {
                    ("FAILED", String::new(), format!("{stage}: {reason}"))
                }
            };
            OutcomeRow {
                slug: o.slug.to_string(),
                result: result.to_owned(),
                page,
                source: o.source.clone(),
                detail,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{}", report.summary());
}
