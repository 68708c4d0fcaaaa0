use anyhow::Result;
use colored::Colorize;

use crate::application::{OutdatedAction, OutdatedEntry};
use crate::index::PackageIndex;
use crate::runtime::Runtime;

use super::config::Config;
use super::services::build_index;

const HEADINGS: [&str; 4] = ["Package", "current", "wanted", "latest"];
const NOT_AVAILABLE: &str = "n/a";

/// Print declared dependencies that are missing or behind
#[tracing::instrument(skip(runtime, config))]
pub async fn outdated<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let index = build_index(&config)?;
    run(&runtime, &index, &config).await
}

pub(crate) async fn run<R: Runtime, P: PackageIndex>(
    runtime: &R,
    index: &P,
    config: &Config,
) -> Result<()> {
    let project = config.project();
    let entries = OutdatedAction::new(runtime, &project, index).check().await?;
    if entries.is_empty() {
        return Ok(());
    }

    print_table(&rows(&entries));
    Ok(())
}

/// Plain table cells, one row per entry.
fn rows(entries: &[OutdatedEntry]) -> Vec<[String; 4]> {
    let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    entries
        .iter()
        .map(|e| {
            [
                e.name.clone(),
                cell(&e.current),
                cell(&e.wanted),
                cell(&e.latest),
            ]
        })
        .collect()
}

fn column_widths(rows: &[[String; 4]]) -> [usize; 4] {
    let mut widths = HEADINGS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn print_table(rows: &[[String; 4]]) {
    let widths = column_widths(rows);
    // Pad before coloring; escape codes have no width
    let pad = |text: &str, width: usize| format!("{:<width$}", text, width = width);

    let header: Vec<String> = HEADINGS
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(h, w).underline().to_string())
        .collect();
    println!("{}", header.join("  ").trim_end());

    for row in rows {
        let line = [
            pad(&row[0], widths[0]).green().to_string(),
            pad(&row[1], widths[1]),
            pad(&row[2], widths[2]).green().to_string(),
            pad(&row[3], widths[3]).magenta().to_string(),
        ];
        println!("{}", line.join("  ").trim_end());
    }
}
