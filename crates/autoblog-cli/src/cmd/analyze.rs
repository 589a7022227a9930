use super::{load_config, topic_rows};
use crate::output::{print_json, print_table};
use anyhow::Context;
use autoblog_core::extract;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let analysis = extract::analyze(&config).context("history analysis failed")?;

    if json {
        return print_json(&analysis);
    }

    println!(
        "Analysed {} history entries, {} days of stats, {} shell commands (last {} days).",
        analysis.history_count, analysis.stats_days, analysis.shell_count, config.sources.days
    );
    if analysis.candidates.is_empty() {
        println!("No topic candidates found.");
        return Ok(());
    }
    println!();
    print_table(
        &["PRIORITY", "TYPE", "TITLE", "TAGS"],
        topic_rows(&analysis.candidates),
    );
    Ok(())
}
