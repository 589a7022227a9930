use super::{analyzer, load_config, open_store, topic_rows};
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;

// ---------------------------------------------------------------------------
// --status
// ---------------------------------------------------------------------------

pub fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let status = open_store(root, &config)
        .get_stock_status()
        .context("failed to read topic stock")?;

    if json {
        return print_json(&status);
    }

    println!("Topic stock");
    println!("  available: {}", status.available);
    println!("  posted:    {}", status.posted_count);
    if status.needs_refresh {
        println!(
            "  below the minimum of {}; the next run will refill it",
            config.stock.minimum
        );
    }

    if status.topics.is_empty() {
        println!("\nNo candidates in stock.");
    } else {
        println!("\nNext candidates:");
        print_table(
            &["PRIORITY", "TYPE", "TITLE", "TAGS"],
            topic_rows(&status.topics),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// --refresh
// ---------------------------------------------------------------------------

pub fn refresh(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let refill = open_store(root, &config)
        .ensure_minimum_stock(analyzer(&config))
        .context("failed to refresh topic stock")?;

    if json {
        return print_json(&refill);
    }

    if refill.refreshed {
        println!(
            "Stock refreshed: {} from history, {} fallback topics.",
            refill.added_from_history, refill.added_fallbacks
        );
    } else {
        println!("Stock already at or above the minimum.");
    }
    println!("Available topics: {}", refill.available);
    Ok(())
}
