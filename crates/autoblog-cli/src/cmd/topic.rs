use super::{load_config, open_store, topic_rows};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TopicSubcommand {
    /// Add a topic to the stock by hand
    Add {
        title: String,
        /// What the article should cover
        #[arg(long)]
        description: Option<String>,
        /// Tag (repeatable; default: claudecode)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        priority: i32,
    },

    /// List topics in stock
    List {
        /// List posted topics instead
        #[arg(long)]
        posted: bool,
    },
}

pub fn run(root: &Path, subcmd: TopicSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TopicSubcommand::Add {
            title,
            description,
            tags,
            priority,
        } => add(root, &title, description, tags, priority, json),
        TopicSubcommand::List { posted } => list(root, posted, json),
    }
}

fn add(
    root: &Path,
    title: &str,
    description: Option<String>,
    tags: Vec<String>,
    priority: i32,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let topic = open_store(root, &config)
        .add_manual_topic(title, description, tags, priority)
        .with_context(|| format!("failed to add topic '{title}'"))?;

    if json {
        return print_json(&topic);
    }
    println!("Added topic: {} (priority {})", topic.title, topic.priority);
    Ok(())
}

fn list(root: &Path, posted: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let store = open_store(root, &config);

    if posted {
        let posted = store
            .posted_topics()
            .context("failed to read posted topics")?;
        if json {
            return print_json(&posted);
        }
        if posted.is_empty() {
            println!("Nothing posted yet.");
            return Ok(());
        }
        let rows = posted
            .iter()
            .map(|p| {
                vec![
                    p.posted_at.format("%Y-%m-%d").to_string(),
                    p.topic.title.clone(),
                ]
            })
            .collect();
        print_table(&["POSTED", "TITLE"], rows);
        return Ok(());
    }

    let topics = store
        .available_topics()
        .context("failed to read topic stock")?;
    if json {
        return print_json(&topics);
    }
    if topics.is_empty() {
        println!("No topics in stock.");
        return Ok(());
    }
    print_table(&["PRIORITY", "TYPE", "TITLE", "TAGS"], topic_rows(&topics));
    Ok(())
}
