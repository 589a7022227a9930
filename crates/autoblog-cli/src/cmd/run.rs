use super::{analyzer, load_config, open_store};
use crate::output::print_json;
use anyhow::Context;
use autoblog_core::announce::Announcer;
use autoblog_core::article::ArticleGenerator;
use autoblog_core::config::Credentials;
use autoblog_core::llm::AnthropicClient;
use autoblog_core::pipeline::DailyPipeline;
use autoblog_core::publish::GitPublisher;
use autoblog_core::social::XClient;
use std::path::Path;

// ---------------------------------------------------------------------------
// --dry-run
// ---------------------------------------------------------------------------

pub fn dry_run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let topic = open_store(root, &config)
        .get_next_topic()
        .context("failed to read topic stock")?;

    if json {
        return print_json(&serde_json::json!({ "topic": topic }));
    }

    match topic {
        Some(t) => {
            println!("Next topic: {}", t.title);
            println!("Tags:       {}", t.tags.join(", "));
            println!("Priority:   {}", t.priority);
        }
        None => println!("No topic in stock. Run with --refresh to add some."),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// default: full pipeline
// ---------------------------------------------------------------------------

/// Run the daily pipeline. Returns whether it succeeded.
pub fn run(root: &Path, json: bool) -> anyhow::Result<bool> {
    let config = load_config(root)?;
    let credentials = Credentials::from_env();
    tracing::debug!(?credentials, "credentials loaded");

    let store = open_store(root, &config);
    let text = AnthropicClient::new(&config.generator, &credentials)
        .context("failed to build the text generation client")?;
    let articles = ArticleGenerator::new(
        &config.persona,
        &config.generator,
        config.articles_dir(root),
        &text,
    );
    let publisher = GitPublisher::new(root, &config.publisher);
    let social =
        XClient::new(&config.announcer, &credentials).context("failed to build the social client")?;
    if !social.can_post() {
        tracing::warn!("social credentials are incomplete; the announcement step will fail");
    }
    let data_dir = config.data_dir(root);
    let announcer = Announcer::new(
        &config.announcer,
        &config.persona.catchphrases,
        &social,
        &data_dir,
    );

    let report = DailyPipeline::new(&store, &articles, &publisher, &config.publisher, &announcer)
        .run(analyzer(&config));

    if json {
        print_json(&report)?;
    } else if report.success {
        println!(
            "Published: {}",
            report.article_title.as_deref().unwrap_or_default()
        );
        if let Some(url) = &report.tweet_url {
            println!("Announced: {url}");
        }
        for e in &report.errors {
            println!("warning: {e}");
        }
    } else {
        println!("Pipeline failed:");
        for e in &report.errors {
            println!("  - {e}");
        }
    }
    Ok(report.success)
}
