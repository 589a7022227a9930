use super::load_config;
use crate::output::{print_json, print_table};
use anyhow::Context;
use autoblog_core::announce::Announcer;
use autoblog_core::config::{Credentials, TWITTER_BEARER_TOKEN};
use autoblog_core::social::XClient;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let credentials = Credentials::from_env();
    if credentials.bearer_token.is_none() {
        tracing::warn!("{TWITTER_BEARER_TOKEN} is not set; no metrics can be fetched");
    }

    let social =
        XClient::new(&config.announcer, &credentials).context("failed to build the social client")?;
    let data_dir = config.data_dir(root);
    let announcer = Announcer::new(
        &config.announcer,
        &config.persona.catchphrases,
        &social,
        &data_dir,
    );
    let metrics = announcer
        .analyze_tweet_performance()
        .context("failed to read tweet records")?;

    if json {
        return print_json(&metrics);
    }
    if metrics.is_empty() {
        println!("No metrics available.");
        return Ok(());
    }

    let rows = metrics
        .iter()
        .map(|m| {
            vec![
                m.likes.to_string(),
                m.retweets.to_string(),
                m.replies.to_string(),
                m.impressions.to_string(),
                m.article_title.clone(),
            ]
        })
        .collect();
    print_table(&["LIKES", "RETWEETS", "REPLIES", "IMPRESSIONS", "TITLE"], rows);
    Ok(())
}
