pub mod analyze;
pub mod config;
pub mod init;
pub mod metrics;
pub mod run;
pub mod stock;
pub mod topic;

use anyhow::Context;
use autoblog_core::config::Config;
use autoblog_core::extract;
use autoblog_core::store::{JsonTopicRepository, TopicStore};
use autoblog_core::topic::Topic;
use std::path::Path;

pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load autoblog.yaml")
}

pub(crate) fn open_store(root: &Path, config: &Config) -> TopicStore<JsonTopicRepository> {
    TopicStore::open(&config.data_dir(root), &config.stock)
}

/// History analysis as a stock refill source.
pub(crate) fn analyzer(config: &Config) -> impl FnOnce() -> autoblog_core::Result<Vec<Topic>> + '_ {
    move || extract::analyze(config).map(|a| a.candidates)
}

pub(crate) fn topic_rows<'a>(topics: impl IntoIterator<Item = &'a Topic>) -> Vec<Vec<String>> {
    topics
        .into_iter()
        .map(|t| {
            vec![
                t.priority.to_string(),
                t.kind.to_string(),
                t.title.clone(),
                t.tags.join(","),
            ]
        })
        .collect()
}
