//! The daily run: refill stock, pick a topic, write, publish, announce,
//! then review how earlier announcements did.
//!
//! Failures are collected into [`PipelineReport::errors`] instead of being
//! returned. Only three of them stop the run: an empty stock, a failed
//! generation, and a failed publish (the topic then stays in stock for the
//! next run).

use crate::announce::Announcer;
use crate::article::ArticleGenerator;
use crate::config::PublisherConfig;
use crate::error::Result;
use crate::publish::{self, Publisher};
use crate::store::{TopicRepository, TopicStore};
use crate::topic::Topic;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub success: bool,
    pub article_title: Option<String>,
    pub article_path: Option<PathBuf>,
    pub tweet_url: Option<String>,
    pub errors: Vec<String>,
}

pub struct DailyPipeline<'a, R> {
    store: &'a TopicStore<R>,
    articles: &'a ArticleGenerator<'a>,
    publisher: &'a dyn Publisher,
    publisher_config: &'a PublisherConfig,
    announcer: &'a Announcer<'a>,
}

impl<'a, R: TopicRepository> DailyPipeline<'a, R> {
    pub fn new(
        store: &'a TopicStore<R>,
        articles: &'a ArticleGenerator<'a>,
        publisher: &'a dyn Publisher,
        publisher_config: &'a PublisherConfig,
        announcer: &'a Announcer<'a>,
    ) -> Self {
        Self {
            store,
            articles,
            publisher,
            publisher_config,
            announcer,
        }
    }

    /// Run once. `analyzer` supplies fresh candidates if the stock is low.
    pub fn run<F>(&self, analyzer: F) -> PipelineReport
    where
        F: FnOnce() -> Result<Vec<Topic>>,
    {
        tracing::info!("daily pipeline started");
        let mut report = PipelineReport::default();
        if let Err(e) = self.run_steps(analyzer, &mut report) {
            tracing::error!(error = %e, "daily pipeline failed");
            report.errors.push(e.to_string());
            report.success = false;
        }
        report
    }

    fn run_steps<F>(&self, analyzer: F, report: &mut PipelineReport) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<Topic>>,
    {
        let refill = self.store.ensure_minimum_stock(analyzer)?;
        tracing::info!(available = refill.available, "stock checked");

        let Some(topic) = self.store.get_next_topic()? else {
            tracing::warn!("no topic available");
            report.errors.push("no topic available".to_string());
            return Ok(());
        };
        tracing::info!(title = %topic.title, "topic selected");

        let (article, path) = match self.articles.generate_and_save(&topic, true) {
            Ok(generated) => generated,
            Err(e) => {
                tracing::error!(error = %e, "article generation failed");
                report.errors.push(format!("article generation failed: {e}"));
                return Ok(());
            }
        };
        report.article_title = Some(article.title.clone());
        report.article_path = Some(path.clone());

        if let Err(e) = self.publisher.publish(&path, &article.title) {
            tracing::error!(error = %e, "publish failed, topic stays in stock");
            report.errors.push(format!("publish failed: {e}"));
            return Ok(());
        }
        self.store.mark_as_posted(&topic.title)?;

        let url = publish::article_url(self.publisher_config, &publish::slug_of(&path));
        match self
            .announcer
            .post_article_announcement(&article.title, &url, None)
        {
            Ok(announcement) => report.tweet_url = Some(announcement.tweet_url),
            Err(e) => {
                tracing::warn!(error = %e, "announcement failed");
                report.errors.push(format!("announcement failed: {e}"));
            }
        }

        match self.announcer.analyze_tweet_performance() {
            Ok(metrics) => {
                if let Some(top) = metrics.first() {
                    tracing::info!(
                        title = %top.article_title,
                        likes = top.likes,
                        retweets = top.retweets,
                        "best performing announcement"
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "performance review skipped"),
        }

        report.success = true;
        tracing::info!(title = %article.title, "daily pipeline finished");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
