//! Topic stock: the queue of article ideas and the log of posted ones.
//!
//! Layout (JSON backend):
//!   <data_dir>/topics.json         active topics, in insertion order
//!   <data_dir>/posted_topics.json  posted topics with `posted_at`
//!
//! Every mutation is load → modify → rewrite of the whole file. There is no
//! locking: two concurrent runs against the same data dir race, and a crash
//! inside `mark_posted` can leave a topic in both files. Both are accepted
//! for a once-a-day, single-process job.

use crate::error::{AutoblogError, Result};
use crate::topic::{title_key, PostedTopic, Topic, TopicKind};
use crate::{io, paths};
use chrono::Utc;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const STATUS_PREVIEW: usize = 5;

// ---------------------------------------------------------------------------
// TopicRepository
// ---------------------------------------------------------------------------

/// Persistence seam for the stock. Titles are matched case-insensitively.
pub trait TopicRepository {
    /// Active topics in stored order.
    fn list(&self) -> Result<Vec<Topic>>;
    fn add(&self, topics: Vec<Topic>) -> Result<()>;
    /// Remove every active topic whose title matches; returns the first removed.
    fn remove(&self, title: &str) -> Result<Option<Topic>>;
    fn posted(&self) -> Result<Vec<PostedTopic>>;
    /// Move the matching active topic into the posted log.
    fn mark_posted(&self, title: &str) -> Result<PostedTopic>;
}

// ---------------------------------------------------------------------------
// JsonTopicRepository
// ---------------------------------------------------------------------------

pub struct JsonTopicRepository {
    topics_path: PathBuf,
    posted_path: PathBuf,
}

impl JsonTopicRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            topics_path: paths::topics_path(data_dir),
            posted_path: paths::posted_topics_path(data_dir),
        }
    }
}

impl TopicRepository for JsonTopicRepository {
    fn list(&self) -> Result<Vec<Topic>> {
        io::load_json_list(&self.topics_path)
    }

    fn add(&self, topics: Vec<Topic>) -> Result<()> {
        if topics.is_empty() {
            return Ok(());
        }
        let mut all = self.list()?;
        all.extend(topics);
        io::save_json_list(&self.topics_path, &all)
    }

    fn remove(&self, title: &str) -> Result<Option<Topic>> {
        let key = title_key(title);
        let (removed, kept): (Vec<Topic>, Vec<Topic>) =
            self.list()?.into_iter().partition(|t| t.key() == key);
        if removed.is_empty() {
            return Ok(None);
        }
        io::save_json_list(&self.topics_path, &kept)?;
        Ok(removed.into_iter().next())
    }

    fn posted(&self) -> Result<Vec<PostedTopic>> {
        io::load_json_list(&self.posted_path)
    }

    fn mark_posted(&self, title: &str) -> Result<PostedTopic> {
        let key = title_key(title);
        let topic = self
            .list()?
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| AutoblogError::TopicNotFound(title.to_string()))?;

        let entry = PostedTopic {
            topic,
            posted_at: Utc::now(),
        };
        let mut posted = self.posted()?;
        posted.push(entry.clone());
        io::save_json_list(&self.posted_path, &posted)?;

        self.remove(title)?;
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// MemoryTopicRepository
// ---------------------------------------------------------------------------

/// In-process repository. Nothing is written to disk.
#[derive(Default)]
pub struct MemoryTopicRepository {
    topics: RefCell<Vec<Topic>>,
    posted: RefCell<Vec<PostedTopic>>,
}

impl MemoryTopicRepository {
    pub fn with_topics(topics: Vec<Topic>) -> Self {
        Self {
            topics: RefCell::new(topics),
            posted: RefCell::new(Vec::new()),
        }
    }
}

impl TopicRepository for MemoryTopicRepository {
    fn list(&self) -> Result<Vec<Topic>> {
        Ok(self.topics.borrow().clone())
    }

    fn add(&self, topics: Vec<Topic>) -> Result<()> {
        self.topics.borrow_mut().extend(topics);
        Ok(())
    }

    fn remove(&self, title: &str) -> Result<Option<Topic>> {
        let key = title_key(title);
        let mut topics = self.topics.borrow_mut();
        let first = topics.iter().find(|t| t.key() == key).cloned();
        topics.retain(|t| t.key() != key);
        Ok(first)
    }

    fn posted(&self) -> Result<Vec<PostedTopic>> {
        Ok(self.posted.borrow().clone())
    }

    fn mark_posted(&self, title: &str) -> Result<PostedTopic> {
        let topic = self
            .remove(title)?
            .ok_or_else(|| AutoblogError::TopicNotFound(title.to_string()))?;
        let entry = PostedTopic {
            topic,
            posted_at: Utc::now(),
        };
        self.posted.borrow_mut().push(entry.clone());
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// StockStatus / StockRefill
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StockStatus {
    pub total: usize,
    pub available: usize,
    pub posted_count: usize,
    pub needs_refresh: bool,
    /// First few available topics, in stored order.
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockRefill {
    pub refreshed: bool,
    pub added_from_history: usize,
    pub added_fallbacks: usize,
    pub available: usize,
}

// ---------------------------------------------------------------------------
// TopicStore
// ---------------------------------------------------------------------------

pub struct TopicStore<R> {
    repo: R,
    minimum: usize,
    fallback_titles: Vec<String>,
}

impl TopicStore<JsonTopicRepository> {
    pub fn open(data_dir: &Path, stock: &crate::config::StockConfig) -> Self {
        Self::new(
            JsonTopicRepository::new(data_dir),
            stock.minimum,
            stock.fallback_titles.clone(),
        )
    }
}

impl<R: TopicRepository> TopicStore<R> {
    pub fn new(repo: R, minimum: usize, fallback_titles: Vec<String>) -> Self {
        Self {
            repo,
            minimum,
            fallback_titles,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn posted_keys(&self) -> Result<HashSet<String>> {
        Ok(self.repo.posted()?.iter().map(|p| p.topic.key()).collect())
    }

    fn available(&self) -> Result<Vec<Topic>> {
        let posted = self.posted_keys()?;
        Ok(self
            .repo
            .list()?
            .into_iter()
            .filter(|t| !posted.contains(&t.key()))
            .collect())
    }

    /// Active topics that have not been posted, in stored order.
    pub fn available_topics(&self) -> Result<Vec<Topic>> {
        self.available()
    }

    pub fn posted_topics(&self) -> Result<Vec<PostedTopic>> {
        self.repo.posted()
    }

    pub fn is_already_posted(&self, title: &str) -> Result<bool> {
        Ok(self.posted_keys()?.contains(&title_key(title)))
    }

    /// Highest-priority topic that has not been posted. Ties go to the
    /// topic stored first.
    pub fn get_next_topic(&self) -> Result<Option<Topic>> {
        let mut best: Option<Topic> = None;
        for topic in self.available()? {
            if best.as_ref().map_or(true, |b| topic.priority > b.priority) {
                best = Some(topic);
            }
        }
        Ok(best)
    }

    pub fn mark_as_posted(&self, title: &str) -> Result<PostedTopic> {
        let posted = self.repo.mark_posted(title)?;
        tracing::info!(title = %posted.topic.title, "topic marked as posted");
        Ok(posted)
    }

    pub fn add_manual_topic(
        &self,
        title: &str,
        description: Option<String>,
        tags: Vec<String>,
        priority: i32,
    ) -> Result<Topic> {
        let key = title_key(title);
        if self.repo.list()?.iter().any(|t| t.key() == key) {
            return Err(AutoblogError::TopicExists(title.to_string()));
        }
        let tags = if tags.is_empty() {
            vec!["claudecode".to_string()]
        } else {
            tags
        };
        let topic = Topic {
            title: title.to_string(),
            kind: TopicKind::Manual,
            source: "手動追加".to_string(),
            priority,
            tags,
            description: description.filter(|d| !d.is_empty()),
            added_at: Some(Utc::now()),
        };
        self.repo.add(vec![topic.clone()])?;
        Ok(topic)
    }

    /// Merge candidates that are neither in stock nor posted. Returns the
    /// number added.
    pub fn refresh_topics(&self, candidates: Vec<Topic>) -> Result<usize> {
        let mut known: HashSet<String> = self.repo.list()?.iter().map(Topic::key).collect();
        let posted = self.posted_keys()?;
        let now = Utc::now();

        let mut fresh = Vec::new();
        for mut candidate in candidates {
            let key = candidate.key();
            if posted.contains(&key) || !known.insert(key) {
                continue;
            }
            candidate.added_at = Some(now);
            fresh.push(candidate);
        }

        let added = fresh.len();
        self.repo.add(fresh)?;
        tracing::info!(added, "merged new topic candidates");
        Ok(added)
    }

    /// Top the stock up to the configured minimum: first from `analyzer`,
    /// then from the fallback titles. `analyzer` only runs when needed.
    pub fn ensure_minimum_stock<F>(&self, analyzer: F) -> Result<StockRefill>
    where
        F: FnOnce() -> Result<Vec<Topic>>,
    {
        let before = self.available()?.len();
        if before >= self.minimum {
            return Ok(StockRefill {
                available: before,
                ..StockRefill::default()
            });
        }

        tracing::warn!(
            available = before,
            minimum = self.minimum,
            "topic stock is low, refilling"
        );
        let added_from_history = self.refresh_topics(analyzer()?)?;

        let mut added_fallbacks = 0;
        if self.available()?.len() < self.minimum {
            tracing::info!("history analysis was not enough, adding fallback topics");
            let posted = self.posted_keys()?;
            let active: HashSet<String> = self.repo.list()?.iter().map(Topic::key).collect();
            let mut seen = HashSet::new();
            for title in &self.fallback_titles {
                let key = title_key(title);
                if posted.contains(&key) || active.contains(&key) || !seen.insert(key) {
                    continue;
                }
                self.add_manual_topic(title, None, Vec::new(), 5)?;
                added_fallbacks += 1;
            }
        }

        Ok(StockRefill {
            refreshed: true,
            added_from_history,
            added_fallbacks,
            available: self.available()?.len(),
        })
    }

    pub fn get_stock_status(&self) -> Result<StockStatus> {
        let total = self.repo.list()?.len();
        let posted_count = self.repo.posted()?.len();
        let available = self.available()?;
        Ok(StockStatus {
            total,
            available: available.len(),
            posted_count,
            needs_refresh: available.len() < self.minimum,
            topics: available.into_iter().take(STATUS_PREVIEW).collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
