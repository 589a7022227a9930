//! Redaction of sensitive names and paths in mined history text.
//!
//! Rules apply in a fixed order: excluded directories first, then
//! sensitive keywords, then the generic home-directory rewrite.

use crate::config::SanitizeConfig;
use crate::error::Result;
use regex::{NoExpand, Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct Sanitizer {
    excluded_paths: Vec<Regex>,
    excluded_path_token: String,
    keywords: Vec<Regex>,
    keyword_placeholder: String,
    home_paths: Vec<Regex>,
}

impl Sanitizer {
    pub fn new(config: &SanitizeConfig) -> Result<Self> {
        let excluded_paths = config
            .excluded_path_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let keywords = config
            .sensitive_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(k)))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let home_paths = config
            .home_path_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            excluded_paths,
            excluded_path_token: config.excluded_path_token.clone(),
            keywords,
            keyword_placeholder: config.keyword_placeholder.clone(),
            home_paths,
        })
    }

    pub fn sanitize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.excluded_paths {
            out = re
                .replace_all(&out, NoExpand(&self.excluded_path_token))
                .into_owned();
        }
        for re in &self.keywords {
            out = re
                .replace_all(&out, NoExpand(&self.keyword_placeholder))
                .into_owned();
        }
        for re in &self.home_paths {
            out = re.replace_all(&out, "~/").into_owned();
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
