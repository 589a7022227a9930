pub mod announce;
pub mod article;
pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod io;
pub mod llm;
pub mod oauth;
pub mod paths;
pub mod pipeline;
pub mod publish;
pub mod sanitize;
pub mod social;
pub mod store;
pub mod topic;

pub use error::{AutoblogError, Result};
