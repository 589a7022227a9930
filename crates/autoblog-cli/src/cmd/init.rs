use anyhow::Context;
use autoblog_core::config::{
    Config, ANTHROPIC_API_KEY, TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_TOKEN_SECRET,
    TWITTER_BEARER_TOKEN, TWITTER_CONSUMER_KEY, TWITTER_CONSUMER_SECRET,
};
use autoblog_core::{io, paths};
use std::path::Path;

const ENV_EXAMPLE_FILE: &str = ".env.example";

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing autoblog in: {}", root.display());

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load autoblog.yaml")?
    } else {
        let config = Config::default();
        config.save(root).context("failed to write autoblog.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        config
    };

    for dir in [config.data_dir(root), config.articles_dir(root)] {
        let existed = dir.is_dir();
        io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let shown = dir.strip_prefix(root).unwrap_or(&dir).display().to_string();
        if existed {
            println!("  exists:  {shown}/");
        } else {
            println!("  created: {shown}/");
        }
    }

    let example: String = [
        ANTHROPIC_API_KEY,
        TWITTER_CONSUMER_KEY,
        TWITTER_CONSUMER_SECRET,
        TWITTER_ACCESS_TOKEN,
        TWITTER_ACCESS_TOKEN_SECRET,
        TWITTER_BEARER_TOKEN,
    ]
    .iter()
    .map(|key| format!("{key}=\n"))
    .collect();
    let example_path = root.join(ENV_EXAMPLE_FILE);
    if io::write_if_missing(&example_path, example.as_bytes())
        .with_context(|| format!("failed to write {ENV_EXAMPLE_FILE}"))?
    {
        println!("  created: {ENV_EXAMPLE_FILE}");
    }

    println!("\nCopy {ENV_EXAMPLE_FILE} to {} and fill in the credentials.", paths::ENV_FILE);
    Ok(())
}
