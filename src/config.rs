use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::ArgMatches;

/// Everything a run needs, read once from the command line and environment.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,

    pub default_author: String,
    pub posts_dir: String,
    pub summary_path: PathBuf,
    pub prompt_template: Option<PathBuf>,

    pub force: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let api_key = matches
            .get_one::<String>("api_key")
            .filter(|k| !k.trim().is_empty())
            .cloned();
        let Some(api_key) = api_key else {
            bail!("an API key is required: pass --api-key or set OPENAI_API_KEY");
        };

        let temperature = *matches
            .get_one::<f32>("temperature")
            .context("temperature")?;
        if !(0.0..=2.0).contains(&temperature) {
            bail!("temperature must be between 0 and 2, got {temperature}");
        }

        Ok(Self {
            api_key,
            endpoint: string_arg(matches, "endpoint")?,
            model: string_arg(matches, "model")?,
            temperature,
            timeout_secs: *matches.get_one::<u64>("timeout").context("timeout")?,
            default_author: string_arg(matches, "author")?,
            posts_dir: string_arg(matches, "posts_dir")?,
            summary_path: matches
                .get_one::<PathBuf>("summary")
                .cloned()
                .context("summary")?,
            prompt_template: matches.get_one::<PathBuf>("prompt_template").cloned(),
            force: matches.get_flag("force"),
            dry_run: matches.get_flag("dry_run"),
        })
    }
}

fn string_arg(matches: &ArgMatches, id: &str) -> anyhow::Result<String> {
    matches.get_one::<String>(id).cloned().context(id.to_string())
}
