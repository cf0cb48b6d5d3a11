use std::path::PathBuf;

use anyhow::Context;
use clap::{command, value_parser, Arg, ArgAction, Command};
use config::Config;
use log::info;
use prompt::Prompt;
use suggestion::ChatCompletionsProvider;

mod config;
mod frontmatter;
mod merge;
mod metadata;
mod prompt;
mod runner;
mod suggestion;
mod summary;

pub(crate) fn cli() -> Command {
    command!().args([
        Arg::new("files")
            .help("Changed files. Only Markdown files under --posts-dir are processed")
            .num_args(1..)
            .required(true),
        Arg::new("force")
            .help("Regenerate tags and keywords even if the post already has them")
            .short('f')
            .long("force")
            .action(ArgAction::SetTrue),
        Arg::new("dry_run")
            .help("Ask for suggestions but don't rewrite any post")
            .long("dry-run")
            .action(ArgAction::SetTrue),
        Arg::new("api_key")
            .help("API key of the suggestion provider")
            .long("api-key")
            .env("OPENAI_API_KEY")
            .hide_env_values(true),
        Arg::new("endpoint")
            .help("Chat completions endpoint")
            .long("endpoint")
            .env("FRONTGEN_ENDPOINT")
            .default_value("https://api.openai.com/v1/chat/completions"),
        Arg::new("model")
            .help("Model name")
            .long("model")
            .env("FRONTGEN_MODEL")
            .default_value("gpt-3.5-turbo"),
        Arg::new("temperature")
            .help("Sampling temperature")
            .long("temperature")
            .value_parser(value_parser!(f32))
            .default_value("0.3"),
        Arg::new("timeout")
            .help("Request timeout in seconds")
            .long("timeout")
            .value_parser(value_parser!(u64))
            .default_value("60"),
        Arg::new("author")
            .help("Author set on posts that don't have one")
            .long("author")
            .default_value(metadata::DEFAULT_AUTHOR),
        Arg::new("posts_dir")
            .help("Only files whose path contains this are processed")
            .long("posts-dir")
            .default_value("content/posts"),
        Arg::new("summary")
            .help("Where to write the run summary")
            .long("summary")
            .value_parser(value_parser!(PathBuf))
            .default_value("ai-summary.md"),
        Arg::new("prompt_template")
            .help("Handlebars template for the prompt. {{title}} and {{content}} are available")
            .long("prompt-template")
            .value_parser(value_parser!(PathBuf)),
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = cli().get_matches();
    let config = Config::from_matches(&matches)?;
    let files = runner::expand_args(matches.get_many::<String>("files").into_iter().flatten());

    let prompt = Prompt::new(config.prompt_template.as_deref())?;
    let provider = ChatCompletionsProvider::new(&config, prompt)?;

    info!("Checking {} file(s) with {}...", files.len(), config.model);
    let results = runner::run(&files, &config, &provider);

    summary::write_summary(&config.summary_path, &results)
        .with_context(|| format!("while writing summary to {:?}", config.summary_path))?;

    Ok(())
}
