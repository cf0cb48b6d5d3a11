use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info, warn};

use crate::{
    config::Config,
    frontmatter::Document,
    merge::{apply_suggestion, should_process},
    prompt::excerpt,
    suggestion::{Suggestion, SuggestionProvider},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Applied,
    WouldApply,
    Skipped,
    Failed(String),
}

/// What happened to one post, rendered as its summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileResult {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl fmt::Display for FileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.outcome {
            Outcome::Applied => write!(f, "Applied AI suggestions to {path}"),
            Outcome::WouldApply => write!(f, "Would apply AI suggestions to {path}"),
            Outcome::Skipped => write!(f, "Skipped {path} - already has tags and keywords"),
            Outcome::Failed(message) => write!(f, "Error processing {path}: {message}"),
        }
    }
}

/// Splits every argument on whitespace, so a single space-separated list of
/// changed files works as well as separate arguments.
pub(crate) fn expand_args<I, S>(args: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .flat_map(|arg| {
            arg.as_ref()
                .split_whitespace()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Markdown files under the posts directory.
pub(crate) fn is_candidate(path: &Path, posts_dir: &str) -> bool {
    let path = path.to_string_lossy().replace('\\', "/");
    path.ends_with(".md") && path.contains(posts_dir.trim_end_matches('/'))
}

fn process_file(
    path: &Path,
    config: &Config,
    provider: &dyn SuggestionProvider,
) -> anyhow::Result<Outcome> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("while reading {path:?}"))?;
    let mut document =
        Document::parse(&content).with_context(|| format!("while parsing {path:?}"))?;

    if !should_process(&document.metadata, config.force) {
        return Ok(Outcome::Skipped);
    }

    let title = document.metadata.title().unwrap_or("Untitled").to_string();
    let reply = provider.suggest(&title, excerpt(&document.body))?;
    let suggestion = Suggestion::parse(&reply)?;
    debug!("{path:?}: {suggestion:?}");

    apply_suggestion(&mut document.metadata, &suggestion, &config.default_author);
    if config.dry_run {
        return Ok(Outcome::WouldApply);
    }
    std::fs::write(path, document.render()).with_context(|| format!("while writing {path:?}"))?;

    Ok(Outcome::Applied)
}

/// Processes posts one at a time. A failing post is recorded and the rest
/// still run.
pub(crate) fn run(
    paths: &[PathBuf],
    config: &Config,
    provider: &dyn SuggestionProvider,
) -> Vec<FileResult> {
    let mut results = vec![];
    for path in paths {
        if !is_candidate(path, &config.posts_dir) {
            debug!("{path:?} is not a post. ignoring...");
            continue;
        }

        // keep each summary bullet on one line
        let outcome = process_file(path, config, provider).unwrap_or_else(|e| {
            Outcome::Failed(format!("{e:#}").split_whitespace().collect::<Vec<_>>().join(" "))
        });
        let result = FileResult {
            path: path.clone(),
            outcome,
        };
        match &result.outcome {
            Outcome::Failed(_) => warn!("{result}"),
            _ => info!("{result}"),
        }
        println!("{result}");
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fs};

    use tempfile::TempDir;

    use super::*;
    use crate::{metadata::DEFAULT_AUTHOR, suggestion::SuggestionError};

    /// Replies from a queue and records what it was asked.
    struct FakeProvider {
        replies: RefCell<Vec<Result<String, SuggestionError>>>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl FakeProvider {
        fn new(replies: Vec<Result<String, SuggestionError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                calls: RefCell::new(vec![]),
            }
        }
    }

    impl SuggestionProvider for FakeProvider {
        fn suggest(&self, title: &str, excerpt: &str) -> Result<String, SuggestionError> {
            self.calls
                .borrow_mut()
                .push((title.to_string(), excerpt.to_string()));
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or(Err(SuggestionError::EmptyResponse))
        }
    }

    fn config() -> Config {
        Config {
            api_key: "sk-test".to_string(),
            endpoint: "http://localhost".to_string(),
            model: "test".to_string(),
            temperature: 0.3,
            timeout_secs: 1,
            default_author: DEFAULT_AUTHOR.to_string(),
            posts_dir: "content/posts".to_string(),
            summary_path: PathBuf::from("ai-summary.md"),
            prompt_template: None,
            force: false,
            dry_run: false,
        }
    }

    fn write_post(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        let path = posts.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const REPLY: &str = "tags: [\"go\", \"grpc\"]\nkeywords: [\"network service\"]";

    #[test]
    fn applies_and_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = write_post(
            &dir,
            "intro.md",
            "---\ntitle: Intro\ntags: []\nkeywords: []\n---\n\nHello gRPC.\n",
        );
        let provider = FakeProvider::new(vec![Ok(REPLY.to_string())]);

        let results = run(&[path.clone()], &config(), &provider);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::Applied);
        assert_eq!(
            provider.calls.borrow()[0],
            ("Intro".to_string(), "Hello gRPC.\n".to_string())
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!(
                "---\ntitle: Intro\nauthor: {DEFAULT_AUTHOR}\n{}{}---\n\nHello gRPC.\n",
                "tags:\n  - go\n  - grpc\n",
                "keywords:\n  - network service\n",
            )
        );
    }

    #[test]
    fn skips_populated_and_honors_force() {
        let dir = TempDir::new().unwrap();
        let content = "---\ntitle: Done\ntags: [a]\nkeywords: [b]\n---\n\nbody\n";
        let path = write_post(&dir, "done.md", content);

        let provider = FakeProvider::new(vec![]);
        let results = run(&[path.clone()], &config(), &provider);
        assert_eq!(results[0].outcome, Outcome::Skipped);
        assert!(provider.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);

        let provider = FakeProvider::new(vec![Ok(REPLY.to_string())]);
        let forced = Config {
            force: true,
            ..config()
        };
        let results = run(&[path.clone()], &forced, &provider);
        assert_eq!(results[0].outcome, Outcome::Applied);
        assert!(fs::read_to_string(&path).unwrap().contains("  - grpc\n"));
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<_> = ["one.md", "two.md", "three.md"]
            .iter()
            .map(|name| write_post(&dir, name, "---\ntitle: Post\n---\n\nbody\n"))
            .collect();
        let provider = FakeProvider::new(vec![
            Ok(REPLY.to_string()),
            Err(SuggestionError::Parse("rate limited".to_string())),
            Ok(REPLY.to_string()),
        ]);

        let results = run(&paths, &config(), &provider);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].outcome, Outcome::Applied);
        assert!(matches!(&results[1].outcome, Outcome::Failed(m) if m.contains("rate limited")));
        assert_eq!(results[2].outcome, Outcome::Applied);
        assert!(results[1].to_string().starts_with("Error processing "));
        assert!(fs::read_to_string(&paths[1]).unwrap().starts_with("---\ntitle: Post\n---\n"));
        assert!(fs::read_to_string(&paths[2]).unwrap().contains("  - go\n"));
    }

    #[test]
    fn malformed_reply_and_missing_file_are_errors() {
        let dir = TempDir::new().unwrap();
        let good = write_post(&dir, "good.md", "---\ntitle: Good\n---\n\nbody\n");
        let missing = dir.path().join("content/posts/missing.md");
        let provider = FakeProvider::new(vec![Ok("I cannot help with that.".to_string())]);

        let results = run(&[good.clone(), missing], &config(), &provider);

        assert!(matches!(
            &results[0].outcome,
            Outcome::Failed(m) if m.contains("could not parse suggestion")
        ));
        assert!(matches!(
            &results[1].outcome,
            Outcome::Failed(m) if m.contains("while reading")
        ));
        assert_eq!(
            fs::read_to_string(&good).unwrap(),
            "---\ntitle: Good\n---\n\nbody\n"
        );
    }

    #[test]
    fn toml_post_is_reported_and_left_alone() {
        let dir = TempDir::new().unwrap();
        let content = "+++\ntitle = \"Hello\"\ntags = [\"a\"]\n+++\n\nbody\n";
        let path = write_post(&dir, "hugo.md", content);
        let provider = FakeProvider::new(vec![Ok(REPLY.to_string())]);

        let results = run(&[path.clone()], &config(), &provider);

        assert!(matches!(
            &results[0].outcome,
            Outcome::Failed(m) if m.contains("TOML front matter")
        ));
        assert!(provider.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn provider_error_body_stays_on_one_line() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<_> = ["a.md", "b.md"]
            .iter()
            .map(|name| write_post(&dir, name, "---\ntitle: Post\n---\n\nbody\n"))
            .collect();
        let provider = FakeProvider::new(vec![
            Err(SuggestionError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "{\n  \"error\": {\n    \"code\": 401\n  }\n}".to_string(),
            }),
            Ok(REPLY.to_string()),
        ]);

        let results = run(&paths, &config(), &provider);
        let summary = crate::summary::render_summary(&results);

        assert_eq!(summary.lines().count(), 4);
        assert!(results[0].to_string().contains("401 Unauthorized: { \"error\": {"));
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = TempDir::new().unwrap();
        let content = "no front matter here\n";
        let path = write_post(&dir, "plain.md", content);
        let provider = FakeProvider::new(vec![Ok(REPLY.to_string())]);
        let dry = Config {
            dry_run: true,
            ..config()
        };

        let results = run(&[path.clone()], &dry, &provider);

        assert_eq!(results[0].outcome, Outcome::WouldApply);
        assert_eq!(provider.calls.borrow()[0].0, "Untitled");
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn ignores_non_posts() {
        let provider = FakeProvider::new(vec![]);
        let paths = expand_args(["README.md content/posts/a.txt", "docs/content/page.md"]);
        assert_eq!(paths.len(), 3);
        assert!(run(&paths, &config(), &provider).is_empty());
    }

    #[test]
    fn candidates() {
        assert!(is_candidate(Path::new("content/posts/a.md"), "content/posts"));
        assert!(is_candidate(Path::new("./site/content/posts/2024/a.md"), "content/posts/"));
        assert!(!is_candidate(Path::new("content/posts/a.markdown"), "content/posts"));
        assert!(!is_candidate(Path::new("content/pages/a.md"), "content/posts"));
    }

    #[test]
    fn result_lines() {
        let line = |outcome| {
            FileResult {
                path: PathBuf::from("content/posts/a.md"),
                outcome,
            }
            .to_string()
        };
        assert_eq!(line(Outcome::Applied), "Applied AI suggestions to content/posts/a.md");
        assert_eq!(
            line(Outcome::Skipped),
            "Skipped content/posts/a.md - already has tags and keywords"
        );
        assert_eq!(
            line(Outcome::Failed("boom".into())),
            "Error processing content/posts/a.md: boom"
        );
    }
}
