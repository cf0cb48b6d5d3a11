use std::path::Path;

use anyhow::Context;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

/// Longest body excerpt sent to the provider, in characters.
pub(crate) const EXCERPT_CHARS: usize = 2000;

const DEFAULT_TEMPLATE: &str = r#"Analyze this Hugo blog post and suggest relevant tags and keywords.

Title: {{title}}
Content: {{content}}

Return ONLY a valid YAML structure with:
tags: [3-8 technical tags, lowercase, single words, use hyphens for compound terms]
keywords: [4-12 relevant keywords, lowercase, maximum 2 words each]

Example format:
tags: ["aws", "terraform", "automation", "cloud-storage"]
keywords: ["proxy server", "browser configuration", "cloud hosting"]
"#;

#[derive(Serialize, Debug)]
struct PromptData<'a> {
    title: &'a str,
    content: &'a str,
}

pub(crate) struct Prompt {
    handlebars: Handlebars<'static>,
}

impl Prompt {
    /// Uses the template file when given, the built-in prompt otherwise.
    pub fn new(template_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // post text goes to the model as is
        handlebars.register_escape_fn(handlebars::no_escape);
        match template_file {
            Some(path) => handlebars
                .register_template_file("prompt", path)
                .with_context(|| format!("while loading prompt template {path:?}"))?,
            None => handlebars
                .register_template_string("prompt", DEFAULT_TEMPLATE)
                .context("built-in prompt")?,
        }

        Ok(Self { handlebars })
    }

    pub fn render(&self, title: &str, content: &str) -> Result<String, RenderError> {
        self.handlebars
            .render("prompt", &PromptData { title, content })
    }
}

/// The first [`EXCERPT_CHARS`] characters of `body`.
pub(crate) fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
