use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::metadata::{FieldValue, Metadata};

mod render;
mod scalar;

use scalar::{is_item, parse_item, parse_scalar};

// pandoc-style metadata block followed by the body
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
        .dot_matches_new_line(true)
        .build()
        .unwrap()
});

#[derive(Error, Debug)]
pub(crate) enum FrontMatterError {
    #[error("invalid front matter at line {line}: {content:?}")]
    InvalidLine { line: usize, content: String },
    #[error("front matter line {line} does not belong to any field: {content:?}")]
    OrphanLine { line: usize, content: String },
    #[error("TOML front matter (+++) is not supported")]
    TomlFrontMatter,
}

/// A post split into its front matter and the untouched body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Document {
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    /// Splits `content` into front matter and body. Text without a leading
    /// `---` block is all body.
    pub fn parse(content: &str) -> Result<Self, FrontMatterError> {
        if content.lines().next().is_some_and(|l| l.trim_end() == "+++") {
            return Err(FrontMatterError::TomlFrontMatter);
        }
        let Some(caps) = HEADER_PATTERN.captures(content) else {
            return Ok(Document {
                metadata: Metadata::new(),
                body: content.to_string(),
            });
        };

        let header = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());
        // one blank line separates the block from the body
        let body = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        Ok(Document {
            metadata: parse_header(header)?,
            body: body.to_string(),
        })
    }

    pub fn render(&self) -> String {
        let mut out = render::render_header(&self.metadata);
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

struct Entry {
    key: String,
    inline: String,
    raw: Vec<String>,
}

impl Entry {
    fn finish(self, metadata: &mut Metadata) {
        let continuation = &self.raw[1..];
        let lines = continuation.iter().filter(|l| !l.trim().is_empty());
        let value = if continuation.is_empty() {
            if self.inline.is_empty() {
                FieldValue::List(vec![])
            } else {
                parse_scalar(&self.inline)
            }
        } else if self.inline.is_empty() && lines.clone().all(|l| is_item(l)) {
            FieldValue::List(lines.map(|l| parse_item(l)).collect())
        } else {
            FieldValue::Block(self.raw)
        };
        metadata.insert(self.key, value);
    }
}

fn parse_header(header: &str) -> Result<Metadata, FrontMatterError> {
    let mut metadata = Metadata::new();
    let mut current: Option<Entry> = None;
    // blank lines that only belong to the open entry if more of it follows
    let mut blanks: Vec<String> = vec![];

    for (i, line) in header.lines().enumerate() {
        // the opening delimiter is line 1
        let line_no = i + 2;
        if line.trim().is_empty() {
            if current.is_some() {
                blanks.push(line.to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            blanks.clear();
            continue;
        }

        if line.starts_with(char::is_whitespace) || is_item(line) {
            match current.as_mut() {
                Some(entry) => {
                    entry.raw.append(&mut blanks);
                    entry.raw.push(line.to_string());
                }
                None if line.trim_start().starts_with('#') => {}
                None => {
                    return Err(FrontMatterError::OrphanLine {
                        line: line_no,
                        content: line.to_string(),
                    })
                }
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':').filter(|(k, _)| !k.trim().is_empty())
        else {
            return Err(FrontMatterError::InvalidLine {
                line: line_no,
                content: line.to_string(),
            });
        };

        blanks.clear();
        if let Some(entry) = current.take() {
            entry.finish(&mut metadata);
        }
        current = Some(Entry {
            key: key.trim().to_string(),
            inline: value.trim().to_string(),
            raw: vec![line.to_string()],
        });
    }
    if let Some(entry) = current.take() {
        entry.finish(&mut metadata);
    }

    Ok(metadata)
}
