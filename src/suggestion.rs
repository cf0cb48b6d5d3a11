use serde_yaml::Value;
use thiserror::Error;

mod openai;

pub(crate) use openai::ChatCompletionsProvider;

#[derive(Error, Debug)]
pub(crate) enum SuggestionError {
    #[error("could not render prompt")]
    Prompt(#[from] handlebars::RenderError),
    #[error("request to suggestion provider failed")]
    Http(#[from] reqwest::Error),
    #[error("suggestion provider returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("suggestion provider returned no content")]
    EmptyResponse,
    #[error("could not parse suggestion: {0}")]
    Parse(String),
}

/// Something that turns a post's title and excerpt into suggestion text.
pub(crate) trait SuggestionProvider {
    fn suggest(&self, title: &str, excerpt: &str) -> Result<String, SuggestionError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Suggestion {
    pub tags: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

impl Suggestion {
    /// Reads a provider reply as YAML. A fenced code block around the reply
    /// is accepted.
    pub fn parse(text: &str) -> Result<Self, SuggestionError> {
        let value: Value = serde_yaml::from_str(strip_code_fence(text))
            .map_err(|e| SuggestionError::Parse(e.to_string()))?;
        let Value::Mapping(map) = value else {
            return Err(SuggestionError::Parse(format!(
                "expected a mapping, got {}",
                describe(&value)
            )));
        };

        let tags = string_list(map.get("tags"), "tags")?;
        let keywords = string_list(map.get("keywords"), "keywords")?;
        if tags.is_none() && keywords.is_none() {
            return Err(SuggestionError::Parse(
                "neither tags nor keywords in response".to_string(),
            ));
        }

        Ok(Suggestion { tags, keywords })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the language tag line
    let rest = rest.split_once('\n').map_or("", |(_, r)| r);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn string_list(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<Vec<String>>, SuggestionError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items,
        Some(other) => {
            return Err(SuggestionError::Parse(format!(
                "{field} must be a list, got {}",
                describe(other)
            )))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(SuggestionError::Parse(format!(
                "{field} items must be strings, got {}",
                describe(other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
