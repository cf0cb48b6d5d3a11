/// Fields with a fixed position in the rendered front matter, in output order.
pub(crate) const KNOWN_FIELDS: [&str; 10] = [
    "title",
    "date",
    "author",
    "tags",
    "keywords",
    "description",
    "showFullContent",
    "readingTime",
    "hideComments",
    "draft",
];

/// Author written into posts that don't name one.
pub(crate) const DEFAULT_AUTHOR: &str = "Editorial Team";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    /// Nested or multi-line value kept as its raw lines (key line included).
    Block(Vec<String>),
}

impl FieldValue {
    /// `true` for an empty string, or a list with no non-empty items.
    /// Whitespace counts as content.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bool(_) => false,
            FieldValue::List(items) => items.iter().all(String::is_empty),
            FieldValue::Block(lines) => lines.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Front matter fields in the order they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Metadata {
    fields: Vec<(String, FieldValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Replaces the value in place if the field exists, appends it otherwise.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(FieldValue::as_text)
    }
}
