// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Positional format-string templates filled from record fields.
//!
//! A template pairs a format string with an ordered list of record keys. Every `%s` in
//! the format is replaced, in order, by the text of the corresponding key; `%%` is a
//! literal percent sign. Any other directive is rejected when the template is compiled.
//!
//! ```
//! use chat_output::template::Template;
//!
//! let template = Template::compile("%s-%s", vec!["a".to_string(), "b".to_string()]).unwrap();
//! let record = serde_json::json!({"a": "x", "b": "y"});
//! assert_eq!(template.render(record.as_object().unwrap()), "x-y");
//! ```

use thiserror::Error;

use crate::event::Record;
use crate::resolver;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("format '{format}' expects {placeholders} value(s) but {keys} key(s) were given")]
    Arity {
        format: String,
        placeholders: usize,
        keys: usize,
    },
    #[error("invalid directive at byte {position} in format '{format}', expected %s or %%")]
    InvalidDirective { format: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder,
}

/// A format string compiled against a fixed list of record keys.
///
/// Arity is checked once in [`Template::compile`]; rendering can not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    format: String,
    keys: Vec<String>,
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(format: &str, keys: Vec<String>) -> Result<Self, TemplateError> {
        let template = Template {
            format: format.to_string(),
            segments: parse(format)?,
            keys,
        };

        // Dry run with one dummy value per key.
        let dummies = vec!["1"; template.keys.len()];
        template.substitute(&dummies)?;

        Ok(template)
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn placeholders(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder))
            .count()
    }

    /// Fills the placeholders with `values`, which must match them one to one.
    pub fn substitute<S: AsRef<str>>(&self, values: &[S]) -> Result<String, TemplateError> {
        let placeholders = self.placeholders();
        if placeholders != values.len() {
            return Err(TemplateError::Arity {
                format: self.format.clone(),
                placeholders,
                keys: values.len(),
            });
        }

        let mut values = values.iter();
        let mut out = String::with_capacity(self.format.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder => {
                    if let Some(value) = values.next() {
                        out.push_str(value.as_ref());
                    }
                }
            }
        }
        Ok(out)
    }

    /// Renders the template against a record. Missing keys render as empty text.
    pub fn render(&self, record: &Record) -> String {
        let mut keys = self.keys.iter();
        let mut out = String::with_capacity(self.format.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder => {
                    if let Some(key) = keys.next() {
                        out.push_str(&resolver::resolve(record, key));
                    }
                }
            }
        }
        out
    }
}

fn parse(format: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = format.char_indices();

    while let Some((position, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '%')) => literal.push('%'),
            Some((_, 's')) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder);
            }
            _ => {
                return Err(TemplateError::InvalidDirective {
                    format: format.to_string(),
                    position,
                })
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
