//! Label scanner for filter-graph text.
//!
//! Walks the text the way FFmpeg's parser splits it: `;` ends a chain, `,`
//! ends a filter, single quotes protect everything up to the next quote, and
//! a backslash outside quotes escapes one character. Bracketed labels before
//! a filter's name are inputs; bracketed labels after it are outputs.

use super::GraphError;

/// One label occurrence, in the order FFmpeg links them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelUse {
    /// Input-file stream such as `0:v`.
    Stream { index: usize, spec: String },
    Consumed(String),
    Produced(String),
}

/// Scan `text` and return every label use in order.
pub fn scan_labels(text: &str) -> Result<Vec<LabelUse>, GraphError> {
    let mut uses = Vec::new();
    let mut chars = text.chars();
    // Set once the current filter's name has started.
    let mut in_body = false;
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        if in_quote {
            if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_quote = true;
                in_body = true;
            }
            '\\' => {
                chars.next();
                in_body = true;
            }
            '[' => {
                let mut label = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(ch) => label.push(ch),
                        None => return Err(GraphError::Unterminated("label")),
                    }
                }
                uses.push(classify(label, in_body));
            }
            ',' | ';' => in_body = false,
            c if c.is_whitespace() => {}
            _ => in_body = true,
        }
    }

    if in_quote {
        return Err(GraphError::Unterminated("quote"));
    }
    Ok(uses)
}

fn classify(label: String, after_name: bool) -> LabelUse {
    if let Some((index, spec)) = label.split_once(':') {
        if let Ok(index) = index.parse() {
            return LabelUse::Stream {
                index,
                spec: spec.to_string(),
            };
        }
    }
    if after_name {
        LabelUse::Produced(label)
    } else {
        LabelUse::Consumed(label)
    }
}
