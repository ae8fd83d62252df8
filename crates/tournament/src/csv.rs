//! Minimal comma-separated tables.
//!
//! Fields containing a comma, quote or line break are quoted and inner quotes
//! doubled. The reader accepts the same dialect, including quoted line
//! breaks, and reports the 1-based line where each record starts.

use std::borrow::Cow;

use crate::error::RatingError;

/// One parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Line the record starts on, 1-based
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render a header and rows. Every line ends with `\n`.
pub fn to_csv<R, F>(header: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<str>,
{
    let mut out = String::new();
    push_row(&mut out, header.iter());
    for row in rows {
        push_row(&mut out, row.iter());
    }
    out
}

fn push_row<I, F>(out: &mut String, fields: I)
where
    I: Iterator<Item = F>,
    F: AsRef<str>,
{
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field.as_ref()));
    }
    out.push('\n');
}

/// Parse every non-blank record, header included.
pub fn parse(text: &str) -> Result<Vec<Record>, RatingError> {
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut was_quoted = false;

        loop {
            let Some(c) = chars.next() else {
                if quoted {
                    return Err(RatingError::csv(start_line, "unterminated quoted field"));
                }
                break;
            };

            if quoted {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => quoted = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() && !was_quoted => {
                    quoted = true;
                    was_quoted = true;
                }
                '"' => {
                    return Err(RatingError::csv(line, "unexpected quote inside field"));
                }
                ',' => {
                    fields.push(std::mem::take(&mut field));
                    was_quoted = false;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    break;
                }
                _ if was_quoted => {
                    return Err(RatingError::csv(line, "text after closing quote"));
                }
                _ => field.push(c),
            }
        }

        let blank = fields.is_empty() && field.trim().is_empty() && !was_quoted;
        if !blank {
            fields.push(field);
            records.push(Record {
                line: start_line,
                fields,
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
#[path = "csv_tests.rs"]
mod csv_tests;
