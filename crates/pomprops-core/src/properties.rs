//! An ordered properties map, with the text format used by `.properties` files.
//!
//! Stored text follows the escaping rules of `java.util.Properties`, because tools that read
//! `pom.properties` out of built artifacts expect exactly that format.

use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use std::io;
use std::io::{Read, Write};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Line separator used when storing
pub const LINE_SEPARATOR: &str = "\n";

static TIMESTAMP_FORMAT: &[FormatItem] = format_description!(
    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] UTC [year]"
);

/// Key-value string pairs that remember the order they were inserted in.
#[derive(Default, Clone, Eq, PartialEq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Debug for Properties {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Options for [`Properties::store_with`]
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Written as the leading comment block
    pub comment: Option<String>,
    /// Written as a date comment after the leading comment
    pub timestamp: Option<OffsetDateTime>,
}

impl StoreOptions {
    pub fn with_comment(comment: impl AsRef<str>) -> Self {
        Self {
            comment: Some(comment.as_ref().to_string()),
            timestamp: None,
        }
    }
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a property. If the key is already present, the value is replaced but the key keeps
    /// its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stores these properties with an optional comment and no date.
    pub fn store<W: Write>(&self, writer: &mut W, comment: Option<&str>) -> io::Result<()> {
        let options = StoreOptions {
            comment: comment.map(str::to_string),
            timestamp: None,
        };
        self.store_with(writer, &options)
    }

    /// Stores these properties as `key=value` lines. The output is always pure ascii, anything
    /// else is written as `\uXXXX`.
    pub fn store_with<W: Write>(&self, writer: &mut W, options: &StoreOptions) -> io::Result<()> {
        let mut text = String::new();
        if let Some(comment) = &options.comment {
            write_comment(&mut text, comment);
        }
        if let Some(timestamp) = options.timestamp {
            text.push('#');
            text.push_str(&format_timestamp(timestamp)?);
            text.push_str(LINE_SEPARATOR);
        }
        for (key, value) in &self.entries {
            escape_into(&mut text, key, true);
            text.push('=');
            escape_into(&mut text, value, false);
            text.push_str(LINE_SEPARATOR);
        }
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }

    /// Loads properties from their text form. Bytes are read as latin-1, and escapes are
    /// resolved.
    pub fn load<R: Read>(mut reader: R) -> Result<Self, PropertiesError> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        let text: String = bytes.iter().map(|&b| b as char).collect();

        let mut properties = Properties::new();
        let mut lines = physical_lines(&text).into_iter().enumerate();
        while let Some((index, raw)) = lines.next() {
            let line = raw.trim_start_matches(is_blank);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let line_number = index + 1;
            let mut logical = line.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_key_value(&logical);
            properties.insert(unescape(key, line_number)?, unescape(value, line_number)?);
        }
        Ok(properties)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Properties::new();
        for (k, v) in iter {
            properties.insert(k, v);
        }
        properties
    }
}

/// An error occurred while loading properties
#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    #[error("Malformed \\uXXXX escape on line {line}")]
    MalformedEscape { line: usize },
    #[error(transparent)]
    IoError(#[from] io::Error),
}

fn format_timestamp(timestamp: OffsetDateTime) -> io::Result<String> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_comment(text: &mut String, comment: &str) {
    let chars: Vec<char> = comment.chars().collect();
    text.push('#');
    let mut index = 0;
    while index < chars.len() {
        let c = chars[index];
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.get(index + 1) == Some(&'\n') {
                    index += 1;
                }
                text.push_str(LINE_SEPARATOR);
                if !matches!(chars.get(index + 1), Some('#') | Some('!')) {
                    text.push('#');
                }
            }
            c if !c.is_ascii() => unicode_escape(text, c),
            c => text.push(c),
        }
        index += 1;
    }
    text.push_str(LINE_SEPARATOR);
}

fn escape_into(text: &mut String, value: &str, escape_space: bool) {
    for (index, c) in value.chars().enumerate() {
        match c {
            '\\' => text.push_str("\\\\"),
            ' ' if index == 0 || escape_space => text.push_str("\\ "),
            '\t' => text.push_str("\\t"),
            '\n' => text.push_str("\\n"),
            '\r' => text.push_str("\\r"),
            '\x0c' => text.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                text.push('\\');
                text.push(c);
            }
            c if !(' '..='~').contains(&c) => unicode_escape(text, c),
            c => text.push(c),
        }
    }
}

fn unicode_escape(text: &mut String, c: char) {
    let mut buffer = [0u16; 2];
    for unit in c.encode_utf16(&mut buffer) {
        text.push_str(&format!("\\u{:04X}", unit));
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Splits on `\n`, `\r` and `\r\n`
fn physical_lines(text: &str) -> Vec<&str> {
    let mut lines = vec![];
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\n' => {
                lines.push(&text[start..index]);
                start = index + 1;
            }
            b'\r' => {
                lines.push(&text[start..index]);
                if bytes.get(index + 1) == Some(&b'\n') {
                    index += 1;
                }
                start = index + 1;
            }
            _ => {}
        }
        index += 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                value_start = index + 1;
                has_separator = true;
                break;
            }
            c if is_blank(c) => {
                key_end = index;
                value_start = index + 1;
                break;
            }
            _ => {}
        }
    }

    let mut value = line[value_start..].trim_start_matches(is_blank);
    if !has_separator {
        if let Some(stripped) = value.strip_prefix(|c: char| c == '=' || c == ':') {
            value = stripped.trim_start_matches(is_blank);
        }
    }
    (&line[..key_end], value)
}

fn unescape(escaped: &str, line: usize) -> Result<String, PropertiesError> {
    let mut units: Vec<u16> = vec![];
    let mut buffer = [0u16; 2];
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        let resolved = if c == '\\' {
            match chars.next() {
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                        return Err(PropertiesError::MalformedEscape { line });
                    }
                    let unit = u16::from_str_radix(&hex, 16)
                        .map_err(|_| PropertiesError::MalformedEscape { line })?;
                    units.push(unit);
                    continue;
                }
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\x0c',
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };
        units.extend_from_slice(resolved.encode_utf16(&mut buffer));
    }
    String::from_utf16(&units).map_err(|_| PropertiesError::MalformedEscape { line })
}
