//! Position record parser
//!
//! The companion mod rewrites a single line on every tick it reports:
//!
//! ```text
//! x=10.0,y=20.0,z=0,surface=1,player=7,server="saveA"
//! ```
//!
//! Fields may come in any order. The server name is either a quoted string
//! (`\"` and `\\` escapes), a length-prefixed string (`server=5:saveA`) or a
//! bare token. Parsing never panics; every failure is classified so the
//! session can tell "no new data this poll" apart from a broken file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{FIELD_DELIMITER, KEY_VALUE_SEPARATOR, RECORD_FIELD_COUNT};
use super::types::{FileSnapshot, ParsedRecord};

const COORDINATE_KEYS: [&str; 3] = ["x", "y", "z"];

// =============================================================================
// GRAMMAR
// =============================================================================

/// Delimiters of the record line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordGrammar {
    /// Separates fields
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Separates a field's key from its value
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_delimiter() -> char {
    FIELD_DELIMITER
}

fn default_separator() -> char {
    KEY_VALUE_SEPARATOR
}

impl Default for RecordGrammar {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            separator: default_separator(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Why a snapshot did not yield a record
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    /// Blank file, or a record cut short before its coordinates
    #[error("no coordinates in position file")]
    NoCoordinates,

    /// The mod rewrote the file while it was being read
    #[error("read {read} bytes but the file reported {declared}")]
    ReadLengthMismatch { declared: u64, read: u64 },

    #[error("malformed record: {0}")]
    Malformed(#[from] MalformedReason),
}

impl RecordError {
    /// True for the transient conditions that only mean "nothing new this poll"
    pub fn is_no_new_data(&self) -> bool {
        matches!(
            self,
            RecordError::NoCoordinates | RecordError::ReadLengthMismatch { .. }
        )
    }
}

/// Structural problems with a record line
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedReason {
    #[error("contents are not valid UTF-8")]
    NotUtf8,

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("empty field")]
    EmptyField,

    #[error("field {0:?} has no key/value separator")]
    MissingSeparator(String),

    #[error("unexpected text after value: {0:?}")]
    TrailingText(String),

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("duplicate field {0:?}")]
    DuplicateField(String),

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("field {field} is not a valid number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("unterminated quoted string")]
    UnterminatedQuote,

    #[error("string declared {declared} bytes but has {actual}")]
    StringLength { declared: usize, actual: usize },
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a file snapshot.
///
/// A torn read is reported before anything else: its bytes are meaningless.
pub fn parse_snapshot(
    snapshot: &FileSnapshot,
    grammar: &RecordGrammar,
) -> Result<ParsedRecord, RecordError> {
    if snapshot.is_torn() {
        return Err(RecordError::ReadLengthMismatch {
            declared: snapshot.declared_len,
            read: snapshot.bytes.len() as u64,
        });
    }

    let text = std::str::from_utf8(&snapshot.bytes).map_err(|_| MalformedReason::NotUtf8)?;
    parse_record(text, grammar)
}

/// Parse the last non-blank line of `text` as a record.
pub fn parse_record(text: &str, grammar: &RecordGrammar) -> Result<ParsedRecord, RecordError> {
    let Some(line) = text.lines().map(str::trim).rev().find(|l| !l.is_empty()) else {
        return Err(RecordError::NoCoordinates);
    };

    // A write cut short can break the grammar anywhere; without a complete
    // coordinate triple it is no data rather than a broken record.
    let fields = match tokenize(line, grammar) {
        Ok(fields) => fields,
        Err(_) if !has_coordinate_triple(line, grammar) => return Err(RecordError::NoCoordinates),
        Err(reason) => return Err(reason.into()),
    };

    let has_coordinates = COORDINATE_KEYS
        .iter()
        .all(|key| fields.iter().any(|f| f.key == *key));
    if !has_coordinates {
        return Err(RecordError::NoCoordinates);
    }

    if fields.len() != RECORD_FIELD_COUNT {
        return Err(MalformedReason::FieldCount {
            expected: RECORD_FIELD_COUNT,
            found: fields.len(),
        }
        .into());
    }

    Ok(build_record(fields)?)
}

/// Lenient scan for well-formed `x`, `y` and `z` fields
fn has_coordinate_triple(line: &str, grammar: &RecordGrammar) -> bool {
    COORDINATE_KEYS.iter().all(|key| {
        line.split(grammar.delimiter).any(|field| {
            field
                .split_once(grammar.separator)
                .filter(|(k, _)| k.trim() == *key)
                .and_then(|(_, v)| v.trim().parse::<f32>().ok())
                .is_some_and(f32::is_finite)
        })
    })
}

fn build_record(fields: Vec<Field<'_>>) -> Result<ParsedRecord, MalformedReason> {
    let mut x = None;
    let mut y = None;
    let mut z = None;
    let mut surface = None;
    let mut player = None;
    let mut server = None;

    for field in fields {
        let duplicate = match field.key {
            "x" => x.replace(field.value.float("x")?).is_some(),
            "y" => y.replace(field.value.float("y")?).is_some(),
            "z" => z.replace(field.value.float("z")?).is_some(),
            "surface" => surface.replace(field.value.int("surface")?).is_some(),
            "player" => player.replace(field.value.int("player")?).is_some(),
            "server" => server.replace(field.value.into_text()).is_some(),
            other => return Err(MalformedReason::UnknownField(other.to_string())),
        };
        if duplicate {
            return Err(MalformedReason::DuplicateField(field.key.to_string()));
        }
    }

    Ok(ParsedRecord {
        x: x.ok_or(MalformedReason::MissingField("x"))?,
        y: y.ok_or(MalformedReason::MissingField("y"))?,
        z: z.ok_or(MalformedReason::MissingField("z"))?,
        surface: surface.ok_or(MalformedReason::MissingField("surface"))?,
        player: player.ok_or(MalformedReason::MissingField("player"))?,
        server: server.ok_or(MalformedReason::MissingField("server"))?,
    })
}

// =============================================================================
// TOKENIZER
// =============================================================================

struct Field<'a> {
    key: &'a str,
    value: Value<'a>,
}

enum Value<'a> {
    /// Unquoted token, trimmed
    Bare(&'a str),
    /// Quoted or length-prefixed string, unescaped
    Text(String),
}

impl Value<'_> {
    fn float(&self, field: &'static str) -> Result<f32, MalformedReason> {
        let parsed = match self {
            Value::Bare(s) => s.parse::<f32>().ok().filter(|v| v.is_finite()),
            Value::Text(_) => None,
        };
        parsed.ok_or_else(|| self.not_a_number(field))
    }

    fn int(&self, field: &'static str) -> Result<i32, MalformedReason> {
        let parsed = match self {
            Value::Bare(s) => s.parse::<i32>().ok(),
            Value::Text(_) => None,
        };
        parsed.ok_or_else(|| self.not_a_number(field))
    }

    fn not_a_number(&self, field: &'static str) -> MalformedReason {
        MalformedReason::NotANumber {
            field,
            value: self.as_str().to_string(),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Value::Bare(s) => s,
            Value::Text(s) => s,
        }
    }

    fn into_text(self) -> String {
        match self {
            Value::Bare(s) => s.to_string(),
            Value::Text(s) => s,
        }
    }
}

fn tokenize<'a>(line: &'a str, grammar: &RecordGrammar) -> Result<Vec<Field<'a>>, MalformedReason> {
    let mut fields = Vec::new();
    let mut rest = line;

    loop {
        if rest.trim().is_empty() {
            return Err(MalformedReason::EmptyField);
        }

        let key_end = rest
            .find(grammar.separator)
            .filter(|&i| !rest[..i].contains(grammar.delimiter));
        let Some(key_end) = key_end else {
            let field = rest.split(grammar.delimiter).next().unwrap_or(rest);
            return Err(MalformedReason::MissingSeparator(field.trim().to_string()));
        };

        let key = rest[..key_end].trim();
        let value_src = rest[key_end + grammar.separator.len_utf8()..].trim_start();
        let (value, remainder) = read_value(value_src, grammar.delimiter)?;
        fields.push(Field { key, value });

        let remainder = remainder.trim_start();
        if remainder.is_empty() {
            return Ok(fields);
        }
        match remainder.strip_prefix(grammar.delimiter) {
            Some(next) => rest = next,
            None => return Err(MalformedReason::TrailingText(remainder.to_string())),
        }
    }
}

/// Read one value; returns it with the unconsumed input.
fn read_value(src: &str, delimiter: char) -> Result<(Value<'_>, &str), MalformedReason> {
    if let Some(body) = src.strip_prefix('"') {
        return read_quoted(body);
    }

    // The declared length may span delimiters; what follows must end the field.
    if let Some((declared, text)) = split_length_prefix(src) {
        if declared > text.len() || !text.is_char_boundary(declared) {
            return Err(MalformedReason::StringLength {
                declared,
                actual: text.len(),
            });
        }
        let rest = &text[declared..];
        let trailing = rest.find(delimiter).unwrap_or(rest.len());
        if !rest[..trailing].trim().is_empty() {
            return Err(MalformedReason::StringLength {
                declared,
                actual: declared + trailing,
            });
        }
        return Ok((Value::Text(text[..declared].to_string()), rest));
    }

    let end = src.find(delimiter).unwrap_or(src.len());
    Ok((Value::Bare(src[..end].trim()), &src[end..]))
}

fn read_quoted(body: &str) -> Result<(Value<'_>, &str), MalformedReason> {
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            '"' => return Ok((Value::Text(out), &body[i + 1..])),
            c => out.push(c),
        }
    }
    Err(MalformedReason::UnterminatedQuote)
}

/// Split `N:text` into (N, text)
fn split_length_prefix(src: &str) -> Option<(usize, &str)> {
    let digits = src.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = src[digits..].strip_prefix(':')?;
    let declared = src[..digits].parse().ok()?;
    Some((declared, text))
}
