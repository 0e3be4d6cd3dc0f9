//! Extractor templates: pulling named, typed fields out of matched URLs.
//!
//! An extractor template is the secondary pattern a client declares next
//! to its URL template. Everything outside braces is literal text; brace
//! fields describe the variable parts in order:
//!
//! - `{}` — filler, matched and ignored;
//! - `{4d}` / `{:8d}` — unnamed fixed-width integer;
//! - `{3w}` — unnamed fixed-width word;
//! - `{Level:w}` / `{Level:d}` — named variable-width word / integer;
//! - `{Resolution:5w}` / `{SatelliteNumber:02d}` — named fixed-width;
//! - `{Band:.2w}` — named exact-width, case-preserved word.
//!
//! Variable-width fields compile to lazy groups, so a following literal
//! separator terminates them.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use crate::error::{ScrapeError, ScrapeResult};

/// Kind of one extractor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unnamed positional filler, ignored after matching.
    Filler,
    /// Integer of the given digit width; `None` means variable width.
    Digits { width: Option<usize> },
    /// Word (letters, digits, underscore) of the given width.
    Word { width: Option<usize> },
}

/// One field of a compiled extractor template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Option<String>,
    pub kind: FieldKind,
}

/// A typed value extracted from a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValue {
    /// Parsed integer, keeping the raw matched text so fixed widths
    /// (for example two-digit years) can be reconstructed.
    Int { value: i64, raw: String },
    Text { value: String },
}

impl FieldValue {
    /// The matched text regardless of type.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Int { raw, .. } => raw,
            FieldValue::Text { value } => value,
        }
    }
}

/// One extracted value in template order. `name` is `None` for unnamed
/// sized fields; fillers produce no entry at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedField {
    pub name: Option<String>,
    pub value: FieldValue,
}

/// A compiled extractor template. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct ExtractorPattern {
    template: String,
    fields: Vec<FieldSpec>,
    regex: Regex,
}

impl ExtractorPattern {
    /// Compile a template into ordered field specs and a matching regex.
    pub fn compile(template: &str) -> ScrapeResult<Self> {
        let mut fields = Vec::new();
        let mut source = String::from("^");
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }
            let mut spec = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(inner) => spec.push(inner),
                    None => {
                        return Err(ScrapeError::MalformedExtractor {
                            field: spec,
                            template: template.to_string(),
                        });
                    }
                }
            }
            source.push_str(&regex::escape(&literal));
            literal.clear();

            let field = parse_field(&spec).ok_or_else(|| ScrapeError::MalformedExtractor {
                field: spec.clone(),
                template: template.to_string(),
            })?;
            source.push_str(&group_source(&field));
            fields.push(field);
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        tracing::debug!(template, fields = fields.len(), "compiled extractor pattern");
        Ok(Self {
            template: template.to_string(),
            fields,
            regex: Regex::new(&source)?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The ordered field specs, fillers included.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of capturing groups, for positional-agreement checks
    /// against a URL pattern's matcher.
    pub fn group_count(&self) -> usize {
        self.fields.len()
    }

    /// Match a URL and pull out its fields, or `None` on no match.
    ///
    /// Digit fields parse as integers; a digit run too long for `i64`
    /// fails the match. Fillers are dropped from the result.
    pub fn extract(&self, url: &str) -> Option<Vec<ExtractedField>> {
        let Some(captures) = self.regex.captures(url) else {
            tracing::trace!(template = %self.template, %url, "url rejected by extractor");
            return None;
        };
        let mut out = Vec::new();
        for (index, field) in self.fields.iter().enumerate() {
            let text = captures.get(index + 1)?.as_str();
            let value = match field.kind {
                FieldKind::Filler => continue,
                FieldKind::Digits { .. } => FieldValue::Int {
                    value: text.parse().ok()?,
                    raw: text.to_string(),
                },
                FieldKind::Word { .. } => FieldValue::Text {
                    value: text.to_string(),
                },
            };
            out.push(ExtractedField {
                name: field.name.clone(),
                value,
            });
        }
        Some(out)
    }
}

fn parse_field(spec: &str) -> Option<FieldSpec> {
    if spec.is_empty() {
        return Some(FieldSpec {
            name: None,
            kind: FieldKind::Filler,
        });
    }

    let (name, format) = match spec.split_once(':') {
        Some(("", format)) => (None, format),
        Some((name, format)) => {
            if !is_identifier(name) {
                return None;
            }
            (Some(name.to_string()), format)
        }
        None => {
            if is_identifier(spec) {
                // {Name} with no format: a named variable-width word.
                return Some(FieldSpec {
                    name: Some(spec.to_string()),
                    kind: FieldKind::Word { width: None },
                });
            }
            (None, spec)
        }
    };

    let format = format.strip_prefix('.').unwrap_or(format);
    let (width_text, kind_char) = format.split_at(format.len().checked_sub(1)?);
    let width = if width_text.is_empty() {
        None
    } else {
        // Leading zeros ({SatelliteNumber:02d}) are padding, not octal.
        Some(width_text.parse::<usize>().ok().filter(|w| *w > 0)?)
    };
    let kind = match kind_char {
        "d" => FieldKind::Digits { width },
        "w" => FieldKind::Word { width },
        _ => return None,
    };
    Some(FieldSpec { name, kind })
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn group_source(field: &FieldSpec) -> String {
    match field.kind {
        FieldKind::Filler => r"(.*?)".to_string(),
        FieldKind::Digits { width: Some(w) } => format!(r"(\d{{{w}}})"),
        FieldKind::Digits { width: None } => r"(\d+?)".to_string(),
        FieldKind::Word { width: Some(w) } => format!(r"(\w{{{w}}})"),
        FieldKind::Word { width: None } => r"(\w+?)".to_string(),
    }
}

/// Static per-archive metadata merged into every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaticMeta {
    pub source: &'static str,
    pub provider: &'static str,
    pub instrument: &'static str,
    pub physobs: &'static str,
}

/// A named field on a record, possibly normalized through the owning
/// client's attribute registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: FieldValue,
    /// False when the value was absent from the client's registry; the
    /// verbatim value is kept rather than rejected so newly published
    /// archive values do not break extraction.
    pub validated: bool,
}

/// One successfully matched and extracted archive URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub bucket: NaiveDateTime,
    pub url: String,
    pub fields: Vec<RecordField>,
    pub meta: StaticMeta,
}

impl Record {
    /// Look up a named field.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Sort records ascending by bucket time. The sort is stable, so ties
/// within one bucket preserve discovery order.
pub fn collect_records(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| r.bucket);
    records
}
