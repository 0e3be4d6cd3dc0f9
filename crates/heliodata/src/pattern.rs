//! URL template compilation, rendering, and time extraction.
//!
//! A URL template mixes strftime-style date directives (`%Y`, `%m`, `%d`,
//! ...), literal regex fragments for non-date variability (for example
//! `go(\d){2}` for a satellite number), and fixed text. Compilation turns
//! the template into a validating matcher plus a renderer that fills the
//! directives for one time bucket. Templates may also carry `{name}`
//! substitution slots resolved from a key/value table at compile time,
//! for archives whose paths vary on a non-date axis.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde::Serialize;

use crate::error::{ScrapeError, ScrapeResult};
use crate::timerange::{Resolution, TimeRange};

/// One date directive recognized in a URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Year,
    TwoDigitYear,
    Month,
    Day,
    DayOfYear,
    Hour,
    Minute,
    Second,
}

impl Directive {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'Y' => Some(Directive::Year),
            'y' => Some(Directive::TwoDigitYear),
            'm' => Some(Directive::Month),
            'd' => Some(Directive::Day),
            'j' => Some(Directive::DayOfYear),
            'H' => Some(Directive::Hour),
            'M' => Some(Directive::Minute),
            'S' => Some(Directive::Second),
            _ => None,
        }
    }

    fn width(self) -> usize {
        match self {
            Directive::Year => 4,
            Directive::DayOfYear => 3,
            _ => 2,
        }
    }

    fn resolution(self) -> Resolution {
        match self {
            Directive::Year | Directive::TwoDigitYear => Resolution::Year,
            Directive::Month => Resolution::Month,
            Directive::Day | Directive::DayOfYear => Resolution::Day,
            Directive::Hour => Resolution::Hour,
            Directive::Minute => Resolution::Minute,
            Directive::Second => Resolution::Second,
        }
    }

    fn render(self, t: NaiveDateTime) -> String {
        match self {
            Directive::Year => format!("{:04}", t.year()),
            Directive::TwoDigitYear => format!("{:02}", t.year().rem_euclid(100)),
            Directive::Month => format!("{:02}", t.month()),
            Directive::Day => format!("{:02}", t.day()),
            Directive::DayOfYear => format!("{:03}", t.ordinal()),
            Directive::Hour => format!("{:02}", t.hour()),
            Directive::Minute => format!("{:02}", t.minute()),
            Directive::Second => format!("{:02}", t.second()),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Directive(Directive),
}

/// A rendered listing target: the directory URL to hand to the external
/// lister, and the time bucket that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub bucket: NaiveDateTime,
    pub url: String,
}

/// A compiled URL template. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    template: String,
    segments: Vec<Segment>,
    matcher: Regex,
    /// Capture-group index of each directive in `matcher`, in template order.
    groups: Vec<(usize, Directive)>,
    resolution: Resolution,
    directory_resolution: Resolution,
}

impl UrlPattern {
    /// Compile a template into a matcher and renderer.
    ///
    /// Fails when the template contains an unknown `%x` directive, no
    /// date directive at all, or a literal fragment that is not valid
    /// regex. These are configuration errors, never per-query errors.
    pub fn compile(template: &str) -> ScrapeResult<Self> {
        Self::compile_with(template, &[])
    }

    /// Compile after substituting `{name}` slots from `substitutions`.
    ///
    /// Slots not named in the table are left untouched, so regex
    /// repetitions such as `(\d){2}` pass through unchanged.
    pub fn compile_with(template: &str, substitutions: &[(&str, &str)]) -> ScrapeResult<Self> {
        let mut resolved = template.to_string();
        for (name, value) in substitutions {
            resolved = resolved.replace(&format!("{{{name}}}"), value);
        }

        let segments = parse_segments(&resolved)?;

        let mut source = String::from("^");
        let mut groups = Vec::new();
        let mut group_index = 0usize;
        for segment in &segments {
            match segment {
                Segment::Literal(text) => {
                    group_index += count_capture_groups(text);
                    source.push_str(text);
                }
                Segment::Directive(d) => {
                    group_index += 1;
                    groups.push((group_index, *d));
                    source.push_str(&format!(r"(\d{{{}}})", d.width()));
                }
            }
        }
        source.push('$');

        if groups.is_empty() {
            return Err(ScrapeError::NoDateDirective {
                template: resolved,
            });
        }

        let matcher = Regex::new(&source)?;
        let resolution = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Directive(d) => Some(d.resolution()),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(Resolution::Day);
        let directory_resolution = directory_resolution(&segments).unwrap_or(resolution);

        let pattern = Self {
            template: resolved,
            segments,
            matcher,
            groups,
            resolution,
            directory_resolution,
        };
        tracing::debug!(
            template = %pattern.template,
            resolution = ?pattern.resolution,
            directory_resolution = ?pattern.directory_resolution,
            "compiled url pattern"
        );
        Ok(pattern)
    }

    /// The template after slot substitution.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Finest date unit present anywhere in the template.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Finest date unit present in the directory portion (before the
    /// last `/`). One directory is listed per bucket at this step.
    pub fn directory_resolution(&self) -> Resolution {
        self.directory_resolution
    }

    /// The generic validating matcher, with every directive as a
    /// fixed-width digit group.
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Whether a discovered URL matches this template.
    pub fn matches(&self, url: &str) -> bool {
        let matched = self.matcher.is_match(url);
        if !matched {
            tracing::trace!(template = %self.template, %url, "url rejected by matcher");
        }
        matched
    }

    /// Matcher for one specific bucket: date directives rendered to
    /// their literal values, literal regex fragments kept. Ties a
    /// discovered URL to the bucket that produced it.
    pub fn matcher_for(&self, bucket: NaiveDateTime) -> ScrapeResult<Regex> {
        let mut source = String::from("^");
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => source.push_str(text),
                Segment::Directive(d) => source.push_str(&d.render(bucket)),
            }
        }
        source.push('$');
        Ok(Regex::new(&source)?)
    }

    /// Render the full template for one bucket. Literal regex fragments
    /// pass through unchanged; pure and deterministic.
    pub fn render(&self, bucket: NaiveDateTime) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Directive(d) => out.push_str(&d.render(bucket)),
            }
        }
        out
    }

    /// Render the directory portion for one bucket: everything up to and
    /// including the last `/`. This is the URL the external lister is
    /// asked to enumerate.
    pub fn prefix(&self, bucket: NaiveDateTime) -> String {
        let last_slash = self.segments.iter().rposition(
            |s| matches!(s, Segment::Literal(text) if text.contains('/')),
        );
        let Some(idx) = last_slash else {
            return self.render(bucket);
        };

        let mut out = String::new();
        for segment in &self.segments[..idx] {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Directive(d) => out.push_str(&d.render(bucket)),
            }
        }
        if let Segment::Literal(text) = &self.segments[idx] {
            if let Some(cut) = text.rfind('/') {
                out.push_str(&text[..=cut]);
            }
        }
        out
    }

    /// One candidate per bucket of `range` at the directory resolution.
    pub fn candidates(&self, range: &TimeRange) -> Vec<Candidate> {
        range
            .buckets(self.directory_resolution)
            .map(|bucket| Candidate {
                bucket,
                url: self.prefix(bucket),
            })
            .collect()
    }

    /// Parse the date directives back out of a matching URL.
    ///
    /// Returns `None` when the URL does not match. Units missing from
    /// the template default to the start of their period. When a unit
    /// appears more than once the later occurrence wins, the filename
    /// being more specific than the directory. Two-digit years pivot at
    /// 69: `00..=68` map to 2000s, `69..=99` to 1900s.
    pub fn extract_time(&self, url: &str) -> Option<NaiveDateTime> {
        let captures = self.matcher.captures(url)?;

        let mut year: Option<i32> = None;
        let mut month: Option<u32> = None;
        let mut day: Option<u32> = None;
        let mut ordinal: Option<u32> = None;
        let mut hour = 0u32;
        let mut minute = 0u32;
        let mut second = 0u32;

        for (index, directive) in &self.groups {
            let text = captures.get(*index)?.as_str();
            let value: u32 = text.parse().ok()?;
            match directive {
                Directive::Year => year = Some(value as i32),
                Directive::TwoDigitYear => {
                    let v = value as i32;
                    year = Some(if v <= 68 { 2000 + v } else { 1900 + v });
                }
                Directive::Month => month = Some(value),
                Directive::Day => day = Some(value),
                Directive::DayOfYear => ordinal = Some(value),
                Directive::Hour => hour = value,
                Directive::Minute => minute = value,
                Directive::Second => second = value,
            }
        }

        let year = year?;
        let date = match (month, day, ordinal) {
            (Some(m), d, _) => NaiveDate::from_ymd_opt(year, m, d.unwrap_or(1))?,
            (None, _, Some(o)) => NaiveDate::from_yo_opt(year, o)?,
            (None, _, None) => NaiveDate::from_ymd_opt(year, 1, 1)?,
        };
        date.and_hms_opt(hour, minute, second)
    }
}

fn parse_segments(template: &str) -> ScrapeResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => literal.push('%'),
            Some(next) => match Directive::from_char(next) {
                Some(directive) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Directive(directive));
                }
                None => {
                    return Err(ScrapeError::UnknownDirective {
                        directive: next,
                        template: template.to_string(),
                    });
                }
            },
            None => {
                return Err(ScrapeError::UnknownDirective {
                    directive: '%',
                    template: template.to_string(),
                });
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Count the capturing groups a literal regex fragment contributes.
fn count_capture_groups(literal: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    let mut in_class = false;
    let mut chars = literal.chars().peekable();
    while let Some(c) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.peek() != Some(&'?') {
                    count += 1;
                }
            }
            _ => {}
        }
    }
    count
}

/// Finest directive before the last `/` of the template, if any.
fn directory_resolution(segments: &[Segment]) -> Option<Resolution> {
    let last_slash = segments.iter().rposition(
        |s| matches!(s, Segment::Literal(text) if text.contains('/')),
    )?;
    segments[..last_slash]
        .iter()
        .filter_map(|s| match s {
            Segment::Directive(d) => Some(d.resolution()),
            Segment::Literal(_) => None,
        })
        .max()
}
