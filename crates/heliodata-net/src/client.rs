//! Client traits and the shared listing/extraction flow.

use heliodata::{
    collect_records, ExtractedField, ExtractorPattern, FieldValue, Record, RecordField, TimeRange,
    UrlPattern,
};

use crate::attrs::{AttrKind, LevelValue, QueryAttribute};
use crate::descriptor::ClientDescriptor;
use crate::error::NetResult;

/// External collaborator that lists the files under a directory URL.
///
/// This is the only suspension point in a search: the core hands over a
/// rendered prefix and gets URLs back. Retry, backoff, and caching
/// policy belong entirely to the implementor.
pub trait DirectoryLister {
    fn list(&self, url: &str) -> NetResult<Vec<String>>;
}

/// A registered archive client.
pub trait ArchiveClient: Send + Sync {
    fn descriptor(&self) -> &ClientDescriptor;

    /// Enumerate, list, match, and extract every record in `range` that
    /// passes `filters`. Orchestrated here, I/O through the lister.
    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>>;
}

impl std::fmt::Debug for dyn ArchiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveClient")
            .field("name", &self.descriptor().name)
            .finish()
    }
}

/// Shared implementation for clients whose archive is fully described
/// by one URL template and one extractor template.
pub struct GenericClient {
    descriptor: ClientDescriptor,
    pattern: UrlPattern,
    extractor: ExtractorPattern,
}

impl GenericClient {
    pub fn new(descriptor: ClientDescriptor, template: &str, extractor: &str) -> NetResult<Self> {
        Self::with_substitutions(descriptor, template, extractor, &[])
    }

    /// Build a client whose URL template carries `{name}` slots.
    pub fn with_substitutions(
        descriptor: ClientDescriptor,
        template: &str,
        extractor: &str,
        substitutions: &[(&str, &str)],
    ) -> NetResult<Self> {
        Ok(Self {
            descriptor,
            pattern: UrlPattern::compile_with(template, substitutions)?,
            extractor: ExtractorPattern::compile(extractor)?,
        })
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub fn extractor(&self) -> &ExtractorPattern {
        &self.extractor
    }
}

impl ArchiveClient for GenericClient {
    fn descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    fn list_and_extract(
        &self,
        lister: &dyn DirectoryLister,
        range: &TimeRange,
        filters: &[QueryAttribute],
    ) -> NetResult<Vec<Record>> {
        scrape_archive(
            &self.descriptor,
            &self.pattern,
            &self.extractor,
            lister,
            range,
            filters,
        )
    }
}

/// The common search flow: enumerate directory buckets, list each one,
/// validate and extract every discovered URL, keep in-range records that
/// pass the filters, and return them in ascending bucket order.
pub(crate) fn scrape_archive(
    descriptor: &ClientDescriptor,
    pattern: &UrlPattern,
    extractor: &ExtractorPattern,
    lister: &dyn DirectoryLister,
    range: &TimeRange,
    filters: &[QueryAttribute],
) -> NetResult<Vec<Record>> {
    // Archives bucket files at the pattern resolution, so a range that
    // starts mid-bucket still covers that bucket's file.
    let window = TimeRange::new(pattern.resolution().floor(range.start()), range.end())?;

    let mut records = Vec::new();
    for candidate in pattern.candidates(&window) {
        let urls = lister.list(&candidate.url)?;
        tracing::debug!(
            client = descriptor.name,
            prefix = %candidate.url,
            found = urls.len(),
            "listed directory"
        );
        for url in urls {
            // Rejections are traced inside the matcher and extractor.
            if !pattern.matches(&url) {
                continue;
            }
            let Some(time) = pattern.extract_time(&url) else {
                continue;
            };
            // Flat archives list the same directory for every bucket, so
            // each file counts only toward the bucket it belongs to.
            if pattern.directory_resolution().floor(time) != candidate.bucket {
                continue;
            }
            if !window.contains(time) {
                continue;
            }
            let Some(extracted) = extractor.extract(&url) else {
                continue;
            };
            let record = build_record(descriptor, time, url, extracted);
            if record_passes(descriptor, &record, filters) {
                records.push(record);
            }
        }
    }
    Ok(collect_records(records))
}

/// Map an extractor field name to the attribute kind it aliases.
fn attr_kind_of(name: &str) -> Option<AttrKind> {
    match name {
        "Instrument" => Some(AttrKind::Instrument),
        "Level" => Some(AttrKind::Level),
        "Detector" => Some(AttrKind::Detector),
        "Resolution" => Some(AttrKind::Resolution),
        "Wavelength" => Some(AttrKind::Wavelength),
        "SatelliteNumber" => Some(AttrKind::SatelliteNumber),
        _ => None,
    }
}

fn build_record(
    descriptor: &ClientDescriptor,
    bucket: chrono::NaiveDateTime,
    url: String,
    extracted: Vec<ExtractedField>,
) -> Record {
    let mut fields = Vec::new();
    for field in extracted {
        let Some(name) = field.name else {
            continue;
        };
        let (value, validated) = match attr_kind_of(&name) {
            Some(kind) => match descriptor.registry.canonical(kind, field.value.as_text()) {
                Some(canonical) => {
                    let value = match field.value {
                        FieldValue::Text { .. } => FieldValue::Text {
                            value: canonical.to_string(),
                        },
                        int => int,
                    };
                    (value, true)
                }
                None => {
                    tracing::warn!(
                        client = descriptor.name,
                        field = %name,
                        value = %field.value.as_text(),
                        "extracted value not in registry, keeping verbatim"
                    );
                    (field.value, false)
                }
            },
            None => (field.value, true),
        };
        fields.push(RecordField {
            name,
            value,
            validated,
        });
    }
    Record {
        bucket,
        url,
        fields,
        meta: descriptor.meta,
    }
}

/// Apply per-attribute filters to an extracted record. A filter only
/// constrains a record that actually carries the corresponding field.
fn record_passes(
    descriptor: &ClientDescriptor,
    record: &Record,
    filters: &[QueryAttribute],
) -> bool {
    for attr in filters {
        let passes = match attr {
            QueryAttribute::Detector(want) => text_field_matches(record, "Detector", want),
            QueryAttribute::Resolution(want) => text_field_matches(record, "Resolution", want),
            QueryAttribute::Level(want) => level_field_matches(descriptor, record, want),
            QueryAttribute::SatelliteNumber(want) => match record.field("SatelliteNumber") {
                Some(RecordField {
                    value: FieldValue::Int { value, .. },
                    ..
                }) => value == want,
                _ => true,
            },
            QueryAttribute::Time(_)
            | QueryAttribute::Instrument(_)
            | QueryAttribute::Wavelength(_) => true,
        };
        if !passes {
            return false;
        }
    }
    true
}

fn text_field_matches(record: &Record, name: &str, want: &str) -> bool {
    match record.field(name) {
        Some(field) => field.value.as_text().eq_ignore_ascii_case(want),
        None => true,
    }
}

fn level_field_matches(descriptor: &ClientDescriptor, record: &Record, want: &LevelValue) -> bool {
    let Some(field) = record.field("Level") else {
        return true;
    };
    let have = match &field.value {
        FieldValue::Int { value, .. } => Some(*value),
        FieldValue::Text { value } => {
            descriptor.normalize_level(&LevelValue::Text(value.clone()))
        }
    };
    match (have, descriptor.normalize_level(want)) {
        (Some(have), Some(want)) => have == want,
        // Either side failing coercion leaves the record in; rejection
        // on coercion is the capability check's job, not the filter's.
        _ => true,
    }
}
