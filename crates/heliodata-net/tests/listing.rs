//! End-to-end search tests: route a query, scrape an in-memory archive,
//! and check the extracted records.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use heliodata::{FieldValue, Record, TimeRange};
use heliodata_net::{default_router, DirectoryLister, NetResult, QueryAttribute, Wavelength};

// ─────────────────────── helpers ───────────────────────

/// A canned archive: directory prefix to the full URLs under it.
/// Unknown prefixes list as empty directories.
struct StaticLister(HashMap<String, Vec<String>>);

impl StaticLister {
    fn new(dirs: &[(&str, &[&str])]) -> Self {
        Self(
            dirs.iter()
                .map(|(prefix, files)| {
                    let urls = files.iter().map(|f| format!("{prefix}{f}")).collect();
                    (prefix.to_string(), urls)
                })
                .collect(),
        )
    }
}

impl DirectoryLister for StaticLister {
    fn list(&self, url: &str) -> NetResult<Vec<String>> {
        Ok(self.0.get(url).cloned().unwrap_or_default())
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn range(start: NaiveDateTime, end: NaiveDateTime) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn search(query: Vec<QueryAttribute>, lister: &StaticLister) -> Vec<Record> {
    init_tracing();
    let router = default_router().unwrap();
    let client = router.route(&query).unwrap();
    let time = *heliodata_net::attrs::query_time(&query).unwrap();
    client.list_and_extract(lister, &time, &query).unwrap()
}

fn field_text<'a>(record: &'a Record, name: &str) -> &'a str {
    record.field(name).unwrap().value.as_text()
}

const GBM_21: &str = "https://heasarc.gsfc.nasa.gov/FTP/fermi/data/gbm/daily/2015/06/21/current/";
const GBM_22: &str = "https://heasarc.gsfc.nasa.gov/FTP/fermi/data/gbm/daily/2015/06/22/current/";
const GBM_23: &str = "https://heasarc.gsfc.nasa.gov/FTP/fermi/data/gbm/daily/2015/06/23/current/";

fn gbm_archive() -> StaticLister {
    StaticLister::new(&[
        (
            GBM_21,
            &["glg_cspec_n5_150621_v00.pha", "readme.txt"] as &[&str],
        ),
        (
            GBM_22,
            &["glg_cspec_n5_150622_v00.pha", "glg_ctime_n11_150622_v00.pha"],
        ),
        (GBM_23, &["glg_cspec_n0_150623_v00.pha"]),
    ])
}

fn gbm_query(extra: Vec<QueryAttribute>) -> Vec<QueryAttribute> {
    let mut query = vec![
        QueryAttribute::Time(range(day(2015, 6, 21), day(2015, 6, 23))),
        QueryAttribute::instrument("gbm"),
    ];
    query.extend(extra);
    query
}

// ─────────────────────── tests ───────────────────────

#[test]
fn test_gbm_three_day_search() {
    let records = search(gbm_query(vec![]), &gbm_archive());

    let buckets: Vec<NaiveDateTime> = records.iter().map(|r| r.bucket).collect();
    assert_eq!(
        buckets,
        vec![
            day(2015, 6, 21),
            day(2015, 6, 22),
            day(2015, 6, 22),
            day(2015, 6, 23),
        ]
    );
    let first = &records[0];
    assert_eq!(
        first.url,
        format!("{GBM_21}glg_cspec_n5_150621_v00.pha")
    );
    assert_eq!(field_text(first, "Resolution"), "CSPEC");
    assert_eq!(field_text(first, "Detector"), "n5");
    assert!(first.field("Detector").unwrap().validated);
    assert_eq!(first.meta.source, "FERMI");
    assert_eq!(first.meta.instrument, "GBM");
}

#[test]
fn test_gbm_detector_and_resolution_filters() {
    let archive = gbm_archive();

    let n5 = search(gbm_query(vec![QueryAttribute::detector("n5")]), &archive);
    assert_eq!(n5.len(), 2);
    assert!(n5.iter().all(|r| field_text(r, "Detector") == "n5"));

    let ctime = search(
        gbm_query(vec![QueryAttribute::resolution("ctime")]),
        &archive,
    );
    assert_eq!(ctime.len(), 1);
    assert_eq!(field_text(&ctime[0], "Detector"), "n11");
    assert_eq!(field_text(&ctime[0], "Resolution"), "CTIME");
}

#[test]
fn test_window_excludes_out_of_range_files() {
    // Range ends on the 22nd, so the 23rd's file is never requested and
    // a stray out-of-range file in a listed directory is dropped.
    let archive = StaticLister::new(&[(
        GBM_21,
        &["glg_cspec_n5_150621_v00.pha", "glg_cspec_n5_150630_v00.pha"] as &[&str],
    )]);
    let query = vec![
        QueryAttribute::Time(range(day(2015, 6, 21), day(2015, 6, 22))),
        QueryAttribute::instrument("gbm"),
    ];
    let records = search(query, &archive);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bucket, day(2015, 6, 21));
}

#[test]
fn test_unregistered_value_kept_verbatim_unvalidated() {
    // Five word characters, so the matcher accepts it, but it is not a
    // registered accumulation.
    let archive = StaticLister::new(&[(
        GBM_21,
        &["glg_zzzzz_n5_150621_v00.pha"] as &[&str],
    )]);
    let query = vec![
        QueryAttribute::Time(range(day(2015, 6, 21), day(2015, 6, 21))),
        QueryAttribute::instrument("gbm"),
    ];
    let records = search(query, &archive);
    assert_eq!(records.len(), 1);
    let resolution = records[0].field("Resolution").unwrap();
    assert_eq!(resolution.value.as_text(), "zzzzz");
    assert!(!resolution.validated);
}

#[test]
fn test_norh_frequency_selects_prefix() {
    let prefix = "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/2016/05/";
    let archive = StaticLister::new(&[(
        prefix,
        &["tca160504", "tcz160504"] as &[&str],
    )]);
    let query = vec![
        QueryAttribute::Time(range(day(2016, 5, 4), day(2016, 5, 4))),
        QueryAttribute::instrument("norh"),
        QueryAttribute::Wavelength(Wavelength::point(17.0)),
    ];
    let records = search(query, &archive);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{prefix}tca160504"));
    let wavelength = records[0].field("Wavelength").unwrap();
    assert_eq!(wavelength.value.as_text(), "17GHz");
    assert!(wavelength.validated);
}

#[test]
fn test_suvi_level2_search() {
    let prefix = "https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/goes/goes16/l2/data/suvi-l2-ci171/2018/06/01/";
    let archive = StaticLister::new(&[(
        prefix,
        &["dr_suvi-l2-ci171_g16_s20180601T120000Z_e20180601T120400Z.fits"] as &[&str],
    )]);
    let query = vec![
        QueryAttribute::Time(range(day(2018, 6, 1), day(2018, 6, 2))),
        QueryAttribute::instrument("suvi"),
        QueryAttribute::Wavelength(Wavelength::point(171.0)),
    ];
    let records = search(query, &archive);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(field_text(record, "Wavelength"), "171");
    assert_eq!(field_text(record, "Level"), "2");
    assert_eq!(
        record.field("SatelliteNumber").unwrap().value,
        FieldValue::Int {
            value: 16,
            raw: "16".to_string()
        }
    );
    assert_eq!(record.meta.provider, "NOAA");
}
