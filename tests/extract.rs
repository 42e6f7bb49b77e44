use assert_fs::TempDir;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use opus_fetch::session::{extract, SessionConfig};

/// Three complete en/lv units (one with an extra de variant, one with the
/// variants in swapped order) and one unit with only the en side.
const WELL_FORMED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<tmx version="1.4">
<header creationtool="opus" srclang="en"/>
<body>
<tu tuid="1"><tuv xml:lang="en"><seg>Good morning.</seg></tuv><tuv xml:lang="lv"><seg>Labrīt.</seg></tuv></tu>
<tu tuid="2"><tuv xml:lang="en"><seg>Thank you.</seg></tuv><tuv xml:lang="de"><seg>Danke.</seg></tuv><tuv xml:lang="lv"><seg>Paldies.</seg></tuv></tu>
<tu tuid="3"><tuv xml:lang="lv"><seg>Uz redzēšanos.</seg></tuv><tuv xml:lang="en"><seg>Goodbye.</seg></tuv></tu>
<tu tuid="4"><tuv xml:lang="en"><seg>Untranslated.</seg></tuv></tu>
</body>
</tmx>"#;

fn write_gz(path: &Path, xml: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(xml.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn config(data_dir: &Path, corpus: &str, batch_size: usize) -> SessionConfig {
    SessionConfig {
        corpus: corpus.to_string(),
        source_lang: "en".to_string(),
        target_lang: "lv".to_string(),
        batch_size,
        max_lines: None,
        keep_former_output_files: false,
        data_dir: data_dir.to_path_buf(),
    }
}

fn fixture(tmp: &TempDir, corpus: &str, xml: &str) -> PathBuf {
    let path = tmp.path().join(format!("{}_en-lv.tmx.gz", corpus));
    write_gz(&path, xml);
    path
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn extracts_aligned_pairs_in_document_order() {
    let tmp = TempDir::new().unwrap();
    let tmx = fixture(&tmp, "Books", WELL_FORMED);

    let config = config(tmp.path(), "Books", 2);
    let report = extract(&tmx, &config).unwrap();

    assert_eq!(report.pairs_written, 3);
    assert_eq!(report.units_discarded, 1);

    let sources = lines(&config.output_path("en"));
    let targets = lines(&config.output_path("lv"));
    assert_eq!(sources, vec!["Good morning.", "Thank you.", "Goodbye."]);
    assert_eq!(targets, vec!["Labrīt.", "Paldies.", "Uz redzēšanos."]);
}

#[test]
fn default_retention_deletes_former_output() {
    let tmp = TempDir::new().unwrap();
    let tmx = fixture(&tmp, "Books", WELL_FORMED);
    let config = config(tmp.path(), "Books", 100);

    extract(&tmx, &config).unwrap();
    extract(&tmx, &config).unwrap();

    assert_eq!(lines(&config.output_path("en")).len(), 3);
    assert_eq!(lines(&config.output_path("lv")).len(), 3);
}

#[test]
fn keep_former_output_files_appends() {
    let tmp = TempDir::new().unwrap();
    let tmx = fixture(&tmp, "Books", WELL_FORMED);
    let mut config = config(tmp.path(), "Books", 100);
    config.keep_former_output_files = true;

    extract(&tmx, &config).unwrap();
    extract(&tmx, &config).unwrap();

    assert_eq!(lines(&config.output_path("en")).len(), 6);
    assert_eq!(lines(&config.output_path("lv")).len(), 6);
}

#[test]
fn max_lines_caps_the_output() {
    let tmp = TempDir::new().unwrap();
    let tmx = fixture(&tmp, "Books", WELL_FORMED);
    let mut config = config(tmp.path(), "Books", 100);
    config.max_lines = Some(2);

    let report = extract(&tmx, &config).unwrap();

    assert_eq!(report.pairs_written, 2);
    assert_eq!(lines(&config.output_path("en")).len(), 2);
    assert_eq!(lines(&config.output_path("lv")).len(), 2);
}

#[test]
fn truncated_corpus_fails_without_poisoning_the_next_one() {
    let tmp = TempDir::new().unwrap();

    // Cut mid-unit; the default-sized batch never fills, so nothing lands
    // on disk for this corpus.
    let truncated = &WELL_FORMED[..WELL_FORMED.find("</tu>").unwrap()];
    let bad_tmx = fixture(&tmp, "Broken", truncated);
    let bad_config = config(tmp.path(), "Broken", 300_000);

    let err = extract(&bad_tmx, &bad_config).unwrap_err();
    assert!(format!("{:#}", err).contains("malformed"));
    assert_eq!(lines(&bad_config.output_path("en")).len(), 0);
    assert_eq!(lines(&bad_config.output_path("lv")).len(), 0);

    let good_tmx = fixture(&tmp, "Books", WELL_FORMED);
    let good_config = config(tmp.path(), "Books", 300_000);
    let report = extract(&good_tmx, &good_config).unwrap();
    assert_eq!(report.pairs_written, 3);
}

#[test]
fn output_files_always_hold_equal_line_counts() {
    let tmp = TempDir::new().unwrap();
    let tmx = fixture(&tmp, "Books", WELL_FORMED);

    for batch_size in [1, 2, 3, 100] {
        let config = config(tmp.path(), "Books", batch_size);
        let report = extract(&tmx, &config).unwrap();
        let sources = lines(&config.output_path("en"));
        let targets = lines(&config.output_path("lv"));
        assert_eq!(sources.len(), targets.len());
        assert_eq!(sources.len() as u64, report.pairs_written);
    }
}
