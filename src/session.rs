use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::pairs::PairAssembler;
use crate::tmx_parser::{TmxEvent, TmxReader};
use crate::writer::PairWriter;

/// Everything one extraction run needs to know.
pub struct SessionConfig {
    pub corpus: String,
    pub source_lang: String,
    pub target_lang: String,
    /// How many pairs to buffer in memory between writes.
    pub batch_size: usize,
    /// Stop after this many pairs, when set.
    pub max_lines: Option<u64>,
    /// Append to pre-existing output files instead of deleting them first.
    pub keep_former_output_files: bool,
    pub data_dir: PathBuf,
}

#[derive(Debug)]
pub struct SessionReport {
    pub pairs_written: u64,
    pub units_discarded: u64,
}

impl SessionConfig {
    /// `<data_dir>/<corpus>_<lang>.txt`
    pub fn output_path(&self, lang: &str) -> PathBuf {
        self.data_dir.join(format!("{}_{}.txt", self.corpus, lang))
    }
}

/// Run one end-to-end extraction over a downloaded gzipped TMX archive.
///
/// Already-flushed lines stay on disk when this fails, so a retry without
/// `keep_former_output_files` is what restores a clean state.
pub fn extract(tmx_path: &Path, config: &SessionConfig) -> Result<SessionReport> {
    let source_path = config.output_path(&config.source_lang);
    let target_path = config.output_path(&config.target_lang);
    apply_retention(config, &source_path, &target_path)?;

    info!(
        "processing {} writing every {} lines to {} and {}",
        tmx_path.display(),
        config.batch_size,
        source_path.display(),
        target_path.display()
    );

    let file = File::open(tmx_path)
        .with_context(|| format!("couldn't open TMX file {}", tmx_path.display()))?;
    let decoder = MultiGzDecoder::new(BufReader::new(file));
    let mut tmx = TmxReader::new(BufReader::new(decoder));
    let mut assembler = PairAssembler::new(&config.source_lang, &config.target_lang);
    let mut writer = PairWriter::open(&source_path, &target_path, config.batch_size)?;

    loop {
        let event = tmx
            .read_event()
            .with_context(|| format!("couldn't parse {}", tmx_path.display()))?;
        let document_ended = event == TmxEvent::DocumentEnd;

        if let Some(pair) = assembler.observe(event) {
            writer.append(pair)?;
            if let Some(max_lines) = config.max_lines {
                if assembler.pairs_emitted() >= max_lines {
                    info!("stopping after the requested {} lines", max_lines);
                    break;
                }
            }
        }
        if document_ended {
            break;
        }
    }

    let pairs_written = writer.drain()?;
    let units_discarded = assembler.units_discarded();
    info!(
        "extracted {} aligned pairs from corpus {} ({} units lacked {} or {})",
        pairs_written, config.corpus, units_discarded, config.source_lang, config.target_lang
    );

    Ok(SessionReport {
        pairs_written,
        units_discarded,
    })
}

fn apply_retention(config: &SessionConfig, source_path: &Path, target_path: &Path) -> Result<()> {
    if config.keep_former_output_files {
        info!(
            "appending to existing files {} and {}",
            source_path.display(),
            target_path.display()
        );
        return Ok(());
    }

    info!(
        "deleting pre-existing files {} and {}",
        source_path.display(),
        target_path.display()
    );
    for path in [source_path, target_path] {
        if path.is_file() {
            std::fs::remove_file(path)
                .with_context(|| format!("couldn't delete former output {}", path.display()))?;
        }
    }
    Ok(())
}
