use anyhow::{Context, Result};
use log::info;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pairs::LanguagePair;

/// Buffers language pairs and flushes them to a pair of line-aligned output
/// files, source text to one, target text to the other.
///
/// Pairs are written in append order; after every flush both files hold
/// exactly one line per pair written so far. Write failures are fatal and
/// propagate immediately, there is no retry and no rollback across the two
/// files.
pub struct PairWriter {
    source: BufWriter<std::fs::File>,
    target: BufWriter<std::fs::File>,
    source_path: PathBuf,
    target_path: PathBuf,
    batch: Vec<LanguagePair>,
    max_batch: usize,
    pairs_written: u64,
}

impl PairWriter {
    /// Open both output files in create-and-append mode.
    pub fn open(source_path: &Path, target_path: &Path, max_batch: usize) -> Result<PairWriter> {
        Ok(PairWriter {
            source: open_append(source_path)?,
            target: open_append(target_path)?,
            source_path: source_path.to_path_buf(),
            target_path: target_path.to_path_buf(),
            batch: Vec::new(),
            max_batch,
            pairs_written: 0,
        })
    }

    /// Add one pair; triggers a synchronous flush when the batch is full.
    pub fn append(&mut self, pair: LanguagePair) -> Result<()> {
        self.batch.push(pair);
        if self.batch.len() >= self.max_batch {
            self.write_batch()?;
        }
        Ok(())
    }

    /// Pairs already flushed to disk.
    pub fn pairs_written(&self) -> u64 {
        self.pairs_written
    }

    /// Flush whatever is still buffered and return the total pairs written.
    pub fn drain(mut self) -> Result<u64> {
        self.write_batch()?;
        Ok(self.pairs_written)
    }

    fn write_batch(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        info!("writing {} lines of language pairs", self.batch.len());

        for pair in &self.batch {
            writeln!(self.source, "{}", clean_line(&pair.source))
                .with_context(|| self.write_failure(true))?;
            writeln!(self.target, "{}", clean_line(&pair.target))
                .with_context(|| self.write_failure(false))?;
        }
        self.source
            .flush()
            .with_context(|| self.write_failure(true))?;
        self.target
            .flush()
            .with_context(|| self.write_failure(false))?;

        self.pairs_written += self.batch.len() as u64;
        self.batch.clear();
        Ok(())
    }

    fn write_failure(&self, source_side: bool) -> String {
        let path = if source_side {
            &self.source_path
        } else {
            &self.target_path
        };
        format!(
            "write to {} failed after {} pairs were flushed",
            path.display(),
            self.pairs_written
        )
    }
}

fn open_append(path: &Path) -> Result<BufWriter<std::fs::File>> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("couldn't open output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Collapse embedded line breaks so every pair stays on a single line.
fn clean_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}
