use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    version,
    long_about = "Fetch OPUS (https://opus.nlpl.eu/) corpora for a language pair, stream the gzipped TMX archives and save the aligned sentences into one line-separated text file per language."
)]
#[clap(about = "Fetch OPUS corpora and extract aligned sentence pairs.")]
pub struct Cli {
    /// ISO code of the source language that will be translated into the target language
    #[clap(short, long)]
    #[clap(display_order = 1)]
    pub source_language_code: String,

    /// ISO code of the target language to translate to
    #[clap(short, long)]
    #[clap(display_order = 2)]
    pub target_language_code: String,

    /// Parallel corpus to select
    #[clap(short, long)]
    #[clap(display_order = 3)]
    #[clap(default_value = "ParaCrawl")]
    #[clap(conflicts_with = "all_corpora")]
    pub corpus: String,

    /// Extract every corpus that offers the requested language pair
    #[clap(long)]
    #[clap(display_order = 4)]
    pub all_corpora: bool,

    /// Append to previously generated output files instead of deleting them first
    #[clap(short, long)]
    #[clap(display_order = 5)]
    pub keep_former_output_files: bool,

    /// Number of language pairs that are kept in memory until they are written to the output files
    #[clap(short = 'l', long)]
    #[clap(display_order = 6)]
    #[clap(default_value_t = 300_000)]
    pub line_write_len: usize,

    /// Stop after this many language pairs have been written
    #[clap(long)]
    #[clap(display_order = 7)]
    pub max_lines: Option<u64>,

    /// Directory where downloaded archives and output files are stored
    #[clap(short, long)]
    #[clap(display_order = 8)]
    #[clap(default_value = "data")]
    pub data_dir: PathBuf,
}
