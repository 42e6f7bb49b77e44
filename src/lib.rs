//! Fetch OPUS (<https://opus.nlpl.eu/>) parallel corpora for a language pair
//! and extract aligned sentence pairs into per-language text files.
//!
//! The TMX archives distributed by OPUS can reach hundreds of megabytes, so
//! the extraction pipeline never materializes a document tree: [tmx_parser]
//! streams structural events off the decompressed archive, [pairs] rebuilds
//! the language-pair alignments and [writer] flushes them in batches to two
//! line-aligned output files. [session] wires one end-to-end run together.

pub mod cli;
pub mod download;
pub mod opus_api;
pub mod pairs;
pub mod session;
pub mod tmx_parser;
pub mod writer;
