use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, error, info};
use reqwest::blocking::Client;

use opus_fetch::cli::Cli;
use opus_fetch::session::{self, SessionConfig, SessionReport};
use opus_fetch::{download, opus_api};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    if cli.line_write_len == 0 {
        bail!("--line-write-len must be greater than zero");
    }

    // No overall request timeout: TMX archives can take a long while.
    let client = Client::builder()
        .timeout(None)
        .build()
        .context("couldn't build HTTP client")?;

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("couldn't create data directory {}", cli.data_dir.display()))?;

    let corpora = if cli.all_corpora {
        opus_api::list_corpora(&client)?
    } else {
        opus_api::ensure_corpus_exists(&client, &cli.corpus)?;
        opus_api::ensure_language_pair_exists(
            &client,
            &cli.corpus,
            &cli.source_language_code,
            &cli.target_language_code,
        )?;
        vec![cli.corpus.clone()]
    };

    let mut failed = 0;
    for corpus in &corpora {
        match process_corpus(&client, corpus, &cli) {
            Ok(Some(_)) | Ok(None) => {}
            // One corpus going bad must not abort the rest of the run.
            Err(err) if cli.all_corpora => {
                failed += 1;
                error!("skipping corpus {}: {:#}", corpus, err);
            }
            Err(err) => return Err(err),
        }
    }

    if failed > 0 {
        info!("{} of {} corpora failed", failed, corpora.len());
    }
    Ok(())
}

/// Download (when not already on disk) and extract one corpus. Returns
/// `None` when the corpus has no TMX release for the requested pair, which
/// is only tolerated in all-corpora mode.
fn process_corpus(client: &Client, corpus: &str, cli: &Cli) -> Result<Option<SessionReport>> {
    let source = &cli.source_language_code;
    let target = &cli.target_language_code;

    let records = opus_api::query_tmx(client, corpus, source, target)?;
    // There is only one TMX release per pair; alternatives exist for XML only.
    let record = match records.first() {
        Some(record) => record,
        None if cli.all_corpora => {
            debug!("corpus {} has no TMX release for {}-{}", corpus, source, target);
            return Ok(None);
        }
        None => bail!(
            "no TMX release of corpus {} for language pair {}-{}",
            corpus,
            source,
            target
        ),
    };
    info!(
        "corpus {} version {:?} lists {:?} alignment pairs at {}",
        corpus, record.version, record.alignment_pairs, record.url
    );
    if record.url.is_empty() {
        bail!("OPUS API returned no TMX url for corpus {}", corpus);
    }

    let tmx_path = cli
        .data_dir
        .join(format!("{}_{}-{}.tmx.gz", corpus, source, target));
    if tmx_path.is_file() {
        info!("reusing existing TMX file {}", tmx_path.display());
    } else {
        download::fetch(client, &record.url, &tmx_path)?;
    }

    let config = SessionConfig {
        corpus: corpus.to_string(),
        source_lang: source.clone(),
        target_lang: target.clone(),
        batch_size: cli.line_write_len,
        max_lines: cli.max_lines,
        keep_former_output_files: cli.keep_former_output_files,
        data_dir: cli.data_dir.clone(),
    };
    let report = session::extract(&tmx_path, &config)?;
    Ok(Some(report))
}
