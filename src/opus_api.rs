use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const OPUS_API_URL: &str = "https://opus.nlpl.eu/opusapi/";

/// One downloadable release of a corpus for a language pair.
///
/// `alignment_pairs` is the catalog's own count and is known to be
/// unreliable, treat it as advisory and never check extraction results
/// against it.
#[derive(Debug, Deserialize)]
pub struct CorpusRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alignment_pairs: Option<u64>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct CorpusNames {
    #[serde(default)]
    corpora: Vec<String>,
}

#[derive(Deserialize)]
struct LanguageNames {
    #[serde(default)]
    languages: Vec<String>,
}

#[derive(Deserialize)]
struct TmxReleases {
    #[serde(default)]
    corpora: Vec<CorpusRecord>,
}

/// Names of every corpus the OPUS catalog knows about.
pub fn list_corpora(client: &Client) -> Result<Vec<String>> {
    let listing: CorpusNames = get(client, &[("corpora", "True")])?;
    Ok(listing.corpora)
}

/// Languages available for a corpus; with `source` set, only languages that
/// pair with it.
pub fn list_languages(client: &Client, corpus: &str, source: Option<&str>) -> Result<Vec<String>> {
    let mut params = vec![("languages", "True"), ("corpus", corpus)];
    if let Some(source) = source {
        params.push(("source", source));
    }
    let listing: LanguageNames = get(client, &params)?;
    Ok(listing.languages)
}

/// TMX releases of a corpus for a language pair, latest version only.
pub fn query_tmx(
    client: &Client,
    corpus: &str,
    source: &str,
    target: &str,
) -> Result<Vec<CorpusRecord>> {
    let releases: TmxReleases = get(
        client,
        &[
            ("corpus", corpus),
            ("source", source),
            ("target", target),
            ("preprocessing", "tmx"),
            ("version", "latest"),
        ],
    )?;
    Ok(releases.corpora)
}

/// Fail early with the list of valid names when the corpus is unknown.
pub fn ensure_corpus_exists(client: &Client, corpus: &str) -> Result<()> {
    let corpora = list_corpora(client)?;
    if !corpora.iter().any(|name| name == corpus) {
        bail!(
            "bad corpus {:?}, must be one of {:?}",
            corpus,
            corpora
        );
    }
    Ok(())
}

/// Fail early when either language of the requested pair is unavailable for
/// the corpus.
pub fn ensure_language_pair_exists(
    client: &Client,
    corpus: &str,
    source: &str,
    target: &str,
) -> Result<()> {
    let source_languages = list_languages(client, corpus, None)?;
    if !source_languages.iter().any(|lang| lang == source) {
        bail!(
            "bad source language {:?}, must be one of {:?} for corpus {}",
            source,
            source_languages,
            corpus
        );
    }

    let target_languages = list_languages(client, corpus, Some(source))?;
    if !target_languages.iter().any(|lang| lang == target) {
        bail!(
            "bad target language {:?}, must be one of {:?} for corpus {} and source {}",
            target,
            target_languages,
            corpus,
            source
        );
    }

    Ok(())
}

fn get<T, P>(client: &Client, params: &P) -> Result<T>
where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
{
    let response = client
        .get(OPUS_API_URL)
        .query(params)
        .send()
        .with_context(|| format!("couldn't reach the OPUS API at {}", OPUS_API_URL))?
        .error_for_status()
        .with_context(|| format!("OPUS API {} returned an error status", OPUS_API_URL))?;

    response
        .json()
        .with_context(|| format!("unexpected JSON from the OPUS API at {}", OPUS_API_URL))
}
