use anyhow::{Context, Result};
use log::info;
use reqwest::blocking::Client;
use std::fs::File;
use std::path::Path;

/// Download `url` into `dest`, streaming the response body to disk.
pub fn fetch(client: &Client, url: &str, dest: &Path) -> Result<()> {
    info!("fetching TMX file from {}", url);

    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("couldn't fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("{} returned an error status", url))?;

    if let Some(total) = response.content_length() {
        info!("downloading {} bytes to {}", total, dest.display());
    }

    let mut file = File::create(dest)
        .with_context(|| format!("couldn't create {}", dest.display()))?;
    let bytes = std::io::copy(&mut response, &mut file)
        .with_context(|| format!("couldn't write full TMX file {}", dest.display()))?;

    info!("saved {} bytes to {}", bytes, dest.display());
    Ok(())
}
