//! Fetching `http(s)://` source objects for the local warehouse

pub mod cache;
pub mod client;

pub use cache::*;
pub use client::*;

use std::path::PathBuf;

use crate::error::Result;
use crate::ui::Ui;

/// Return a local copy of `url`, downloading it unless already cached
pub fn fetch_object(
    url: &str,
    cache: &ObjectCache,
    force: bool,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    let path = cache.object_path(url);

    if !force && cache.is_cached(url) {
        ui.log(format!("Using cached copy of {}", url));
        return Ok(path);
    }

    ui.log(format!("Downloading {}", url));
    let client = ObjectClient::new()?;
    client.download(url, &path, ui)?;

    Ok(path)
}
