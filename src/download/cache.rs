use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::error::{EtlError, Result};

/// On-disk cache of downloaded source objects, one file per URL
pub struct ObjectCache {
    cache_dir: PathBuf,
}

impl ObjectCache {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "songplay-warehouse")
                    .ok_or_else(|| EtlError::config("Could not determine cache directory"))?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir)?;

        Ok(Self { cache_dir })
    }

    /// Cache path for a URL: a SHA-256 prefix of the URL plus its last
    /// segment, so archive and JSON extensions survive.
    pub fn object_path(&self, url: &str) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(url.as_bytes()));

        let file_name = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("object");

        self.cache_dir
            .join(format!("{}-{}", &digest[..16], file_name))
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.object_path(url).is_file()
    }
}
