//! Resolve a source location into the JSON objects a bulk copy reads.
//!
//! A location is a directory (walked recursively), a single file, a `.zip`
//! archive, an `http(s)://` object (fetched into the cache first), or a path
//! prefix matched against its parent directory the way an object-storage
//! prefix matches keys.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::download::{fetch_object, ObjectCache};
use crate::error::{EtlError, Result};
use crate::ui::Ui;

const JSON_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

/// One readable object of a source location
#[derive(Debug, Clone, PartialEq)]
pub enum SourceObject {
    File(PathBuf),
    ZipEntry { archive: PathBuf, name: String },
}

impl SourceObject {
    pub fn name(&self) -> String {
        match self {
            SourceObject::File(path) => path.display().to_string(),
            SourceObject::ZipEntry { archive, name } => {
                format!("{}!{}", archive.display(), name)
            }
        }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        match self {
            SourceObject::File(path) => {
                File::open(path)
                    .map_err(|e| EtlError::source_unreachable(self.name(), e.to_string()))?
                    .read_to_end(&mut bytes)?;
            }
            SourceObject::ZipEntry { archive, name } => {
                let mut zip = open_archive(archive)?;
                let mut entry = zip
                    .by_name(name)
                    .map_err(|e| EtlError::source_unreachable(self.name(), e.to_string()))?;
                entry.read_to_end(&mut bytes)?;
            }
        }
        Ok(bytes)
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| EtlError::source_unreachable(path.display().to_string(), e.to_string()))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| {
        EtlError::source_unreachable(path.display().to_string(), format!("bad archive: {}", e))
    })
}

fn is_json_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| JSON_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Resolves source locations for the local warehouse
pub struct SourceResolver<'a> {
    cache: &'a ObjectCache,
    force_download: bool,
}

impl<'a> SourceResolver<'a> {
    pub fn new(cache: &'a ObjectCache, force_download: bool) -> Self {
        Self {
            cache,
            force_download,
        }
    }

    /// All objects under a location, in name order. An empty match is an error.
    pub fn resolve(&self, location: &str, ui: &mut impl Ui) -> Result<Vec<SourceObject>> {
        let path = self.local_path(location, ui)?;

        let objects = if path.exists() {
            expand(&path)?
        } else {
            expand_prefix(&path)?
        };

        if objects.is_empty() {
            return Err(EtlError::source_unreachable(
                location,
                "no JSON objects found at this location",
            ));
        }

        Ok(objects)
    }

    /// Read a location that must name exactly one object (a JSONPaths descriptor)
    pub fn read_single(&self, location: &str, ui: &mut impl Ui) -> Result<Vec<u8>> {
        let path = self.local_path(location, ui)?;
        if !path.is_file() {
            return Err(EtlError::source_unreachable(location, "not a file"));
        }
        SourceObject::File(path).read()
    }

    fn local_path(&self, location: &str, ui: &mut impl Ui) -> Result<PathBuf> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return fetch_object(location, self.cache, self.force_download, ui);
        }
        if location.starts_with("s3://") {
            return Err(EtlError::source_unreachable(
                location,
                "object storage is only reachable from the redshift target",
            ));
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(PathBuf::from(path))
    }
}

/// Expand an existing path: directory, archive, or plain file
fn expand(path: &Path) -> Result<Vec<SourceObject>> {
    if path.is_dir() {
        let mut objects = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                EtlError::source_unreachable(path.display().to_string(), e.to_string())
            })?;
            let keep = {
                let name = entry.file_name().to_string_lossy();
                entry.file_type().is_file() && !name.starts_with('.') && is_json_name(&name)
            };
            if keep {
                objects.push(SourceObject::File(entry.into_path()));
            }
        }
        return Ok(objects);
    }

    if is_zip(path) {
        let archive = open_archive(path)?;
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/') && is_json_name(name))
            .map(str::to_string)
            .collect();
        names.sort();
        return Ok(names
            .into_iter()
            .map(|name| SourceObject::ZipEntry {
                archive: path.to_path_buf(),
                name,
            })
            .collect());
    }

    Ok(vec![SourceObject::File(path.to_path_buf())])
}

/// Treat a missing path as a key prefix within its parent directory
fn expand_prefix(path: &Path) -> Result<Vec<SourceObject>> {
    let location = path.display().to_string();
    let prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EtlError::source_unreachable(&location, "path does not exist"))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !parent.is_dir() {
        return Err(EtlError::source_unreachable(&location, "path does not exist"));
    }

    let mut matches: Vec<PathBuf> = std::fs::read_dir(&parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();
    matches.sort();

    let mut objects = Vec::new();
    for matched in matches {
        if matched.is_dir() || is_zip(&matched) || is_json_name(&matched.to_string_lossy()) {
            objects.extend(expand(&matched)?);
        }
    }

    Ok(objects)
}
