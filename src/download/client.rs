use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{EtlError, Result};
use crate::ui::Ui;

/// Blocking HTTP client for single source objects
pub struct ObjectClient {
    client: Client,
}

impl ObjectClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("songplay-warehouse")
            .build()
            .map_err(|e| EtlError::connectivity(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Download `url` to `dest`. The file only appears once complete.
    pub fn download(&self, url: &str, dest: &Path, ui: &mut impl Ui) -> Result<u64> {
        let unreachable = |e: reqwest::Error| EtlError::source_unreachable(url, e.to_string());

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(unreachable)?;

        let total_size = response.content_length().unwrap_or(0);
        let partial = dest.with_extension("part");
        let mut file = std::fs::File::create(&partial)?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| EtlError::source_unreachable(url, e.to_string()))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])?;

            downloaded += bytes_read as u64;
            ui.set_progress(downloaded, total_size, format_bytes(downloaded, total_size));
        }

        file.flush()?;
        std::fs::rename(&partial, dest)?;
        ui.clear_progress();

        Ok(downloaded)
    }
}

/// Format bytes as human-readable string
fn format_bytes(current: u64, total: u64) -> String {
    fn fmt(bytes: u64) -> String {
        if bytes >= 1_000_000_000 {
            format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
        } else if bytes >= 1_000_000 {
            format!("{:.1} MB", bytes as f64 / 1_000_000.0)
        } else if bytes >= 1_000 {
            format!("{:.1} KB", bytes as f64 / 1_000.0)
        } else {
            format!("{} B", bytes)
        }
    }
    if total == 0 {
        return fmt(current);
    }
    format!("{} / {}", fmt(current), fmt(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500, 999), "500 B / 999 B");
        assert_eq!(format_bytes(1500, 3000), "1.5 KB / 3.0 KB");
        assert_eq!(format_bytes(1_500_000, 0), "1.5 MB");
    }
}
