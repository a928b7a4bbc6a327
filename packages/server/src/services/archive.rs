//! Zip packaging of an event's media for bulk download.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::utils::filename::unique_archive_name;

/// One stored file and the name it gets inside the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub original_name: String,
}

/// A finished archive, rewound to the start and ready to stream.
pub struct EventArchive {
    pub file: tokio::fs::File,
    pub len: u64,
    pub entries: usize,
}

/// Build the archive in an anonymous temp file on the blocking pool.
///
/// Media is already compressed, so entries are stored rather than deflated.
/// Files missing from disk are skipped.
pub async fn build_archive(entries: Vec<ArchiveEntry>) -> Result<EventArchive> {
    let (file, len, written) = tokio::task::spawn_blocking(move || write_archive(entries))
        .await
        .context("archive task panicked")??;

    Ok(EventArchive {
        file: tokio::fs::File::from_std(file),
        len,
        entries: written,
    })
}

fn write_archive(entries: Vec<ArchiveEntry>) -> Result<(File, u64, usize)> {
    let temp = tempfile::tempfile().context("create archive temp file")?;
    let mut zip = ZipWriter::new(temp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut used = HashSet::new();
    let mut written = 0;
    for entry in entries {
        let mut source = match File::open(&entry.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %entry.path.display(), "Media file missing, left out of archive");
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("open {}", entry.path.display()));
            }
        };
        let name = unique_archive_name(&mut used, &entry.original_name);
        zip.start_file(name, options).context("start zip entry")?;
        io::copy(&mut source, &mut zip).context("copy into zip")?;
        written += 1;
    }

    let mut file = zip.finish().context("finish zip")?;
    let len = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;
    Ok((file, len, written))
}

/// Download name for an event's archive.
pub fn archive_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() {
        "event_media.zip".to_string()
    } else {
        format!("{stem}_media.zip")
    }
}
