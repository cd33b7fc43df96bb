//! Archive builder: concurrent downloads, collision-free naming, zip output.
//!
//! Downloads fan out over a bounded pool of worker threads pulling from a
//! shared queue; every result is sent back over a channel to the calling
//! thread, which is the only owner of the [`ArchiveJob`]. Name claims are
//! therefore serialized even though the transfers are not, and they are made
//! in input order, so a fixed input always yields the same entry names.

use std::collections::{HashSet, VecDeque};
use std::io::{Cursor, Write};
use std::sync::{mpsc, Mutex};
use std::thread;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fetch::{Fetch, FetchError, FetchedBody};
use crate::model::FileEntry;
use crate::naming::{sanitize_entry_path, NameRegistry, UNKNOWN_FILE};

/// Error while serializing an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress of a download batch, sent after each settled download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveProgress {
    pub settled: usize,
    pub failed: usize,
    pub total: usize,
}

/// A file whose bytes were fetched successfully.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub entry: FileEntry,
    pub bytes: Vec<u8>,
    /// `Content-Disposition` of the response, when the server sent one.
    pub content_disposition: Option<String>,
}

/// Downloads every entry, at most `max_concurrent` at a time (0 = one worker
/// per entry), and waits for all of them to settle.
///
/// A failed download is logged and left out; the batch never aborts.
/// Successful results come back in input order, whatever order they completed in.
pub fn download_all(
    fetcher: &dyn Fetch,
    entries: Vec<FileEntry>,
    max_concurrent: usize,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ArchiveProgress>>,
) -> Vec<Downloaded> {
    let total = entries.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = if max_concurrent == 0 {
        total
    } else {
        max_concurrent.min(total)
    };

    let mut slots: Vec<Option<FetchedBody>> = (0..total).map(|_| None).collect();
    {
        let queue: Mutex<VecDeque<(usize, &FileEntry)>> =
            Mutex::new(entries.iter().enumerate().collect());
        let (tx, rx) = mpsc::channel::<(usize, Result<FetchedBody, FetchError>)>();

        thread::scope(|s| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                s.spawn(move || loop {
                    let next = match queue.lock() {
                        Ok(mut q) => q.pop_front(),
                        Err(_) => None,
                    };
                    let Some((index, entry)) = next else {
                        break;
                    };
                    let result = fetcher.get(&entry.download_url);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            let mut progress = ArchiveProgress {
                settled: 0,
                failed: 0,
                total,
            };
            for (index, result) in rx {
                progress.settled += 1;
                match result {
                    Ok(body) => slots[index] = Some(body),
                    Err(e) => {
                        progress.failed += 1;
                        tracing::warn!(
                            url = %entries[index].download_url,
                            path = %entries[index].relative_path,
                            "download failed, entry omitted: {}",
                            e
                        );
                    }
                }
                if let Some(tx) = progress_tx {
                    let _ = tx.try_send(progress);
                }
            }
        });
    }

    entries
        .into_iter()
        .zip(slots)
        .filter_map(|(entry, body)| {
            body.map(|body| Downloaded {
                entry,
                bytes: body.bytes,
                content_disposition: body.content_disposition,
            })
        })
        .collect()
}

/// A finished archive ready to be written out.
#[derive(Debug, Clone)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub file_count: usize,
}

/// An archive under construction: files placed under one root folder,
/// each under a unique path.
#[derive(Debug)]
pub struct ArchiveJob {
    file_name: String,
    root: String,
    names: NameRegistry,
    files: Vec<(String, Vec<u8>)>,
}

impl ArchiveJob {
    /// `root_folder` must already be sanitized (see `naming::archive_root_folder`).
    pub fn new(file_name: impl Into<String>, root_folder: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            root: root_folder.into(),
            names: NameRegistry::new(),
            files: Vec::new(),
        }
    }

    /// Adds a file under `relative_path`, renamed to `name (n).ext` if that
    /// path is already taken. Returns the path actually used, relative to the root.
    pub fn add(&mut self, relative_path: &str, bytes: Vec<u8>) -> String {
        let clean = sanitize_entry_path(relative_path).unwrap_or_else(|| UNKNOWN_FILE.to_string());
        let claimed = self.names.claim(&clean);
        if claimed != clean {
            tracing::debug!(wanted = %clean, used = %claimed, "name collision, renamed");
        }
        self.files.push((claimed.clone(), bytes));
        claimed
    }

    /// Serializes to a deflate-compressed zip: a directory entry for the root
    /// and each sub-folder (first appearance order), then files in the order
    /// they were added.
    pub fn finish(self) -> Result<Archive, ArchiveError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut dirs: HashSet<String> = HashSet::new();

        zip.add_directory(format!("{}/", self.root), options)?;
        for (path, bytes) in &self.files {
            let full = format!("{}/{}", self.root, path);
            let mut dir_end = self.root.len();
            while let Some(i) = full[dir_end + 1..].find('/') {
                dir_end += 1 + i;
                let dir = &full[..=dir_end];
                if dirs.insert(dir.to_string()) {
                    zip.add_directory(dir, options)?;
                }
            }
            zip.start_file(full, options)?;
            zip.write_all(bytes)?;
        }

        let bytes = zip.finish()?.into_inner();
        tracing::debug!(name = %self.file_name, files = self.files.len(), size = bytes.len(), "archive serialized");
        Ok(Archive {
            file_name: self.file_name,
            file_count: self.files.len(),
            bytes,
        })
    }
}
