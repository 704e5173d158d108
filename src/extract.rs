//! Lazy tar.gz extraction over in-memory buffers.

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::RegistryError;

/// 100 MB cap on a single decompressed entry to guard against
/// decompression bombs.
const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// One member of an extracted archive.
///
/// `buffer` is `None` for directory and other non-file entries, and for
/// entries presented to a filter before their content is materialized.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Archive-relative path of the entry.
    pub path: String,
    /// Entry content, present only for regular files that passed the filter.
    pub buffer: Option<Bytes>,
}

/// Decompress `buffer` and walk its tar entries in order.
///
/// Each entry is first presented to `filter` without content; rejected
/// entries are skipped without reading their body. Accepted regular files
/// have their body read into a buffer and handed to `on_entry`; accepted
/// directories (and other non-file entries) reach `on_entry` with no buffer.
///
/// The walk is finite and not restartable; every call decompresses afresh.
/// Malformed gzip or tar data fails with [`RegistryError::Decode`].
pub fn extract_entries<F, G>(
    buffer: &[u8],
    filter: F,
    mut on_entry: G,
) -> Result<(), RegistryError>
where
    F: Fn(&ArchiveEntry) -> bool,
    G: FnMut(ArchiveEntry),
{
    let decoder = GzDecoder::new(buffer);
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(false);
    #[cfg(any(unix, target_os = "redox"))]
    archive.set_unpack_xattrs(false);

    let entries = archive
        .entries()
        .map_err(|e| RegistryError::decode("opening tar stream", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| RegistryError::decode("reading tar entry", e))?;

        let path = entry
            .path()
            .map_err(|e| RegistryError::decode("reading entry path", e))?
            .to_string_lossy()
            .into_owned();

        let candidate = ArchiveEntry { path, buffer: None };
        if !filter(&candidate) {
            continue;
        }

        if entry.header().entry_type().is_file() {
            if entry.size() > MAX_ENTRY_SIZE {
                return Err(RegistryError::decode(
                    format!("reading entry {}", candidate.path),
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("entry exceeds {MAX_ENTRY_SIZE} byte cap"),
                    ),
                ));
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .by_ref()
                .take(MAX_ENTRY_SIZE)
                .read_to_end(&mut data)
                .map_err(|e| {
                    RegistryError::decode(format!("reading entry {}", candidate.path), e)
                })?;

            on_entry(ArchiveEntry {
                path: candidate.path,
                buffer: Some(Bytes::from(data)),
            });
        } else {
            on_entry(candidate);
        }
    }

    Ok(())
}
