// src/storage/archive.rs
//! Zip archive layout of an agenda file.
//!
//! ```text
//! meta.s           graph-encoded metadata section
//! data.s           graph-encoded data section
//! files/<id>.png   theme images
//! ```
//!
//! Anything else found in the staging directory is carried along as-is.

use std::fs::{self, File, Permissions};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::ArchiveCompression;
use crate::error::{AgendaError, Result};

pub const META_SECTION: &str = "meta.s";
pub const DATA_SECTION: &str = "data.s";

/// Sections every valid archive must contain, in the order they are checked.
const REQUIRED_SECTIONS: [&str; 2] = [DATA_SECTION, META_SECTION];

/// Validate `archive_path` and unpack all of its entries into `staging_dir`.
///
/// Returns the number of archive entries.
pub fn extract(archive_path: &Path, staging_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| AgendaError::InvalidArchive {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    for section in REQUIRED_SECTIONS {
        if !archive.file_names().any(|name| name == section) {
            return Err(AgendaError::MissingSection {
                path: archive_path.to_path_buf(),
                section: section.to_string(),
            });
        }
    }

    archive
        .extract(staging_dir)
        .map_err(|e| AgendaError::InvalidArchive {
            path: archive_path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(archive.len())
}

/// Build a new archive at `destination` from everything under `staging_dir`.
///
/// Entries are added in file-name order with a fixed timestamp, so an
/// unchanged staging directory always produces the same bytes. The archive
/// is written to a temporary file beside `destination` and renamed over it.
///
/// Returns the number of entries written.
pub fn write(
    staging_dir: &Path,
    destination: &Path,
    compression: ArchiveCompression,
) -> Result<usize> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(parent)?;

    let options = SimpleFileOptions::default()
        .compression_method(compression.into())
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(tmp.as_file());
    let mut entries = 0;

    for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let name = entry_name(staging_dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
        entries += 1;
    }

    zip.finish()?;
    if let Some(permissions) = archive_permissions(destination)? {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(destination).map_err(|e| e.error)?;

    Ok(entries)
}

/// Permissions for the rebuilt archive: those of the file being replaced,
/// or `0644` for a new one on unix. Temporary files start out owner-only.
fn archive_permissions(destination: &Path) -> Result<Option<Permissions>> {
    match fs::metadata(destination) {
        Ok(existing) => Ok(Some(existing.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

/// Archive entry name: the path relative to the staging root, `/`-separated.
fn entry_name(staging_dir: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(staging_dir).map_err(io::Error::other)?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    fn staged(tmp: &TempDir) -> std::path::PathBuf {
        let staging = tmp.path().join("staging");
        fs::create_dir_all(staging.join("files")).unwrap();
        fs::write(staging.join(META_SECTION), b"meta").unwrap();
        fs::write(staging.join(DATA_SECTION), b"data").unwrap();
        fs::write(staging.join("files").join("t1.png"), b"png").unwrap();
        staging
    }

    #[test]
    fn test_write_uses_relative_names() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        let out = tmp.path().join("out.bad");

        let count = write(&staging, &out, ArchiveCompression::Deflated).unwrap();
        assert_eq!(count, 4);

        let mut entries = names(&out);
        entries.sort();
        assert_eq!(entries, vec!["data.s", "files/", "files/t1.png", "meta.s"]);
    }

    #[test]
    fn test_write_descends_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        fs::create_dir_all(staging.join("files").join("extra")).unwrap();
        fs::write(staging.join("files").join("extra").join("x.txt"), b"x").unwrap();
        let out = tmp.path().join("out.bad");

        write(&staging, &out, ArchiveCompression::Stored).unwrap();
        assert!(names(&out).contains(&"files/extra/x.txt".to_string()));
    }

    #[test]
    fn test_write_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        let first = tmp.path().join("a.bad");
        let second = tmp.path().join("b.bad");

        write(&staging, &first, ArchiveCompression::Deflated).unwrap();
        write(&staging, &second, ArchiveCompression::Deflated).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_write_replaces_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        let out = tmp.path().join("out.bad");
        fs::write(&out, b"stale").unwrap();

        write(&staging, &out, ArchiveCompression::Deflated).unwrap();
        assert!(names(&out).contains(&"meta.s".to_string()));
    }

    #[test]
    fn test_extract_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        let out = tmp.path().join("out.bad");
        write(&staging, &out, ArchiveCompression::Deflated).unwrap();

        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        extract(&out, &target).unwrap();

        assert_eq!(fs::read(target.join(META_SECTION)).unwrap(), b"meta");
        assert_eq!(fs::read(target.join("files").join("t1.png")).unwrap(), b"png");
    }

    #[test]
    fn test_extract_rejects_non_archive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.bad");
        fs::write(&path, b"just some text").unwrap();

        let err = extract(&path, tmp.path()).unwrap_err();
        assert!(matches!(err, AgendaError::InvalidArchive { .. }));
    }

    #[test]
    fn test_extract_reports_missing_data_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.bad");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(META_SECTION, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"meta").unwrap();
        zip.finish().unwrap();

        let err = extract(&path, tmp.path()).unwrap_err();
        match err {
            AgendaError::MissingSection { section, .. } => assert_eq!(section, DATA_SECTION),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_extract_reports_missing_meta_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.bad");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(DATA_SECTION, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"data").unwrap();
        zip.finish().unwrap();

        let err = extract(&path, tmp.path()).unwrap_err();
        match err {
            AgendaError::MissingSection { section, .. } => assert_eq!(section, META_SECTION),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_extract_corrupt_entry_is_invalid_archive() {
        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);
        fs::write(staging.join(DATA_SECTION), b"DATA-PAYLOAD-0123456789").unwrap();
        let out = tmp.path().join("out.bad");
        write(&staging, &out, ArchiveCompression::Stored).unwrap();

        // stored entries keep their bytes verbatim; break the checksum
        let mut raw = fs::read(&out).unwrap();
        let at = raw
            .windows(12)
            .position(|w| w == b"DATA-PAYLOAD")
            .unwrap();
        raw[at..at + 4].copy_from_slice(b"XXXX");
        fs::write(&out, &raw).unwrap();

        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        let err = extract(&out, &target).unwrap_err();
        assert!(matches!(err, AgendaError::InvalidArchive { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_destination_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let staging = staged(&tmp);

        let fresh = tmp.path().join("fresh.bad");
        write(&staging, &fresh, ArchiveCompression::Deflated).unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        let shared = tmp.path().join("shared.bad");
        fs::write(&shared, b"old").unwrap();
        fs::set_permissions(&shared, fs::Permissions::from_mode(0o664)).unwrap();
        write(&staging, &shared, ArchiveCompression::Deflated).unwrap();
        let mode = fs::metadata(&shared).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o664);
    }
}
