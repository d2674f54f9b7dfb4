use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::annotation::AnnotationSet;
use crate::error::{PersistenceError, Result};

use super::codec::{from_xml_str, to_xml_string};

/// Loads an annotation file.
///
/// # Errors
///
/// Returns [`PersistenceError::Io`] if the file cannot be read, and the
/// errors of [`from_xml_str`] for invalid content.
pub fn read_annotation_file(path: impl AsRef<Path>) -> Result<AnnotationSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = from_xml_str(&text)?;
    debug!(
        path = %path.display(),
        lanes = set.lanes().len(),
        boundaries = set.boundaries().len(),
        markers = set.markers().len(),
        "loaded annotation"
    );
    Ok(set)
}

/// Saves an annotation file. The previous file is replaced only once the new
/// content has been written completely.
///
/// # Errors
///
/// Returns [`PersistenceError::Io`] if writing fails.
pub fn write_annotation_file(path: impl AsRef<Path>, set: &AnnotationSet) -> Result<()> {
    let path = path.as_ref();
    let text = to_xml_string(set)?;
    write_atomically(path, text.as_bytes()).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes `bytes` to a sibling temporary file and renames it over `path`.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_sibling(path);
    let written = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("roadlane"), ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_a_sibling() {
        let tmp = temp_sibling(Path::new("/data/set/a.xml"));
        assert_eq!(tmp, Path::new("/data/set/a.xml.tmp"));
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner"), b"x").unwrap();

        assert!(write_atomically(&target, b"<RoadLane/>").is_err());
        assert!(!temp_sibling(&target).exists());
        assert!(target.is_dir());

        let missing = dir.path().join("absent").join("a.xml");
        assert!(write_atomically(&missing, b"<RoadLane/>").is_err());
        assert!(!temp_sibling(&missing).exists());
    }
}
