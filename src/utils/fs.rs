use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|found| found.to_string_lossy().eq_ignore_ascii_case(ext))
}

/// Writes to `<path>.tmp` and renames over `path`, so readers never see a
/// half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_relative_paths_against_base() {
        let base = Path::new("/work");
        assert_eq!(
            resolve_path(base, Path::new("answers.json")),
            PathBuf::from("/work/answers.json")
        );
        assert_eq!(
            resolve_path(base, Path::new("/tmp/answers.json")),
            PathBuf::from("/tmp/answers.json")
        );
    }

    #[test]
    fn matches_extension_case_insensitively() {
        assert!(has_extension(Path::new("a/b.JSON"), "json"));
        assert!(!has_extension(Path::new("a/b.json.tmp"), "json"));
        assert!(!has_extension(Path::new("a/json"), "json"));
    }

    #[test]
    fn atomic_write_replaces_content_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("record.json.tmp").exists());
    }
}
