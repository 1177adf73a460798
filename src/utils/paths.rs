use std::env;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result, bail};

// Maximum size for a record export file: 50MB
const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Validates that a file's size is within acceptable limits (50MB)
///
/// Takes an open file handle so the size check and the subsequent read
/// operate on the same file.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the file is larger than 50MB.
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Write a file atomically (temp file + rename) creating parent directories as needed
///
/// Readers see either the previous content or the new content, never a partial write.
/// Nothing is coordinated across files.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("Path has no file name: {}", path.display()))?;
    let temp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file into place: {}", path.display()))?;

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use diary_insights::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/diary/insights");
/// // Returns "~/diary/insights" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    if let Some(home) = home.filter(|h| !h.is_empty())
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return Path::new("~").join(rest).to_string_lossy().into_owned();
    }

    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("deeper").join("out.json");

        write_atomic(&target, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!target.with_file_name("out.json.tmp").exists(), "temp file should be renamed");
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("latest.csv");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_write_atomic_fails_when_parent_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();

        let result = write_atomic(&blocker.join("out.json"), b"{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_file_size_small_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("records.json");
        fs::write(&path, "[]").unwrap();
        let file = File::open(&path).unwrap();
        assert!(validate_file_size(&file, &path).is_ok());
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/Users/testuser/diary/insights");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/testuser"));
        assert_eq!(formatted, "~/diary/insights");

        let path2 = PathBuf::from("/opt/local/bin");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");
    }

    #[test]
    fn test_format_path_with_tilde_matches_whole_components() {
        let sibling = PathBuf::from("/home/alice/diary");
        assert_eq!(format_path_with_tilde_internal(&sibling, Some("/home/al")), "/home/alice/diary");

        let home = PathBuf::from("/home/al");
        assert_eq!(format_path_with_tilde_internal(&home, Some("/home/al/")), "~");

        assert_eq!(format_path_with_tilde_internal(&sibling, Some("")), "/home/alice/diary");
    }
}
