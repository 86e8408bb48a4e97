//! Centralized input validation.

use std::path::{Path, PathBuf};

/// Input validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{} is not a valid path file.", .0.display())]
    InvalidPath(PathBuf),

    #[error("{} is not a directory.", .0.display())]
    NotADirectory(PathBuf),
}

/// Check that `path` names an existing, readable regular file.
///
/// # Examples
///
/// ```
/// use eggnog2gbk::utils::validation::is_valid_file;
/// use std::path::Path;
///
/// assert!(!is_valid_file(Path::new("/definitely/not/here.fna")));
/// ```
#[must_use]
pub fn is_valid_file(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

/// Validate every input file before any work starts.
///
/// Paths are checked in order and the first invalid one is reported.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPath` naming the offending path.
pub fn validate_input_files<'a, I>(paths: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        if !is_valid_file(path) {
            return Err(ValidationError::InvalidPath(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Validate that `path` is an existing directory
///
/// # Errors
///
/// Returns `ValidationError::NotADirectory` otherwise.
pub fn validate_directory(path: &Path) -> Result<(), ValidationError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ValidationError::NotADirectory(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_valid_file() {
        let temp = NamedTempFile::new().unwrap();
        assert!(is_valid_file(temp.path()));

        let dir = tempfile::tempdir().unwrap();
        assert!(!is_valid_file(dir.path()));
        assert!(!is_valid_file(&dir.path().join("missing.tsv")));
    }

    #[test]
    fn test_validate_input_files_reports_first_bad_path() {
        let good = NamedTempFile::new().unwrap();
        let bad = PathBuf::from("/no/such/genome.fna");
        let also_bad = PathBuf::from("/no/such/proteins.faa");

        let err = validate_input_files([good.path(), bad.as_path(), also_bad.as_path()])
            .unwrap_err();
        assert!(matches!(&err, ValidationError::InvalidPath(p) if *p == bad));
        assert_eq!(
            err.to_string(),
            "/no/such/genome.fna is not a valid path file."
        );
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_directory(dir.path()).is_ok());

        let file = NamedTempFile::new().unwrap();
        assert!(validate_directory(file.path()).is_err());
    }
}
