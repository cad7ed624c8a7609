use crate::utils::constants::{BACKUP_SUFFIX, DEDUP_SUFFIX};
use std::path::{Path, PathBuf};

/// `data/out.csv` -> `data/out_old.csv`
pub fn backup_path(path: &Path) -> PathBuf {
    with_stem_suffix(path, BACKUP_SUFFIX)
}

/// `data/out.csv` -> `data/out.dedup.csv`
pub fn dedup_path(path: &Path) -> PathBuf {
    with_stem_suffix(path, DEDUP_SUFFIX)
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let filename = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(filename)
}

/// Absolute form of `path` for identity checks. Works for files that do not
/// exist yet as long as their directory does.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Directory a file lives in, `.` for bare file names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("data/weather_data_aggregated.csv")),
            PathBuf::from("data/weather_data_aggregated_old.csv")
        );
        assert_eq!(backup_path(Path::new("output")), PathBuf::from("output_old"));
    }

    #[test]
    fn test_dedup_path() {
        assert_eq!(
            dedup_path(Path::new("data/weather_data_aggregated.csv")),
            PathBuf::from("data/weather_data_aggregated.dedup.csv")
        );
    }

    #[test]
    fn test_normalize_missing_file() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let missing = dir.path().join("later.csv");

        assert_eq!(
            normalize_path(&missing),
            dir.path().canonicalize()?.join("later.csv")
        );
        Ok(())
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("out.csv")), Path::new("."));
        assert_eq!(parent_dir(Path::new("data/out.csv")), Path::new("data"));
    }
}
