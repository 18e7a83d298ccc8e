use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Creates the directory that will hold `file`, if any.
pub fn ensure_parent_dir(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parent_dirs_are_created() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a").join("b").join("out.csv");
        ensure_parent_dir(&file).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_bare_file_name_needs_no_dir() {
        assert!(ensure_parent_dir(Path::new("out.csv")).is_ok());
    }
}
