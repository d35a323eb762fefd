//! Live filesystem adapter using `std::fs`.

use std::path::Path;

use crate::ports::filesystem::FileSystem;

/// Manifest and state file access on the real disk.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so a crash never truncates state.
        let staging = path.with_extension("tmp");
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_replaces_contents() {
        let dir = std::env::temp_dir().join("labsync_live_fs_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("state.yaml");
        let fs = LiveFileSystem;

        fs.write(&path, "first").unwrap();
        fs.write(&path, "second").unwrap();

        assert!(fs.exists(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
