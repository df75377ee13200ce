use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Writes export files below a base directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!(path = %full_path.display(), bytes = data.len(), "Wrote export file");
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("out");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        let written = tokio_test::block_on(storage.write_file("tiktok_dog.csv", b"a,b\n")).unwrap();

        assert_eq!(written, base.join("tiktok_dog.csv").display().to_string());
        assert_eq!(std::fs::read(base.join("tiktok_dog.csv")).unwrap(), b"a,b\n");
    }
}
