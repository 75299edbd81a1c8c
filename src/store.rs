use crate::error::StoreError;
use crate::utils::{load_text_files, split_into_chunks};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Immutable text blob with the label it is cited by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Document {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Anything that can hand over the full document collection on demand.
pub trait DocumentStore: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Document>, StoreError>;
}

/// Fixed in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        MemoryStore { documents }
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.clone())
    }
}

/// Text files under a directory, optionally split into sentence-bounded chunks.
///
/// Each chunk is labelled with the name of the file it came from.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
    chunk_chars: usize,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>, chunk_chars: usize) -> Self {
        DirectoryStore {
            dir: dir.into(),
            chunk_chars,
        }
    }
}

impl DocumentStore for DirectoryStore {
    fn fetch_all(&self) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        for (path, content) in load_text_files(&self.dir)? {
            let source = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            if self.chunk_chars == 0 {
                documents.push(Document::new(content, source));
            } else {
                documents.extend(
                    split_into_chunks(&content, self.chunk_chars)
                        .into_iter()
                        .map(|chunk| Document::new(chunk, source.clone())),
                );
            }
        }
        debug!(dir = %self.dir.display(), count = documents.len(), "fetched documents");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_directory_store_labels_by_file_name() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("fees.txt"), "Fees are due. Registration is Rs. 500.")?;
        fs::write(dir.path().join("contact.md"), "Email the office.")?;

        let documents = DirectoryStore::new(dir.path(), 0).fetch_all()?;
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].source, "contact.md");
        assert_eq!(documents[1].source, "fees.txt");
        Ok(())
    }

    #[test]
    fn test_directory_store_chunks() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("handbook.txt"),
            "First sentence here. Second sentence follows. Third one closes it.",
        )?;

        let documents = DirectoryStore::new(dir.path(), 25).fetch_all()?;
        assert!(documents.len() > 1);
        assert!(documents.iter().all(|d| d.source == "handbook.txt"));
        Ok(())
    }

    #[test]
    fn test_directory_store_chunks_keep_text_intact() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("admissions.txt"),
            "To apply, submit the form. Is there a deadline? Contact the office \
             by email at info@infotechcollege.example or by phone. Pass mark is 3.5 points.",
        )?;

        let documents = DirectoryStore::new(dir.path(), 60).fetch_all()?;
        let text = documents.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join(" ");
        assert!(text.contains("info@infotechcollege.example"));
        assert!(text.contains("deadline?"));
        assert!(text.contains("3.5 points."));
        assert!(!text.contains(". example"));
        Ok(())
    }

    #[test]
    fn test_directory_store_missing_dir_is_unavailable() {
        let store = DirectoryStore::new("/definitely/not/here", 0);
        assert!(matches!(store.fetch_all(), Err(StoreError::MissingDirectory(_))));
    }
}
