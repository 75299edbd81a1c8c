use crate::error::StoreError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref PAGE_MARKER: Regex = Regex::new(r"Page \d+ of \d+").unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?](?:\s+|$)").unwrap();
}

/// Sentences of `text`, each keeping its own terminator.
///
/// A terminator only ends a sentence when whitespace or the end of text
/// follows it, so `3.5` and `info@host.example` stay whole.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Splits text into chunks of approximately max_chars length at sentence boundaries
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current_chunk = String::new();
    let mut current_length = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();
        if current_length + sentence_len + 1 > max_chars && !current_chunk.is_empty() {
            chunks.push(std::mem::take(&mut current_chunk));
            current_length = 0;
        }

        if !current_chunk.is_empty() {
            current_chunk.push(' ');
            current_length += 1;
        }
        current_chunk.push_str(sentence);
        current_length += sentence_len;
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}

/// Loads all `.txt` and `.md` files under a directory recursively, sorted by path
pub fn load_text_files(dir_path: impl AsRef<Path>) -> Result<Vec<(PathBuf, String)>, StoreError> {
    let dir_path = dir_path.as_ref();
    if !dir_path.is_dir() {
        return Err(StoreError::MissingDirectory(dir_path.to_path_buf()));
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| StoreError::Io { path, source }
    };

    let mut entries = fs::read_dir(dir_path)
        .map_err(io_err(dir_path))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err(dir_path))?;
    entries.sort();

    let mut texts = Vec::new();
    for path in entries {
        if path.is_file() {
            let is_text = path
                .extension()
                .is_some_and(|ext| ext == "txt" || ext == "md");
            if is_text {
                let content = fs::read_to_string(&path).map_err(io_err(&path))?;
                texts.push((path, content));
            }
        } else if path.is_dir() {
            texts.extend(load_text_files(&path)?);
        }
    }

    Ok(texts)
}

/// Strips boilerplate headers and page markers, then collapses whitespace runs
pub fn clean_passage(text: &str, boilerplate: &[String]) -> String {
    let mut text = text.to_string();
    for header in boilerplate.iter().filter(|h| !h.is_empty()) {
        text = text.replace(header.as_str(), "");
    }
    let text = PAGE_MARKER.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
