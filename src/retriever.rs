use crate::store::Document;
use crate::utils::clean_passage;
use crate::vector_space::{Embedding, VectorSpace, cosine_similarity};
use std::sync::RwLock;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 3;
/// Scores are f32; a score only survives if it compares strictly greater
/// than this f32 value, so a score that rounds to exactly `0.1_f32` is dropped.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.1;
pub const DEFAULT_BOILERPLATE: &str = "FIT HANDBOOK 2025 INFOTECH COLLEGE";

/// A document together with its similarity to the query and its 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
    pub rank: usize,
}

/// Cleaned, deduplicated excerpt returned to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub max_features: usize,
    pub top_k: usize,
    /// Exclusive lower bound: a score equal to this is discarded.
    pub min_similarity: f32,
    pub boilerplate: Vec<String>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_features: crate::vector_space::DEFAULT_MAX_FEATURES,
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            boilerplate: vec![DEFAULT_BOILERPLATE.to_string()],
        }
    }
}

/// Linear-scan TF-IDF retriever over whatever collection it is handed.
///
/// The vector space is fit on the first collection seen and then kept for the
/// lifetime of the retriever. Document embeddings are recomputed on every
/// query; nothing is cached between calls.
pub struct Retriever {
    space: RwLock<VectorSpace>,
    config: RetrieverConfig,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(RetrieverConfig::default())
    }
}

impl Retriever {
    pub fn new(config: RetrieverConfig) -> Self {
        Retriever {
            space: RwLock::new(VectorSpace::new(config.max_features)),
            config,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.space.read().map(|space| space.is_fit()).unwrap_or(false)
    }

    /// Fits the vector space on `documents` if nothing has been fit yet.
    pub fn ensure_fit(&self, documents: &[Document]) -> anyhow::Result<()> {
        if self.is_fit() {
            return Ok(());
        }
        let mut space = self
            .space
            .write()
            .map_err(|_| anyhow::anyhow!("vector space lock poisoned"))?;
        // Re-checked by `fit` under the write lock.
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        space.fit(&texts);
        Ok(())
    }

    pub fn embed(&self, text: &str) -> anyhow::Result<Embedding> {
        let space = self
            .space
            .read()
            .map_err(|_| anyhow::anyhow!("vector space lock poisoned"))?;
        Ok(space.embed(text))
    }

    /// Top-k documents scoring strictly above the similarity threshold, best first.
    ///
    /// Ties keep their collection order.
    pub fn score(&self, query: &str, documents: &[Document]) -> anyhow::Result<Vec<ScoredDocument>> {
        self.ensure_fit(documents)?;

        let space = self
            .space
            .read()
            .map_err(|_| anyhow::anyhow!("vector space lock poisoned"))?;
        let query_embedding = space.embed(query);

        let similarities: Vec<(f32, &Document)> = documents
            .iter()
            .map(|doc| {
                let doc_embedding = space.embed(&doc.content);
                (cosine_similarity(&query_embedding, &doc_embedding), doc)
            })
            .collect();

        let scored = self.select(similarities);
        debug!(
            candidates = documents.len(),
            selected = scored.len(),
            top_score = scored.first().map(|s| s.score),
            "scored query"
        );
        Ok(scored)
    }

    /// Keeps the top-k of `similarities` that lie strictly above the threshold.
    fn select(&self, mut similarities: Vec<(f32, &Document)>) -> Vec<ScoredDocument> {
        // sort_by is stable, so equal scores stay in collection order
        similarities.sort_by(|a, b| b.0.total_cmp(&a.0));

        similarities
            .into_iter()
            .take(self.config.top_k)
            .filter(|(score, _)| *score > self.config.min_similarity)
            .enumerate()
            .map(|(i, (score, doc))| ScoredDocument {
                document: doc.clone(),
                score,
                rank: i + 1,
            })
            .collect()
    }

    /// Scores, cleans and deduplicates passages for `query`, keeping rank order.
    pub fn retrieve(&self, query: &str, documents: &[Document]) -> anyhow::Result<Vec<Passage>> {
        let scored = self.score(query, documents)?;
        let mut passages: Vec<Passage> = Vec::with_capacity(scored.len());
        for hit in scored {
            let text = clean_passage(&hit.document.content, &self.config.boilerplate);
            if passages.iter().any(|p| p.text == text) {
                continue;
            }
            passages.push(Passage {
                text,
                source: hit.document.source,
            });
        }
        Ok(passages)
    }
}
