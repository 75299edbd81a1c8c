use lazy_static::lazy_static;
use ndarray::Array1;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// Term-weighted vector of a text against a fitted [`VectorSpace`].
pub type Embedding = Array1<f32>;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
    static ref STOP_WORDS: FxHashSet<&'static str> = {
        let words = vec![
            "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
            "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
            "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
            "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
            "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
            "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
            "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
            "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
            "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
            "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
            "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
            "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
            "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
            "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
            "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its",
            "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd", "made",
            "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most",
            "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
            "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
            "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
            "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
            "over", "own", "part", "per", "perhaps", "please", "put", "rather", "re", "same",
            "see", "seem", "seemed", "seeming", "seems", "serious", "several", "she", "should",
            "show", "side", "since", "sincere", "six", "sixty", "so", "some", "somehow",
            "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
            "system", "take", "ten", "than", "that", "the", "their", "them", "themselves", "then",
            "thence", "there", "thereafter", "thereby", "therefore", "therein", "thereupon",
            "these", "they", "thick", "thin", "third", "this", "those", "though", "three",
            "through", "throughout", "thru", "thus", "to", "together", "too", "top", "toward",
            "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon", "us",
            "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
            "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
            "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
            "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
            "yours", "yourself", "yourselves",
        ];
        words.into_iter().collect()
    };
}

/// Fitted vocabulary: term -> dimension plus the smoothed idf of each dimension.
#[derive(Debug, Clone)]
struct Vocabulary {
    index: FxHashMap<String, usize>,
    idf: Array1<f32>,
}

/// TF-IDF vector space with an explicit `unfit -> fit` lifecycle.
///
/// The space is fit at most once. Documents that show up after the fit are
/// still embedded, but only against the vocabulary captured at fit time.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    max_features: usize,
    vocabulary: Option<Vocabulary>,
}

impl Default for VectorSpace {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl VectorSpace {
    pub fn new(max_features: usize) -> Self {
        VectorSpace {
            max_features,
            vocabulary: None,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Number of dimensions of every embedding this space produces.
    pub fn dimension(&self) -> usize {
        match &self.vocabulary {
            Some(vocabulary) => vocabulary.idf.len(),
            None => self.max_features,
        }
    }

    /// Fits the vocabulary on `texts` unless already fit.
    ///
    /// Returns `true` only when this call performed the fit. A corpus without
    /// a single usable term leaves the space unfit.
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> bool {
        if self.is_fit() {
            return false;
        }

        let mut term_counts: FxHashMap<String, usize> = FxHashMap::default();
        let mut doc_freq: FxHashMap<String, usize> = FxHashMap::default();
        for text in texts {
            let tokens = tokenize(text.as_ref());
            let mut seen = FxHashSet::default();
            for token in tokens {
                if seen.insert(token.clone()) {
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
                *term_counts.entry(token).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            warn!(documents = texts.len(), "corpus has no usable terms; vector space left unfit");
            return false;
        }

        // Most frequent terms first, alphabetical on ties.
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let doc_count = texts.len() as f32;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + doc_count) / (1.0 + df)).ln() + 1.0
            })
            .collect::<Array1<f32>>();
        let index = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        self.vocabulary = Some(Vocabulary { index, idf });
        info!(
            documents = texts.len(),
            dimension = self.dimension(),
            "vector space fit"
        );
        true
    }

    /// Projects `text` into the space.
    ///
    /// An unfit space yields the zero vector: callers read that as "no signal".
    pub fn embed(&self, text: &str) -> Embedding {
        let Some(vocabulary) = &self.vocabulary else {
            debug!("vector space not fit; degraded to zero embedding");
            return Array1::zeros(self.max_features);
        };

        let mut embedding = Array1::<f32>::zeros(vocabulary.idf.len());
        for token in tokenize(text) {
            if let Some(&i) = vocabulary.index.get(&token) {
                embedding[i] += 1.0;
            }
        }
        embedding *= &vocabulary.idf;

        let norm = embedding.dot(&embedding).sqrt();
        if norm > 0.0 {
            embedding /= norm;
        }
        embedding
    }
}

/// Lowercased, NFC-normalized word tokens of two or more characters, stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let text = text.nfc().collect::<String>().to_lowercase();
    TOKEN_PATTERN
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Cosine similarity; zero whenever either side is the zero vector.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        a.dot(b) / (norm_a * norm_b)
    }
}
