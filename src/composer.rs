use crate::retriever::Passage;
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_MAX_PASSAGES: usize = 2;
pub const DEFAULT_MAX_CHARS: usize = 500;
pub const MORE_INFORMATION_MARKER: &str = "... [More information available in documents]";
pub const NO_INFORMATION_FALLBACK: &str = "I couldn't find specific information about that topic in the available documents. Please try asking about programs, fees, admissions, or contact information.";

/// Coarse topic of a query, picked by keyword presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Program,
    Cost,
    Contact,
    Admission,
    Duration,
    Generic,
}

/// Checked in order; the first category with a trigger in the query wins.
const PRECEDENCE: [(Category, &[&str]); 5] = [
    (Category::Program, &["program", "course"]),
    (Category::Cost, &["tuition", "cost", "fee", "payment"]),
    (Category::Contact, &["contact", "email", "phone"]),
    (Category::Admission, &["admission", "apply", "requirement"]),
    (Category::Duration, &["duration", "length", "month"]),
];

impl Category {
    pub fn classify(query: &str) -> Category {
        let query = query.to_lowercase();
        PRECEDENCE
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| query.contains(t)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Generic)
    }

    /// Words a passage must contain (any one of) to be accepted.
    /// Empty for `Generic`, which accepts everything.
    pub fn passage_keywords(self) -> &'static [&'static str] {
        match self {
            Category::Program => &["fit", "foundation"],
            Category::Cost => &["payment", "fee", "rs.", "registration"],
            Category::Contact => &["contact", "email", "phone"],
            Category::Admission => &["admission", "apply", "requirement"],
            Category::Duration => &["month", "duration"],
            Category::Generic => &[],
        }
    }

    pub fn accepts(self, passage: &str) -> bool {
        if self == Category::Generic {
            return true;
        }
        let passage = passage.to_lowercase();
        self.passage_keywords().iter().any(|k| passage.contains(k))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Program => "program",
            Category::Cost => "cost",
            Category::Contact => "contact",
            Category::Admission => "admission",
            Category::Duration => "duration",
            Category::Generic => "generic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub max_passages: usize,
    pub max_chars: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_passages: DEFAULT_MAX_PASSAGES,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposerConfig,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Composer { config }
    }

    /// Passages whose text matches the query's category, in their original order.
    pub fn filter<'a>(&self, query: &str, passages: &'a [Passage]) -> Vec<&'a Passage> {
        let category = Category::classify(query);
        passages.iter().filter(|p| category.accepts(&p.text)).collect()
    }

    pub fn compose(&self, query: &str, passages: &[Passage]) -> Answer {
        let accepted = self.filter(query, passages);
        if accepted.is_empty() {
            return Answer {
                text: NO_INFORMATION_FALLBACK.to_string(),
                sources: Vec::new(),
            };
        }

        let used = &accepted[..accepted.len().min(self.config.max_passages)];
        let combined = used
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let text = if combined.chars().count() > self.config.max_chars {
            let head: String = combined.chars().take(self.config.max_chars).collect();
            format!("{head}{MORE_INFORMATION_MARKER}")
        } else {
            combined
        };

        let sources = used
            .iter()
            .map(|p| p.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Answer { text, sources }
    }
}
