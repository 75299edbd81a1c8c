use crate::composer::{Category, Composer};
use crate::error::{ServiceError, ServiceResult};
use crate::retriever::Retriever;
use crate::store::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<String>,
}

/// Fetch, retrieve, filter, compose: the whole question-answering path.
pub struct QaService {
    store: Arc<dyn DocumentStore>,
    retriever: Retriever,
    composer: Composer,
}

impl QaService {
    pub fn new(store: Arc<dyn DocumentStore>, retriever: Retriever, composer: Composer) -> Self {
        QaService {
            store,
            retriever,
            composer,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.retriever.is_fit()
    }

    pub fn answer(&self, message: &str) -> ServiceResult<ChatResponse> {
        if message.trim().is_empty() {
            return Err(ServiceError::EmptyMessage);
        }

        let documents = self.store.fetch_all().inspect_err(|e| {
            warn!(error = %e, "document store fetch failed");
        })?;

        let passages = self
            .retriever
            .retrieve(message, &documents)
            .map_err(|e| ServiceError::Unexpected(format!("{e:#}")))?;

        let answer = self.composer.compose(message, &passages);
        if answer.sources.is_empty() {
            info!(category = %Category::classify(message), "no relevant content");
        } else {
            debug!(
                category = %Category::classify(message),
                passages = passages.len(),
                sources = ?answer.sources,
                "composed answer"
            );
        }

        Ok(ChatResponse {
            response: answer.text,
            sources: answer.sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{MORE_INFORMATION_MARKER, NO_INFORMATION_FALLBACK};
    use crate::error::StoreError;
    use crate::store::{Document, MemoryStore};
    use std::path::PathBuf;

    fn handbook() -> Vec<Document> {
        vec![
            Document::new(
                "FIT HANDBOOK 2025 INFOTECH COLLEGE The Foundation in IT (FIT) programme prepares students for degree study. Page 2 of 10",
                "handbook.pdf",
            ),
            Document::new(
                "Tuition is paid in installments. The registration fee is Rs. 15,000 and each payment is due monthly.",
                "fees.pdf",
            ),
            Document::new(
                "Contact the student office by email at info@infotech.example or by phone.",
                "contact.pdf",
            ),
            Document::new(
                "To apply, students must meet the admission requirement of three passes.",
                "admissions.pdf",
            ),
            Document::new("The programme duration is twelve months.", "handbook.pdf"),
        ]
    }

    fn service(documents: Vec<Document>) -> QaService {
        QaService::new(
            Arc::new(MemoryStore::new(documents)),
            Retriever::default(),
            Composer::default(),
        )
    }

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn fetch_all(&self) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::MissingDirectory(PathBuf::from("gone")))
        }
    }

    #[test]
    fn test_cost_question() {
        let response = service(handbook()).answer("How much is the registration fee?").unwrap();
        assert!(response.response.contains("Rs. 15,000"));
        assert_eq!(response.sources, vec!["fees.pdf".to_string()]);
    }

    #[test]
    fn test_answer_is_cleaned() {
        let response = service(handbook()).answer("Tell me about the FIT programme").unwrap();
        assert!(!response.response.contains("FIT HANDBOOK 2025"));
        assert!(!response.response.contains("Page 2 of 10"));
        assert!(response.sources.contains(&"handbook.pdf".to_string()));
    }

    #[test]
    fn test_no_relevant_content_is_not_an_error() {
        let documents: Vec<_> = (0..5)
            .map(|i| Document::new(format!("Lecture hall {i} cost covers seating and lighting"), "halls.txt"))
            .collect();
        let response = service(documents).answer("What does it cost?").unwrap();
        assert_eq!(response.response, NO_INFORMATION_FALLBACK);
        assert!(response.sources.is_empty());
    }

    #[test]
    fn test_precedence_decides_filter() {
        let documents = vec![Document::new("The course fee is payable monthly.", "fees.pdf")];
        // "course" wins over "fee", and program passages need fit/foundation
        let response = service(documents).answer("What is the course fee?").unwrap();
        assert_eq!(response.response, NO_INFORMATION_FALLBACK);
    }

    #[test]
    fn test_unmatched_query_falls_back() {
        let response = service(handbook()).answer("xylophone").unwrap();
        assert_eq!(response.response, NO_INFORMATION_FALLBACK);
        assert!(response.sources.is_empty());
    }

    #[test]
    fn test_long_answer_truncated() {
        let long = format!("Payment details. {}", "Installment fee schedule applies. ".repeat(30));
        let documents = vec![
            Document::new(long.clone(), "a.txt"),
            Document::new(format!("{long} Extra."), "b.txt"),
        ];
        let response = service(documents).answer("payment fee").unwrap();
        assert!(response.response.ends_with(MORE_INFORMATION_MARKER));
        assert_eq!(
            response.response.chars().count(),
            500 + MORE_INFORMATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_shared_source_listed_once() {
        let documents = vec![
            Document::new("Monthly payment plan for the fee.", "fees.pdf"),
            Document::new("Late fee applies after the payment date.", "fees.pdf"),
        ];
        let response = service(documents).answer("fee payment").unwrap();
        assert_eq!(response.sources, vec!["fees.pdf".to_string()]);
    }

    #[test]
    fn test_chunked_directory_keeps_email_whole() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("admissions.txt"),
            "To apply, students must submit the admission form.\n\
             For questions contact the student office by email at \
             info@infotechcollege.example or by phone on 555 123 4567.",
        )?;
        let service = QaService::new(
            Arc::new(crate::store::DirectoryStore::new(dir.path(), 600)),
            Retriever::default(),
            Composer::default(),
        );

        let response = service.answer("What is the contact email?")?;
        assert!(response.response.contains("info@infotechcollege.example or by phone"));
        assert_eq!(response.sources, vec!["admissions.txt".to_string()]);
        Ok(())
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(
            service(handbook()).answer("   "),
            Err(ServiceError::EmptyMessage)
        ));
    }

    #[test]
    fn test_store_failure_propagates() {
        let service = QaService::new(Arc::new(BrokenStore), Retriever::default(), Composer::default());
        assert!(matches!(
            service.answer("fees?"),
            Err(ServiceError::StoreUnavailable(_))
        ));
        assert!(!service.is_fit());
    }
}
