use crate::service::{ChatRequest, ChatResponse};
use tracing::warn;

pub const BACKEND_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting to the knowledge base. Please try again later.";
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the chatbot service. Please make sure the backend is running.";

/// Outcome of one remote question, kept apart by failure tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The service answered; this includes its own "no information" fallback.
    Answer(ChatResponse),
    /// The service was reached but returned a non-success status.
    BackendError,
    /// The service could not be reached at all.
    Unreachable,
}

impl Reply {
    pub fn render(&self) -> String {
        match self {
            Reply::Answer(answer) => {
                format!("{}\n\nSources: {}", answer.response, answer.sources.join(", "))
            }
            Reply::BackendError => BACKEND_ERROR_MESSAGE.to_string(),
            Reply::Unreachable => UNREACHABLE_MESSAGE.to_string(),
        }
    }
}

pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ChatClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn ask(&self, message: &str) -> Reply {
        let request = ChatRequest {
            message: message.to_string(),
        };
        let response = match self
            .http
            .post(format!("{}/chat", self.endpoint))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, endpoint = %self.endpoint, "chat service unreachable");
                return Reply::Unreachable;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "chat service returned an error");
            return Reply::BackendError;
        }

        match response.json::<ChatResponse>().await {
            Ok(answer) => Reply::Answer(answer),
            Err(e) => {
                warn!(error = %e, "malformed chat response");
                Reply::BackendError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::Composer;
    use crate::retriever::Retriever;
    use crate::server::build_router;
    use crate::service::QaService;
    use crate::store::{DirectoryStore, Document, MemoryStore};
    use std::sync::Arc;

    async fn spawn(service: QaService) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(Arc::new(service));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_render_answer() {
        let reply = Reply::Answer(ChatResponse {
            response: "Fees are due monthly.".to_string(),
            sources: vec!["fees.txt".to_string(), "faq.txt".to_string()],
        });
        assert_eq!(reply.render(), "Fees are due monthly.\n\nSources: fees.txt, faq.txt");
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let store = MemoryStore::new(vec![Document::new("Call the phone line for contact.", "contact.txt")]);
        let endpoint = spawn(QaService::new(
            Arc::new(store),
            Retriever::default(),
            Composer::default(),
        ))
        .await;

        let reply = ChatClient::new(endpoint).ask("What is the contact phone?").await;
        match reply {
            Reply::Answer(answer) => {
                assert_eq!(answer.response, "Call the phone line for contact.");
                assert_eq!(answer.sources, vec!["contact.txt".to_string()]);
            }
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_error_tier() {
        let endpoint = spawn(QaService::new(
            Arc::new(DirectoryStore::new("/no/such/docs", 0)),
            Retriever::default(),
            Composer::default(),
        ))
        .await;

        let reply = ChatClient::new(endpoint).ask("fees").await;
        assert_eq!(reply, Reply::BackendError);
        assert_eq!(reply.render(), BACKEND_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_tier() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let reply = ChatClient::new(format!("http://{addr}")).ask("fees").await;
        assert_eq!(reply, Reply::Unreachable);
    }
}
