//! Question answering over a fixed document set.
//!
//! ```text
//! DocumentStore::fetch_all -> Retriever::retrieve (TF-IDF, top 3 > 0.1)
//!                          -> Composer::compose (category filter, 500 char budget)
//!                          -> ChatResponse { response, sources }
//! ```

pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod retriever;
pub mod server;
pub mod service;
pub mod store;
pub mod utils;
pub mod vector_space;
