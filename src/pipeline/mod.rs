//! Retrieval question answering around the anonymizer
//!
//! - [`RecursiveTextSplitter`] cuts anonymized documents into chunks
//! - [`Retriever`] selects context chunks for a question
//! - [`AnswerModel`] turns context and question into an answer
//! - [`QaChain`] wires them together with a [`ReversibleAnonymizer`]
//!
//! [`ReversibleAnonymizer`]: crate::anonymization::ReversibleAnonymizer

pub mod chain;
pub mod http;
pub mod model;
pub mod prompt;
pub mod retriever;
pub mod splitter;

pub use chain::{QaAnswer, QaChain};
pub use http::HttpAnswerModel;
pub use model::AnswerModel;
pub use prompt::PromptTemplate;
pub use retriever::{KeywordRetriever, Retriever};
pub use splitter::RecursiveTextSplitter;
