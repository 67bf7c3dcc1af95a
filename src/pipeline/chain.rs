//! Question answering over an anonymized document
//!
//! Documents are anonymized before they are split and indexed, and questions
//! are anonymized with the same mapping before retrieval. The model only ever
//! sees substitutes; its answer is deanonymized on the way back.

use super::model::AnswerModel;
use super::retriever::Retriever;
use super::splitter::RecursiveTextSplitter;
use crate::anonymization::ReversibleAnonymizer;
use crate::domain::{PipelineError, Result};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of [`QaChain::ask`]
#[derive(Debug, Clone)]
pub struct QaAnswer {
    /// The question as sent to the model
    pub anonymized_question: String,
    /// Chunks handed to the model as context
    pub context: Vec<String>,
    /// The model output before deanonymization
    pub raw_answer: String,
    /// The answer with original values restored
    pub answer: String,
}

pub struct QaChain {
    anonymizer: Arc<ReversibleAnonymizer>,
    splitter: RecursiveTextSplitter,
    retriever: Box<dyn Retriever>,
    model: Box<dyn AnswerModel>,
    top_k: usize,
}

impl QaChain {
    pub fn new(
        anonymizer: Arc<ReversibleAnonymizer>,
        splitter: RecursiveTextSplitter,
        retriever: Box<dyn Retriever>,
        model: Box<dyn AnswerModel>,
    ) -> Self {
        Self {
            anonymizer,
            splitter,
            retriever,
            model,
            top_k: 4,
        }
    }

    /// Chunks retrieved per question (at least one)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn anonymizer(&self) -> &Arc<ReversibleAnonymizer> {
        &self.anonymizer
    }

    pub fn indexed_chunks(&self) -> usize {
        self.retriever.len()
    }

    /// Anonymize a document and add its chunks to the index
    ///
    /// Returns the number of chunks added.
    pub fn index_document(&mut self, text: &str) -> Result<usize> {
        let anonymized = self.anonymizer.anonymize(text)?;
        let chunks = self.splitter.split_text(&anonymized);
        let count = chunks.len();
        self.retriever.add_chunks(chunks);

        tracing::info!(
            chunks = count,
            total_chunks = self.retriever.len(),
            "Document indexed"
        );
        Ok(count)
    }

    /// Answer a question against the indexed documents
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyIndex`] when nothing has been indexed, otherwise
    /// any anonymizer or model error.
    pub async fn ask(&self, question: &str) -> Result<QaAnswer> {
        if self.retriever.is_empty() {
            return Err(PipelineError::EmptyIndex.into());
        }

        let started = Instant::now();
        let anonymized_question = self.anonymizer.anonymize(question)?;
        let context = self.retriever.retrieve(&anonymized_question, self.top_k);
        let raw_answer = self
            .model
            .answer(&context.join("\n\n"), &anonymized_question)
            .await?;
        let answer = self.anonymizer.deanonymize(&raw_answer)?;

        tracing::info!(
            model_id = %self.model.model_id(),
            context_chunks = context.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Question answered"
        );

        Ok(QaAnswer {
            anonymized_question,
            context,
            raw_answer,
            answer,
        })
    }
}
