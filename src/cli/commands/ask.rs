//! Ask command implementation
//!
//! Indexes one or more documents through the anonymizer and answers
//! questions with the configured answer model.

use super::{build_anonymizer, load, report_error};
use crate::anonymization::MappingStore;
use crate::domain::{Result, ShroudError};
use crate::pipeline::{HttpAnswerModel, KeywordRetriever, QaChain, RecursiveTextSplitter};
use clap::Args;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Document(s) to index
    #[arg(short, long, required = true)]
    pub document: Vec<PathBuf>,

    /// Question(s) to ask; read line by line from stdin when omitted
    #[arg(short, long)]
    pub question: Vec<String>,

    /// Mapping file (overrides anonymizer.mapping_path)
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Chunks retrieved per question (overrides pipeline.top_k)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print the anonymized question and model output as well
    #[arg(long)]
    pub show_anonymized: bool,
}

impl AskArgs {
    /// Execute the ask command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(documents = self.document.len(), "Starting ask command");

        match self.run(config_path).await {
            Ok(()) => Ok(0),
            Err(e) => Ok(report_error("Question answering failed", &e)),
        }
    }

    async fn run(&self, config_path: &str) -> Result<()> {
        let mut config = load(config_path)?;
        if let Some(ref mapping) = self.mapping {
            config.anonymizer.mapping_path = Some(mapping.clone());
        }
        if let Some(top_k) = self.top_k {
            config.pipeline.top_k = top_k;
        }
        if config.application.dry_run {
            return Err(ShroudError::Configuration(
                "ask cannot run in dry-run mode: documents would reach the model unmodified"
                    .to_string(),
            ));
        }

        let model = HttpAnswerModel::from_config(&config.pipeline)?;
        let (anonymizer, store) = build_anonymizer(&config, false)?;
        let splitter =
            RecursiveTextSplitter::new(config.pipeline.chunk_size, config.pipeline.chunk_overlap)?;

        let mut chain = QaChain::new(
            Arc::new(anonymizer),
            splitter,
            Box::new(KeywordRetriever::new()),
            Box::new(model),
        )
        .with_top_k(config.pipeline.top_k);

        for path in &self.document {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ShroudError::Io(format!("Failed to read {}: {e}", path.display())))?;
            let chunks = chain.index_document(&text)?;
            eprintln!("📚 Indexed {} ({chunks} chunks)", path.display());
        }

        // Persist before asking so the substitutes sent to the model stay
        // reversible even if a request fails
        if let Some(ref store) = store {
            store.save(&chain.anonymizer().mapping()?)?;
        }

        let questions = if self.question.is_empty() {
            read_questions()?
        } else {
            self.question.clone()
        };

        for question in &questions {
            let answer = chain.ask(question).await?;
            println!("Q: {question}");
            if self.show_anonymized {
                println!("   (anonymized) {}", answer.anonymized_question);
                println!("   (model) {}", answer.raw_answer);
            }
            println!("A: {}", answer.answer);
            println!();
        }

        if let Some(ref store) = store {
            store.save(&chain.anonymizer().mapping()?)?;
            eprintln!("🔐 Mapping saved to {}", store.path().display());
        }

        Ok(())
    }
}

fn read_questions() -> Result<Vec<String>> {
    let mut questions = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            questions.push(trimmed.to_string());
        }
    }
    Ok(questions)
}
