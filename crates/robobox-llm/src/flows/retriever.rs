//! Grounding Q&A retrieval for the FAQ tool

use crate::error::{LLMError, Result};
use async_trait::async_trait;
use robobox_core::qa::sample_pairs;
use robobox_core::QaPair;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Source of prior question/answer pairs
#[async_trait]
pub trait QaRetriever: Send + Sync {
    /// Pairs relevant to `question`, best first
    async fn retrieve(&self, question: &str) -> Result<Vec<QaPair>>;
}

/// Returns the same pairs for every question
#[derive(Debug, Clone)]
pub struct StaticQaRetriever {
    pairs: Vec<QaPair>,
}

impl StaticQaRetriever {
    pub fn new(pairs: Vec<QaPair>) -> Self {
        Self { pairs }
    }
}

impl Default for StaticQaRetriever {
    fn default() -> Self {
        Self::new(sample_pairs())
    }
}

#[async_trait]
impl QaRetriever for StaticQaRetriever {
    async fn retrieve(&self, _question: &str) -> Result<Vec<QaPair>> {
        Ok(self.pairs.clone())
    }
}

/// Knowledge base file: either a bare list or `{ pairs: [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum KnowledgeBaseFile {
    List(Vec<QaPair>),
    Wrapped { pairs: Vec<QaPair> },
}

/// Ranks a knowledge base by word overlap with the question
#[derive(Debug, Clone)]
pub struct KeywordQaRetriever {
    pairs: Vec<QaPair>,
    limit: usize,
}

impl KeywordQaRetriever {
    pub const DEFAULT_LIMIT: usize = 3;

    pub fn new(pairs: Vec<QaPair>) -> Self {
        Self {
            pairs,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let pairs = match serde_yaml::from_str::<KnowledgeBaseFile>(content)? {
            KnowledgeBaseFile::List(pairs) => pairs,
            KnowledgeBaseFile::Wrapped { pairs } => pairs,
        };
        if pairs.is_empty() {
            return Err(LLMError::InvalidConfiguration(
                "knowledge base is empty".to_string(),
            ));
        }
        Ok(Self::new(pairs))
    }

    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let retriever = Self::from_yaml_str(&content)?;
        debug!(
            "Loaded {} Q&A pairs from {}",
            retriever.pairs.len(),
            path.display()
        );
        Ok(retriever)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn rank(&self, question: &str) -> Vec<QaPair> {
        let wanted = keywords(question);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .pairs
            .iter()
            .enumerate()
            .filter_map(|(i, pair)| {
                let score = keywords(&pair.question)
                    .union(&keywords(&pair.answer))
                    .filter(|w| wanted.contains(*w))
                    .count();
                (score > 0).then_some((score, i))
            })
            .collect();

        // Highest score first; ties keep knowledge-base order
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(self.limit)
            .map(|(_, i)| self.pairs[i].clone())
            .collect()
    }
}

#[async_trait]
impl QaRetriever for KeywordQaRetriever {
    async fn retrieve(&self, question: &str) -> Result<Vec<QaPair>> {
        Ok(self.rank(question))
    }
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "can", "how", "what", "does", "you", "your", "with", "our", "from",
    "this", "that", "who", "why", "when", "which", "has", "have", "any", "its",
];

/// Lowercased words of three or more characters, minus stopwords
fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}
