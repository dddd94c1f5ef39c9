use crate::error::RankError;
use crate::model::Model;
use crate::tokenizer::TextNormalizer;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TOP_K: usize = 5;

/// Which content index supplies the relevance half of the blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Tfidf,
    Bm25,
}

impl FromStr for Method {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" => Ok(Method::Tfidf),
            "bm25" => Ok(Method::Bm25),
            _ => Err(RankError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Tfidf => f.write_str("tfidf"),
            Method::Bm25 => f.write_str("bm25"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    /// Cosine similarity for tf-idf, max-normalized score for bm25.
    pub content_score: f32,
    pub access_count: u64,
    pub combined_score: f32,
}

/// Blends one content index with popularity over a borrowed model.
pub struct HybridRanker<'a> {
    model: &'a Model,
    normalizer: &'a dyn TextNormalizer,
}

impl<'a> HybridRanker<'a> {
    pub fn new(model: &'a Model, normalizer: &'a dyn TextNormalizer) -> Self {
        Self { model, normalizer }
    }

    /// Per-document content scores in `[0, 1]`, in corpus order.
    pub fn content_scores(&self, query: &str, method: Method) -> Vec<f32> {
        let tokens = self.normalizer.normalize(query);
        match method {
            Method::Tfidf => self.model.tfidf.score(&tokens),
            Method::Bm25 => self.model.bm25.score(&tokens),
        }
    }

    pub fn rank(&self, query: &str, alpha: f32, method: Method) -> Result<Vec<RankedResult>, RankError> {
        self.rank_top(query, alpha, method, DEFAULT_TOP_K)
    }

    /// `alpha * content + (1 - alpha) * popularity`, best `k` first. Equal
    /// scores keep corpus order.
    pub fn rank_top(&self, query: &str, alpha: f32, method: Method, k: usize) -> Result<Vec<RankedResult>, RankError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RankError::InvalidAlpha(alpha));
        }
        let content = self.content_scores(query, method);
        let popularity = &self.model.popularity;

        let mut scored: Vec<(usize, f32, f32)> = content
            .into_iter()
            .enumerate()
            .map(|(doc, c)| (doc, c, alpha * c + (1.0 - alpha) * popularity.normalized_score(doc)))
            .collect();
        // stable: ties stay in corpus order
        scored.sort_by(|a, b| b.2.total_cmp(&a.2));
        tracing::debug!(query, %method, alpha, candidates = scored.len(), "ranked query");

        let results = scored
            .into_iter()
            .take(k)
            .filter_map(|(doc, content_score, combined_score)| {
                let article = self.model.corpus.article(doc as DocId)?;
                Some(RankedResult {
                    doc_id: article.id,
                    title: article.title.clone(),
                    url: article.url.clone(),
                    content_score,
                    access_count: popularity.access_count(doc),
                    combined_score,
                })
            })
            .collect();
        Ok(results)
    }
}
