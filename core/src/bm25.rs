//! Okapi BM25 content index.

use crate::vocab::Vocabulary;
use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const BM25_K1: f32 = 1.5;
pub const BM25_B: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: BM25_K1, b: BM25_B }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bm25Index {
    vocab: Vocabulary,
    term_freqs: Vec<HashMap<TermId, u32>>,
    doc_freq: Vec<u32>,
    doc_lens: Vec<u32>,
    avgdl: f32,
    params: Bm25Params,
}

impl Bm25Index {
    pub fn build(tokens: &[Vec<String>]) -> Self {
        let vocab = Vocabulary::build(tokens);
        let term_freqs: Vec<HashMap<TermId, u32>> = tokens.iter().map(|doc| vocab.count_terms(doc)).collect();
        let mut doc_freq = vec![0u32; vocab.len()];
        for tf in &term_freqs {
            for tid in tf.keys() {
                doc_freq[*tid as usize] += 1;
            }
        }
        let doc_lens: Vec<u32> = tokens.iter().map(|doc| doc.len() as u32).collect();
        let avgdl = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().map(|&l| l as f32).sum::<f32>() / doc_lens.len() as f32
        };
        tracing::info!(num_docs = tokens.len(), num_terms = vocab.len(), avgdl, "bm25 index built");
        Self { vocab, term_freqs, doc_freq, doc_lens, avgdl, params: Bm25Params::default() }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn num_docs(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn average_doc_length(&self) -> f32 {
        self.avgdl
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// `ln((N - df + 0.5) / (df + 0.5) + 1)`, never negative.
    pub fn idf(&self, tid: TermId) -> f32 {
        let n = self.num_docs() as f32;
        let df = self.doc_freq.get(tid as usize).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Unbounded BM25 score per document, in corpus order. Repeated query
    /// terms count once per occurrence.
    pub fn raw_scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.num_docs()];
        let terms: Vec<TermId> = query_tokens.iter().filter_map(|t| self.vocab.get(t)).collect();
        if terms.is_empty() {
            return scores;
        }
        let Bm25Params { k1, b } = self.params;
        for (doc, score) in scores.iter_mut().enumerate() {
            let dl = self.doc_lens[doc] as f32;
            // avgdl is only zero when every document is empty, so no tf can be positive
            let len_ratio = if self.avgdl > 0.0 { dl / self.avgdl } else { 0.0 };
            for tid in &terms {
                let tf = match self.term_freqs[doc].get(tid) {
                    Some(&tf) => tf as f32,
                    None => continue,
                };
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * len_ratio));
                *score += self.idf(*tid) * tf_norm;
            }
        }
        scores
    }

    /// Scores rescaled by this query's maximum, so they lie in `[0, 1]`.
    pub fn score(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = self.raw_scores(query_tokens);
        let max = scores.iter().copied().fold(0.0f32, f32::max);
        let denom = if max > 0.0 { max } else { 1.0 };
        for s in scores.iter_mut() {
            *s /= denom;
        }
        scores
    }
}
