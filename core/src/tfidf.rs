//! Vector-space content index.
//!
//! Weights are raw term counts times the smoothed idf
//! `ln((1 + N) / (1 + df)) + 1`, and every document vector is scaled to unit
//! length so that cosine similarity is a plain dot product.

use crate::vocab::Vocabulary;
use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term_id: TermId,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfIndex {
    vocab: Vocabulary,
    idf: Vec<f32>,
    /// Unit-length (or empty) sparse vector per document, sorted by term id.
    docs: Vec<Vec<TermWeight>>,
}

impl TfidfIndex {
    pub fn build(tokens: &[Vec<String>]) -> Self {
        let vocab = Vocabulary::build(tokens);
        let n = tokens.len() as f32;

        let mut df = vec![0u32; vocab.len()];
        let counts: Vec<HashMap<TermId, u32>> = tokens.iter().map(|doc| vocab.count_terms(doc)).collect();
        for doc in &counts {
            for tid in doc.keys() {
                df[*tid as usize] += 1;
            }
        }
        let idf: Vec<f32> = df.iter().map(|&d| smoothed_idf(n, d as f32)).collect();

        let docs = counts.iter().map(|doc| weigh(doc, &idf)).collect();
        tracing::info!(num_docs = tokens.len(), num_terms = vocab.len(), "tf-idf index built");
        Self { vocab, idf, docs }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn idf(&self, tid: TermId) -> Option<f32> {
        self.idf.get(tid as usize).copied()
    }

    pub fn doc_vector(&self, doc: usize) -> Option<&[TermWeight]> {
        self.docs.get(doc).map(Vec::as_slice)
    }

    /// Unit-length query vector over the stored vocabulary and idf.
    pub fn query_vector(&self, query_tokens: &[String]) -> Vec<TermWeight> {
        weigh(&self.vocab.count_terms(query_tokens), &self.idf)
    }

    /// Cosine similarity of the query against every document, in corpus order.
    pub fn score(&self, query_tokens: &[String]) -> Vec<f32> {
        let q: HashMap<TermId, f32> = self
            .query_vector(query_tokens)
            .into_iter()
            .map(|tw| (tw.term_id, tw.weight))
            .collect();
        if q.is_empty() {
            return vec![0.0; self.docs.len()];
        }
        self.docs
            .iter()
            .map(|doc| {
                let dot: f32 = doc.iter().filter_map(|tw| q.get(&tw.term_id).map(|w| w * tw.weight)).sum();
                // both sides are unit vectors; clamp rounding overshoot
                dot.clamp(0.0, 1.0)
            })
            .collect()
    }
}

fn smoothed_idf(n: f32, df: f32) -> f32 {
    ((1.0 + n) / (1.0 + df)).ln() + 1.0
}

/// TF·IDF then L2 normalization. A vector with no weight stays empty.
fn weigh(counts: &HashMap<TermId, u32>, idf: &[f32]) -> Vec<TermWeight> {
    let mut out: Vec<TermWeight> = counts
        .iter()
        .map(|(&term_id, &tf)| TermWeight { term_id, weight: tf as f32 * idf[term_id as usize] })
        .collect();
    out.sort_by_key(|tw| tw.term_id);

    let norm = out.iter().map(|tw| tw.weight * tw.weight).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Vec::new();
    }
    for tw in out.iter_mut() {
        tw.weight /= norm;
    }
    out
}
