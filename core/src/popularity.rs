use crate::corpus::Corpus;
use serde::{Deserialize, Serialize};

/// Access counts aligned with corpus ids, scaled by the corpus maximum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularityModel {
    access_counts: Vec<u64>,
    max_access_count: u64,
}

impl PopularityModel {
    pub fn build(corpus: &Corpus) -> Self {
        Self::from_counts(corpus.access_counts().collect())
    }

    pub fn from_counts(access_counts: Vec<u64>) -> Self {
        let max_access_count = access_counts.iter().copied().max().unwrap_or(0).max(1);
        Self { access_counts, max_access_count }
    }

    pub fn len(&self) -> usize {
        self.access_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.access_counts.is_empty()
    }

    pub fn access_count(&self, doc: usize) -> u64 {
        self.access_counts.get(doc).copied().unwrap_or(0)
    }

    pub fn max_access_count(&self) -> u64 {
        self.max_access_count
    }

    pub fn normalized_score(&self, doc: usize) -> f32 {
        self.access_count(doc) as f32 / self.max_access_count as f32
    }

    pub fn scores(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.normalized_score(i)).collect()
    }
}
