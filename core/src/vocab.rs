use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Term to dense column index. Ids are assigned in first-seen order over the
/// corpus, so the same corpus always yields the same assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn build<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        let mut vocab = Self::default();
        for doc in docs {
            for term in doc {
                vocab.insert(term);
            }
        }
        vocab
    }

    fn insert(&mut self, term: &str) -> TermId {
        if let Some(&tid) = self.dictionary.get(term) {
            return tid;
        }
        let tid = self.terms.len() as TermId;
        self.dictionary.insert(term.to_string(), tid);
        self.terms.push(term.to_string());
        tid
    }

    pub fn get(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn term(&self, tid: TermId) -> Option<&str> {
        self.terms.get(tid as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Raw counts of in-vocabulary terms; unknown terms are dropped.
    pub fn count_terms(&self, tokens: &[String]) -> HashMap<TermId, u32> {
        let mut counts = HashMap::new();
        for token in tokens {
            if let Some(tid) = self.get(token) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn first_seen_order() {
        let docs = vec![toks("desa wisata desa"), toks("wisata pantai")];
        let v = Vocabulary::build(&docs);
        assert_eq!(v.len(), 3);
        assert_eq!(v.get("desa"), Some(0));
        assert_eq!(v.get("wisata"), Some(1));
        assert_eq!(v.get("pantai"), Some(2));
        assert_eq!(v.term(2), Some("pantai"));
    }

    #[test]
    fn counts_skip_unknown_terms() {
        let v = Vocabulary::build(&vec![toks("desa wisata")]);
        let counts = v.count_terms(&toks("desa desa gunung"));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&0], 2);
    }
}
