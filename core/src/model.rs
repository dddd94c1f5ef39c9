use crate::bm25::Bm25Index;
use crate::corpus::{Corpus, RawArticle};
use crate::popularity::PopularityModel;
use crate::tfidf::TfidfIndex;
use crate::tokenizer::TextNormalizer;

/// Everything a query needs, built in one pass and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub corpus: Corpus,
    pub tfidf: TfidfIndex,
    pub bm25: Bm25Index,
    pub popularity: PopularityModel,
}

impl Model {
    pub fn build(raw: Vec<RawArticle>, normalizer: &dyn TextNormalizer) -> Self {
        Self::from_corpus(Corpus::build(raw, normalizer))
    }

    pub fn from_corpus(corpus: Corpus) -> Self {
        let tfidf = TfidfIndex::build(corpus.tokens());
        let bm25 = Bm25Index::build(corpus.tokens());
        let popularity = PopularityModel::build(&corpus);
        Self { corpus, tfidf, bm25, popularity }
    }

    pub fn num_docs(&self) -> usize {
        self.corpus.len()
    }
}
