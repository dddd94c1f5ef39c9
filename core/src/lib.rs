pub mod access;
pub mod bm25;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod model;
pub mod persist;
pub mod popularity;
pub mod ranker;
pub mod tfidf;
pub mod tokenizer;
pub mod vocab;

pub use corpus::{Article, Corpus, RawArticle};
pub use engine::{Engine, EngineConfig};
pub use error::{RankError, SnapshotError};
pub use model::Model;
pub use persist::{ModelStore, SectionKind};
pub use ranker::{HybridRanker, Method, RankedResult, DEFAULT_TOP_K};
pub use tokenizer::{Language, Normalizer, TextNormalizer};

pub type TermId = u32;
pub type DocId = u32;
