use crate::persist::SectionKind;
use crate::tokenizer::Language;
use thiserror::Error;

/// Errors returned by the query path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// Blend weight was NaN or outside `[0, 1]`.
    #[error("alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f32),
    #[error("unknown ranking method `{0}` (expected `tfidf` or `bm25`)")]
    UnknownMethod(String),
}

/// Reasons a snapshot file could not be decoded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot too small ({0} bytes)")]
    Truncated(usize),
    #[error("bad snapshot magic")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot decode: {0}")]
    Decode(#[from] bincode::Error),
    /// The snapshot has no corpus section, so nothing can be migrated.
    #[error("snapshot has no corpus section")]
    MissingCorpus,
    /// A section does not cover the same documents as the corpus.
    #[error("{section:?} section covers {found} documents, corpus has {expected}")]
    Inconsistent { section: SectionKind, found: usize, expected: usize },
    #[error("snapshot was built for {found}, engine normalizes {expected}")]
    LanguageMismatch { found: Language, expected: Language },
}
