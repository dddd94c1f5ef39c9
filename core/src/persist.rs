//! Single-file model snapshots.
//!
//! Layout: `WRTA` magic, little-endian `u32` format version, then a bincode
//! [`SnapshotFile`]. The body is a list of tagged sections so that a snapshot
//! written before an index type existed still decodes; the missing section is
//! rebuilt from the stored corpus on load and the file is rewritten.

use crate::bm25::Bm25Index;
use crate::corpus::Corpus;
use crate::error::SnapshotError;
use crate::model::Model;
use crate::popularity::PopularityModel;
use crate::tfidf::TfidfIndex;
use crate::tokenizer::Language;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SNAPSHOT_MAGIC: &[u8; 4] = b"WRTA";
const SNAPSHOT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Corpus,
    Tfidf,
    Bm25,
    Popularity,
}

/// New section kinds are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Section {
    Corpus(Corpus),
    Tfidf(TfidfIndex),
    Bm25(Bm25Index),
    Popularity(PopularityModel),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Corpus(_) => SectionKind::Corpus,
            Section::Tfidf(_) => SectionKind::Tfidf,
            Section::Bm25(_) => SectionKind::Bm25,
            Section::Popularity(_) => SectionKind::Popularity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub created_at: String,
    /// Normalizer language the corpus tokens and vocabularies were built with.
    pub language: Language,
    pub sections: Vec<Section>,
}

impl SnapshotFile {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(Section::kind).collect()
    }
}

/// Borrowing twin of [`Section`]; variant order must match so bincode
/// decodes it as a `Section`.
#[derive(Serialize)]
enum SectionRef<'a> {
    Corpus(&'a Corpus),
    Tfidf(&'a TfidfIndex),
    Bm25(&'a Bm25Index),
    Popularity(&'a PopularityModel),
}

/// Borrowing twin of [`SnapshotFile`], same field order. `sections` stays a
/// `Vec` so it carries the same length prefix.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    created_at: String,
    language: Language,
    sections: Vec<SectionRef<'a>>,
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Reads and writes the model snapshot at one path.
pub struct ModelStore {
    path: PathBuf,
    language: Language,
    rebuilds: Mutex<HashMap<SectionKind, usize>>,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf(), language: Language::default(), rebuilds: Mutex::new(HashMap::new()) }
    }

    /// Language this store writes, and requires of snapshots it loads.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// How many times `kind` was rebuilt during a migrating load.
    pub fn rebuild_count(&self, kind: SectionKind) -> usize {
        self.rebuilds.lock().get(&kind).copied().unwrap_or(0)
    }

    /// Loads the snapshot, filling in any missing derived section from the
    /// stored corpus. Returns `None` when there is no usable snapshot,
    /// including one built for another language.
    pub fn load(&self) -> Option<Model> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no snapshot found");
            return None;
        }
        let file = match read_snapshot(&self.path) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable snapshot");
                return None;
            }
        };
        let (model, rebuilt) = match self.assemble(file) {
            Ok(parts) => parts,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unusable snapshot");
                return None;
            }
        };
        if !rebuilt.is_empty() {
            tracing::info!(?rebuilt, "migrated snapshot sections");
            if let Err(err) = self.save(&model) {
                tracing::warn!(error = %err, "failed to re-save migrated snapshot");
            }
        }
        tracing::info!(num_docs = model.num_docs(), "snapshot loaded");
        Some(model)
    }

    fn assemble(&self, file: SnapshotFile) -> Result<(Model, Vec<SectionKind>), SnapshotError> {
        if file.language != self.language {
            return Err(SnapshotError::LanguageMismatch { found: file.language, expected: self.language });
        }
        let mut corpus = None;
        let mut tfidf = None;
        let mut bm25 = None;
        let mut popularity = None;
        for section in file.sections {
            match section {
                Section::Corpus(c) => corpus = Some(c),
                Section::Tfidf(t) => tfidf = Some(t),
                Section::Bm25(b) => bm25 = Some(b),
                Section::Popularity(p) => popularity = Some(p),
            }
        }
        let corpus = corpus.ok_or(SnapshotError::MissingCorpus)?;
        let expected = corpus.len();
        check_len(SectionKind::Tfidf, tfidf.as_ref().map(TfidfIndex::num_docs), expected)?;
        check_len(SectionKind::Bm25, bm25.as_ref().map(Bm25Index::num_docs), expected)?;
        check_len(SectionKind::Popularity, popularity.as_ref().map(PopularityModel::len), expected)?;

        let mut rebuilt = Vec::new();
        let tfidf = tfidf.unwrap_or_else(|| {
            rebuilt.push(SectionKind::Tfidf);
            TfidfIndex::build(corpus.tokens())
        });
        let bm25 = bm25.unwrap_or_else(|| {
            rebuilt.push(SectionKind::Bm25);
            Bm25Index::build(corpus.tokens())
        });
        let popularity = popularity.unwrap_or_else(|| {
            rebuilt.push(SectionKind::Popularity);
            PopularityModel::build(&corpus)
        });

        let mut counts = self.rebuilds.lock();
        for kind in &rebuilt {
            *counts.entry(*kind).or_insert(0) += 1;
        }
        Ok((Model { corpus, tfidf, bm25, popularity }, rebuilt))
    }

    pub fn save(&self, model: &Model) -> Result<()> {
        let snapshot = SnapshotRef {
            created_at: now_rfc3339(),
            language: self.language,
            sections: vec![
                SectionRef::Corpus(&model.corpus),
                SectionRef::Tfidf(&model.tfidf),
                SectionRef::Bm25(&model.bm25),
                SectionRef::Popularity(&model.popularity),
            ],
        };
        self.write_payload(&snapshot)
    }

    /// Writes an owned snapshot file, e.g. one with sections left out.
    pub fn write(&self, file: &SnapshotFile) -> Result<()> {
        self.write_payload(file)
    }

    /// Header plus bincode payload, written atomically: temp file, fsync, rename.
    fn write_payload<T: Serialize>(&self, body: &T) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let payload = bincode::serialize(body)?;
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        buf.extend_from_slice(&payload);

        let tmp = self.tmp_path();
        {
            let mut f = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
            f.write_all(&buf)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path).with_context(|| format!("renaming snapshot into {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), bytes = buf.len(), language = %self.language, "snapshot saved");
        Ok(())
    }

    /// Removes the snapshot so the next load reports absence.
    pub fn discard(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// A present section must cover exactly the corpus documents.
fn check_len(section: SectionKind, len: Option<usize>, expected: usize) -> Result<(), SnapshotError> {
    match len {
        Some(found) if found != expected => Err(SnapshotError::Inconsistent { section, found, expected }),
        _ => Ok(()),
    }
}

pub fn read_snapshot(path: &Path) -> Result<SnapshotFile, SnapshotError> {
    let buf = fs::read(path)?;
    if buf.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated(buf.len()));
    }
    if &buf[0..4] != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&buf[4..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    Ok(bincode::deserialize(&buf[HEADER_LEN..])?)
}
