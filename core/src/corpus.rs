use crate::access::extract_access_count;
use crate::tokenizer::TextNormalizer;
use crate::DocId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One record as produced by the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(rename = "judul", alias = "title")]
    pub title: String,
    pub url: String,
    #[serde(rename = "konten", alias = "content")]
    pub content: String,
    #[serde(rename = "tanggal", alias = "metadata", default)]
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: DocId,
    pub title: String,
    pub url: String,
    pub raw_content: String,
    pub raw_metadata: String,
    pub access_count: u64,
}

/// Ordered articles plus their normalized token sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    articles: Vec<Article>,
    tokens: Vec<Vec<String>>,
}

impl Corpus {
    pub fn build(raw: Vec<RawArticle>, normalizer: &dyn TextNormalizer) -> Self {
        let mut articles = Vec::with_capacity(raw.len());
        let mut tokens = Vec::with_capacity(raw.len());
        for (pos, doc) in raw.into_iter().enumerate() {
            tokens.push(normalizer.normalize(&doc.content));
            articles.push(Article {
                id: pos as DocId,
                access_count: extract_access_count(&doc.metadata),
                title: doc.title,
                url: doc.url,
                raw_content: doc.content,
                raw_metadata: doc.metadata,
            });
        }
        tracing::info!(num_docs = articles.len(), "corpus built");
        Self { articles, tokens }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn article(&self, id: DocId) -> Option<&Article> {
        self.articles.get(id as usize)
    }

    /// Normalized token sequence for every document, in corpus order.
    pub fn tokens(&self) -> &[Vec<String>] {
        &self.tokens
    }

    pub fn access_counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.articles.iter().map(|a| a.access_count)
    }
}

/// Reads raw articles from a JSON/JSONL file or a directory of them.
///
/// Directories are walked in file-name order so repeated builds see the same
/// corpus order. Any unreadable or malformed input is an error.
pub fn load_raw_articles(input: &Path) -> Result<Vec<RawArticle>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", input.display()))?;
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("article source {} does not exist", input.display());
    }

    let mut out = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut out)?;
        } else {
            read_json(&file, &mut out)?;
        }
    }
    tracing::info!(num_articles = out.len(), source = %input.display(), "loaded raw articles");
    Ok(out)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, out: &mut Vec<RawArticle>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: RawArticle = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed article", file.display(), lineno + 1))?;
        out.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<RawArticle>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("{}: malformed json", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v).with_context(|| format!("{}: malformed article", file.display()))?);
            }
        }
        serde_json::Value::Object(_) => {
            out.push(serde_json::from_value(json).with_context(|| format!("{}: malformed article", file.display()))?);
        }
        _ => anyhow::bail!("{}: expected an article object or array", file.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Normalizer;
    use std::fs;
    use tempfile::tempdir;

    fn line(title: &str) -> String {
        format!(r#"{{"judul":"{title}","url":"https://x/{title}","konten":"isi {title}","tanggal":"1 kali"}}"#)
    }

    fn titles(docs: &[RawArticle]) -> Vec<&str> {
        docs.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn jsonl_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");
        fs::write(&path, format!("{}\n\n   \n{}\n", line("a"), line("b"))).unwrap();
        let docs = load_raw_articles(&path).unwrap();
        assert_eq!(titles(&docs), vec!["a", "b"]);
    }

    #[test]
    fn malformed_jsonl_line_is_fatal_with_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");
        fs::write(&path, format!("{}\n{{\"judul\": 3}}\n{}\n", line("a"), line("c"))).unwrap();
        let err = load_raw_articles(&path).unwrap_err();
        assert!(err.to_string().contains("articles.jsonl:2: malformed article"), "{err:#}");
    }

    #[test]
    fn directory_is_read_in_path_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), format!("{}\n{}\n", line("b1"), line("b2"))).unwrap();
        fs::write(dir.path().join("a.json"), format!("[{}]", line("a1"))).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c").join("nested.json"), line("c1")).unwrap();
        fs::write(dir.path().join("notes.txt"), "bukan artikel").unwrap();
        fs::write(dir.path().join("0.csv"), "judul,url").unwrap();

        let docs = load_raw_articles(dir.path()).unwrap();
        assert_eq!(titles(&docs), vec!["a1", "b1", "b2", "c1"]);
    }

    #[test]
    fn malformed_file_in_directory_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), format!("[{}]", line("a1"))).unwrap();
        fs::write(dir.path().join("b.jsonl"), "{ not json\n").unwrap();
        assert!(load_raw_articles(dir.path()).is_err());
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(load_raw_articles(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn json_scalar_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.json");
        fs::write(&path, "42").unwrap();
        assert!(load_raw_articles(&path).is_err());
    }

    #[test]
    fn reads_scraper_keys() {
        let doc: RawArticle = serde_json::from_str(
            r#"{"judul":"Rapat","url":"https://x/1","konten":"Isi rapat","tanggal":"1 Jan | 5 kali"}"#,
        )
        .unwrap();
        assert_eq!(doc.title, "Rapat");
        assert_eq!(doc.metadata, "1 Jan | 5 kali");
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let doc: RawArticle =
            serde_json::from_str(r#"{"title":"A","url":"u","content":"c"}"#).unwrap();
        assert_eq!(doc.metadata, "");
    }

    #[test]
    fn build_assigns_positions_and_counts() {
        let raw = vec![
            RawArticle { title: "a".into(), url: "u0".into(), content: "desa wisata".into(), metadata: "3 kali".into() },
            RawArticle { title: "b".into(), url: "u1".into(), content: "".into(), metadata: "rusak".into() },
        ];
        let corpus = Corpus::build(raw, &Normalizer::default());
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.article(1).unwrap().id, 1);
        assert_eq!(corpus.access_counts().collect::<Vec<_>>(), vec![3, 0]);
        assert_eq!(corpus.tokens()[0], vec!["desa", "wisata"]);
        assert!(corpus.tokens()[1].is_empty());
    }
}
