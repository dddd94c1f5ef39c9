use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9\s]+").expect("valid regex");
    static ref ENGLISH_STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref INDONESIAN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "yang", "untuk", "dengan", "dari", "dan", "di", "ke", "pada", "adalah",
            "itu", "ini", "kami", "kita", "mereka", "saya", "anda", "atau", "sebagai",
            "juga", "dalam", "akan", "telah", "tidak", "bagi", "oleh", "karena",
        ];
        words.iter().copied().collect()
    };
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw text into the token sequence both indexes are built from.
///
/// Implementations must be pure and deterministic and must never fail:
/// empty or all-punctuation input yields an empty sequence.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Indonesian,
    English,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" | "indonesian" => Ok(Language::Indonesian),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unsupported language `{other}`")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Indonesian => f.write_str("indonesian"),
            Language::English => f.write_str("english"),
        }
    }
}

/// NFKC, lowercase, ASCII alphanumerics only, stemming and stopword removal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    language: Language,
}

impl Normalizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn stem(&self, token: &str) -> String {
        match self.language {
            Language::Indonesian => stem_indonesian(token).to_string(),
            Language::English => ENGLISH_STEMMER.stem(token).to_string(),
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        match self.language {
            Language::Indonesian => INDONESIAN_STOPWORDS.contains(token),
            Language::English => ENGLISH_STOPWORDS.contains(token),
        }
    }
}

impl TextNormalizer for Normalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.nfkc().collect::<String>().to_lowercase();
        let cleaned = NON_ALNUM.replace_all(&lowered, " ");
        let mut tokens = Vec::new();
        for word in cleaned.split_whitespace() {
            if self.is_stopword(word) {
                continue;
            }
            let stem = self.stem(word);
            if stem.is_empty() || self.is_stopword(&stem) {
                continue;
            }
            tokens.push(stem);
        }
        tokens
    }
}

/// Tokenize with the default (Indonesian) normalizer.
pub fn tokenize(text: &str) -> Vec<String> {
    Normalizer::default().normalize(text)
}

const PARTICLES: &[&str] = &["lah", "kah", "tah", "pun"];
const POSSESSIVES: &[&str] = &["nya", "ku", "mu"];
const MIN_STEM_LEN: usize = 3;

/// Strips one inflectional particle and then one possessive suffix.
fn stem_indonesian(word: &str) -> &str {
    let word = strip_suffix(word, PARTICLES);
    strip_suffix(word, POSSESSIVES)
}

fn strip_suffix<'a>(word: &'a str, suffixes: &[&str]) -> &'a str {
    for suffix in suffixes {
        if let Some(rest) = word.strip_suffix(suffix) {
            if rest.len() >= MIN_STEM_LEN {
                return rest;
            }
        }
    }
    word
}
