//! Static word -> phonetic transcription table.
//!
//! The on-disk format is one entry per line:
//!
//! ```text
//! # comment
//! hello   /həˈloʊ/, /hɛˈloʊ/
//! read    /ˈɹid/
//! read    /ˈɹɛd/
//! ```
//!
//! Several transcriptions for one word, on one line or across lines, make
//! the entry ambiguous. Lookups of ambiguous entries still succeed and the
//! first listed transcription is the one callers use.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{DictionaryError, DictionaryErrorDescription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(String),
    /// More than one transcription is known; they are listed in file order.
    Ambiguous(Vec<String>),
    Missing,
}

impl Lookup {
    /// The transcription a caller should use, if any.
    pub fn transcription(&self) -> Option<&str> {
        match self {
            Self::Found(t) => Some(t.as_str()),
            Self::Ambiguous(all) => all.first().map(|t| t.as_str()),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Read-only pronunciation source consulted before the rule-based generator.
pub trait PronunciationLookup: Send + Sync {
    fn lookup(&self, word: &str) -> Lookup;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub total: usize,
    pub covered: usize,
    pub uncovered: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PronunciationDictionary {
    entries: HashMap<String, Vec<String>>,
}

fn normalize_word(word: &str) -> String {
    let word = word.trim();
    // CMU-style variant suffix: `read(2)`
    let word = match word.find('(') {
        Some(idx) if word.ends_with(')') && idx > 0 => &word[..idx],
        _ => word,
    };
    word.to_lowercase()
}

fn clean_transcription(raw: &str) -> &str {
    raw.trim().trim_matches('/').trim()
}

/// `word transcription[, transcription...]`, or `None` when either half is missing.
fn split_entry(line: &str) -> Option<(&str, Vec<&str>)> {
    let (word, rest) = line.split_once(char::is_whitespace)?;
    let transcriptions = rest
        .split(',')
        .flat_map(|part| part.split(" OR "))
        .map(clean_transcription)
        .filter(|t| !t.is_empty())
        .collect::<Vec<&str>>();
    if transcriptions.is_empty() {
        return None;
    }
    Some((word, transcriptions))
}

impl PronunciationDictionary {
    /// A dictionary with no entries: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, DictionaryError> {
        Self::from_reader(data.as_bytes())
    }

    /// Like [`parse`](Self::parse), but the first malformed line is an error.
    pub fn parse_strict(data: &str) -> Result<Self, DictionaryError> {
        Self::read_entries(data.as_bytes(), true)
    }

    /// Reads entries, skipping malformed lines with a warning. Fails only
    /// on I/O errors or when no usable entry is left.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DictionaryError> {
        Self::read_entries(reader, false)
    }

    fn read_entries<R: BufRead>(reader: R, strict: bool) -> Result<Self, DictionaryError> {
        let mut dict = Self::empty();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(";;;") {
                continue;
            }

            let (word, transcriptions) = match split_entry(trimmed) {
                Some(entry) => entry,
                None if strict => {
                    return Err(DictionaryError::new(DictionaryErrorDescription::MalformedLine {
                        line: idx + 1,
                        content: trimmed.to_string(),
                    }));
                }
                None => {
                    log::warn!("Skipping malformed dictionary line {}: {:?}", idx + 1, trimmed);
                    skipped += 1;
                    continue;
                }
            };

            for transcription in transcriptions {
                dict.insert(word, transcription);
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} malformed dictionary lines", skipped);
        }
        if dict.is_empty() {
            return Err(DictionaryError::new(DictionaryErrorDescription::Empty));
        }

        Ok(dict)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let file = std::fs::File::open(path.as_ref())?;
        let dict = Self::from_reader(std::io::BufReader::new(file))?;
        log::debug!("Loaded {} dictionary entries from {}", dict.len(), path.as_ref().display());
        Ok(dict)
    }

    /// Loads `path`, treating any failure as "dictionary unavailable".
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(dict) => dict,
            Err(e) => {
                log::warn!("Dictionary {} unavailable, using rule-based phonemes only: {}", path.as_ref().display(), e);
                Self::empty()
            }
        }
    }

    /// Adds a transcription for `word`; repeated inserts accumulate variants.
    pub fn insert(&mut self, word: &str, transcription: &str) {
        let key = normalize_word(word);
        let transcription = clean_transcription(transcription);
        if key.is_empty() || transcription.is_empty() {
            return;
        }
        let variants = self.entries.entry(key).or_default();
        if !variants.iter().any(|v| v == transcription) {
            variants.push(transcription.to_string());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many of `words` have an entry.
    pub fn coverage<I, S>(&self, words: I) -> Coverage
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (total, covered) = words.into_iter().fold((0usize, 0usize), |(total, covered), word| {
            (total + 1, covered + self.contains(word.as_ref()) as usize)
        });
        let percent = if total == 0 { 0.0 } else { covered as f64 * 100.0 / total as f64 };
        Coverage {
            total,
            covered,
            uncovered: total - covered,
            percent,
        }
    }
}

impl PronunciationLookup for PronunciationDictionary {
    fn lookup(&self, word: &str) -> Lookup {
        match self.entries.get(&normalize_word(word)).map(|v| v.as_slice()) {
            None | Some([]) => Lookup::Missing,
            Some([only]) => Lookup::Found(only.clone()),
            Some(all) => Lookup::Ambiguous(all.to_vec()),
        }
    }
}

/// A dictionary being read on a worker thread.
#[derive(Debug)]
pub struct PendingDictionary {
    path: PathBuf,
    receiver: oneshot::Receiver<Result<PronunciationDictionary, DictionaryError>>,
}

/// Starts reading `path` on its own thread.
pub fn load_in_background<P: AsRef<Path>>(path: P) -> PendingDictionary {
    let path = path.as_ref().to_path_buf();
    let (sender, receiver) = oneshot::channel();

    let worker_path = path.clone();
    std::thread::spawn(move || {
        let res = PronunciationDictionary::load(&worker_path);
        let _ = sender.send(res);
    });

    PendingDictionary { path, receiver }
}

impl PendingDictionary {
    /// Blocks until loading finishes. Must not be called from async code.
    pub fn try_wait_blocking(self) -> Result<PronunciationDictionary, DictionaryError> {
        self.receiver
            .blocking_recv()
            .map_err(|_| DictionaryError::new(DictionaryErrorDescription::LoaderGone))?
    }

    pub async fn try_wait(self) -> Result<PronunciationDictionary, DictionaryError> {
        self.receiver
            .await
            .map_err(|_| DictionaryError::new(DictionaryErrorDescription::LoaderGone))?
    }

    /// Blocks until loading finishes; failures yield an empty dictionary.
    pub fn wait_blocking(self) -> PronunciationDictionary {
        let path = self.path.clone();
        Self::or_empty(&path, self.try_wait_blocking())
    }

    pub async fn wait(self) -> PronunciationDictionary {
        let path = self.path.clone();
        Self::or_empty(&path, self.try_wait().await)
    }

    fn or_empty(path: &Path, res: Result<PronunciationDictionary, DictionaryError>) -> PronunciationDictionary {
        res.unwrap_or_else(|e| {
            log::warn!("Dictionary {} unavailable, using rule-based phonemes only: {}", path.display(), e);
            PronunciationDictionary::empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# sample
hello   /həˈloʊ/, /hɛˈloʊ/
cat     /ˈkæt/
read    /ˈɹid/
read(2) /ˈɹɛd/
";

    #[test]
    fn parse_collects_variants() {
        let dict = PronunciationDictionary::parse(SAMPLE).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.lookup("cat"), Lookup::Found("ˈkæt".to_string()));
        assert_eq!(
            dict.lookup("Hello"),
            Lookup::Ambiguous(vec!["həˈloʊ".to_string(), "hɛˈloʊ".to_string()])
        );
        assert_eq!(dict.lookup("read").transcription(), Some("ˈɹid"));
        assert!(dict.lookup("dog").is_missing());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dict = PronunciationDictionary::parse("cat /kæt/\nlonely\ndog /dɔg/\nempty //\n").unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("cat"));
        assert!(dict.contains("dog"));
        assert!(!dict.contains("lonely"));
    }

    #[test]
    fn only_malformed_lines_is_empty() {
        let err = PronunciationDictionary::parse("lonely\nempty //\n").unwrap_err();
        assert!(matches!(err.into_inner(), DictionaryErrorDescription::Empty));
    }

    #[test]
    fn background_load_keeps_good_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("cat /kæt/\nlonely\n".as_bytes()).unwrap();
        let dict = load_in_background(file.path()).wait_blocking();
        assert_eq!(dict.len(), 1);
        assert!(dict.contains("cat"));
    }

    #[test]
    fn strict_parse_reports_malformed_line() {
        let err = PronunciationDictionary::parse_strict("cat /kæt/\nlonely\n").unwrap_err();
        match err.into_inner() {
            DictionaryErrorDescription::MalformedLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "lonely");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn comments_only_is_empty() {
        let err = PronunciationDictionary::parse("# nothing\n\n").unwrap_err();
        assert!(matches!(err.into_inner(), DictionaryErrorDescription::Empty));
    }

    #[test]
    fn coverage_counts_known_words() {
        let dict = PronunciationDictionary::parse(SAMPLE).unwrap();
        let coverage = dict.coverage(["cat", "dog", "HELLO", "zxqv"]);
        assert_eq!(coverage.total, 4);
        assert_eq!(coverage.covered, 2);
        assert_eq!(coverage.uncovered, 2);
        assert!((coverage.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn insert_deduplicates() {
        let mut dict = PronunciationDictionary::empty();
        dict.insert("Dog", "/dɔg/");
        dict.insert("dog", "dɔg");
        assert_eq!(dict.lookup("dog"), Lookup::Found("dɔg".to_string()));
    }

    #[test]
    fn background_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let dict = load_in_background(file.path()).wait_blocking();
        assert!(dict.contains("cat"));
    }

    #[test]
    fn background_load_failure_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pending = load_in_background(dir.path().join("missing.dict"));
        let dict = pending.wait_blocking();
        assert!(dict.is_empty());
        assert!(dict.lookup("cat").is_missing());
    }
}
