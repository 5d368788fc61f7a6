//! Rule-based phonemes for words the dictionary does not know.
//!
//! Two independent layers:
//!
//! * the pattern layer walks the word left to right and, at every
//!   position, applies the first rule of [`RULE_TABLE`] that matches there.
//!   Rule order matters: clusters and digraphs come before single letters
//!   and context-sensitive single letters before their defaults;
//! * the letter layer maps every letter straight to one phoneme.

use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Phoneme, Symbol};

/// Which layer handles dictionary misses.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    #[default]
    Rules,
    Letters,
}

/// Right context a rule needs after its match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Follow {
    Any,
    /// Next letter is one of these.
    OneOf(&'static str),
    /// The rest of the word ends in `e` ("magic e").
    FinalE,
}

impl Follow {
    fn accepts(&self, rest: &str) -> bool {
        match self {
            Self::Any => true,
            Self::OneOf(set) => rest.chars().next().map_or(false, |c| set.contains(c)),
            Self::FinalE => rest.ends_with('e'),
        }
    }
}

/// Ordered rule list; the first rule that matches at a position wins.
const RULE_TABLE: &[(&str, Follow, &[Symbol])] = &[
    // consonant clusters
    ("^ch", Follow::Any, &[Symbol::CH]),
    ("^sh", Follow::Any, &[Symbol::SH]),
    ("^th", Follow::Any, &[Symbol::TH]),
    ("^ph", Follow::Any, &[Symbol::F]),
    ("^wh", Follow::Any, &[Symbol::W]),
    ("^ck$", Follow::Any, &[Symbol::K]),
    ("^ng$", Follow::Any, &[Symbol::NG]),
    // vowel digraphs
    ("^ee", Follow::Any, &[Symbol::IY]),
    ("^ea", Follow::Any, &[Symbol::IY]),
    ("^oo", Follow::Any, &[Symbol::UW]),
    ("^ou", Follow::Any, &[Symbol::AW]),
    ("^ow", Follow::Any, &[Symbol::AW]),
    ("^ai", Follow::Any, &[Symbol::EY]),
    ("^ay", Follow::Any, &[Symbol::EY]),
    ("^oi", Follow::Any, &[Symbol::OY]),
    ("^oy", Follow::Any, &[Symbol::OY]),
    ("^ar", Follow::Any, &[Symbol::AA, Symbol::R]),
    ("^er$", Follow::Any, &[Symbol::ER]),
    ("^or", Follow::Any, &[Symbol::AO, Symbol::R]),
    ("^ir", Follow::Any, &[Symbol::IH, Symbol::R]),
    ("^ur", Follow::Any, &[Symbol::ER]),
    // single consonants
    ("^b", Follow::Any, &[Symbol::B]),
    ("^c", Follow::OneOf("eiy"), &[Symbol::S]),
    ("^c", Follow::Any, &[Symbol::K]),
    ("^d", Follow::Any, &[Symbol::D]),
    ("^f", Follow::Any, &[Symbol::F]),
    ("^g", Follow::OneOf("eiy"), &[Symbol::JH]),
    ("^g", Follow::Any, &[Symbol::G]),
    ("^h", Follow::Any, &[Symbol::HH]),
    ("^j", Follow::Any, &[Symbol::JH]),
    ("^k", Follow::Any, &[Symbol::K]),
    ("^l", Follow::Any, &[Symbol::L]),
    ("^m", Follow::Any, &[Symbol::M]),
    ("^n", Follow::Any, &[Symbol::N]),
    ("^p", Follow::Any, &[Symbol::P]),
    ("^q", Follow::Any, &[Symbol::K, Symbol::W]),
    ("^r", Follow::Any, &[Symbol::R]),
    ("^s", Follow::Any, &[Symbol::S]),
    ("^t", Follow::Any, &[Symbol::T]),
    ("^v", Follow::Any, &[Symbol::V]),
    ("^w", Follow::Any, &[Symbol::W]),
    ("^x", Follow::Any, &[Symbol::K, Symbol::S]),
    ("^y", Follow::OneOf("aeiou"), &[Symbol::Y]),
    ("^y", Follow::Any, &[Symbol::AY]),
    ("^z", Follow::Any, &[Symbol::Z]),
    // single vowels
    ("^a", Follow::FinalE, &[Symbol::EY]),
    ("^a", Follow::Any, &[Symbol::AE]),
    ("^e$", Follow::Any, &[]),
    ("^e", Follow::Any, &[Symbol::EH]),
    ("^i", Follow::FinalE, &[Symbol::AY]),
    ("^i", Follow::Any, &[Symbol::IH]),
    ("^o", Follow::FinalE, &[Symbol::OW]),
    ("^o", Follow::Any, &[Symbol::AA]),
    ("^u", Follow::FinalE, &[Symbol::UW]),
    ("^u", Follow::Any, &[Symbol::AH]),
];

#[derive(Debug)]
struct PatternRule {
    pattern: Regex,
    follow: Follow,
    emits: &'static [Symbol],
}

static RULES: OnceLock<Vec<PatternRule>> = OnceLock::new();

fn rules() -> &'static [PatternRule] {
    RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .filter_map(|(pattern, follow, emits)| match Regex::new(pattern) {
                Ok(pattern) => Some(PatternRule { pattern, follow: *follow, emits: *emits }),
                Err(e) => {
                    log::error!("Skipping phoneme rule {:?}: {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

/// Lower-cases and drops everything but letters, digits and `_`.
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhonemeGenerator {
    mode: FallbackMode,
}

impl PhonemeGenerator {
    pub fn new(mode: FallbackMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> FallbackMode {
        self.mode
    }

    /// Phonemes for `word` using the configured layer.
    pub fn generate(&self, word: &str) -> Vec<Phoneme> {
        match self.mode {
            FallbackMode::Rules => self.rule_phonemes(word),
            FallbackMode::Letters => self.letter_phonemes(word),
        }
    }

    /// Pattern layer followed by suffix corrections and de-duplication.
    pub fn rule_phonemes(&self, word: &str) -> Vec<Phoneme> {
        let word = normalize_word(word);
        let mut phonemes = self.pattern_phonemes(&word);
        correct_suffixes(&mut phonemes, &word);
        phonemes.dedup();
        phonemes
    }

    /// Raw pattern layer output, without post-processing.
    pub fn pattern_phonemes(&self, word: &str) -> Vec<Phoneme> {
        let word = normalize_word(word);
        let rules = rules();
        let mut phonemes = Vec::new();
        let mut pos = 0;

        while pos < word.len() {
            let rest = &word[pos..];
            let matched = rules.iter().find_map(|rule| {
                let m = rule.pattern.find(rest)?;
                rule.follow.accepts(&rest[m.end()..]).then_some((rule, m.end()))
            });

            match matched {
                Some((rule, len)) if len > 0 => {
                    phonemes.extend(rule.emits.iter().copied().map(Phoneme::new));
                    pos += len;
                }
                _ => {
                    pos += rest.chars().next().map_or(1, |c| c.len_utf8());
                }
            }
        }

        phonemes
    }

    /// One phoneme per letter, `ch`/`sh` excepted, never repeating the
    /// previous phoneme.
    pub fn letter_phonemes(&self, word: &str) -> Vec<Phoneme> {
        let letters = normalize_word(word).chars().collect::<Vec<char>>();
        let mut phonemes: Vec<Phoneme> = Vec::with_capacity(letters.len());
        let mut i = 0;

        while i < letters.len() {
            let next_is_h = letters.get(i + 1) == Some(&'h');
            let symbol = match letters[i] {
                'a' => Symbol::AH,
                'b' => Symbol::B,
                'c' if next_is_h => {
                    i += 1;
                    Symbol::SH
                }
                'c' => Symbol::K,
                'd' => Symbol::D,
                'e' => Symbol::EH,
                'f' | 'v' => Symbol::F,
                'g' => Symbol::G,
                'h' => Symbol::REST,
                'i' => Symbol::IH,
                'j' => Symbol::REST,
                'k' => Symbol::K,
                'l' => Symbol::L,
                'm' => Symbol::M,
                'n' => Symbol::N,
                'o' => Symbol::OH,
                'p' => Symbol::P,
                'q' => Symbol::K,
                'r' => Symbol::R,
                's' if next_is_h => {
                    i += 1;
                    Symbol::SH
                }
                's' => Symbol::S,
                't' => Symbol::T,
                'u' | 'w' => Symbol::UH,
                'x' => Symbol::S,
                'y' => Symbol::EH,
                'z' => Symbol::S,
                _ => Symbol::REST,
            };
            let phoneme = Phoneme::new(symbol);
            if phonemes.last() != Some(&phoneme) {
                phonemes.push(phoneme);
            }
            i += 1;
        }

        phonemes
    }

    pub fn convert_batch<I, S>(&self, words: I) -> Vec<(String, Vec<Phoneme>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        words
            .into_iter()
            .map(|word| (word.as_ref().to_string(), self.generate(word.as_ref())))
            .collect()
    }

    /// Space-separated phoneme codes, e.g. `K AE T`.
    pub fn phoneme_string(&self, word: &str) -> String {
        self.generate(word).iter().map(|p| p.to_string()).collect::<Vec<String>>().join(" ")
    }
}

/// `-tion` and `-sion` endings: everything from the last `T`/`S` becomes
/// `SH AH N` / `ZH AH N`.
fn correct_suffixes(phonemes: &mut Vec<Phoneme>, word: &str) {
    let (anchor, replacement) = if word.ends_with("tion") {
        (Symbol::T, [Symbol::SH, Symbol::AH, Symbol::N])
    } else if word.ends_with("sion") {
        (Symbol::S, [Symbol::ZH, Symbol::AH, Symbol::N])
    } else {
        return;
    };

    if let Some(idx) = phonemes.iter().rposition(|p| p.symbol() == Some(anchor)) {
        phonemes.truncate(idx);
        phonemes.extend(replacement.into_iter().map(Phoneme::new));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(phonemes: &[Phoneme]) -> Vec<String> {
        phonemes.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn clusters_and_digraphs() {
        let generator = PhonemeGenerator::default();
        assert_eq!(codes(&generator.rule_phonemes("ship")), vec!["SH", "IH", "P"]);
        assert_eq!(codes(&generator.rule_phonemes("phone")), vec!["F", "OW", "N"]);
        assert_eq!(codes(&generator.rule_phonemes("moon")), vec!["M", "UW", "N"]);
        assert_eq!(codes(&generator.rule_phonemes("car")), vec!["K", "AA", "R"]);
    }

    #[test]
    fn soft_and_hard_consonants() {
        let generator = PhonemeGenerator::default();
        assert_eq!(codes(&generator.rule_phonemes("city")), vec!["S", "IH", "T", "AY"]);
        assert_eq!(codes(&generator.rule_phonemes("gem")), vec!["JH", "EH", "M"]);
        assert_eq!(codes(&generator.rule_phonemes("got")), vec!["G", "AA", "T"]);
    }

    #[test]
    fn magic_and_silent_e() {
        let generator = PhonemeGenerator::default();
        assert_eq!(codes(&generator.rule_phonemes("make")), vec!["M", "EY", "K"]);
        assert_eq!(codes(&generator.rule_phonemes("bike")), vec!["B", "AY", "K"]);
        assert_eq!(codes(&generator.rule_phonemes("cube")), vec!["K", "UW", "B"]);
    }

    #[test]
    fn tion_and_sion_suffixes() {
        let generator = PhonemeGenerator::default();
        assert_eq!(codes(&generator.rule_phonemes("nation")), vec!["N", "AE", "SH", "AH", "N"]);
        assert_eq!(codes(&generator.rule_phonemes("vision")), vec!["V", "IH", "ZH", "AH", "N"]);
        assert_eq!(codes(&generator.pattern_phonemes("nation")), vec!["N", "AE", "T", "IH", "AA", "N"]);
    }

    #[test]
    fn repeated_phonemes_collapse() {
        let generator = PhonemeGenerator::default();
        assert_eq!(codes(&generator.pattern_phonemes("buzz")), vec!["B", "AH", "Z", "Z"]);
        assert_eq!(codes(&generator.rule_phonemes("buzz")), vec!["B", "AH", "Z"]);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let generator = PhonemeGenerator::default();
        assert_eq!(generator.rule_phonemes("Cat!"), generator.rule_phonemes("cat"));
        assert!(generator.rule_phonemes("...").is_empty());
    }

    #[test]
    fn unknown_word_is_deterministic() {
        let generator = PhonemeGenerator::default();
        let first = generator.rule_phonemes("zxqv");
        assert_eq!(codes(&first), vec!["Z", "K", "S", "K", "W", "V"]);
        assert_eq!(first, generator.rule_phonemes("zxqv"));
    }

    #[test]
    fn letter_layer() {
        let generator = PhonemeGenerator::new(FallbackMode::Letters);
        assert_eq!(codes(&generator.generate("chat")), vec!["SH", "AH", "T"]);
        assert_eq!(codes(&generator.generate("fish")), vec!["F", "IH", "SH"]);
        assert_eq!(codes(&generator.generate("off")), vec!["OH", "F"]);
        assert_eq!(codes(&generator.generate("hello")), vec!["REST", "EH", "L", "OH"]);
    }

    #[test]
    fn batch_and_string_helpers() {
        let generator = PhonemeGenerator::default();
        assert_eq!(generator.phoneme_string("cat"), "K AE T");
        let batch = generator.convert_batch(["cat", "dog"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].0, "dog");
        assert_eq!(codes(&batch[1].1), vec!["D", "AA", "G"]);
    }
}
