use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Speech language. Anything that is not English or Spanish is carried as
/// `Other` and handled with the English tables.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Other,
}

impl Language {
    /// Resolves a BCP-47 style tag (`en`, `en-US`, `es_MX`, ...) by its
    /// first two letters.
    pub fn from_tag(tag: &str) -> Self {
        let base = tag.trim().chars().take(2).collect::<String>().to_ascii_lowercase();
        match base.as_str() {
            "en" => Self::En,
            "es" => Self::Es,
            _ => Self::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stress {
    #[default]
    Unstressed,
    Secondary,
    Primary,
}

impl Stress {
    /// Numeric (`0`/`1`/`2`) and IPA (`ˈ`/`ˌ`) stress markers.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '0' => Some(Self::Unstressed),
            '1' | 'ˈ' => Some(Self::Primary),
            '2' | 'ˌ' => Some(Self::Secondary),
            _ => None,
        }
    }

    pub fn digit(&self) -> char {
        match self {
            Self::Unstressed => '0',
            Self::Primary => '1',
            Self::Secondary => '2',
        }
    }
}

/// Where a phoneme sits inside its word and phrase.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Initial,
    #[default]
    Medial,
    Final,
    PhraseFinal,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RateClass {
    VerySlow,
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

/// Internal phoneme alphabet: ARPAbet plus the Spanish additions, silence
/// markers and the `REST` placeholder emitted by the letter fallback.
#[allow(clippy::upper_case_acronyms)]
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    // monophthongs
    AA, AE, AH, AO, EH, ER, IH, IY, OH, UH, UW,
    // diphthongs
    AW, AY, EY, OW, OY,
    // Spanish vowels
    A, E, I, O, U,
    // consonants
    B, CH, D, DH, F, G, H, HH, JH, K, L, M, N, NG, P, Q, R, S, SH, T, TH, V, W, Y, Z, ZH,
    // Spanish consonants
    LL, NX, RR, X,
    // silence
    SIL, SP, REST,
}

impl Symbol {
    pub const ALL: [Symbol; 54] = [
        Self::AA, Self::AE, Self::AH, Self::AO, Self::EH, Self::ER, Self::IH, Self::IY, Self::OH, Self::UH, Self::UW,
        Self::AW, Self::AY, Self::EY, Self::OW, Self::OY,
        Self::A, Self::E, Self::I, Self::O, Self::U,
        Self::B, Self::CH, Self::D, Self::DH, Self::F, Self::G, Self::H, Self::HH, Self::JH, Self::K, Self::L,
        Self::M, Self::N, Self::NG, Self::P, Self::Q, Self::R, Self::S, Self::SH, Self::T, Self::TH, Self::V,
        Self::W, Self::Y, Self::Z, Self::ZH,
        Self::LL, Self::NX, Self::RR, Self::X,
        Self::SIL, Self::SP, Self::REST,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::AA => "AA", Self::AE => "AE", Self::AH => "AH", Self::AO => "AO", Self::EH => "EH",
            Self::ER => "ER", Self::IH => "IH", Self::IY => "IY", Self::OH => "OH", Self::UH => "UH",
            Self::UW => "UW",
            Self::AW => "AW", Self::AY => "AY", Self::EY => "EY", Self::OW => "OW", Self::OY => "OY",
            Self::A => "A", Self::E => "E", Self::I => "I", Self::O => "O", Self::U => "U",
            Self::B => "B", Self::CH => "CH", Self::D => "D", Self::DH => "DH", Self::F => "F",
            Self::G => "G", Self::H => "H", Self::HH => "HH", Self::JH => "JH", Self::K => "K",
            Self::L => "L", Self::M => "M", Self::N => "N", Self::NG => "NG", Self::P => "P",
            Self::Q => "Q", Self::R => "R", Self::S => "S", Self::SH => "SH", Self::T => "T",
            Self::TH => "TH", Self::V => "V", Self::W => "W", Self::Y => "Y", Self::Z => "Z",
            Self::ZH => "ZH",
            Self::LL => "LL", Self::NX => "NX", Self::RR => "RR", Self::X => "X",
            Self::SIL => "SIL", Self::SP => "SP", Self::REST => "REST",
        }
    }

    /// Case-insensitive lookup of a bare symbol code (no stress digit).
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.to_ascii_uppercase();
        Self::ALL.iter().copied().find(|s| s.code() == upper)
    }

    pub fn is_diphthong(&self) -> bool {
        matches!(self, Self::AW | Self::AY | Self::EY | Self::OW | Self::OY)
    }

    pub fn is_vowel(&self) -> bool {
        matches!(
            self,
            Self::AA | Self::AE | Self::AH | Self::AO | Self::EH | Self::ER | Self::IH | Self::IY
                | Self::OH | Self::UH | Self::UW | Self::A | Self::E | Self::I | Self::O | Self::U
        ) || self.is_diphthong()
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, Self::SIL | Self::SP | Self::REST)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhonemeKind {
    Known(Symbol),
    /// A symbol outside the internal alphabet, kept lower-cased.
    Literal(String),
}

/// Prefix that keeps a literal apart from a known symbol in string form,
/// so that a literal `y` does not read back as `Y`.
pub const LITERAL_MARK: char = '\'';

/// One phoneme of a word, with the stress marker it carried, if any.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(into = "String", from = "String")]
pub struct Phoneme {
    pub kind: PhonemeKind,
    pub stress: Option<Stress>,
}

impl Phoneme {
    pub fn new(symbol: Symbol) -> Self {
        Self { kind: PhonemeKind::Known(symbol), stress: None }
    }

    pub fn stressed(symbol: Symbol, stress: Stress) -> Self {
        Self { kind: PhonemeKind::Known(symbol), stress: Some(stress) }
    }

    pub fn literal(text: &str) -> Self {
        Self { kind: PhonemeKind::Literal(text.to_lowercase()), stress: None }
    }

    /// Parses an ARPAbet-style code such as `AE1`, `T` or `REST`.
    /// Codes outside the alphabet, and anything written with a leading
    /// [`LITERAL_MARK`], become literals.
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        if let Some(literal) = code.strip_prefix(LITERAL_MARK) {
            return Self::literal(literal);
        }
        let (bare, stress) = match code.char_indices().last() {
            Some((idx, marker)) if idx > 0 => match Stress::from_marker(marker) {
                Some(stress) => (&code[..idx], Some(stress)),
                None => (code, None),
            },
            _ => (code, None),
        };
        match Symbol::from_code(bare) {
            Some(symbol) => Self { kind: PhonemeKind::Known(symbol), stress },
            None => Self::literal(code),
        }
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match &self.kind {
            PhonemeKind::Known(symbol) => Some(*symbol),
            PhonemeKind::Literal(_) => None,
        }
    }

    pub fn is_vowel(&self) -> bool {
        self.symbol().map(|s| s.is_vowel()).unwrap_or(false)
    }

    pub fn is_diphthong(&self) -> bool {
        self.symbol().map(|s| s.is_diphthong()).unwrap_or(false)
    }

    /// Stress marker, defaulting to unstressed.
    pub fn stress_level(&self) -> Stress {
        self.stress.unwrap_or_default()
    }

    /// Same phoneme without its stress marker.
    pub fn bare(&self) -> Self {
        Self { kind: self.kind.clone(), stress: None }
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PhonemeKind::Known(symbol) => f.write_str(symbol.code())?,
            PhonemeKind::Literal(text) => write!(f, "{}{}", LITERAL_MARK, text)?,
        }
        if let Some(stress) = self.stress {
            write!(f, "{}", stress.digit())?;
        }
        Ok(())
    }
}

impl From<Phoneme> for String {
    fn from(p: Phoneme) -> Self {
        p.to_string()
    }
}

impl From<String> for Phoneme {
    fn from(s: String) -> Self {
        Phoneme::parse(&s)
    }
}

impl From<Symbol> for Phoneme {
    fn from(symbol: Symbol) -> Self {
        Phoneme::new(symbol)
    }
}

/// Mouth shapes understood by the renderer.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisemeCode {
    A,
    O,
    E,
    I,
    U,
    M,
    F,
    Th,
    L,
    S,
    Sh,
    Rest,
    R,
    W,
}

impl VisemeCode {
    pub const ALL: [VisemeCode; 14] = [
        Self::A, Self::O, Self::E, Self::I, Self::U, Self::M, Self::F,
        Self::Th, Self::L, Self::S, Self::Sh, Self::Rest, Self::R, Self::W,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::O => "O",
            Self::E => "E",
            Self::I => "I",
            Self::U => "U",
            Self::M => "M",
            Self::F => "F",
            Self::Th => "TH",
            Self::L => "L",
            Self::S => "S",
            Self::Sh => "SH",
            Self::Rest => "REST",
            Self::R => "R",
            Self::W => "W",
        }
    }
}

impl fmt::Display for VisemeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WordVisemeRecord {
    pub word: String,
    pub phonemes: Vec<Phoneme>,
    pub visemes: Vec<VisemeCode>,
    /// Milliseconds per viseme; always as long as `visemes`.
    pub durations: Vec<u32>,
}

impl WordVisemeRecord {
    pub fn total_ms(&self) -> u64 {
        self.durations.iter().map(|d| *d as u64).sum()
    }
}

/// Word records keyed by the character offset of each word in the spoken text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Schedule {
    words: BTreeMap<usize, WordVisemeRecord>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, offset: usize, record: WordVisemeRecord) {
        self.words.insert(offset, record);
    }

    pub fn get(&self, offset: usize) -> Option<&WordVisemeRecord> {
        self.words.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &WordVisemeRecord)> {
        self.words.iter().map(|(offset, record)| (*offset, record))
    }

    pub fn total_ms(&self) -> u64 {
        self.words.values().map(|r| r.total_ms()).sum()
    }
}
