//! Phoneme durations in milliseconds.
//!
//! Two strategies with deliberately different numbers:
//!
//! * [`ContextualDurations`] runs every phoneme through [`DurationModel`]:
//!   a per-language base table keyed by IPA, then stress, position, rate
//!   and vowel-context factors;
//! * [`AveragedDurations`] gives every vowel, consonant or silence one
//!   fixed value scaled by a per-language multiplier.
//!
//! Base values follow Klatt (1976), Crystal & House (1988) and, for
//! Spanish, Machuca & Ríos (2014).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::bridge;
use crate::types::{Language, Phoneme, PhonemeKind, Position, RateClass, Stress};

pub const MIN_DURATION_MS: f64 = 10.0;
pub const BEFORE_VOICED_FACTOR: f64 = 1.2;
pub const OPEN_SYLLABLE_FACTOR: f64 = 1.1;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationStrategyKind {
    /// Per-phoneme durations from language, stress, position, rate and neighbours.
    #[default]
    Contextual,
    /// One averaged value per phoneme class, scaled per language.
    Averaged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Vowel,
    Diphthong,
    Stop,
    Fricative,
    Nasal,
    Liquid,
    Other,
}

/// Category of an IPA duration key, by fixed set membership.
pub fn category(ipa: &str) -> Category {
    match ipa {
        "i" | "ɪ" | "e" | "ɛ" | "æ" | "ɑ" | "ɔ" | "o" | "ʊ" | "u" | "ʌ" | "ə" | "ɝ" | "ɚ" | "a" => Category::Vowel,
        "aɪ" | "aʊ" | "ɔɪ" | "eɪ" | "oʊ" => Category::Diphthong,
        "p" | "b" | "t" | "d" | "k" | "g" => Category::Stop,
        "f" | "v" | "θ" | "ð" | "s" | "z" | "ʃ" | "ʒ" | "h" | "x" => Category::Fricative,
        "m" | "n" | "ŋ" | "ɲ" => Category::Nasal,
        "l" | "r" | "rr" | "ʎ" => Category::Liquid,
        _ => Category::Other,
    }
}

pub fn is_voiced_consonant(ipa: &str) -> bool {
    matches!(
        ipa,
        "b" | "d" | "g" | "v" | "ð" | "z" | "ʒ" | "dʒ" | "m" | "n" | "ŋ" | "ɲ" | "l" | "r" | "rr" | "ʎ" | "w" | "j"
    )
}

fn english_base(ipa: &str) -> Option<f64> {
    let ms = match ipa {
        // monophthongs
        "i" => 75.0,
        "ɪ" => 65.0,
        "e" => 85.0,
        "ɛ" => 80.0,
        "æ" => 95.0,
        "ɑ" => 130.0,
        "ɔ" => 110.0,
        "o" => 90.0,
        "ʊ" => 70.0,
        "u" => 85.0,
        "ʌ" => 75.0,
        "ə" => 60.0,
        "ɝ" => 95.0,
        "ɚ" => 70.0,
        // diphthongs
        "aɪ" => 120.0,
        "aʊ" => 125.0,
        "ɔɪ" => 135.0,
        "eɪ" => 110.0,
        "oʊ" => 115.0,
        // stops
        "p" => 25.0,
        "b" => 30.0,
        "t" => 22.0,
        "d" => 28.0,
        "k" => 30.0,
        "g" => 35.0,
        // fricatives
        "f" => 85.0,
        "v" => 75.0,
        "θ" => 90.0,
        "ð" => 80.0,
        "s" => 95.0,
        "z" => 85.0,
        "ʃ" => 100.0,
        "ʒ" => 90.0,
        "h" => 60.0,
        // affricates
        "tʃ" => 75.0,
        "dʒ" => 80.0,
        // nasals
        "m" => 70.0,
        "n" => 65.0,
        "ŋ" => 75.0,
        // liquids
        "l" => 70.0,
        "r" => 75.0,
        // glides
        "w" => 55.0,
        "j" => 50.0,
        // pauses
        "sil" => 100.0,
        "sp" => 50.0,
        _ => return None,
    };
    Some(ms)
}

fn spanish_base(ipa: &str) -> Option<f64> {
    let ms = match ipa {
        "a" => 85.0,
        "e" => 75.0,
        "i" => 65.0,
        "o" => 80.0,
        "u" => 70.0,
        "p" => 20.0,
        "b" => 25.0,
        "t" => 18.0,
        "d" => 22.0,
        "k" => 25.0,
        "g" => 28.0,
        "f" => 80.0,
        "θ" => 85.0,
        "s" => 90.0,
        "x" => 95.0,
        "tʃ" => 70.0,
        "m" => 65.0,
        "n" => 60.0,
        "ɲ" => 70.0,
        "l" => 65.0,
        // tap vs trill
        "r" => 25.0,
        "rr" => 90.0,
        "ʎ" => 70.0,
        "w" => 50.0,
        "j" => 45.0,
        "sil" => 100.0,
        "sp" => 50.0,
        _ => return None,
    };
    Some(ms)
}

fn category_fallback(language: Language, category: Category) -> f64 {
    match (language, category) {
        (Language::Es, Category::Vowel) => 75.0,
        (Language::Es, Category::Diphthong) => 110.0,
        (Language::Es, Category::Stop) => 22.0,
        (Language::Es, Category::Fricative) => 85.0,
        (Language::Es, Category::Nasal) => 60.0,
        (Language::Es, Category::Liquid) => 65.0,
        (Language::Es, Category::Other) => 55.0,
        (_, Category::Vowel) => 80.0,
        (_, Category::Diphthong) => 120.0,
        (_, Category::Stop) => 25.0,
        (_, Category::Fricative) => 85.0,
        (_, Category::Nasal) => 65.0,
        (_, Category::Liquid) => 70.0,
        (_, Category::Other) => 60.0,
    }
}

pub fn stress_factor(stress: Stress) -> f64 {
    match stress {
        Stress::Primary => 1.4,
        Stress::Secondary => 1.15,
        Stress::Unstressed => 1.0,
    }
}

pub fn position_factor(position: Position) -> f64 {
    match position {
        Position::Initial => 1.1,
        Position::Medial => 1.0,
        Position::Final => 1.3,
        Position::PhraseFinal => 1.5,
    }
}

pub fn rate_factor(rate: RateClass) -> f64 {
    match rate {
        RateClass::VerySlow => 1.8,
        RateClass::Slow => 1.4,
        RateClass::Normal => 1.0,
        RateClass::Fast => 0.7,
        RateClass::VeryFast => 0.5,
    }
}

/// Everything besides the phoneme itself that shapes its duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationContext<'a> {
    pub language: Language,
    /// Overrides the phoneme's own stress marker when set.
    pub stress: Option<Stress>,
    pub position: Position,
    pub rate: RateClass,
    pub prev: Option<&'a Phoneme>,
    pub next: Option<&'a Phoneme>,
    pub open_syllable: bool,
}

/// Contextual per-phoneme duration model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationModel;

impl DurationModel {
    pub fn new() -> Self {
        Self
    }

    /// Duration of `phoneme` in whole milliseconds, never below 10.
    pub fn duration(&self, phoneme: &Phoneme, ctx: &DurationContext) -> u32 {
        let language = match ctx.language {
            Language::Other => {
                log::warn!("Language {:?} not supported by the duration model, falling back to English", ctx.language);
                Language::En
            }
            language => language,
        };

        let ipa = bridge::to_ipa(phoneme, language);
        let category = category(&ipa);
        let base = match language {
            Language::Es => spanish_base(&ipa),
            _ => english_base(&ipa),
        };
        let mut ms = base.unwrap_or_else(|| {
            let fallback = category_fallback(language, category);
            log::warn!("Phoneme {:?} (from {}) not in the duration table, using {:?} average {}ms", ipa, phoneme, category, fallback);
            fallback
        });

        let stress = ctx.stress.unwrap_or_else(|| phoneme.stress_level());
        ms *= stress_factor(stress);
        ms *= position_factor(ctx.position);
        ms *= rate_factor(ctx.rate);

        if matches!(category, Category::Vowel | Category::Diphthong) {
            if let Some(next) = ctx.next {
                if is_voiced_consonant(&bridge::to_ipa(next, language)) {
                    ms *= BEFORE_VOICED_FACTOR;
                }
            }
            if ctx.open_syllable {
                ms *= OPEN_SYLLABLE_FACTOR;
            }
        }

        ms.max(MIN_DURATION_MS).round() as u32
    }

    /// One duration per phoneme, filling in each phoneme's neighbours on
    /// top of `base`.
    pub fn sequence_durations(&self, phonemes: &[Phoneme], base: &DurationContext) -> Vec<u32> {
        phonemes
            .iter()
            .enumerate()
            .map(|(i, phoneme)| {
                let ctx = DurationContext {
                    prev: i.checked_sub(1).and_then(|j| phonemes.get(j)),
                    next: phonemes.get(i + 1),
                    ..*base
                };
                self.duration(phoneme, &ctx)
            })
            .collect()
    }
}

/// Per-word inputs shared by both strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTiming {
    pub language: Language,
    pub rate: RateClass,
    /// The word closes a phrase; its last phoneme is lengthened further.
    pub phrase_final: bool,
}

/// Durations for all phonemes of one word.
pub trait DurationStrategy: Send + Sync {
    fn word_durations(&self, phonemes: &[Phoneme], timing: &WordTiming) -> Vec<u32>;
}

pub fn strategy_for(kind: DurationStrategyKind) -> &'static dyn DurationStrategy {
    static CONTEXTUAL: ContextualDurations = ContextualDurations { model: DurationModel };
    static AVERAGED: AveragedDurations = AveragedDurations;
    match kind {
        DurationStrategyKind::Contextual => &CONTEXTUAL,
        DurationStrategyKind::Averaged => &AVERAGED,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextualDurations {
    model: DurationModel,
}

fn position_in_word(index: usize, len: usize, phrase_final: bool) -> Position {
    let last = index + 1 == len;
    match (last, phrase_final) {
        (true, true) => Position::PhraseFinal,
        (true, false) => Position::Final,
        _ if index == 0 => Position::Initial,
        _ => Position::Medial,
    }
}

/// Open when nothing, a vowel, or a single consonant before a vowel follows.
fn is_open_syllable(phonemes: &[Phoneme], index: usize) -> bool {
    match (phonemes.get(index + 1), phonemes.get(index + 2)) {
        (None, _) => true,
        (Some(next), _) if next.is_vowel() => true,
        (Some(_), Some(after)) => after.is_vowel(),
        (Some(_), None) => false,
    }
}

impl DurationStrategy for ContextualDurations {
    fn word_durations(&self, phonemes: &[Phoneme], timing: &WordTiming) -> Vec<u32> {
        phonemes
            .iter()
            .enumerate()
            .map(|(i, phoneme)| {
                let ctx = DurationContext {
                    language: timing.language,
                    stress: None,
                    position: position_in_word(i, phonemes.len(), timing.phrase_final),
                    rate: timing.rate,
                    prev: i.checked_sub(1).and_then(|j| phonemes.get(j)),
                    next: phonemes.get(i + 1),
                    open_syllable: phoneme.is_vowel() && is_open_syllable(phonemes, i),
                };
                self.model.duration(phoneme, &ctx)
            })
            .collect()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BroadClass {
    Vowel,
    Consonant,
    Silence,
}

fn broad_class(phoneme: &Phoneme) -> BroadClass {
    match &phoneme.kind {
        PhonemeKind::Known(symbol) if symbol.is_silence() => BroadClass::Silence,
        PhonemeKind::Known(symbol) if symbol.is_vowel() => BroadClass::Vowel,
        PhonemeKind::Known(_) => BroadClass::Consonant,
        PhonemeKind::Literal(text) if text.is_empty() => BroadClass::Silence,
        PhonemeKind::Literal(text) => {
            let upper = text.to_uppercase();
            if ["AH", "EH", "IH", "OH", "UH"].iter().any(|v| upper.contains(v)) {
                BroadClass::Vowel
            } else {
                BroadClass::Consonant
            }
        }
    }
}

/// Word-level strategy: class averages times a language multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragedDurations;

impl AveragedDurations {
    pub fn class_ms(phoneme: &Phoneme) -> f64 {
        match broad_class(phoneme) {
            BroadClass::Vowel => 133.0,
            BroadClass::Consonant => 66.0,
            BroadClass::Silence => 43.0,
        }
    }

    pub fn language_multiplier(language: Language) -> f64 {
        match language {
            Language::Es => 0.66,
            Language::En | Language::Other => 1.0,
        }
    }
}

impl DurationStrategy for AveragedDurations {
    fn word_durations(&self, phonemes: &[Phoneme], timing: &WordTiming) -> Vec<u32> {
        let multiplier = Self::language_multiplier(timing.language);
        phonemes
            .iter()
            .map(|p| (Self::class_ms(p) * multiplier).round() as u32)
            .collect()
    }
}
