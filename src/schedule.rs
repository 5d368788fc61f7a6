//! Per-word viseme schedule construction.

use serde::{Deserialize, Serialize};

use crate::bridge;
use crate::dictionary::{Lookup, PronunciationLookup};
use crate::duration::{self, DurationStrategyKind, WordTiming};
use crate::error::{ScheduleError, ScheduleErrorDescription};
use crate::generator::{self, FallbackMode, PhonemeGenerator};
use crate::types::{Language, Phoneme, RateClass, Schedule, VisemeCode, WordVisemeRecord};
use crate::viseme;
use crate::TextSplitter;

/// Knobs for one utterance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ScheduleOptions {
    pub language: Language,
    pub duration_strategy: DurationStrategyKind,
    pub rate_class: RateClass,
    pub fallback: FallbackMode,
    /// Merge immediately repeated visemes inside a word.
    pub coalesce_visemes: bool,
}

pub struct ScheduleBuilder<'a> {
    lookup: &'a dyn PronunciationLookup,
    options: ScheduleOptions,
    generator: PhonemeGenerator,
    splitter: TextSplitter,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(lookup: &'a dyn PronunciationLookup, options: ScheduleOptions) -> Self {
        Self {
            lookup,
            options,
            generator: PhonemeGenerator::new(options.fallback),
            splitter: TextSplitter::new(),
        }
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Dictionary first, rule-based generator on a miss.
    pub fn resolve_phonemes(&self, word: &str) -> Vec<Phoneme> {
        let normalized = generator::normalize_word(word);
        if normalized.is_empty() {
            return Vec::new();
        }

        let lookup = self.lookup.lookup(&normalized);
        if let Lookup::Ambiguous(variants) = &lookup {
            log::debug!("{:?} has {} pronunciations, using the first", normalized, variants.len());
        }
        match lookup.transcription() {
            Some(transcription) => {
                log::debug!("{:?}: dictionary /{}/", normalized, transcription);
                bridge::to_internal(transcription, self.options.language)
            }
            None => {
                let phonemes = self.generator.generate(&normalized);
                log::debug!("{:?}: not in dictionary, generated {:?} phonemes", normalized, self.generator.mode());
                phonemes
            }
        }
    }

    /// Record for a single word, `phrase_final` marking the last word
    /// before a phrase break.
    pub fn word_record(&self, word: &str, phrase_final: bool) -> WordVisemeRecord {
        let phonemes = self.resolve_phonemes(word);
        let timing = WordTiming {
            language: self.options.language,
            rate: self.options.rate_class,
            phrase_final,
        };
        let phoneme_durations = duration::strategy_for(self.options.duration_strategy).word_durations(&phonemes, &timing);

        let mut visemes: Vec<VisemeCode> = Vec::with_capacity(phonemes.len());
        let mut durations: Vec<u32> = Vec::with_capacity(phonemes.len());
        for (phoneme, ms) in phonemes.iter().zip(phoneme_durations) {
            for (code, part) in viseme::split_duration(viseme::map_to_visemes(phoneme), ms) {
                visemes.push(code);
                durations.push(part);
            }
        }

        if self.options.coalesce_visemes {
            viseme::coalesce(&mut visemes, &mut durations);
        }

        WordVisemeRecord {
            word: word.to_string(),
            phonemes,
            visemes,
            durations,
        }
    }

    /// Schedule for `text`, keyed by each word's char offset.
    pub fn build(&self, text: &str) -> Result<Schedule, ScheduleError> {
        let words = self.splitter.split_words(text);
        if words.is_empty() {
            return Err(ScheduleError::new(ScheduleErrorDescription::NothingToSpeak));
        }

        let mut schedule = Schedule::new();
        for span in words {
            schedule.insert(span.offset, self.word_record(span.text, span.phrase_final));
        }
        Ok(schedule)
    }
}
