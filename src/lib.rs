pub mod error;
pub mod types;
pub mod numbers;
pub mod dictionary;
pub mod generator;
pub mod bridge;
pub mod duration;
pub mod viseme;
pub mod schedule;
pub mod session;
pub mod playback;

pub use error::{
    ErrorDescription,
    GenericError,
    ScheduleError,
    DictionaryError,
    NumberError,
    ParamsError,
};

pub use types::{Language, Phoneme, RateClass, Schedule, Symbol, VisemeCode, WordVisemeRecord};
pub use dictionary::{PronunciationDictionary, PronunciationLookup, Lookup};
pub use duration::{DurationModel, DurationStrategyKind};
pub use generator::{FallbackMode, PhonemeGenerator};
pub use schedule::{ScheduleBuilder, ScheduleOptions};
pub use session::{PreparedUtterance, SpeechSession};
pub use playback::{MouthAnimator, PlaybackParams, VisemeSink};

/// A whitespace-delimited word of the spoken text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan<'a> {
    /// Char offset of the word's first character.
    pub offset: usize,
    /// The word as written, punctuation included.
    pub text: &'a str,
    /// Last word before a phrase break or the end of the text.
    pub phrase_final: bool,
}

pub struct TextSplitter {
    phrase_breaks: Vec<char>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            phrase_breaks: vec!['.', '!', '?', ';', ':', '。', '？', '！'],
        }
    }
}

impl TextSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_break(&self, c: char) -> bool {
        self.phrase_breaks.contains(&c)
    }

    pub fn split_words<'a>(&self, text: &'a str) -> Vec<WordSpan<'a>> {
        let mut spans: Vec<WordSpan<'a>> = Vec::new();
        let mut start: Option<(usize, usize)> = None;
        let mut chars = 0;

        for (idx, c) in text.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some((byte, offset))) => {
                    spans.push(WordSpan { offset, text: &text[byte..idx], phrase_final: false });
                    start = None;
                }
                (false, None) => start = Some((idx, chars)),
                _ => {}
            }
            chars += 1;
        }
        if let Some((byte, offset)) = start {
            spans.push(WordSpan { offset, text: &text[byte..], phrase_final: false });
        }

        let count = spans.len();
        for i in 0..count {
            let ends_phrase = spans[i].text.chars().last().map_or(false, |c| self.is_break(c));
            let next_opens_break = spans
                .get(i + 1)
                .and_then(|next| next.text.chars().next())
                .map_or(false, |c| self.is_break(c));
            spans[i].phrase_final = i + 1 == count || ends_phrase || next_opens_break;
        }

        spans
    }
}
