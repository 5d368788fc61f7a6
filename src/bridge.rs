//! Conversion between dictionary IPA transcriptions and the internal
//! ARPAbet-style alphabet.
//!
//! IPA -> internal is greedy: at every position the longest known sequence
//! wins, so `aɪ` is one diphthong rather than `a` followed by `ɪ`. Stress
//! markers (`ˈ`, `ˌ`, `0`, `1`, `2`) are held until the next vowel or
//! diphthong and attached to it alone.
//!
//! Internal -> IPA feeds the duration tables, which are keyed by IPA.

use std::borrow::Cow;

use crate::types::{Language, Phoneme, PhonemeKind, Stress, Symbol};

/// Longest IPA sequence in either table, in chars.
const MAX_SEQUENCE: usize = 2;

fn english_ipa(segment: &str) -> Option<Symbol> {
    let symbol = match segment {
        "aɪ" => Symbol::AY,
        "aʊ" => Symbol::AW,
        "ɔɪ" => Symbol::OY,
        "oʊ" | "əʊ" => Symbol::OW,
        "eɪ" => Symbol::EY,
        "tʃ" => Symbol::CH,
        "dʒ" => Symbol::JH,
        "i" => Symbol::IY,
        "ɪ" => Symbol::IH,
        "e" => Symbol::EY,
        "ɛ" => Symbol::EH,
        "æ" => Symbol::AE,
        "ɑ" | "ɒ" | "a" => Symbol::AA,
        "ɔ" => Symbol::AO,
        "o" => Symbol::OW,
        "ʊ" => Symbol::UH,
        "u" => Symbol::UW,
        "ʌ" | "ə" => Symbol::AH,
        "ɜ" | "ɝ" | "ɚ" => Symbol::ER,
        "p" => Symbol::P,
        "b" => Symbol::B,
        "t" => Symbol::T,
        "d" | "ɾ" => Symbol::D,
        "k" => Symbol::K,
        "g" | "ɡ" => Symbol::G,
        "f" => Symbol::F,
        "v" => Symbol::V,
        "θ" => Symbol::TH,
        "ð" => Symbol::DH,
        "s" => Symbol::S,
        "z" => Symbol::Z,
        "ʃ" => Symbol::SH,
        "ʒ" => Symbol::ZH,
        "h" => Symbol::HH,
        "m" => Symbol::M,
        "n" => Symbol::N,
        "ŋ" => Symbol::NG,
        "l" | "ɫ" => Symbol::L,
        "r" | "ɹ" => Symbol::R,
        "j" => Symbol::Y,
        "w" => Symbol::W,
        _ => return None,
    };
    Some(symbol)
}

fn spanish_ipa(segment: &str) -> Option<Symbol> {
    let symbol = match segment {
        "tʃ" => Symbol::CH,
        "rr" | "r" => Symbol::RR,
        "ɾ" => Symbol::R,
        "a" => Symbol::A,
        "e" => Symbol::E,
        "i" => Symbol::I,
        "o" => Symbol::O,
        "u" => Symbol::U,
        "ɲ" => Symbol::NX,
        "ʎ" => Symbol::LL,
        "x" => Symbol::X,
        "b" | "β" => Symbol::B,
        "d" | "ð" => Symbol::D,
        "g" | "ɡ" | "ɣ" => Symbol::G,
        "θ" => Symbol::TH,
        "j" | "ʝ" => Symbol::Y,
        "w" => Symbol::W,
        "p" => Symbol::P,
        "t" => Symbol::T,
        "k" => Symbol::K,
        "f" => Symbol::F,
        "s" => Symbol::S,
        "m" => Symbol::M,
        "n" => Symbol::N,
        "l" => Symbol::L,
        _ => return None,
    };
    Some(symbol)
}

fn ipa_to_symbol(segment: &str, language: Language) -> Option<Symbol> {
    match language {
        Language::Es => spanish_ipa(segment).or_else(|| english_ipa(segment)),
        Language::En | Language::Other => english_ipa(segment),
    }
}

/// Marks that carry no phoneme of their own: length, syllable breaks,
/// delimiters and combining diacritics.
fn is_ignorable(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, 'ː' | 'ˑ' | '.' | '/' | '-' | '\'' | '‿' | '[' | ']')
        || ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Converts one IPA transcription into internal phonemes.
pub fn to_internal(transcription: &str, language: Language) -> Vec<Phoneme> {
    let chars = transcription.chars().collect::<Vec<char>>();
    let mut phonemes = Vec::new();
    let mut pending_stress: Option<Stress> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(stress) = Stress::from_marker(c) {
            pending_stress = Some(stress);
            i += 1;
            continue;
        }
        if is_ignorable(c) {
            i += 1;
            continue;
        }

        let longest = MAX_SEQUENCE.min(chars.len() - i);
        let matched = (1..=longest).rev().find_map(|len| {
            let segment = chars[i..i + len].iter().collect::<String>();
            ipa_to_symbol(&segment, language).map(|symbol| (symbol, len))
        });

        match matched {
            Some((symbol, len)) => {
                let mut phoneme = Phoneme::new(symbol);
                if symbol.is_vowel() {
                    phoneme.stress = pending_stress.take();
                }
                phonemes.push(phoneme);
                i += len;
            }
            None => {
                log::warn!("Unrecognized IPA symbol {:?} in {:?}, passing it through", c, transcription);
                phonemes.push(Phoneme::literal(&c.to_string()));
                i += 1;
            }
        }
    }

    phonemes
}

fn english_symbol_ipa(symbol: Symbol) -> Option<&'static str> {
    let ipa = match symbol {
        Symbol::AA => "ɑ",
        Symbol::AE => "æ",
        Symbol::AH => "ʌ",
        Symbol::AO => "ɔ",
        Symbol::AW => "aʊ",
        Symbol::AY => "aɪ",
        Symbol::EH => "ɛ",
        Symbol::ER => "ɝ",
        Symbol::EY => "eɪ",
        Symbol::IH => "ɪ",
        Symbol::IY => "i",
        Symbol::OH => "o",
        Symbol::OW => "oʊ",
        Symbol::OY => "ɔɪ",
        Symbol::UH => "ʊ",
        Symbol::UW => "u",
        Symbol::B => "b",
        Symbol::CH => "tʃ",
        Symbol::D => "d",
        Symbol::DH => "ð",
        Symbol::F => "f",
        Symbol::G => "g",
        Symbol::H | Symbol::HH => "h",
        Symbol::JH => "dʒ",
        Symbol::K => "k",
        Symbol::L => "l",
        Symbol::M => "m",
        Symbol::N => "n",
        Symbol::NG => "ŋ",
        Symbol::P => "p",
        Symbol::R => "r",
        Symbol::S => "s",
        Symbol::SH => "ʃ",
        Symbol::T => "t",
        Symbol::TH => "θ",
        Symbol::V => "v",
        Symbol::W => "w",
        Symbol::Y => "j",
        Symbol::Z => "z",
        Symbol::ZH => "ʒ",
        Symbol::SIL => "sil",
        Symbol::SP | Symbol::REST => "sp",
        Symbol::A | Symbol::E | Symbol::I | Symbol::O | Symbol::U
        | Symbol::LL | Symbol::NX | Symbol::RR | Symbol::X | Symbol::Q => return None,
    };
    Some(ipa)
}

fn spanish_symbol_ipa(symbol: Symbol) -> Option<&'static str> {
    let ipa = match symbol {
        Symbol::A => "a",
        Symbol::E => "e",
        Symbol::I => "i",
        Symbol::O => "o",
        Symbol::U => "u",
        Symbol::B => "b",
        Symbol::CH => "tʃ",
        Symbol::D => "d",
        Symbol::F => "f",
        Symbol::G => "g",
        Symbol::K => "k",
        Symbol::L => "l",
        Symbol::LL => "ʎ",
        Symbol::M => "m",
        Symbol::N => "n",
        Symbol::NX => "ɲ",
        Symbol::P => "p",
        Symbol::R => "r",
        Symbol::RR => "rr",
        Symbol::S | Symbol::Z => "s",
        Symbol::T => "t",
        Symbol::TH => "θ",
        Symbol::V => "v",
        Symbol::W => "w",
        Symbol::Y => "j",
        Symbol::ZH => "ʒ",
        Symbol::X => "x",
        Symbol::SIL => "sil",
        Symbol::SP | Symbol::REST => "sp",
        _ => return None,
    };
    Some(ipa)
}

/// IPA key for the duration tables.
///
/// Symbols missing from the language's table fall back to the English one;
/// anything still unknown comes back lower-cased as-is.
pub fn to_ipa(phoneme: &Phoneme, language: Language) -> Cow<'static, str> {
    let symbol = match &phoneme.kind {
        PhonemeKind::Known(symbol) => *symbol,
        PhonemeKind::Literal(text) => {
            let literal = text.to_lowercase();
            log::warn!("Phoneme {:?} has no IPA equivalent, returning it as-is", literal);
            return Cow::Owned(literal);
        }
    };

    let ipa = match language {
        Language::Es => spanish_symbol_ipa(symbol).or_else(|| english_symbol_ipa(symbol)),
        Language::En | Language::Other => english_symbol_ipa(symbol),
    };

    match ipa {
        Some(ipa) => Cow::Borrowed(ipa),
        None => {
            log::warn!("Phoneme {} not found for language {}, returning it as-is", symbol, language.code());
            Cow::Owned(symbol.code().to_lowercase())
        }
    }
}
