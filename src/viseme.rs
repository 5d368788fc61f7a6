//! Phoneme -> mouth shape mapping.

use crate::types::{Phoneme, Symbol, VisemeCode};

/// One or two mouth shapes for a phoneme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VisemeShape {
    Single(VisemeCode),
    /// Start and end shape of a diphthong glide.
    Pair(VisemeCode, VisemeCode),
}

impl VisemeShape {
    pub fn codes(&self) -> impl Iterator<Item = VisemeCode> {
        let (first, second) = match *self {
            Self::Single(code) => (code, None),
            Self::Pair(start, end) => (start, Some(end)),
        };
        std::iter::once(first).chain(second)
    }
}

pub fn symbol_shape(symbol: Symbol) -> VisemeShape {
    use VisemeCode as V;

    let code = match symbol {
        Symbol::AW => return VisemeShape::Pair(V::A, V::U),
        Symbol::AY => return VisemeShape::Pair(V::A, V::I),
        Symbol::EY => return VisemeShape::Pair(V::E, V::I),
        Symbol::OW => return VisemeShape::Pair(V::O, V::U),
        Symbol::OY => return VisemeShape::Pair(V::O, V::I),

        Symbol::IY | Symbol::IH | Symbol::EH => V::E,
        Symbol::AE | Symbol::AA | Symbol::AH => V::A,
        Symbol::AO | Symbol::OH => V::O,
        Symbol::UH | Symbol::UW | Symbol::Q => V::U,
        Symbol::ER => V::R,

        Symbol::A => V::A,
        Symbol::E => V::E,
        Symbol::I => V::I,
        Symbol::O => V::O,
        Symbol::U => V::U,

        Symbol::P | Symbol::B | Symbol::M => V::M,
        Symbol::T | Symbol::D | Symbol::TH | Symbol::DH => V::Th,
        Symbol::F | Symbol::V => V::F,
        Symbol::S | Symbol::Z => V::S,
        Symbol::SH | Symbol::ZH | Symbol::H | Symbol::CH | Symbol::JH => V::Sh,
        Symbol::K | Symbol::HH | Symbol::R | Symbol::RR | Symbol::X => V::R,
        Symbol::G | Symbol::Y => V::E,
        Symbol::N | Symbol::L | Symbol::LL | Symbol::NX => V::L,
        Symbol::W => V::U,

        Symbol::NG | Symbol::SIL | Symbol::SP | Symbol::REST => V::Rest,
    };
    VisemeShape::Single(code)
}

/// Shape for a phoneme; stress is ignored and anything outside the
/// alphabet rests.
pub fn map_to_visemes(phoneme: &Phoneme) -> VisemeShape {
    match phoneme.symbol() {
        Some(symbol) => symbol_shape(symbol),
        None => VisemeShape::Single(VisemeCode::Rest),
    }
}

/// Same as [`map_to_visemes`] for a raw code such as `"OW1"` or `""`.
pub fn map_code(code: &str) -> VisemeShape {
    if code.trim().is_empty() {
        return VisemeShape::Single(VisemeCode::Rest);
    }
    map_to_visemes(&Phoneme::parse(code))
}

/// Splits `duration` across `shape`; a pair gets two halves that add up
/// to exactly `duration`.
pub fn split_duration(shape: VisemeShape, duration: u32) -> Vec<(VisemeCode, u32)> {
    match shape {
        VisemeShape::Single(code) => vec![(code, duration)],
        VisemeShape::Pair(start, end) => {
            let first = duration / 2;
            vec![(start, first), (end, duration - first)]
        }
    }
}

/// Merges immediately repeated codes, summing their durations.
pub fn coalesce(visemes: &mut Vec<VisemeCode>, durations: &mut Vec<u32>) {
    let mut merged_codes: Vec<VisemeCode> = Vec::with_capacity(visemes.len());
    let mut merged_durations: Vec<u32> = Vec::with_capacity(durations.len());

    for (code, duration) in visemes.drain(..).zip(durations.drain(..)) {
        match (merged_codes.last(), merged_durations.last_mut()) {
            (Some(last), Some(total)) if *last == code => *total += duration,
            _ => {
                merged_codes.push(code);
                merged_durations.push(duration);
            }
        }
    }

    *visemes = merged_codes;
    *durations = merged_durations;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_symbol_has_a_shape() {
        for symbol in Symbol::ALL {
            let codes = symbol_shape(symbol).codes().count();
            assert!(codes == 1 || codes == 2, "{} maps to {} codes", symbol, codes);
        }
    }

    #[test]
    fn diphthongs_are_pairs() {
        assert_eq!(map_code("AY1"), VisemeShape::Pair(VisemeCode::A, VisemeCode::I));
        assert_eq!(map_code("OW"), VisemeShape::Pair(VisemeCode::O, VisemeCode::U));
        assert_eq!(symbol_shape(Symbol::EY).codes().collect::<Vec<_>>(), vec![VisemeCode::E, VisemeCode::I]);
    }

    #[test]
    fn consonants_and_vowels() {
        assert_eq!(map_code("P"), VisemeShape::Single(VisemeCode::M));
        assert_eq!(map_code("TH"), VisemeShape::Single(VisemeCode::Th));
        assert_eq!(map_code("SH"), VisemeShape::Single(VisemeCode::Sh));
        assert_eq!(map_code("AE1"), VisemeShape::Single(VisemeCode::A));
        assert_eq!(map_code("rr"), VisemeShape::Single(VisemeCode::R));
    }

    #[test]
    fn unknown_and_empty_rest() {
        assert_eq!(map_code(""), VisemeShape::Single(VisemeCode::Rest));
        assert_eq!(map_code("QX"), VisemeShape::Single(VisemeCode::Rest));
        assert_eq!(map_to_visemes(&Phoneme::literal("ʘ")), VisemeShape::Single(VisemeCode::Rest));
    }

    #[test]
    fn split_keeps_total() {
        let shape = VisemeShape::Pair(VisemeCode::A, VisemeCode::I);
        for duration in [0, 1, 10, 133, 168] {
            let parts = split_duration(shape, duration);
            assert_eq!(parts.len(), 2);
            assert_eq!(parts[0].0, VisemeCode::A);
            assert_eq!(parts[1].0, VisemeCode::I);
            assert_eq!(parts[0].1 + parts[1].1, duration);
        }
        assert_eq!(split_duration(VisemeShape::Single(VisemeCode::M), 70), vec![(VisemeCode::M, 70)]);
    }

    #[test]
    fn coalesce_merges_runs() {
        let mut visemes = vec![VisemeCode::M, VisemeCode::M, VisemeCode::A, VisemeCode::M];
        let mut durations = vec![10, 20, 30, 40];
        coalesce(&mut visemes, &mut durations);
        assert_eq!(visemes, vec![VisemeCode::M, VisemeCode::A, VisemeCode::M]);
        assert_eq!(durations, vec![30, 30, 40]);
    }
}
