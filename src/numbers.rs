//! Spelling out numeric tokens before phoneme conversion.
//!
//! English follows short-scale names up to the trillions, Spanish covers
//! everything below one thousand million. Tokens outside those ranges are
//! left untouched.

use crate::error::{NumberError, NumberErrorDescription};
use crate::types::Language;

const ENGLISH_SINGLE: [&str; 10] = ["", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine"];
const ENGLISH_TEENS: [&str; 10] = [
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];
const ENGLISH_TENS: [&str; 8] = ["Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety"];
const ENGLISH_SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "Trillion"),
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];
const ENGLISH_LIMIT: u64 = 1_000_000_000_000_000;

const SPANISH_UNITS: [&str; 10] = ["", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve"];
const SPANISH_TEN_TO_TWENTY_NINE: [&str; 20] = [
    "diez", "once", "doce", "trece", "catorce", "quince", "dieciséis", "diecisiete", "dieciocho", "diecinueve",
    "veinte", "veintiuno", "veintidós", "veintitrés", "veinticuatro", "veinticinco", "veintiséis", "veintisiete",
    "veintiocho", "veintinueve",
];
const SPANISH_TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];
const SPANISH_HUNDREDS: [&str; 10] = [
    "", "ciento", "doscientos", "trescientos", "cuatrocientos", "quinientos", "seiscientos", "setecientos",
    "ochocientos", "novecientos",
];
const SPANISH_LIMIT: u64 = 1_000_000_000;

/// English cardinal, one capitalised word per component (`21` -> `Twenty One`).
pub fn english_cardinal(n: i64) -> Result<String, NumberError> {
    if n < 0 {
        return Err(NumberError::new(NumberErrorDescription::Negative));
    }
    let n = n as u64;
    if n >= ENGLISH_LIMIT {
        return Err(NumberError::new(NumberErrorDescription::OutOfRange));
    }
    if n == 0 {
        return Ok("Zero".to_string());
    }
    let mut words = Vec::new();
    english_words(n, &mut words);
    Ok(words.join(" "))
}

fn english_words(n: u64, words: &mut Vec<&'static str>) {
    if n < 10 {
        if n > 0 {
            words.push(ENGLISH_SINGLE[n as usize]);
        }
    } else if n < 20 {
        words.push(ENGLISH_TEENS[(n - 10) as usize]);
    } else if n < 100 {
        words.push(ENGLISH_TENS[(n / 10 - 2) as usize]);
        english_words(n % 10, words);
    } else if n < 1_000 {
        words.push(ENGLISH_SINGLE[(n / 100) as usize]);
        words.push("Hundred");
        english_words(n % 100, words);
    } else {
        for (scale, name) in ENGLISH_SCALES {
            if n >= scale {
                english_words(n / scale, words);
                words.push(name);
                english_words(n % scale, words);
                return;
            }
        }
    }
}

/// Spanish cardinal in lower case (`21` -> `veintiuno`, `100` -> `cien`).
pub fn spanish_cardinal(n: i64) -> Result<String, NumberError> {
    if n < 0 {
        return Err(NumberError::new(NumberErrorDescription::Negative));
    }
    let n = n as u64;
    if n >= SPANISH_LIMIT {
        return Err(NumberError::new(NumberErrorDescription::OutOfRange));
    }
    if n == 0 {
        return Ok("cero".to_string());
    }
    Ok(spanish_millions(n))
}

fn spanish_tens(n: u64) -> String {
    match n {
        0..=9 => SPANISH_UNITS[n as usize].to_string(),
        10..=29 => SPANISH_TEN_TO_TWENTY_NINE[(n - 10) as usize].to_string(),
        _ => {
            let tens = SPANISH_TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                unit => format!("{} y {}", tens, SPANISH_UNITS[unit as usize]),
            }
        }
    }
}

fn spanish_hundreds(n: u64) -> String {
    match n {
        100 => "cien".to_string(),
        0..=99 => spanish_tens(n),
        _ => {
            let rest = spanish_tens(n % 100);
            let hundreds = SPANISH_HUNDREDS[(n / 100) as usize];
            if rest.is_empty() {
                hundreds.to_string()
            } else {
                format!("{} {}", hundreds, rest)
            }
        }
    }
}

/// `uno` shortens before `mil` and `millones`: `veintiún mil`, `treinta y un millones`.
fn apocope(words: String) -> String {
    if let Some(stem) = words.strip_suffix("veintiuno") {
        format!("{}veintiún", stem)
    } else if let Some(stem) = words.strip_suffix("uno") {
        format!("{}un", stem)
    } else {
        words
    }
}

fn join_nonempty(head: String, tail: String) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail,
        (_, true) => head,
        _ => format!("{} {}", head, tail),
    }
}

fn spanish_thousands(n: u64) -> String {
    let thousands = n / 1_000;
    let head = match thousands {
        0 => String::new(),
        1 => "mil".to_string(),
        _ => format!("{} mil", apocope(spanish_hundreds(thousands))),
    };
    join_nonempty(head, spanish_hundreds(n % 1_000))
}

fn spanish_millions(n: u64) -> String {
    let millions = n / 1_000_000;
    let head = match millions {
        0 => String::new(),
        1 => "un millón".to_string(),
        _ => format!("{} millones", apocope(spanish_hundreds(millions))),
    };
    join_nonempty(head, spanish_thousands(n % 1_000_000))
}

/// Spells out one purely numeric string for the given language.
pub fn spell_number(digits: &str, language: Language) -> Result<String, NumberError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(NumberError::new(NumberErrorDescription::NotNumeric));
    }
    let n: i64 = digits.parse().map_err(|_| NumberError::new(NumberErrorDescription::OutOfRange))?;
    match language {
        Language::Es => spanish_cardinal(n),
        Language::En | Language::Other => english_cardinal(n),
    }
}

fn is_sentence_end(token: &str) -> bool {
    token.ends_with(['.', '!', '?'])
}

fn capitalize_first(words: &str) -> String {
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces every numeric token in `text` by its spelled-out form.
///
/// Leading and trailing punctuation around the number is kept, and a number
/// that opens a sentence gets a capitalised first word. Whitespace between
/// tokens is copied verbatim.
pub fn expand(text: &str, language: Language) -> String {
    let mut out = String::with_capacity(text.len());
    let mut sentence_start = true;

    for (is_space, segment) in segments(text) {
        if is_space {
            out.push_str(segment);
            continue;
        }
        out.push_str(&expand_token(segment, language, sentence_start));
        sentence_start = is_sentence_end(segment);
    }

    out
}

fn expand_token(token: &str, language: Language, sentence_start: bool) -> String {
    let core_start = token.find(|c: char| c.is_alphanumeric()).unwrap_or(token.len());
    let core_end = token.rfind(|c: char| c.is_alphanumeric()).map(|i| i + token[i..].chars().next().map_or(1, |c| c.len_utf8())).unwrap_or(core_start);
    if core_start >= core_end {
        return token.to_string();
    }

    let (leading, rest) = token.split_at(core_start);
    let (core, trailing) = rest.split_at(core_end - core_start);

    if !core.chars().all(|c| c.is_ascii_digit()) {
        return token.to_string();
    }
    if leading.ends_with(['-', '\u{2212}']) {
        log::debug!("Leaving negative number {:?} unconverted", token);
        return token.to_string();
    }

    match spell_number(core, language) {
        Ok(words) => {
            let words = if sentence_start { capitalize_first(&words) } else { words };
            format!("{}{}{}", leading, words, trailing)
        }
        Err(e) => {
            log::debug!("Leaving {:?} unconverted: {}", token, e);
            token.to_string()
        }
    }
}

/// Splits text into alternating whitespace / non-whitespace runs.
fn segments(text: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match current {
            Some(kind) if kind == is_space => {}
            Some(kind) => {
                segments.push((kind, &text[start..idx]));
                start = idx;
                current = Some(is_space);
            }
            None => current = Some(is_space),
        }
    }
    if let Some(kind) = current {
        segments.push((kind, &text[start..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_small_numbers() {
        assert_eq!(english_cardinal(0).unwrap(), "Zero");
        assert_eq!(english_cardinal(7).unwrap(), "Seven");
        assert_eq!(english_cardinal(13).unwrap(), "Thirteen");
        assert_eq!(english_cardinal(21).unwrap(), "Twenty One");
        assert_eq!(english_cardinal(40).unwrap(), "Forty");
    }

    #[test]
    fn english_large_numbers() {
        assert_eq!(english_cardinal(100).unwrap(), "One Hundred");
        assert_eq!(english_cardinal(305).unwrap(), "Three Hundred Five");
        assert_eq!(english_cardinal(1_000).unwrap(), "One Thousand");
        assert_eq!(english_cardinal(12_345).unwrap(), "Twelve Thousand Three Hundred Forty Five");
        assert_eq!(english_cardinal(2_000_000_001).unwrap(), "Two Billion One");
        assert_eq!(english_cardinal(1_000_000_000_000).unwrap(), "One Trillion");
    }

    #[test]
    fn english_rejects_negative_and_huge() {
        assert_eq!(english_cardinal(-1).unwrap_err().into_inner(), NumberErrorDescription::Negative);
        assert_eq!(
            english_cardinal(1_000_000_000_000_000).unwrap_err().into_inner(),
            NumberErrorDescription::OutOfRange
        );
    }

    #[test]
    fn spanish_agreement_rules() {
        assert_eq!(spanish_cardinal(0).unwrap(), "cero");
        assert_eq!(spanish_cardinal(16).unwrap(), "dieciséis");
        assert_eq!(spanish_cardinal(21).unwrap(), "veintiuno");
        assert_eq!(spanish_cardinal(35).unwrap(), "treinta y cinco");
        assert_eq!(spanish_cardinal(100).unwrap(), "cien");
        assert_eq!(spanish_cardinal(101).unwrap(), "ciento uno");
        assert_eq!(spanish_cardinal(500).unwrap(), "quinientos");
        assert_eq!(spanish_cardinal(1_000).unwrap(), "mil");
        assert_eq!(spanish_cardinal(21_000).unwrap(), "veintiún mil");
        assert_eq!(spanish_cardinal(31_500).unwrap(), "treinta y un mil quinientos");
        assert_eq!(spanish_cardinal(1_000_000).unwrap(), "un millón");
        assert_eq!(spanish_cardinal(2_000_100).unwrap(), "dos millones cien");
    }

    #[test]
    fn spanish_out_of_range() {
        assert!(spanish_cardinal(1_000_000_000).is_err());
        assert!(spanish_cardinal(-3).is_err());
    }

    #[test]
    fn expand_keeps_trailing_punctuation() {
        assert_eq!(expand("I have 21 cats.", Language::En), "I have Twenty One cats.");
        assert_eq!(expand("count: 3.", Language::En), "count: Three.");
    }

    #[test]
    fn expand_spanish() {
        assert_eq!(expand("tengo 21 euros", Language::Es), "tengo veintiuno euros");
        assert_eq!(expand("21 euros. 5 más", Language::Es), "Veintiuno euros. Cinco más");
    }

    #[test]
    fn expand_leaves_other_tokens_alone() {
        assert_eq!(expand("route 66b is -5 away", Language::En), "route 66b is -5 away");
        assert_eq!(expand("  spaced\tout  ", Language::En), "  spaced\tout  ");
        assert_eq!(expand("(42)", Language::En), "(Forty Two)");
    }

    #[test]
    fn expand_leaves_oversized_numbers() {
        let text = "big 99999999999999999999 number";
        assert_eq!(expand(text, Language::En), text);
    }
}
