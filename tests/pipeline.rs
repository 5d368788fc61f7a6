use std::sync::Arc;

use viseme_sync::dictionary::{self, Lookup, PronunciationDictionary, PronunciationLookup};
use viseme_sync::duration::{strategy_for, AveragedDurations, WordTiming};
use viseme_sync::{
    bridge,
    numbers,
    DurationStrategyKind,
    Language,
    Phoneme,
    ScheduleBuilder,
    ScheduleOptions,
    SpeechSession,
    Symbol,
    VisemeCode,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/words.dict");

fn fixture() -> PronunciationDictionary {
    PronunciationDictionary::load(FIXTURE).unwrap()
}

fn codes(phonemes: &[Phoneme]) -> Vec<String> {
    phonemes.iter().map(|p| p.to_string()).collect()
}

#[test]
fn fixture_dictionary_loads() {
    let dict = fixture();
    assert_eq!(dict.len(), 18);
    assert!(matches!(dict.lookup("hello"), Lookup::Ambiguous(_)));
    assert!(matches!(dict.lookup("READ"), Lookup::Ambiguous(_)));
    assert!(dict.lookup("zxqv").is_missing());
}

#[test]
fn dictionary_words_are_well_formed() {
    let dict = fixture();
    let builder = ScheduleBuilder::new(&dict, ScheduleOptions::default());
    let schedule = builder
        .build("hello I have my cat now boy say go choice twenty one the read")
        .unwrap();

    assert_eq!(schedule.len(), 14);
    for (_, record) in schedule.iter() {
        assert!(!record.visemes.is_empty(), "{} has no visemes", record.word);
        assert_eq!(record.visemes.len(), record.durations.len());
        assert!(record.durations.iter().all(|d| *d >= 10), "{}: {:?}", record.word, record.durations);
    }
}

#[test]
fn averaged_strategy_uses_class_values() {
    let dict = fixture();
    for language in [Language::En, Language::Es] {
        let options = ScheduleOptions {
            language,
            duration_strategy: DurationStrategyKind::Averaged,
            ..Default::default()
        };
        let builder = ScheduleBuilder::new(&dict, options);
        let multiplier = AveragedDurations::language_multiplier(language);
        for word in ["hello", "cats", "choice", "perro"] {
            let record = builder.word_record(word, false);
            let expected = record
                .phonemes
                .iter()
                .map(|p| (AveragedDurations::class_ms(p) * multiplier).round() as u64)
                .sum::<u64>();
            assert_eq!(record.total_ms(), expected, "{}", word);
        }
    }
}

#[test]
fn diphthongs_split_their_duration() {
    let dict = fixture();
    let builder = ScheduleBuilder::new(&dict, ScheduleOptions::default());
    let timing = WordTiming::default();

    for (word, start, end) in [
        ("my", VisemeCode::A, VisemeCode::I),
        ("now", VisemeCode::A, VisemeCode::U),
        ("boy", VisemeCode::O, VisemeCode::I),
        ("say", VisemeCode::E, VisemeCode::I),
        ("go", VisemeCode::O, VisemeCode::U),
    ] {
        let record = builder.word_record(word, false);
        assert_eq!(record.phonemes.len(), 2, "{}", word);
        assert_eq!(record.visemes.len(), 3, "{}", word);
        assert_eq!(&record.visemes[1..], &[start, end], "{}", word);

        let allotted = strategy_for(DurationStrategyKind::Contextual).word_durations(&record.phonemes, &timing);
        assert_eq!(record.durations[1] + record.durations[2], allotted[1], "{}", word);
    }
}

#[test]
fn two_char_diphthongs_are_never_split() {
    for (ipa, symbol) in [("naʊ", Symbol::AW), ("baɪ", Symbol::AY), ("bɔɪ", Symbol::OY), ("seɪ", Symbol::EY), ("ɡoʊ", Symbol::OW)] {
        let phonemes = bridge::to_internal(ipa, Language::En);
        assert_eq!(phonemes.len(), 2, "{}", ipa);
        assert_eq!(phonemes[1].symbol(), Some(symbol), "{}", ipa);
    }
}

#[test]
fn stress_does_not_reach_the_next_consonant() {
    let mut stressed = PronunciationDictionary::empty();
    stressed.insert("cats", "ˈkæts");
    let mut plain = PronunciationDictionary::empty();
    plain.insert("cats", "kæts");

    let stressed = ScheduleBuilder::new(&stressed, ScheduleOptions::default()).word_record("cats", false);
    let plain = ScheduleBuilder::new(&plain, ScheduleOptions::default()).word_record("cats", false);

    assert_eq!(codes(&stressed.phonemes), vec!["K", "AE1", "T", "S"]);
    assert_eq!(codes(&plain.phonemes), vec!["K", "AE", "T", "S"]);
    assert!(stressed.durations[1] > plain.durations[1]);
    assert_eq!(stressed.durations[0], plain.durations[0]);
    assert_eq!(stressed.durations[2], plain.durations[2]);
    assert_eq!(stressed.durations[3], plain.durations[3]);
}

#[test]
fn number_expansion() {
    assert_eq!(numbers::expand("I have 21 cats.", Language::En), "I have Twenty One cats.");
    assert!(numbers::expand("tengo 21 euros", Language::Es).starts_with("tengo veintiuno euros"));
    assert_eq!(numbers::expand("-5 degrees", Language::En), "-5 degrees");
}

#[test]
fn full_utterance() {
    let session = SpeechSession::new(Arc::new(fixture()), ScheduleOptions::default());
    let prepared = session.prepare("I have 21 cats.").unwrap();

    assert_eq!(prepared.text, "I have Twenty One cats.");
    let offsets = prepared.schedule.iter().map(|(offset, r)| (offset, r.word.as_str())).collect::<Vec<_>>();
    assert_eq!(offsets, vec![(0, "I"), (2, "have"), (7, "Twenty"), (14, "One"), (18, "cats.")]);

    let i = prepared.schedule.get(0).unwrap();
    assert_eq!(i.visemes, vec![VisemeCode::A, VisemeCode::I]);
    assert_eq!(i.durations, vec![120, 120]);

    let cats = prepared.schedule.get(18).unwrap();
    assert_eq!(cats.visemes, vec![VisemeCode::R, VisemeCode::A, VisemeCode::Th, VisemeCode::S]);
    assert_eq!(cats.durations, vec![33, 133, 22, 143]);
}

#[test]
fn ambiguous_entries_use_the_first_pronunciation() {
    let dict = fixture();
    let record = ScheduleBuilder::new(&dict, ScheduleOptions::default()).word_record("Hello,", false);
    assert_eq!(codes(&record.phonemes), vec!["HH", "AH", "L", "OW1"]);
    assert_eq!(
        record.visemes,
        vec![VisemeCode::R, VisemeCode::A, VisemeCode::L, VisemeCode::O, VisemeCode::U]
    );
}

#[test]
fn spanish_dictionary_words() {
    let dict = fixture();
    let options = ScheduleOptions { language: Language::Es, ..Default::default() };
    let builder = ScheduleBuilder::new(&dict, options);

    assert_eq!(codes(&builder.resolve_phonemes("perro")), vec!["P", "E1", "RR", "O"]);
    assert_eq!(codes(&builder.resolve_phonemes("pero")), vec!["P", "E1", "R", "O"]);
    let tengo = builder.word_record("tengo", true);
    assert_eq!(tengo.visemes.len(), tengo.durations.len());
    assert_eq!(tengo.visemes[0], VisemeCode::Th);
}

#[test]
fn schedules_are_reproducible() {
    let dict = Arc::new(fixture());
    for strategy in [DurationStrategyKind::Contextual, DurationStrategyKind::Averaged] {
        let options = ScheduleOptions { duration_strategy: strategy, ..Default::default() };
        let session = SpeechSession::new(dict.clone(), options);
        let text = "Hello, my 3 cats say zxqv and read now!";
        assert_eq!(session.prepare(text).unwrap(), session.prepare(text).unwrap());
    }
}

#[test]
fn unknown_word_never_fails() {
    let session = SpeechSession::new(Arc::new(fixture()), ScheduleOptions::default());
    let prepared = session.prepare("zxqv").unwrap();
    let record = prepared.schedule.get(0).unwrap();
    assert_eq!(record.word, "zxqv");
    assert_eq!(record.visemes.len(), record.durations.len());
}

#[test]
fn missing_dictionary_falls_back_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    let session = SpeechSession::with_dictionary_file(dir.path().join("nope.dict"), ScheduleOptions::default());
    assert!(session.lookup().lookup("hello").is_missing());

    let prepared = session.prepare("hello cat").unwrap();
    assert_eq!(prepared.schedule.len(), 2);
}

#[test]
fn schedule_serializes_by_offset() {
    let session = SpeechSession::new(Arc::new(fixture()), ScheduleOptions::default());
    let prepared = session.prepare("my cat").unwrap();
    let json = serde_json::to_value(&prepared.schedule).unwrap();

    assert_eq!(json["0"]["word"], "my");
    assert_eq!(json["0"]["visemes"], serde_json::json!(["M", "A", "I"]));
    assert_eq!(json["0"]["phonemes"], serde_json::json!(["M", "AY1"]));
    assert_eq!(json["3"]["visemes"], serde_json::json!(["R", "A", "TH"]));
}

#[tokio::test]
async fn background_dictionary_load() {
    let pending = dictionary::load_in_background(FIXTURE);
    let session = SpeechSession::from_pending(pending, ScheduleOptions::default()).await;
    assert!(!session.lookup().lookup("choice").is_missing());
}
