pub(crate) mod mouth_output;


use viseme_sync::{
    dictionary,
    numbers,
    DurationStrategyKind,
    FallbackMode,
    Language,
    MouthAnimator,
    PhonemeGenerator,
    PlaybackParams,
    RateClass,
    ScheduleOptions,
    SpeechSession,
    TextSplitter,
};

use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

pub(crate) const ABOUT: &str = "Text to timed mouth shapes for speech animation";


#[derive(Debug, Parser)]
#[command(about = ABOUT, long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Debug, Args)]
struct PipelineArgs {
    /// Language tag (en, es, en-US, ...)
    #[arg(long, default_value = "en")]
    language: Language,

    /// Duration strategy
    #[arg(long, value_enum, default_value_t = ScheduleOptions::default().duration_strategy)]
    duration_strategy: DurationStrategyKind,

    /// Speaking rate class used for phoneme durations
    #[arg(long, value_enum, default_value_t = ScheduleOptions::default().rate_class)]
    rate_class: RateClass,

    /// Phoneme generator layer for words missing from the dictionary
    #[arg(long, value_enum, default_value_t = ScheduleOptions::default().fallback)]
    fallback: FallbackMode,

    /// Merge repeated visemes within a word
    #[arg(long)]
    coalesce: bool,

    /// Pronunciation dictionary file
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Input text (read from stdin when omitted)
    #[arg(long)]
    text: Option<String>,
}

impl PipelineArgs {
    fn options(&self) -> ScheduleOptions {
        ScheduleOptions {
            language: self.language,
            duration_strategy: self.duration_strategy,
            rate_class: self.rate_class,
            fallback: self.fallback,
            coalesce_visemes: self.coalesce,
        }
    }

    fn session(&self) -> SpeechSession {
        match &self.dictionary {
            Some(path) => {
                log::debug!("Loading dictionary {}", path.display());
                SpeechSession::from_pending_blocking(dictionary::load_in_background(path), self.options())
            }
            None => {
                log::info!("No dictionary given, using rule-based phonemes only.");
                SpeechSession::without_dictionary(self.options())
            }
        }
    }

    fn input(&self) -> anyhow::Result<String> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => {
                let mut text = String::new();
                let _ = std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the viseme schedule for the input text
    #[command()]
    Schedule {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Spells out the numbers in the input text
    #[command()]
    Expand {
        /// Language tag
        #[arg(long, default_value = "en")]
        language: Language,

        /// Input text (read from stdin when omitted)
        #[arg(long)]
        text: Option<String>,
    },

    /// Prints generated phonemes for each word
    #[command(arg_required_else_help = true)]
    Phonemes {
        /// Phoneme generator layer
        #[arg(long, value_enum, default_value_t = FallbackMode::default())]
        fallback: FallbackMode,

        words: Vec<String>,
    },

    /// Reports how many input words the dictionary knows
    #[command(arg_required_else_help = true)]
    Coverage {
        /// Pronunciation dictionary file
        #[arg(long)]
        dictionary: PathBuf,

        /// Input text (read from stdin when omitted)
        #[arg(long)]
        text: Option<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Animates a terminal mouth through the schedule
    #[command()]
    Animate {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Speaking rate multiplier applied to viseme timing
        #[arg(long, default_value_t = PlaybackParams::default().speaking_rate())]
        speaking_rate: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    match args.subcommand {
        Command::Schedule { pipeline, json } => {
            let session = pipeline.session();
            let prepared = session.prepare(&pipeline.input()?)?;

            if json {
                let mut json = serde_json::to_string_pretty(&prepared)?;
                json.push('\n');
                std::io::stdout().write_all(json.as_bytes())?;
            } else {
                println!("OFFSET\tWORD\tVISEMES\tDURATIONS");
                for (offset, record) in prepared.schedule.iter() {
                    let visemes = record.visemes.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(" ");
                    let durations = record.durations.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ");
                    println!("{}\t{}\t{}\t{}", offset, record.word, visemes, durations);
                }
                log::info!("Total: {}ms", prepared.schedule.total_ms());
            }
        },

        Command::Expand { language, text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut text = String::new();
                    let _ = std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            println!("{}", numbers::expand(&text, language));
        },

        Command::Phonemes { fallback, words } => {
            let generator = PhonemeGenerator::new(fallback);
            for (word, phonemes) in generator.convert_batch(&words) {
                let phonemes = phonemes.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ");
                println!("{}\t{}", word, phonemes);
            }
        },

        Command::Coverage { dictionary, text, json } => {
            let dict = dictionary::load_in_background(&dictionary).try_wait_blocking()?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut text = String::new();
                    let _ = std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let words = TextSplitter::new()
                .split_words(&text)
                .into_iter()
                .map(|span| viseme_sync::generator::normalize_word(span.text))
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>();
            let coverage = dict.coverage(&words);

            if json {
                let mut json = serde_json::to_string_pretty(&coverage)?;
                json.push('\n');
                std::io::stdout().write_all(json.as_bytes())?;
            } else {
                println!("TOTAL\tCOVERED\tUNCOVERED\tPERCENT");
                println!("{}\t{}\t{}\t{:.1}", coverage.total, coverage.covered, coverage.uncovered, coverage.percent);
            }
        },

        Command::Animate { pipeline, speaking_rate } => {
            let params = PlaybackParams::new(speaking_rate)?;
            let session = pipeline.session();
            let prepared = session.prepare(&pipeline.input()?)?;
            log::info!("Animating {} words ({}ms at rate 1.0)", prepared.schedule.len(), prepared.schedule.total_ms());

            let runtime = tokio::runtime::Runtime::new()?;
            let mouth = Arc::new(mouth_output::TerminalMouth::stdout());
            let animator = MouthAnimator::new(mouth.clone(), params, runtime.handle().clone());

            runtime.block_on(async {
                animator.begin(prepared.schedule);
                animator.play_through().await;
            });
            mouth.finish();

            log::info!("Animation finished.");
            log::debug!("Frames drawn: {}", mouth.frames_drawn());
        },
    }

    Ok(())
}
