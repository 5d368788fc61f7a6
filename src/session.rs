//! Caller-owned state for turning utterances into schedules.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dictionary::{self, PendingDictionary, PronunciationDictionary, PronunciationLookup};
use crate::error::ScheduleError;
use crate::numbers;
use crate::schedule::{ScheduleBuilder, ScheduleOptions};
use crate::types::Schedule;

/// Text as it will be spoken, and the schedule whose offsets index into it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PreparedUtterance {
    pub text: String,
    pub schedule: Schedule,
}

#[derive(Clone)]
pub struct SpeechSession {
    lookup: Arc<dyn PronunciationLookup>,
    options: ScheduleOptions,
}

impl std::fmt::Debug for SpeechSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSession")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SpeechSession {
    pub fn new(lookup: Arc<dyn PronunciationLookup>, options: ScheduleOptions) -> Self {
        Self { lookup, options }
    }

    /// Session without a dictionary; every word goes through the generator.
    pub fn without_dictionary(options: ScheduleOptions) -> Self {
        Self::new(Arc::new(PronunciationDictionary::empty()), options)
    }

    /// Waits for a background load. Must not be called from async code.
    pub fn from_pending_blocking(pending: PendingDictionary, options: ScheduleOptions) -> Self {
        Self::new(Arc::new(pending.wait_blocking()), options)
    }

    pub async fn from_pending(pending: PendingDictionary, options: ScheduleOptions) -> Self {
        Self::new(Arc::new(pending.wait().await), options)
    }

    /// Loads `path` on a worker thread and blocks until it is done.
    pub fn with_dictionary_file<P: AsRef<Path>>(path: P, options: ScheduleOptions) -> Self {
        Self::from_pending_blocking(dictionary::load_in_background(path), options)
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ScheduleOptions) {
        self.options = options;
    }

    pub fn lookup(&self) -> &dyn PronunciationLookup {
        self.lookup.as_ref()
    }

    pub fn builder(&self) -> ScheduleBuilder<'_> {
        ScheduleBuilder::new(self.lookup.as_ref(), self.options)
    }

    /// Spells out numbers, then builds the schedule over the expanded text.
    pub fn prepare(&self, text: &str) -> Result<PreparedUtterance, ScheduleError> {
        let text = numbers::expand(text, self.options.language);
        let schedule = self.builder().build(&text)?;
        log::debug!("Prepared {} words, {}ms", schedule.len(), schedule.total_ms());
        Ok(PreparedUtterance { text, schedule })
    }
}
