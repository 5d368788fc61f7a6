use std::collections::VecDeque;
use std::io::Write;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;

use viseme_sync::{VisemeCode, VisemeSink};

/// Keeps this many recent shapes for the trailing history line.
const HISTORY_LEN: usize = 12;

pub(crate) fn mouth_art(code: VisemeCode) -> &'static str {
    match code {
        VisemeCode::A => "( \\___/ )",
        VisemeCode::O => "(  (O)  )",
        VisemeCode::E => "(  ===  )",
        VisemeCode::I => "(  -=-  )",
        VisemeCode::U => "(   o   )",
        VisemeCode::M => "(  ___  )",
        VisemeCode::F => "(  vvv  )",
        VisemeCode::Th => "(  =v=  )",
        VisemeCode::L => "(  -^-  )",
        VisemeCode::S => "(  ===  )",
        VisemeCode::Sh => "(  [=]  )",
        VisemeCode::R => "(  -o-  )",
        VisemeCode::W => "(   .   )",
        VisemeCode::Rest => "(  ---  )",
    }
}

/// Draws the current mouth shape on one terminal line.
#[derive(Clone)]
pub(crate) struct TerminalMouth {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    history: Arc<Mutex<VecDeque<VisemeCode>>>,
    frames_drawn: Arc<AtomicUsize>,
}

impl TerminalMouth {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            history: Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_LEN))),
            frames_drawn: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    fn draw(&self, code: VisemeCode) {
        let mut history = self.history.lock();
        if history.len() == HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(code);
        let trail = history.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" ");
        drop(history);

        let mut out = self.out.lock();
        let res = write!(out, "\r\x1b[2K{} {:<4} | {}", mouth_art(code), code.as_str(), trail).and_then(|_| out.flush());
        if let Err(e) = res {
            log::error!("Failed to draw mouth: {}", e);
        }
        self.frames_drawn.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn.load(Ordering::Relaxed)
    }

    /// Ends the animation line.
    pub fn finish(&self) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out).and_then(|_| out.flush()) {
            log::error!("Failed to finish mouth output: {}", e);
        }
    }
}

impl VisemeSink for TerminalMouth {
    fn on_viseme(&self, code: VisemeCode) {
        self.draw(code);
    }

    fn reset(&self) {
        self.draw(VisemeCode::Rest);
    }
}
