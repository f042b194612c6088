use std::fmt;
use std::io::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::score::ScoreState;

/// How a finished score is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// keystrokes=…, characters=…, backspaces=…, enters=…
    #[default]
    Plain,
    /// plain counters plus time and speed
    Detailed,
    /// one JSON object per line
    Json,
}

/// Counters in `key=value` form
pub struct PlainReport<'a>(pub &'a ScoreState);

impl fmt::Display for PlainReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "keystrokes={}, characters={}, backspaces={}, enters={}",
            s.keystrokes, s.characters_typed, s.backspace_count, s.enter_count
        )
    }
}

/// Counters plus active time, speed and keystrokes per character
pub struct DetailedReport<'a>(pub &'a ScoreState);

impl fmt::Display for DetailedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "{}, elapsed={:.2}s, speed={:.1} cpm, keys/char={:.2}",
            PlainReport(s),
            s.elapsed.as_secs_f64(),
            s.chars_per_minute(),
            s.keystrokes_per_char()
        )
    }
}

#[derive(Debug, Serialize)]
struct JsonReport {
    finished_at: DateTime<Local>,
    keystrokes: u64,
    characters: u64,
    backspaces: u64,
    enters: u64,
    errors: u64,
    elapsed_secs: f64,
    chars_per_minute: f64,
    keystrokes_per_char: f64,
}

impl JsonReport {
    fn new(score: &ScoreState) -> Self {
        Self {
            finished_at: Local::now(),
            keystrokes: score.keystrokes,
            characters: score.characters_typed,
            backspaces: score.backspace_count,
            enters: score.enter_count,
            errors: score.error_count,
            elapsed_secs: score.elapsed.as_secs_f64(),
            chars_per_minute: score.chars_per_minute(),
            keystrokes_per_char: score.keystrokes_per_char(),
        }
    }
}

/// Render `score` in the requested format, without a trailing newline
pub fn render(score: &ScoreState, format: ReportFormat) -> String {
    match format {
        ReportFormat::Plain => PlainReport(score).to_string(),
        ReportFormat::Detailed => DetailedReport(score).to_string(),
        ReportFormat::Json => serde_json::to_string(&JsonReport::new(score))
            .unwrap_or_else(|_| PlainReport(score).to_string()),
    }
}

/// Receiver of final scores (terminal, file, clipboard-like collaborators)
pub trait ScoreSink {
    fn deliver(&mut self, score: &ScoreState) -> crate::error::Result<()>;
}

/// Writes one report line per delivered score
pub struct WriterSink<W: Write> {
    writer: W,
    format: ReportFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ScoreSink for WriterSink<W> {
    fn deliver(&mut self, score: &ScoreState) -> crate::error::Result<()> {
        let line = match self.format {
            ReportFormat::Json => serde_json::to_string(&JsonReport::new(score))?,
            format => render(score, format),
        };
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps delivered scores in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub scores: Vec<ScoreState>,
}

impl ScoreSink for MemorySink {
    fn deliver(&mut self, score: &ScoreState) -> crate::error::Result<()> {
        self.scores.push(*score);
        Ok(())
    }
}
