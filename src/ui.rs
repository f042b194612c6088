use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::{
    app::{App, Mark},
    report::DetailedReport,
    score::ScoreState,
    session::SessionStatus,
    splitter::Passage,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const NEWLINE_GLYPH: char = '↵';

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (passage, status, score) = {
            let session = self.session.lock();
            (session.passage().clone(), session.status(), session.snapshot())
        };

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let input_height = if self.config.show_input { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),               // passage
                Constraint::Length(input_height), // input
                Constraint::Length(1),            // status
                Constraint::Length(1),            // padding
                Constraint::Length(1),            // legend
            ])
            .split(area);

        let cursor = if status == SessionStatus::Completed {
            None
        } else {
            Some(self.input.chars().count())
        };

        Paragraph::new(passage_lines(&passage, &self.marks, cursor))
            .wrap(Wrap { trim: false })
            .render(chunks[0], buf);

        if status == SessionStatus::Completed {
            Paragraph::new(Span::styled(
                DetailedReport(&score).to_string(),
                bold_style.fg(Color::Cyan),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1].union(chunks[2]), buf);
        } else {
            if self.config.show_input {
                let width = chunks[1].width.saturating_sub(2) as usize;
                Paragraph::new(visible_tail(&self.input, width))
                    .block(Block::default().borders(Borders::ALL))
                    .render(chunks[1], buf);
            }

            status_line(status, &score, self.awaiting_resume()).render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(
            "(esc)ape / (ctrl-r) restart / (ctrl-n) new passage",
            italic_style,
        ))
        .render(chunks[4], buf);
    }
}

fn mark_style(mark: Mark, is_cursor: bool) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let style = match mark {
        Mark::Pending => bold_style.add_modifier(Modifier::DIM),
        Mark::Correct => bold_style.fg(Color::Green),
        Mark::Incorrect => bold_style.fg(Color::Red),
    };
    if is_cursor {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

/// Passage text split into lines, with runs of equally marked units sharing a span
fn passage_lines(passage: &Passage, marks: &[Mark], cursor: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = Vec::new();

    let runs = passage.units().iter().chunk_by(|unit| {
        let mark = marks.get(unit.index).copied().unwrap_or(Mark::Pending);
        (mark, cursor == Some(unit.index))
    });

    for ((mark, is_cursor), run) in &runs {
        let style = mark_style(mark, is_cursor);
        let mut text = String::new();
        for unit in run {
            if unit.codepoint == '\n' {
                text.push(NEWLINE_GLYPH);
                spans.push(Span::styled(std::mem::take(&mut text), style));
                lines.push(Line::from(std::mem::take(&mut spans)));
            } else {
                text.push(unit.codepoint);
            }
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, style));
        }
    }

    if !spans.is_empty() || lines.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

/// The end of `input` that fits in `width` terminal columns
fn visible_tail(input: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = input.len();
    for (idx, ch) in input.char_indices().rev() {
        let w = if ch == '\n' { 1 } else { ch.width().unwrap_or(0) };
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    input[start..].replace('\n', &NEWLINE_GLYPH.to_string())
}

fn status_line(
    status: SessionStatus,
    score: &ScoreState,
    awaiting_resume: bool,
) -> Paragraph<'static> {
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let label = match status {
        SessionStatus::Idle => Span::styled("READY - start typing", dim_style),
        SessionStatus::Active => Span::styled(
            "TYPING",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        SessionStatus::Suspended if !awaiting_resume => {
            Span::styled("PAUSED - focus lost", dim_style)
        }
        SessionStatus::Suspended => Span::styled(
            "PAUSED - type to resume",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
        SessionStatus::Completed => Span::raw("DONE"),
    };

    Paragraph::new(Line::from(vec![
        label,
        Span::styled(
            format!(
                "   {:.1}s   {} keys   {} chars   {} bksp   {} enter",
                score.elapsed.as_secs_f64(),
                score.keystrokes,
                score.characters_typed,
                score.backspace_count,
                score.enter_count
            ),
            dim_style,
        ),
    ]))
    .alignment(Alignment::Center)
}
