//! Single-line prompt for filter text, notes, new entries and confirmations.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::collection::EntryId;

/// Batch edit waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Remove(Vec<EntryId>),
    Hide(Vec<EntryId>),
}

impl BatchAction {
    pub fn question(&self) -> String {
        match self {
            Self::Remove(ids) => format!("Remove {} entries? (y/n)", ids.len()),
            Self::Hide(ids) => format!("Hide {} entries? (y/n)", ids.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Filter,
    Notes(EntryId),
    AddRequest,
    Replace(EntryId),
    OpenCollection,
    Confirm(BatchAction),
}

impl PromptKind {
    fn label(&self) -> String {
        match self {
            Self::Filter => String::from("Filter: "),
            Self::Notes(_) => String::from("Notes: "),
            Self::AddRequest => String::from("Add (Artist - Title): "),
            Self::Replace(_) => String::from("Replace with (Artist - Title): "),
            Self::OpenCollection => String::from("Open playlist id: "),
            Self::Confirm(batch) => format!("{} ", batch.question()),
        }
    }

    pub fn takes_text(&self) -> bool {
        !matches!(self, Self::Confirm(_))
    }
}

/// Prompt state.
#[derive(Debug, Default)]
pub struct PromptState {
    /// Open prompt, if any
    pub kind: Option<PromptKind>,

    /// Text typed so far
    pub input: String,
}

impl PromptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, kind: PromptKind, initial: impl Into<String>) {
        self.kind = Some(kind);
        self.input = initial.into();
    }

    /// Close the prompt, returning what it was for and the typed text.
    pub fn close(&mut self) -> Option<(PromptKind, String)> {
        let kind = self.kind.take()?;
        Some((kind, std::mem::take(&mut self.input)))
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    pub fn is_confirm(&self) -> bool {
        matches!(self.kind, Some(PromptKind::Confirm(_)))
    }

    pub fn push(&mut self, c: char) {
        if self.kind.as_ref().is_some_and(PromptKind::takes_text) {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }
}

/// Split "Artist - Title" input. Without a separator the whole text is the title.
pub fn parse_request(input: &str) -> Option<(Option<String>, String)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match input.split_once(" - ") {
        Some((artist, title)) if !title.trim().is_empty() => {
            let artist = artist.trim();
            Some((
                (!artist.is_empty()).then(|| artist.to_string()),
                title.trim().to_string(),
            ))
        }
        _ => Some((None, input.to_string())),
    }
}

/// Render the prompt line.
pub fn render_prompt(frame: &mut Frame, area: Rect, state: &PromptState) {
    let Some(kind) = &state.kind else {
        return;
    };
    let label = kind.label();

    let line = Line::from(vec![
        Span::styled(
            label.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(state.input.clone()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if kind.takes_text() {
        let x = area.x + (label.width() + state.input.width()) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
}
