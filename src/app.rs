//! Terminal adapter: key events in, editor commands out, ratatui drawing.

use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::editor::{Editor, Notice, Status};
use crate::model::clipboard::Clipboard;
use crate::model::config::AppConfig;
use crate::model::cursor::Position;
use crate::model::document::Document;
use crate::model::mode::{Mode, PromptKind};
use crate::msg::{Command, Msg};

/// Rows below the text area: status bar and message/prompt line.
const CHROME_ROWS: u16 = 2;

pub struct App {
    pub mode: Mode,
    editor: Editor,
    clipboard: Clipboard,
    config: AppConfig,
    /// Text typed into the active prompt.
    input: String,
    find_case_sensitive: bool,
    /// Set while a Save As runs on the way to opening another file.
    pending_open: bool,
    status: Status,
    /// Terminal size as (width, height).
    size: (u16, u16),
}

impl App {
    pub fn new(config: AppConfig, document: Document) -> Self {
        let editor = Editor::new(document).with_config(&config);
        let status = Status {
            summary: editor.summary(),
            notice: None,
        };
        let mut app = Self {
            mode: Mode::Editing,
            editor,
            clipboard: Clipboard::new(),
            find_case_sensitive: config.search.case_sensitive,
            config,
            input: String::new(),
            pending_open: false,
            status,
            size: (80, 24),
        };
        app.sync_viewport();
        app
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn should_quit(&self) -> bool {
        self.editor.should_quit()
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(width, height) => {
                self.size = (width, height);
                self.sync_viewport();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode.clone() {
            Mode::Editing => self.handle_key_editing(key),
            Mode::Prompt(kind) => self.handle_key_prompt(key, kind),
            Mode::ReplaceScope { query, replacement } => {
                self.handle_key_replace_scope(key, query, replacement)
            }
            Mode::ConfirmQuit => self.handle_key_confirm_quit(key),
            Mode::ConfirmSave => self.handle_key_confirm_save(key),
        }
    }

    fn handle_key_editing(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('f') => {
                    // Reopening find keeps the case mode of the running search.
                    self.find_case_sensitive = self
                        .editor
                        .search()
                        .map_or(self.config.search.case_sensitive, |s| s.case_sensitive());
                    return self.open_prompt(PromptKind::Find, String::new());
                }
                KeyCode::Char('r') => {
                    return self.open_prompt(PromptKind::ReplaceQuery, String::new());
                }
                KeyCode::Char('g') => {
                    return self.open_prompt(PromptKind::GotoLine, String::new());
                }
                KeyCode::Char('w') => {
                    let current = self
                        .editor
                        .document()
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    return self.open_prompt(PromptKind::SaveAs, current);
                }
                KeyCode::Char('s') if self.editor.document().path().is_none() => {
                    return self.open_prompt(PromptKind::SaveAs, String::new());
                }
                KeyCode::Char('o') => {
                    if self.editor.document().is_modified() {
                        self.mode = Mode::ConfirmSave;
                    } else {
                        self.open_prompt(PromptKind::Open, String::new());
                    }
                    return;
                }
                _ => {}
            }
        }

        let Some(command) = editing_command(key) else {
            return;
        };
        let quitting = command == Command::Quit;
        self.dispatch(command);
        if quitting && self.editor.quit_pending() {
            self.mode = Mode::ConfirmQuit;
        }
    }

    fn handle_key_prompt(&mut self, key: KeyEvent, kind: PromptKind) {
        match key.code {
            KeyCode::Esc => self.close_prompt(),
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.input);
                self.submit_prompt(kind, input);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('c')
                if kind == PromptKind::Find && key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.find_case_sensitive = !self.find_case_sensitive;
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.input.push(ch);
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: String) {
        self.mode = Mode::Editing;
        match kind {
            PromptKind::Find => self.dispatch(Command::Find {
                query: input,
                case_sensitive: self.find_case_sensitive,
            }),
            PromptKind::ReplaceQuery => {
                self.open_prompt(PromptKind::ReplaceWith { query: input }, String::new());
            }
            PromptKind::ReplaceWith { query } => {
                self.mode = Mode::ReplaceScope {
                    query,
                    replacement: input,
                };
            }
            PromptKind::GotoLine => self.dispatch(Command::GotoLine(input)),
            PromptKind::SaveAs => {
                let then_open = std::mem::take(&mut self.pending_open);
                if input.trim().is_empty() {
                    self.status.notice = Some(Notice::Info("Save cancelled".to_string()));
                    return;
                }
                self.dispatch(Command::SaveAs(PathBuf::from(input.trim())));
                if then_open && !self.status.is_error() {
                    self.open_prompt(PromptKind::Open, String::new());
                }
            }
            PromptKind::Open => {
                if input.trim().is_empty() {
                    self.status.notice = Some(Notice::Info("Open cancelled".to_string()));
                } else {
                    self.dispatch(Command::Open(PathBuf::from(input.trim())));
                }
            }
        }
    }

    /// `o` replaces the next occurrence and keeps asking; `a` replaces the rest.
    fn handle_key_replace_scope(&mut self, key: KeyEvent, query: String, replacement: String) {
        match key.code {
            KeyCode::Char('o') | KeyCode::Enter => {
                self.dispatch(Command::Replace {
                    query: query.clone(),
                    replacement: replacement.clone(),
                    all: false,
                });
                self.mode = if self.status.is_error() {
                    Mode::Editing
                } else {
                    Mode::ReplaceScope { query, replacement }
                };
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Editing;
                self.dispatch(Command::Replace {
                    query,
                    replacement,
                    all: true,
                });
            }
            KeyCode::Esc | KeyCode::Char('q') => self.close_prompt(),
            _ => {}
        }
    }

    fn handle_key_confirm_quit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.dispatch(Command::ForceQuit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Editing;
                self.status.notice = None;
            }
            _ => {}
        }
    }

    /// `y` saves before asking for the file to open, `n` discards.
    fn handle_key_confirm_save(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.editor.document().path().is_none() {
                    self.pending_open = true;
                    return self.open_prompt(PromptKind::SaveAs, String::new());
                }
                self.mode = Mode::Editing;
                self.dispatch(Command::Save);
                if !self.status.is_error() {
                    self.open_prompt(PromptKind::Open, String::new());
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.open_prompt(PromptKind::Open, String::new());
            }
            KeyCode::Esc => self.close_prompt(),
            _ => {}
        }
    }

    fn open_prompt(&mut self, kind: PromptKind, initial: String) {
        self.input = initial;
        self.mode = Mode::Prompt(kind);
    }

    fn close_prompt(&mut self) {
        self.input.clear();
        self.pending_open = false;
        self.mode = Mode::Editing;
        self.status.notice = None;
    }

    fn dispatch(&mut self, command: Command) {
        self.status = self.editor.execute(command, &mut self.clipboard);
        self.sync_viewport();
    }

    /// Keep the editor's viewport the size of the text area.
    fn sync_viewport(&mut self) {
        let (width, height) = self.size;
        let rows = usize::from(height.saturating_sub(CHROME_ROWS)).max(1);
        let cols = usize::from(width.saturating_sub(self.gutter_width())).max(1);
        let viewport = self.editor.viewport();
        if (viewport.rows, viewport.cols) != (rows, cols) {
            let status = self
                .editor
                .execute(Command::Resize { rows, cols }, &mut self.clipboard);
            self.status.summary = status.summary;
        }
    }

    /// Width of the line-number column including its trailing space.
    fn gutter_width(&self) -> u16 {
        if !self.config.editor.line_numbers {
            return 0;
        }
        let digits = self.editor.document().line_count().to_string().len().max(3);
        digits as u16 + 1
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if (area.width, area.height) != self.size {
            self.size = (area.width, area.height);
            self.sync_viewport();
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // text
                Constraint::Length(1), // status bar
                Constraint::Length(1), // message / prompt
            ])
            .split(area);

        self.render_text(frame, chunks[0]);
        self.render_status_bar(frame, chunks[1]);
        self.render_message_line(frame, chunks[2]);
    }

    fn render_text(&self, frame: &mut Frame, area: Rect) {
        let gutter = self.gutter_width();
        let viewport = *self.editor.viewport();
        let doc = self.editor.document();
        let selection = self.editor.selection();
        let selected_style = Style::default().add_modifier(Modifier::REVERSED);

        let lines: Vec<Line> = viewport
            .visible_rows(doc.line_count())
            .map(|row| {
                let mut spans = Vec::new();
                if gutter > 0 {
                    spans.push(Span::styled(
                        format!("{:>width$} ", row + 1, width = usize::from(gutter) - 1),
                        Style::default().fg(Color::DarkGray),
                    ));
                }

                let text = doc.line(row).unwrap_or_default();
                let mut run = String::new();
                let mut run_selected = false;
                let visible = text
                    .chars()
                    .enumerate()
                    .skip(viewport.left_col)
                    .take(viewport.cols);
                for (col, ch) in visible {
                    let selected = selection.is_some_and(|s| s.contains(Position::new(row, col)));
                    if selected != run_selected && !run.is_empty() {
                        spans.push(styled_run(std::mem::take(&mut run), run_selected, selected_style));
                    }
                    run_selected = selected;
                    run.push(if ch.is_control() { ' ' } else { ch });
                }
                if !run.is_empty() {
                    spans.push(styled_run(run, run_selected, selected_style));
                }

                // A selection that continues onto the next line covers the line break.
                let eol = Position::new(row, doc.line_len(row));
                if selection.is_some_and(|s| s.contains(eol)) && viewport.contains(eol) {
                    spans.push(Span::styled(" ", selected_style));
                }

                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);

        if self.mode == Mode::Editing
            && let Some((row, col)) = viewport.to_screen(self.editor.cursor())
        {
            frame.set_cursor_position((
                area.x + gutter + col as u16,
                area.y + row as u16,
            ));
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Editing => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Mode::Prompt(_) | Mode::ReplaceScope { .. } => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::ConfirmQuit | Mode::ConfirmSave => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let bar = Line::from(vec![
            Span::styled(format!(" {} ", self.mode.label()), mode_style),
            Span::styled(
                format!(" {} ", self.status.summary),
                Style::default().fg(Color::Gray).bg(Color::DarkGray),
            ),
        ]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_message_line(&self, frame: &mut Frame, area: Rect) {
        match &self.mode {
            Mode::Prompt(kind) => {
                let prompt = kind.prompt(self.find_case_sensitive);
                let line = Line::from(vec![
                    Span::styled(prompt.clone(), Style::default().fg(Color::Cyan)),
                    Span::raw(self.input.clone()),
                ]);
                frame.render_widget(Paragraph::new(line), area);

                let typed = prompt.chars().count() + self.input.chars().count();
                let x = area.x + (typed as u16).min(area.width.saturating_sub(1));
                frame.set_cursor_position((x, area.y));
            }
            Mode::ReplaceScope { .. } => {
                let mut spans = vec![Span::styled(
                    "Replace (o)ne or (a)ll? ",
                    Style::default().fg(Color::Cyan),
                )];
                if let Some(message) = self.status.message() {
                    spans.push(Span::raw(message.to_string()));
                }
                frame.render_widget(Paragraph::new(Line::from(spans)), area);
            }
            Mode::ConfirmQuit => {
                let line = Span::styled(
                    "Unsaved changes. Quit without saving? (y/n)",
                    Style::default().fg(Color::Yellow),
                );
                frame.render_widget(Paragraph::new(Line::from(line)), area);
            }
            Mode::ConfirmSave => {
                let line = Span::styled(
                    "File modified. Save first? (y/n)",
                    Style::default().fg(Color::Yellow),
                );
                frame.render_widget(Paragraph::new(Line::from(line)), area);
            }
            Mode::Editing => {
                let Some(message) = self.status.message() else {
                    return;
                };
                let style = if self.status.is_error() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                frame.render_widget(Paragraph::new(Span::styled(message.to_string(), style)), area);
            }
        }
    }
}

fn styled_run(text: String, selected: bool, selected_style: Style) -> Span<'static> {
    if selected {
        Span::styled(text, selected_style)
    } else {
        Span::raw(text)
    }
}

/// Map a key pressed while editing to the command it runs.
///
/// Keys that open a prompt are handled by the app before this is consulted.
pub fn editing_command(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let command = match key.code {
        KeyCode::Left if ctrl => Command::MoveWordLeft,
        KeyCode::Right if ctrl => Command::MoveWordRight,
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Right => Command::MoveRight,
        KeyCode::Up => Command::MoveUp,
        KeyCode::Down => Command::MoveDown,
        KeyCode::Home => Command::MoveHome,
        KeyCode::End => Command::MoveEnd,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::PageDown => Command::PageDown,
        KeyCode::Enter => Command::Newline,
        KeyCode::Backspace => Command::Backspace,
        KeyCode::Delete => Command::DeleteForward,
        KeyCode::Tab => Command::Tab,
        KeyCode::F(3) if shift => Command::FindPrevious,
        KeyCode::F(3) => Command::FindNext,
        KeyCode::Char(' ') if ctrl => Command::ToggleSelection,
        KeyCode::Char('a') if alt => Command::ToggleSelection,
        KeyCode::Char('w') if alt => Command::CopyWord,
        KeyCode::Char(ch) if ctrl => match ch.to_ascii_lowercase() {
            'a' => Command::SelectAll,
            'c' => Command::Copy,
            'd' => Command::SelectWord,
            'l' => Command::SelectLine,
            'x' => Command::Cut,
            'v' => Command::Paste,
            'n' => Command::FindNext,
            'p' => Command::FindPrevious,
            's' => Command::Save,
            'q' => Command::Quit,
            _ => return None,
        },
        KeyCode::Char(ch) if !alt => Command::InsertChar(ch),
        _ => return None,
    };
    Some(command)
}
