/// What the next key press is interpreted as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys edit the document.
    #[default]
    Editing,
    /// A one-line prompt is collecting input.
    Prompt(PromptKind),
    /// Last step of replace: one occurrence or all of them.
    ReplaceScope { query: String, replacement: String },
    /// Waiting for y/n before discarding unsaved changes.
    ConfirmQuit,
    /// Waiting for y/n to save before another file is opened.
    ConfirmSave,
}

/// The question a text prompt is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Find,
    ReplaceQuery,
    /// Second step of replace; carries the query typed in the first.
    ReplaceWith { query: String },
    GotoLine,
    SaveAs,
    Open,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Editing => "EDIT",
            Mode::Prompt(PromptKind::Find) => "FIND",
            Mode::Prompt(PromptKind::ReplaceQuery | PromptKind::ReplaceWith { .. })
            | Mode::ReplaceScope { .. } => "REPLACE",
            Mode::Prompt(PromptKind::GotoLine) => "GOTO",
            Mode::Prompt(PromptKind::SaveAs) => "SAVE AS",
            Mode::Prompt(PromptKind::Open) | Mode::ConfirmSave => "OPEN",
            Mode::ConfirmQuit => "QUIT?",
        }
    }
}

impl PromptKind {
    /// Text shown before the input field.
    pub fn prompt(&self, case_sensitive: bool) -> String {
        match self {
            PromptKind::Find => {
                let case = if case_sensitive { "Aa" } else { "aa" };
                format!("Find [{case}, Alt+C]: ")
            }
            PromptKind::ReplaceQuery => "Replace: ".to_string(),
            PromptKind::ReplaceWith { query } => format!("Replace \"{query}\" with: "),
            PromptKind::GotoLine => "Go to line: ".to_string(),
            PromptKind::SaveAs => "Save as: ".to_string(),
            PromptKind::Open => "Open file: ".to_string(),
        }
    }
}
