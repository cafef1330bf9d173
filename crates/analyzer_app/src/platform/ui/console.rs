use std::io::{self, Write};

use analyzer_engine::TerminalRenderer;

use super::render::{format_with_commas, ConsoleCommand};
use crate::cli::ReportStyle;

/// Writes frames to the terminal: the report to stdout, everything else to stderr.
pub struct Console {
    style: ReportStyle,
    terminal: TerminalRenderer,
    last_frame: Vec<ConsoleCommand>,
}

impl Console {
    pub fn new(style: ReportStyle) -> Self {
        let terminal = match style {
            ReportStyle::Styled => TerminalRenderer::default(),
            ReportStyle::Unstyled | ReportStyle::Raw => TerminalRenderer::unstyled(),
        };
        Self {
            style,
            terminal,
            last_frame: Vec::new(),
        }
    }

    pub fn apply(&mut self, frame: Vec<ConsoleCommand>) {
        for cmd in frame.iter().filter(|cmd| !self.last_frame.contains(cmd)) {
            self.execute(cmd);
        }
        self.last_frame = frame;
    }

    fn execute(&self, cmd: &ConsoleCommand) {
        match cmd {
            ConsoleCommand::ShowSelection {
                file_name,
                file_size,
            } => {
                let _ = writeln!(
                    io::stderr().lock(),
                    "Resume: {} ({} bytes)",
                    file_name,
                    format_with_commas(*file_size)
                );
            }
            ConsoleCommand::ShowProgress { label } => {
                let _ = writeln!(io::stderr().lock(), "{label}");
            }
            ConsoleCommand::ShowError { message } => {
                let _ = writeln!(io::stderr().lock(), "{message}");
            }
            ConsoleCommand::ShowReport { markdown } => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{}", self.format_report(markdown));
                let _ = out.flush();
            }
        }
    }

    pub fn format_report(&self, markdown: &str) -> String {
        match self.style {
            ReportStyle::Raw => markdown.to_string(),
            ReportStyle::Styled | ReportStyle::Unstyled => self.terminal.render(markdown, None),
        }
    }
}
