//! Markdown report rendering.
//!
//! The report is never validated: whatever `minimad` makes of malformed
//! markdown is what gets shown.

use termimad::minimad::{Composite, CompositeStyle, Compound, Line, Text};
use termimad::MadSkin;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strikeout: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    /// Nesting depth, starting at zero.
    ListItem(u8),
    Quote,
    Code,
    TableRow,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// One block per source line that carries content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    pub blocks: Vec<Block>,
}

impl RichText {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub trait ReportRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> RichText;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> RichText {
        let text = Text::from(markdown);
        let blocks = text.lines.iter().filter_map(block_from_line).collect();
        RichText { blocks }
    }
}

fn block_from_line(line: &Line<'_>) -> Option<Block> {
    match line {
        Line::Normal(composite) => {
            let kind = match composite.style {
                CompositeStyle::Paragraph => BlockKind::Paragraph,
                CompositeStyle::Header(level) => BlockKind::Heading(level),
                CompositeStyle::ListItem(depth) => BlockKind::ListItem(depth),
                CompositeStyle::Quote => BlockKind::Quote,
                CompositeStyle::Code => BlockKind::Code,
            };
            let spans = spans_of(composite);
            // Blank paragraph lines only separate blocks.
            if kind == BlockKind::Paragraph && spans.iter().all(|span| span.text.trim().is_empty())
            {
                return None;
            }
            Some(Block { kind, spans })
        }
        Line::TableRow(row) => {
            let mut spans = Vec::new();
            for (index, cell) in row.cells.iter().enumerate() {
                if index > 0 {
                    spans.push(Span::plain(" | "));
                }
                spans.extend(spans_of(cell));
            }
            Some(Block {
                kind: BlockKind::TableRow,
                spans,
            })
        }
        Line::HorizontalRule => Some(Block {
            kind: BlockKind::Rule,
            spans: Vec::new(),
        }),
        // Table separators and fence markers have no visible content of their own.
        _ => None,
    }
}

fn spans_of(composite: &Composite<'_>) -> Vec<Span> {
    composite.compounds.iter().map(span_of).collect()
}

fn span_of(compound: &Compound<'_>) -> Span {
    Span {
        text: compound.src.to_string(),
        bold: compound.bold,
        italic: compound.italic,
        code: compound.code,
        strikeout: compound.strikeout,
    }
}

/// ANSI-styled rendering for a terminal.
pub struct TerminalRenderer {
    skin: MadSkin,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            skin: MadSkin::default(),
        }
    }
}

impl TerminalRenderer {
    /// Renders without any escape sequences, e.g. when stdout is not a terminal.
    pub fn unstyled() -> Self {
        Self {
            skin: MadSkin::no_style(),
        }
    }

    /// `width` wraps long lines; `None` lets termimad use the terminal width.
    pub fn render(&self, markdown: &str, width: Option<usize>) -> String {
        self.skin.text(markdown, width).to_string()
    }
}
