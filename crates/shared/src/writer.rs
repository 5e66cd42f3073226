use anyhow::{Context, Result};
use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, Start, Style, StyleType,
};
use std::fs::File;
use std::path::Path;
use tracing::info;

pub const DEFAULT_REPORT_PATH: &str = "data_report.docx";

const BULLET_NUMBERING_ID: usize = 1;

/// One element of the report markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    Bullet(String),
    Paragraph(String),
}

/// Read the report line by line: `# ` is a title, `### ` a sub-heading,
/// `- ` a bullet, anything else non-blank a paragraph.
pub fn parse_markup(report: &str) -> Vec<Block> {
    report
        .lines()
        .filter_map(|line| {
            if let Some(text) = line.strip_prefix("# ") {
                Some(Block::Title(text.trim().to_string()))
            } else if let Some(text) = line.strip_prefix("### ") {
                Some(Block::Heading(text.trim().to_string()))
            } else if let Some(text) = line.strip_prefix("- ") {
                Some(Block::Bullet(text.trim().to_string()))
            } else if !line.trim().is_empty() {
                Some(Block::Paragraph(line.to_string()))
            } else {
                None
            }
        })
        .collect()
}

fn render(blocks: &[Block]) -> Docx {
    let bullet_level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    );

    let mut docx = Docx::new()
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading3", StyleType::Paragraph)
                .name("Heading 3")
                .size(24)
                .bold(),
        )
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(bullet_level))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for block in blocks {
        let paragraph = match block {
            Block::Title(text) => text_paragraph(text).style("Heading1"),
            Block::Heading(text) => text_paragraph(text).style("Heading3"),
            Block::Bullet(text) => text_paragraph(text)
                .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
            Block::Paragraph(text) => text_paragraph(text),
        };
        docx = docx.add_paragraph(paragraph);
    }

    docx
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// Write the report as a Word document at `path`.
pub fn write_report(report: &str, path: &Path) -> Result<()> {
    let blocks = parse_markup(report);

    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    render(&blocks)
        .build()
        .pack(file)
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;

    info!(path = %path.display(), blocks = blocks.len(), "report written");
    Ok(())
}
