//! Show command - print the chunk tree of a RIFF file

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use nether_riff::{ParsedChunk, ParsedFile, parse_riff};
use serde::Serialize;

/// Arguments for the show command
#[derive(Args)]
pub struct ShowArgs {
    /// RIFF file to display
    #[arg(long)]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Indented tree, one chunk per line
    Text,
    /// Nested JSON objects
    Json,
}

#[derive(Debug, Serialize)]
struct FileNode {
    byte_order: String,
    chunks: Vec<ChunkNode>,
}

#[derive(Debug, Serialize)]
struct ChunkNode {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<String>,
    offset: u64,
    size: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ChunkNode>,
}

impl ChunkNode {
    fn from_chunk(chunk: ParsedChunk<'_>) -> Self {
        Self {
            id: chunk.name().to_string(),
            form: chunk.form_type().map(|f| f.to_string()),
            offset: chunk.offset(),
            size: chunk.data_size_including_form().unpadded(),
            children: chunk.sub_chunks().map(ChunkNode::from_chunk).collect(),
        }
    }
}

/// Execute the show command
pub fn execute(args: ShowArgs) -> Result<()> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file = parse_riff(args.file.display().to_string(), &data)?;

    let mut stdout = io::stdout().lock();
    match args.format {
        Format::Text => render_text(&file, &mut stdout)?,
        Format::Json => render_json(&file, &mut stdout)?,
    }
    Ok(())
}

/// Print each chunk as `ID(FORM) (size N)` or `ID (size N)`, indented two
/// spaces per nesting level
///
/// `N` is the unpadded data size without the form type.
pub fn render_text(file: &ParsedFile, out: &mut impl Write) -> io::Result<()> {
    for chunk in file.linearized_chunks() {
        let indent = "  ".repeat(chunk.depth());
        let size = chunk.data_size_excluding_form().unpadded();
        match chunk.form_type() {
            Some(form) => writeln!(out, "{}{}({}) (size {})", indent, chunk.name(), form, size)?,
            None => writeln!(out, "{}{} (size {})", indent, chunk.name(), size)?,
        }
    }
    Ok(())
}

pub fn render_json(file: &ParsedFile, out: &mut impl Write) -> Result<()> {
    let tree = FileNode {
        byte_order: file.byte_order().to_string(),
        chunks: file
            .linearized_chunks()
            .filter(|c| c.parent().is_none())
            .map(ChunkNode::from_chunk)
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &tree).context("Failed to serialize chunk tree")?;
    writeln!(out)?;
    Ok(())
}
