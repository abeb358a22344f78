use anyhow::{Context, Result};
use docx_rs::{Docx, LineSpacing, PageMargin, Paragraph, Run, RunFonts};
use std::io::Cursor;
use std::path::Path;

use super::scene::Scene;
use crate::file_utils::FileManager;

// @module: Linear screenplay rendering of a scene list (text, JSON, DOCX)

// @const: Screenplay typeface
const DOCX_FONT: &str = "Courier New";

// @const: Empty paragraphs between two scenes
const DOCX_SCENE_GAP: usize = 2;

/// Export format, picked from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain text screenplay (any unrecognized extension)
    Text,
    /// Scene list in the persistence JSON shape (`.json`)
    Json,
    /// Formatted Word document (`.docx`)
    Docx,
}

impl ExportFormat {
    /// Format for `path`, case-insensitive on the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("json") => ExportFormat::Json,
            Some("docx") => ExportFormat::Docx,
            _ => ExportFormat::Text,
        }
    }
}

/// One paragraph of the DOCX screenplay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxParagraph {
    pub text: String,
    pub bold: bool,
}

impl DocxParagraph {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }
}

/// Render scenes as a screenplay: uppercased header, blank line, content.
/// Scenes are separated by a blank line.
pub fn render_screenplay(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|scene| {
            let header = scene.header.to_uppercase();
            if scene.content.is_empty() {
                header
            } else {
                format!("{}\n\n{}", header, scene.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write the rendered screenplay to `path`
pub fn export_screenplay<P: AsRef<Path>>(scenes: &[Scene], path: P) -> Result<()> {
    let mut text = render_screenplay(scenes);
    text.push('\n');
    FileManager::write_to_file(&path, &text)
        .with_context(|| format!("Failed to export screenplay to {:?}", path.as_ref()))
}

/// Write the scene list as a JSON array of plain scene objects
pub fn export_scenes_json<P: AsRef<Path>>(scenes: &[Scene], path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(scenes)
        .context("Failed to serialize scenes to JSON")?;
    FileManager::write_to_file(&path, &json)
}

/// Paragraph layout of the DOCX screenplay: bold uppercased header, one
/// paragraph per content line, two empty paragraphs before every scene but the first
pub fn docx_paragraphs(scenes: &[Scene]) -> Vec<DocxParagraph> {
    let mut paragraphs = Vec::new();

    for (position, scene) in scenes.iter().enumerate() {
        if position > 0 {
            paragraphs.extend((0..DOCX_SCENE_GAP).map(|_| DocxParagraph::plain("")));
        }

        paragraphs.push(DocxParagraph {
            text: scene.header.to_uppercase(),
            bold: true,
        });
        paragraphs.extend(scene.content.split('\n').map(DocxParagraph::plain));
    }

    paragraphs
}

/// Build the DOCX screenplay in memory
pub fn render_docx(scenes: &[Scene]) -> Result<Vec<u8>> {
    // Twips, 1440 per inch: 1" all round, 1.5" left for binding
    let margins = PageMargin::new().top(1440).bottom(1440).left(2160).right(1440);
    let fonts = RunFonts::new()
        .ascii(DOCX_FONT)
        .hi_ansi(DOCX_FONT)
        .east_asia(DOCX_FONT)
        .cs(DOCX_FONT);

    let docx = docx_paragraphs(scenes).into_iter().fold(
        Docx::new()
            .page_margin(margins)
            .default_fonts(fonts)
            .default_size(24), // 12pt in half-points
        |docx, paragraph| {
            let mut run = Run::new().add_text(paragraph.text);
            if paragraph.bold {
                run = run.bold();
            }
            // Single spacing, nothing after
            docx.add_paragraph(
                Paragraph::new()
                    .add_run(run)
                    .line_spacing(LineSpacing::new().line(240).after(0)),
            )
        },
    );

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .context("Failed to build DOCX document")?;
    Ok(buffer.into_inner())
}

/// Write the DOCX screenplay to `path`
pub fn export_docx<P: AsRef<Path>>(scenes: &[Scene], path: P) -> Result<()> {
    let bytes = render_docx(scenes)?;
    FileManager::write_to_file(&path, bytes)
        .with_context(|| format!("Failed to export DOCX to {:?}", path.as_ref()))
}

/// Write `scenes` to `path` in the format its extension names
pub fn export_scenes<P: AsRef<Path>>(scenes: &[Scene], path: P) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(&path);
    match format {
        ExportFormat::Text => export_screenplay(scenes, &path)?,
        ExportFormat::Json => export_scenes_json(scenes, &path)?,
        ExportFormat::Docx => export_docx(scenes, &path)?,
    }
    Ok(format)
}

/// Read a scene list previously written by [`export_scenes_json`]
pub fn load_scenes_json<P: AsRef<Path>>(path: P) -> Result<Vec<Scene>> {
    let json = FileManager::read_to_string(&path)?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse scene list: {:?}", path.as_ref()))
}
