//! Local export of simplified or translated text. No server round trip.

use std::{
    fmt, fs,
    io::Cursor,
    path::{Path, PathBuf},
    str::FromStr,
};

use docx_rs::{Docx, Paragraph, Run};
use shared::error::ParseValueError;
use tracing::info;

use crate::error::ClientError;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Txt => "text/plain; charset=utf-8",
            Self::Docx => DOCX_MIME,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "docx" | "word" => Ok(Self::Docx),
            _ => Err(ParseValueError::new("export format", value)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Simplified,
    Translated,
}

impl ExportTarget {
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Simplified => "simplified",
            Self::Translated => "translated",
        }
    }
}

impl FromStr for ExportTarget {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simplified" | "simple" => Ok(Self::Simplified),
            "translated" | "translation" => Ok(Self::Translated),
            _ => Err(ParseValueError::new("export target", value)),
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ClientError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(
            path = %path.display(),
            bytes = self.bytes.len(),
            "export written"
        );
        Ok(path)
    }
}

pub fn render(
    target: ExportTarget,
    format: ExportFormat,
    content: &str,
) -> Result<Artifact, ClientError> {
    let bytes = match format {
        ExportFormat::Txt => content.as_bytes().to_vec(),
        ExportFormat::Docx => render_docx(content)?,
    };
    Ok(Artifact {
        file_name: format!("{}.{}", target.file_stem(), format.extension()),
        mime_type: format.mime_type(),
        bytes,
    })
}

fn render_docx(content: &str) -> Result<Vec<u8>, ClientError> {
    let docx = content.lines().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });
    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ClientError::Export(format!("failed to build docx: {e}")))?;
    Ok(buffer.into_inner())
}
