//! Settings for the pipeline, loadable from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::AnalysisConfig;
use crate::toc::TocStyle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Table-of-contents geometry and fonts.
    pub toc: TocStyle,

    /// Keyword analysis settings.
    pub analysis: AnalysisConfig,

    /// Default file names used by each step.
    pub files: FileNames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    /// Merged PDF written by `combine` and read by `analyze`.
    pub combined: String,

    /// Raw text written by `analyze`.
    pub text: String,

    /// Word report written by `report`.
    pub report: String,
}

impl Default for FileNames {
    fn default() -> Self {
        FileNames {
            combined: "Combined_Assignment_Document.pdf".to_string(),
            text: "text_for_summary.txt".to_string(),
            report: "Assignment_Summary_Report.docx".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.toc.validate()?;
        Ok(config)
    }

    /// The file at `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::Font;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdfbind.json");
        std::fs::write(
            &path,
            r#"{
                "toc": { "line_height": 18, "entry_font": { "font": "Helvetica-Bold", "size": 11 } },
                "analysis": { "top_keywords": 25 },
                "files": { "combined": "book.pdf" }
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.toc.line_height, 18.0);
        assert_eq!(config.toc.entry_font.font, Font::HelveticaBold);
        assert_eq!(config.toc.right_margin, 540.0);
        assert_eq!(config.analysis.top_keywords, 25);
        assert_eq!(config.analysis.min_word_chars, 3);
        assert_eq!(config.files.combined, "book.pdf");
        assert_eq!(config.files.text, "text_for_summary.txt");
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "toc": { "bottom_y": 800 } }"#).unwrap();
        assert!(PipelineConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_defaults_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
