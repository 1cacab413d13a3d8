use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::KeywordCount;
use crate::commands::{analyze, combine, report};
use crate::config::PipelineConfig;
use crate::pdf::merge::SourceOutcome;
use crate::pdf::outline::read_outline;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CombineRequest {
    #[schemars(description = "Folder containing the PDFs to combine")]
    pub dir: String,
    #[schemars(description = "Output file path (default: the configured combined file inside the folder)")]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeRequest {
    #[schemars(description = "PDF to analyze (default: the configured combined file)")]
    pub path: Option<String>,
    #[schemars(description = "Where to save the extracted text (default: the configured text file)")]
    pub text_output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReportRequest {
    #[schemars(description = "Output .docx path")]
    pub output: String,
    #[schemars(description = "Keyword report JSON to take page and word counts from")]
    pub analysis: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    config: PipelineConfig,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn combine(&self, req: CombineRequest) -> Result<CombineResult> {
        let dir = PathBuf::from(&req.dir);
        let output = req
            .output
            .map(PathBuf::from)
            .unwrap_or_else(|| dir.join(&self.config.files.combined));
        let report = combine::combine(&dir, &output, &self.config, false)?;

        Ok(CombineResult {
            output_path: report.output.display().to_string(),
            page_count: report.total_pages(),
            toc_pages: report.toc_pages,
            sources: report
                .sources
                .into_iter()
                .map(|s| {
                    let (status, pages, reason) = match s.outcome {
                        SourceOutcome::Merged { pages } => ("merged", Some(pages), None),
                        SourceOutcome::Skipped { reason } => ("skipped", None, Some(reason)),
                        SourceOutcome::Failed { reason } => ("failed", None, Some(reason)),
                    };
                    SourceResult {
                        path: s.path.display().to_string(),
                        title: s.title,
                        status: status.to_string(),
                        pages,
                        reason,
                    }
                })
                .collect(),
            chapters: report
                .entries
                .into_iter()
                .map(|e| ChapterResult {
                    title: e.name,
                    start_page: e.start_page,
                })
                .collect(),
        })
    }

    fn analyze(&self, req: AnalyzeRequest) -> Result<AnalyzeResult> {
        let input = req
            .path
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.files.combined.clone().into());
        let text_output = req
            .text_output
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.files.text.clone().into());
        let report = analyze::analyze(&input, &text_output, &self.config.analysis)?;

        Ok(AnalyzeResult {
            text_path: text_output.display().to_string(),
            pages_scanned: report.pages_scanned,
            total_words: report.total_words,
            top_keywords: report.top_keywords,
        })
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Combine every PDF in a folder into one document, ordered by the number in each file name, with a generated table of contents and one bookmark per file")]
    fn pdf_combine(&self, Parameters(req): Parameters<CombineRequest>) -> String {
        match self.combine(req) {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Extract the text of a PDF, save it to a text file, and report page count, word count and the most frequent keywords")]
    fn pdf_analyze(&self, Parameters(req): Parameters<AnalyzeRequest>) -> String {
        match self.analyze(req) {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Write the summary report as a Word document, optionally with page and word counts from a keyword report JSON")]
    fn report_generate(&self, Parameters(req): Parameters<ReportRequest>) -> String {
        let analysis = req.analysis.as_deref().map(Path::new);
        match report::generate(Path::new(&req.output), analysis) {
            Ok(content) => {
                let result = ReportResult {
                    output_path: req.output,
                    sections: content.sections.len(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Get the bookmarks (outline) of a PDF as structured data")]
    fn pdf_toc(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match read_outline(&path) {
            Ok(bookmarks) => {
                let result: Vec<TocEntryResult> = bookmarks
                    .into_iter()
                    .map(|b| TocEntryResult {
                        title: b.title,
                        page: b.page,
                        level: b.level,
                    })
                    .collect();
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SourceResult {
    pub path: String,
    pub title: String,
    pub status: String,
    pub pages: Option<u32>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ChapterResult {
    pub title: String,
    pub start_page: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CombineResult {
    pub output_path: String,
    pub page_count: u32,
    pub toc_pages: u32,
    pub sources: Vec<SourceResult>,
    pub chapters: Vec<ChapterResult>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResult {
    pub text_path: String,
    pub pages_scanned: u32,
    pub total_words: usize,
    pub top_keywords: Vec<KeywordCount>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ReportResult {
    pub output_path: String,
    pub sections: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TocEntryResult {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF binding tools. Use pdf_combine to merge a folder of PDFs with a table of \
                 contents, pdf_analyze for keyword statistics, report_generate to write the Word \
                 summary, and pdf_toc to inspect bookmarks."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: PipelineConfig) -> Result<()> {
    let server = PdfServer::new(config);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
