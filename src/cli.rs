use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfbind")]
#[command(about = "Bind a folder of PDFs into one document with a table of contents, then analyze and report on it")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON file with layout, analysis and file name settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge every PDF in a folder into one document with a table of contents
    #[command(alias = "merge")]
    Combine {
        /// Folder containing the PDFs
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Output file (default: Combined_Assignment_Document.pdf inside the folder)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the text of the combined PDF and report keyword frequencies
    Analyze {
        /// PDF to analyze (default: Combined_Assignment_Document.pdf)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to save the extracted text (default: text_for_summary.txt)
        #[arg(short, long)]
        text_output: Option<PathBuf>,

        /// Also save the keyword report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Write the summary report as a Word document
    Report {
        /// Output file (default: Assignment_Summary_Report.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keyword report JSON whose page and word counts go into the cover block
        #[arg(short, long)]
        analysis: Option<PathBuf>,
    },

    /// Print the bookmarks of a PDF
    Toc {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Run as MCP server
    Mcp,
}
