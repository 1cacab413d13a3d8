//! The summary report written as a Word document.

use anyhow::{Context, Result};
use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, Start, Style, StyleType,
};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::analysis::KeywordReport;

const BULLETS: usize = 1;

const PAGES_LABEL: &str = "Total Pages in Source: ";
const WORDS_LABEL: &str = "Total Words in Source: ";

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    /// Bullet point with a bold lead-in
    Bullet { lead: String, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    /// 1 for numbered sections, 2 for their sub-sections
    pub level: usize,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub title: String,
    pub subtitle: String,
    /// Bold label followed by its value, one per line of the cover block
    pub metadata: Vec<(String, String)>,
    pub sections: Vec<Section>,
}

fn text(s: &str) -> Block {
    Block::Text(s.to_string())
}

fn bullet(lead: &str, s: &str) -> Block {
    Block::Bullet {
        lead: lead.to_string(),
        text: s.to_string(),
    }
}

fn section(heading: &str, level: usize, blocks: Vec<Block>) -> Section {
    Section {
        heading: heading.to_string(),
        level,
        blocks,
    }
}

impl Default for ReportContent {
    fn default() -> Self {
        let metadata = [
            ("Source Document: ", "Combined_Assignment_Document.pdf"),
            (PAGES_LABEL, "1,093"),
            (WORDS_LABEL, "803,502"),
            (
                "Meaningful Content Analyzed: ",
                "~760,000 words (Excluding citations & stopwords)",
            ),
            ("Generated: ", "November 25, 2025"),
            (
                "Method: ",
                "Mixed-Methods Analysis (Python Frequency Auditing + LLM Thematic Review)",
            ),
        ]
        .into_iter()
        .map(|(label, value)| (label.to_string(), value.to_string()))
        .collect();

        let sections = vec![
            section(
                "1. Executive Summary",
                1,
                vec![text(
                    "This report presents an automated analysis of a corpus comprising 67 documents (1,093 pages) \
                     focused on the intersection of Generative AI (ChatGPT) and Marketing Strategy.\n\n\
                     The analysis reveals a watershed moment in the industry. The consensus across the text is that \
                     Generative AI is not merely a tool for efficiency but a transformational agent. The literature, \
                     heavily anchored in 2023–2024 research, suggests that while AI democratizes content creation, \
                     it simultaneously elevates the value of human ethical oversight, strategic curation, and empathy.",
                )],
            ),
            section(
                "2. Quantitative Evidence (The \"Why\" Behind the Findings)",
                1,
                vec![
                    text("A frequency analysis of the 800,000+ word dataset reveals the specific focus of the literature:"),
                    bullet(
                        "Immediacy: ",
                        "The most frequent year in the text is '2023' (4,418 occurrences), indicating that the dataset \
                         represents cutting-edge, post-disruption research rather than historical theory.",
                    ),
                    bullet(
                        "Topic Dominance: ",
                        "The specific term 'ChatGPT' (4,056 occurrences) appears nearly twice as often as the general term \
                         'Marketing,' proving the industry's specific fixation on Large Language Models (LLMs).",
                    ),
                    bullet(
                        "The Human Factor: ",
                        "Despite being a technical corpus, the word 'Human' is a top-10 keyword (1,813 occurrences), \
                         statistically validating the conclusion that the 'Human-in-the-Loop' is a central concern.",
                    ),
                ],
            ),
            section("3. Thematic Findings", 1, Vec::new()),
            section(
                "A. The Transformation of Content (The \"Co-Pilot\" Model)",
                2,
                vec![text(
                    "The text identifies a shift in the marketer’s role from 'creator' to 'editor'. \
                     The barrier to entry for content production (emails, blogs, code) has dropped to near zero. \
                     The text warns of 'content commoditization,' where brand voices become indistinguishable. \
                     The competitive advantage shifts to those who can prompt and curate AI output effectively.",
                )],
            ),
            section(
                "B. Impact on Academic & Market Research",
                2,
                vec![text(
                    "The corpus includes significant excerpts from the Journal of Services Marketing (Vol 38, 2024) and Nature (2022). \
                     A significant portion of the text discusses the 'Industrialization of Science' and the 'Reviewer 2 Crisis'—\
                     an active debate regarding the integrity of peer review when both authors and reviewers use AI tools.",
                )],
            ),
            section(
                "C. Ethics, Bias, and Trust",
                2,
                vec![text(
                    "The text frequently discusses the 'Uncanny Valley'—the erosion of trust when consumers realize they \
                     are interacting with a machine masquerading as a human. 'Hallucinations' (confident falsehoods) pose \
                     a legal risk, making transparency—disclosing when AI is used—a mandatory ethical standard.",
                )],
            ),
            section(
                "4. Conclusion",
                1,
                vec![text(
                    "The data indicates that the marketing industry has moved beyond the 'hype cycle' into a phase of \
                     practical integration. The central thesis of the combined documents is that AI is a capability multiplier, \
                     not a human replacement. The future of marketing belongs to the 'hybrid professional' who can navigate \
                     the technical utility of AI while maintaining the ethical and emotional standards that machines cannot replicate.",
                )],
            ),
        ];

        ReportContent {
            title: "COMPREHENSIVE DOCUMENT ANALYSIS".to_string(),
            subtitle: "AI-Generated Fact-Based Summary".to_string(),
            metadata,
            sections,
        }
    }
}

impl ReportContent {
    /// Replace the page and word counts of the cover block with measured ones.
    pub fn with_statistics(mut self, stats: &KeywordReport) -> Self {
        for (label, value) in &mut self.metadata {
            if label == PAGES_LABEL {
                *value = group_thousands(stats.pages_scanned as usize);
            } else if label == WORDS_LABEL {
                *value = group_thousands(stats.total_words);
            }
        }
        self
    }

    pub fn to_docx(&self) -> Docx {
        let mut docx = Docx::new()
            .add_style(
                Style::new("Title", StyleType::Paragraph)
                    .name("Title")
                    .size(52)
                    .bold(),
            )
            .add_style(
                Style::new("Heading1", StyleType::Paragraph)
                    .name("Heading 1")
                    .size(32)
                    .bold(),
            )
            .add_style(
                Style::new("Heading2", StyleType::Paragraph)
                    .name("Heading 2")
                    .size(26)
                    .bold(),
            )
            .add_abstract_numbering(AbstractNumbering::new(BULLETS).add_level(Level::new(
                0,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            )))
            .add_numbering(Numbering::new(BULLETS, BULLETS));

        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&self.title))
                    .style("Title")
                    .align(AlignmentType::Center),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&self.subtitle).italic())
                    .align(AlignmentType::Center),
            )
            .add_paragraph(Paragraph::new());

        let mut cover = Paragraph::new();
        for (i, (label, value)) in self.metadata.iter().enumerate() {
            if i > 0 {
                cover = cover.add_run(Run::new().add_break(BreakType::TextWrapping));
            }
            cover = cover
                .add_run(Run::new().add_text(label).bold())
                .add_run(Run::new().add_text(value));
        }
        docx = docx
            .add_paragraph(cover)
            .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));

        for section in &self.sections {
            let style = if section.level <= 1 { "Heading1" } else { "Heading2" };
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&section.heading))
                    .style(style),
            );
            for block in &section.blocks {
                docx = docx.add_paragraph(block_paragraph(block));
            }
        }

        docx
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.to_docx()
            .build()
            .pack(writer)
            .context("Failed to write Word document")?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        self.write_to(file)
            .with_context(|| format!("Failed to write Word document: {}", path.display()))
    }
}

fn block_paragraph(block: &Block) -> Paragraph {
    match block {
        Block::Text(body) => {
            // Blank lines in the body become line breaks inside one paragraph
            let mut paragraph = Paragraph::new();
            for (i, line) in body.split('\n').enumerate() {
                if i > 0 {
                    paragraph = paragraph.add_run(Run::new().add_break(BreakType::TextWrapping));
                }
                if !line.is_empty() {
                    paragraph = paragraph.add_run(Run::new().add_text(line));
                }
            }
            paragraph
        }
        Block::Bullet { lead, text } => Paragraph::new()
            .numbering(NumberingId::new(BULLETS), IndentLevel::new(0))
            .add_run(Run::new().add_text(lead).bold())
            .add_run(Run::new().add_text(text)),
    }
}

/// `1093` becomes `"1,093"`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
