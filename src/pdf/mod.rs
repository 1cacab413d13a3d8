pub mod document;
pub mod merge;
pub mod outline;
pub mod render;
pub mod sources;
pub mod text;

pub use document::PdfDocument;
