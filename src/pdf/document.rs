use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

use crate::toc::metrics::win_ansi_code;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Make an encrypted document usable if it opens with the empty user
    /// password.
    ///
    /// Loading already decrypts such files and only leaves `/Encrypt` in
    /// the trailer, which is dropped here. Calling `decrypt` again would
    /// run the cipher over plaintext.
    pub fn unlock(&mut self) -> Result<()> {
        if !self.doc.is_encrypted() {
            return Ok(());
        }
        if self.doc.encryption_state.is_none() {
            anyhow::bail!("{} requires a password", self.path);
        }

        if let Some(encrypt_id) = self
            .doc
            .trailer
            .remove(b"Encrypt")
            .and_then(|o| o.as_reference().ok())
        {
            self.doc.objects.remove(&encrypt_id);
        }
        self.doc.encryption_state = None;
        debug!(path = %self.path, "opened with empty password");
        Ok(())
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise PDFDocEncoding).
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16_lossy(&u16_chars)
    } else {
        // Latin-1 approximation of PDFDocEncoding
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Encode text as a PDF text string: plain bytes when every character is
/// Latin-1, UTF-16BE with a BOM otherwise.
pub fn encode_pdf_string(text: &str) -> Vec<u8> {
    if text.chars().all(|c| (c as u32) < 0x100) {
        return text.chars().map(|c| c as u8).collect();
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// Encode text for a simple font with `/WinAnsiEncoding`.
///
/// Characters without a WinAnsi code are replaced by `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_code(c).unwrap_or(b'?'))
        .collect()
}
