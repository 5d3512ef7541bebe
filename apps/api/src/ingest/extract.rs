//! Per-format text extraction.
//!
//! DOCX and PPTX are ZIP archives of XML parts; both are read with `zip` and
//! walked with `quick-xml`, collecting the text runs of each paragraph.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::IngestError;

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

pub fn pdf_text(bytes: &[u8]) -> Result<String, IngestError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| IngestError::Extraction(format!("PDF: {e}")))?;
    Ok(text.trim().to_string())
}

/// Non-empty paragraphs, separated by blank lines.
pub fn docx_text(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, DOCX_BODY)?;
    let paragraphs = collect_paragraphs(&xml, b"w:t", b"w:p")?;
    Ok(paragraphs.join("\n\n").trim().to_string())
}

/// One block per slide in slide order, each headed `--- Slide N ---`.
pub fn pptx_text(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut blocks = Vec::with_capacity(slides.len());
    for (idx, (_, part)) in slides.iter().enumerate() {
        let xml = read_part(&mut archive, part)?;
        let mut block = vec![format!("--- Slide {} ---", idx + 1)];
        block.extend(collect_paragraphs(&xml, b"a:t", b"a:p")?);
        blocks.push(block.join("\n"));
    }

    Ok(blocks.join("\n\n").trim().to_string())
}

/// UTF-8, falling back to Latin-1 (every byte is a code point).
pub fn plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim().to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| b as char)
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(PPTX_SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, IngestError> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| IngestError::Extraction(format!("cannot find {name}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Concatenates the text runs (`text_tag`) of every paragraph (`para_tag`)
/// and returns the non-blank paragraphs in document order.
fn collect_paragraphs(
    xml: &str,
    text_tag: &[u8],
    para_tag: &[u8],
) -> Result<Vec<String>, IngestError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                if name.as_ref() == text_tag {
                    in_text = true;
                } else if name.as_ref() == para_tag {
                    current.clear();
                }
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == text_tag {
                    in_text = false;
                } else if name.as_ref() == para_tag {
                    let para = current.trim();
                    if !para.is_empty() {
                        paragraphs.push(para.to_string());
                    }
                    current.clear();
                }
            }
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
