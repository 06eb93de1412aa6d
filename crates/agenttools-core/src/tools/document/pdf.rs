//! PDF tools: text extraction, info, page-level rewrites, merging and
//! plain-text authoring

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::formatting::split_list;
use crate::tools::filesystem::{
    ensure_parent, path_to_display, resolve_existing, resolve_in_workspace,
};
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{expect_format, DocumentFormat};

fn open_pdf(workspace: &Path, params: &Value) -> Result<PathBuf, ToolError> {
    let path = resolve_existing(workspace, require_str(params, "file_path")?)?;
    expect_format(&path, DocumentFormat::Pdf)?;
    Ok(path)
}

fn load(path: &Path) -> Result<Document, ToolError> {
    Document::load(path).map_err(|e| {
        ToolError::failed(format!("Failed to read PDF {}", path_to_display(path)), e)
    })
}

fn save(doc: &mut Document, path: &Path) -> Result<(), ToolError> {
    doc.save(path).map_err(|e| {
        ToolError::failed(format!("Failed to write PDF {}", path_to_display(path)), e)
    })?;
    Ok(())
}

/// Copy of `doc` keeping only the given 1-based page
fn single_page(doc: &Document, page: u32) -> Document {
    let mut copy = doc.clone();
    let others: Vec<u32> = doc.get_pages().keys().copied().filter(|&n| n != page).collect();
    copy.delete_pages(&others);
    copy.prune_objects();
    copy
}

/// Tool for extracting all text from a PDF
pub struct ExtractPdfText {
    workspace: PathBuf,
}

impl ExtractPdfText {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ExtractPdfText {
    fn name(&self) -> &str {
        "extract_pdf_text"
    }

    fn description(&self) -> &str {
        "Extract all text from a PDF file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the PDF file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = open_pdf(&self.workspace, &params)?;

            match pdf_extract::extract_text(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(ToolOutput::success(text.trim().to_string()));
                }
                Ok(_) => debug!("pdf-extract returned no text, falling back to lopdf"),
                Err(e) => warn!("pdf-extract failed: {e}, falling back to lopdf"),
            }

            let doc = load(&path)?;
            let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
            let text = doc.extract_text(&pages).map_err(|e| {
                ToolError::failed("Failed to extract PDF text", e)
            })?;
            Ok(ToolOutput::success(text.trim().to_string()))
        })
    }
}

/// Tool for reporting page count and document metadata
pub struct PdfInfo {
    workspace: PathBuf,
}

impl PdfInfo {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for PdfInfo {
    fn name(&self) -> &str {
        "get_pdf_info"
    }

    fn description(&self) -> &str {
        "Get information about a PDF file (page count, metadata)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the PDF file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = open_pdf(&self.workspace, &params)?;
            let doc = load(&path)?;
            let page_count = doc.get_pages().len();

            let mut lines = vec![format!("Number of pages: {}", page_count)];
            let metadata = info_entries(&doc);
            if !metadata.is_empty() {
                lines.push("\nMetadata:".to_string());
                for (key, value) in &metadata {
                    lines.push(format!("  /{}: {}", key, value));
                }
            }

            Ok(ToolOutput::success(lines.join("\n")).with_metadata("pages", page_count))
        })
    }
}

/// Entries of the trailer's Info dictionary, rendered as text
fn info_entries(doc: &Document) -> Vec<(String, String)> {
    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    let Some(info) = info else {
        return Vec::new();
    };

    info.iter()
        .map(|(key, value)| (String::from_utf8_lossy(key).into_owned(), object_text(value)))
        .collect()
}

fn object_text(object: &Object) -> String {
    match object {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}

/// Text strings are UTF-16BE with a BOM or a single-byte encoding
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Tool for writing a single page to a new PDF
pub struct ExtractPdfPage {
    workspace: PathBuf,
}

impl ExtractPdfPage {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ExtractPdfPage {
    fn name(&self) -> &str {
        "extract_pdf_page"
    }

    fn description(&self) -> &str {
        "Extract a specific page from a PDF into a new file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the PDF file",
            page_number: "integer" => "Page number to extract (1-based)",
            output_path: "string" => "Path where the extracted page will be saved",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = open_pdf(&self.workspace, &params)?;
            let page_number = params["page_number"]
                .as_i64()
                .ok_or_else(|| ToolError::InvalidParams("page_number is required".into()))?;
            let output = resolve_in_workspace(&self.workspace, require_str(&params, "output_path")?)?;

            let doc = load(&path)?;
            let total = doc.get_pages().len();
            if page_number < 1 || page_number as usize > total {
                return Err(ToolError::InvalidParams(format!(
                    "Page number {} out of range (1-{})",
                    page_number, total
                )));
            }

            let mut page = single_page(&doc, page_number as u32);
            ensure_parent(&output).await?;
            save(&mut page, &output)?;

            Ok(ToolOutput::success(format!(
                "Page {} extracted successfully to: {}",
                page_number,
                path_to_display(&output)
            )))
        })
    }
}

/// Tool for splitting a PDF into one file per page
pub struct SplitPdf {
    workspace: PathBuf,
}

impl SplitPdf {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for SplitPdf {
    fn name(&self) -> &str {
        "split_pdf"
    }

    fn description(&self) -> &str {
        "Split a PDF into individual pages (page_1.pdf, page_2.pdf, ...)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the PDF file to split",
            output_dir: "string" => "Directory where individual pages will be saved",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = open_pdf(&self.workspace, &params)?;
            let output_dir = resolve_in_workspace(&self.workspace, require_str(&params, "output_dir")?)?;

            let doc = load(&path)?;
            let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
            tokio::fs::create_dir_all(&output_dir).await?;

            for &number in &pages {
                let mut page = single_page(&doc, number);
                save(&mut page, &output_dir.join(format!("page_{}.pdf", number)))?;
            }
            debug!(pages = pages.len(), dir = %path_to_display(&output_dir), "Split PDF");

            Ok(ToolOutput::success(format!(
                "Successfully split PDF into {} pages in: {}",
                pages.len(),
                path_to_display(&output_dir)
            ))
            .with_metadata("pages", json!(pages)))
        })
    }
}

/// Tool for rotating every page of a PDF
pub struct RotatePdf {
    workspace: PathBuf,
}

impl RotatePdf {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for RotatePdf {
    fn name(&self) -> &str {
        "rotate_pdf_pages"
    }

    fn description(&self) -> &str {
        "Rotate all pages in a PDF by a multiple of 90 degrees"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the PDF file",
            degrees: "integer" => "Degrees to rotate clockwise (90, 180, 270)",
            output_path: "string" => "Path where the rotated PDF will be saved",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = open_pdf(&self.workspace, &params)?;
            let degrees = params["degrees"]
                .as_i64()
                .ok_or_else(|| ToolError::InvalidParams("degrees is required".into()))?;
            if degrees % 90 != 0 {
                return Err(ToolError::InvalidParams(
                    "Degrees must be a multiple of 90 (90, 180, 270)".into(),
                ));
            }
            let output = resolve_in_workspace(&self.workspace, require_str(&params, "output_path")?)?;

            let mut doc = load(&path)?;
            rotate_pages(&mut doc, degrees)?;
            ensure_parent(&output).await?;
            save(&mut doc, &output)?;

            Ok(ToolOutput::success(format!(
                "PDF rotated {} degrees and saved to: {}",
                degrees,
                path_to_display(&output)
            )))
        })
    }
}

/// Add `degrees` to each page's /Rotate entry
pub(crate) fn rotate_pages(doc: &mut Document, degrees: i64) -> Result<(), ToolError> {
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    for id in page_ids {
        let page = doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| ToolError::failed("Malformed page object", e))?;
        let current = page
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        page.set("Rotate", Object::Integer((current + degrees).rem_euclid(360)));
    }
    Ok(())
}

/// Tool for concatenating several PDFs into one
pub struct MergePdfs {
    workspace: PathBuf,
}

impl MergePdfs {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for MergePdfs {
    fn name(&self) -> &str {
        "merge_pdfs"
    }

    fn description(&self) -> &str {
        "Merge multiple PDF files into one, in the order given"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            output_path: "string" => "Path where the merged PDF will be saved",
            input_paths: "string" => "Comma-separated list of PDF files to merge",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let output = resolve_in_workspace(&self.workspace, require_str(&params, "output_path")?)?;
            expect_format(&output, DocumentFormat::Pdf)?;
            let inputs = split_list(require_str(&params, "input_paths")?);
            if inputs.is_empty() {
                return Err(ToolError::InvalidParams(
                    "input_paths must name at least one PDF".into(),
                ));
            }

            let mut sources = Vec::with_capacity(inputs.len());
            for input in &inputs {
                let path = resolve_existing(&self.workspace, input)?;
                expect_format(&path, DocumentFormat::Pdf)?;
                sources.push(load(&path)?);
            }

            let mut merged = merge_documents(sources)?;
            ensure_parent(&output).await?;
            save(&mut merged, &output)?;
            debug!(inputs = inputs.len(), output = %path_to_display(&output), "Merged PDFs");

            Ok(ToolOutput::success(format!(
                "Successfully merged {} PDFs into: {}",
                inputs.len(),
                path_to_display(&output)
            ))
            .with_metadata("pages", merged.get_pages().len()))
        })
    }
}

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITED_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree we follow when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Concatenate the pages of `sources` under a fresh catalog
pub(crate) fn merge_documents(sources: Vec<Document>) -> Result<Document, ToolError> {
    let mut merged = Document::with_version("1.5");
    let mut kids: Vec<ObjectId> = Vec::new();
    let mut next_id = 1;

    for mut doc in sources {
        doc.renumber_objects_with(next_id);
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page in &pages {
            flatten_inherited(&mut doc, page)?;
        }
        next_id = doc.objects.keys().map(|&(id, _)| id + 1).max().unwrap_or(next_id);

        for (id, object) in doc.objects {
            if !matches!(object.type_name(), Ok("Catalog") | Ok("Pages")) {
                merged.objects.insert(id, object);
            }
        }
        kids.extend(pages);
    }

    merged.max_id = next_id.saturating_sub(1);
    let pages_id = merged.new_object_id();
    for &kid in &kids {
        merged
            .get_dictionary_mut(kid)
            .map_err(|e| ToolError::failed("Malformed page object", e))?
            .set("Parent", pages_id);
    }
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids.into_iter().map(Object::from).collect::<Vec<_>>(),
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);
    merged.prune_objects();
    merged.compress();
    Ok(merged)
}

/// Copy inherited attributes onto the page itself so it survives re-parenting
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), ToolError> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| ToolError::failed("Malformed page object", e))?;
    let mut missing: Vec<&[u8]> = INHERITED_ATTRIBUTES
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut found = Vec::new();

    for _ in 0..MAX_TREE_DEPTH {
        let (Some(id), false) = (parent, missing.is_empty()) else {
            break;
        };
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| ToolError::failed("Malformed page object", e))?;
    for (key, value) in found {
        page.set(key, value);
    }
    Ok(())
}

/// US Letter, in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN_LEFT: i64 = 50;
const FIRST_LINE_Y: i64 = 742;
const LAST_LINE_Y: i64 = 50;
const LINE_HEIGHT: i64 = 15;
const FONT_SIZE: i64 = 12;

/// Tool for writing plain text to a new PDF
pub struct CreatePdf {
    workspace: PathBuf,
}

impl CreatePdf {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CreatePdf {
    fn name(&self) -> &str {
        "create_pdf"
    }

    fn description(&self) -> &str {
        "Create a PDF from plain text, one line per text line, paginating as needed"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path where the PDF will be saved",
            text: "string" => "Text content; newlines start new lines",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "file_path")?)?;
            expect_format(&path, DocumentFormat::Pdf)?;
            let text = params["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidParams("text is required".into()))?;

            let mut doc = text_document(text)?;
            ensure_parent(&path).await?;
            save(&mut doc, &path)?;

            Ok(ToolOutput::success(format!(
                "PDF created successfully at: {}",
                path_to_display(&path)
            ))
            .with_metadata("pages", doc.get_pages().len()))
        })
    }
}

/// Lay `text` out in Helvetica, one text line per PDF line
pub(crate) fn text_document(text: &str) -> Result<Document, ToolError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let lines_per_page = ((FIRST_LINE_Y - LAST_LINE_Y) / LINE_HEIGHT + 1) as usize;

    let mut kids: Vec<Object> = Vec::new();
    for chunk in lines.chunks(lines_per_page) {
        let mut operations = Vec::new();
        let mut y = FIRST_LINE_Y;
        for line in chunk {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![MARGIN_LEFT.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(line))]),
                Operation::new("ET", vec![]),
            ]);
            y -= LINE_HEIGHT;
        }
        let content = Content { operations }
            .encode()
            .map_err(|e| ToolError::failed("Failed to encode page content", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

/// Latin-1 bytes for the standard font encoding, `?` for anything wider
fn win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"Plain title"), "Plain title");
        assert_eq!(
            decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]),
            "Hi"
        );
        assert_eq!(decode_pdf_string(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Caf\u{e9}"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("\u{20ac}5"), b"?5".to_vec());
    }

    #[test]
    fn test_text_document_paginates() {
        let text = (1..=60).map(|n| format!("line {}", n)).collect::<Vec<_>>().join("\n");
        let doc = text_document(&text).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(text_document("").unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_merge_keeps_page_order() {
        let first = text_document("a").unwrap();
        let second = text_document(&"b\n".repeat(50)).unwrap();
        let merged = merge_documents(vec![first, second]).unwrap();

        let pages: Vec<ObjectId> = merged.get_pages().into_values().collect();
        assert_eq!(pages.len(), 3);
        for page in pages {
            let dict = merged.get_dictionary(page).unwrap();
            assert!(dict.has(b"MediaBox"));
            assert!(dict.has(b"Resources"));
        }
    }

    #[test]
    fn test_object_text() {
        assert_eq!(object_text(&Object::Integer(3)), "3");
        assert_eq!(object_text(&Object::Name(b"Helvetica".to_vec())), "Helvetica");
        assert_eq!(object_text(&Object::Boolean(true)), "true");
    }
}
