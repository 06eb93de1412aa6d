//! PowerPoint tools: slide count and per-slide text

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::ToolError;
use crate::tools::filesystem::resolve_existing;
use crate::tools::{require_str, BoxFuture, Tool, ToolOutput};

use super::{expect_format, DocumentFormat};

type Archive = zip::ZipArchive<BufReader<File>>;

fn open(workspace: &Path, params: &Value) -> Result<Archive, ToolError> {
    let path = resolve_existing(workspace, require_str(params, "file_path")?)?;
    expect_format(&path, DocumentFormat::PowerPoint)?;

    let file = File::open(&path)?;
    zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| ToolError::failed("Failed to open PPTX archive", e))
}

/// N of a `ppt/slides/slideN.xml` part name
pub(crate) fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse::<u32>()
        .ok()
}

/// Slide part names in presentation order (`ppt/slides/slideN.xml`, sorted by N)
pub(crate) fn slide_parts<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut numbered: Vec<(u32, String)> = names
        .filter_map(|name| Some((slide_number(name)?, name.to_string())))
        .collect();
    numbered.sort();
    numbered.into_iter().map(|(_, name)| name).collect()
}

/// Tool for counting the slides of a presentation
pub struct SlideCount {
    workspace: PathBuf,
}

impl SlideCount {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for SlideCount {
    fn name(&self) -> &str {
        "get_slide_count"
    }

    fn description(&self) -> &str {
        "Get the number of slides in a PowerPoint presentation"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the PowerPoint file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let archive = open(&self.workspace, &params)?;
            let count = slide_parts(archive.file_names()).len();
            Ok(ToolOutput::success(format!("Presentation has {} slides", count))
                .with_metadata("slides", count))
        })
    }
}

/// Tool for reading the text of one slide
pub struct ReadSlideText {
    workspace: PathBuf,
}

impl ReadSlideText {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ReadSlideText {
    fn name(&self) -> &str {
        "read_slide_text"
    }

    fn description(&self) -> &str {
        "Read all text from a specific slide (0-based index)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the PowerPoint file"
                },
                "slide_index": {
                    "type": "integer",
                    "description": "Index of the slide (0-based)"
                }
            },
            "required": ["file_path", "slide_index"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let index = params["slide_index"]
                .as_i64()
                .ok_or_else(|| ToolError::InvalidParams("slide_index is required".into()))?;
            let mut archive = open(&self.workspace, &params)?;
            let parts = slide_parts(archive.file_names());

            let part = usize::try_from(index)
                .ok()
                .and_then(|i| parts.get(i))
                .ok_or_else(|| {
                    ToolError::InvalidParams(format!(
                        "Slide index {} out of range (presentation has {} slides)",
                        index,
                        parts.len()
                    ))
                })?;

            let mut xml = String::new();
            archive
                .by_name(part)
                .map_err(|e| ToolError::failed("Failed to read slide", e))?
                .read_to_string(&mut xml)?;

            let paragraphs = slide_paragraphs(&xml)?;
            if paragraphs.is_empty() {
                return Ok(ToolOutput::success("No text found on slide"));
            }
            Ok(ToolOutput::success(paragraphs.join("\n")))
        })
    }
}

/// Non-empty `<a:p>` paragraphs of a slide, runs concatenated
pub(crate) fn slide_paragraphs(xml: &str) -> Result<Vec<String>, ToolError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"a:t" => in_text_element = true,
            Ok(Event::Text(e)) if in_text_element => {
                current.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if in_text_element => {
                let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                if let Some(resolved) = resolve_entity(&name) {
                    current.push_str(&resolved);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"a:t" => in_text_element = false,
                b"a:p" => {
                    let text = current.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ToolError::ExecutionFailed(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Predefined XML entities and numeric character references
fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(resolved.to_string())
}
