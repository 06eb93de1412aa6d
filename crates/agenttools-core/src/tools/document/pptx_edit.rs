//! PowerPoint authoring tools
//!
//! New presentations are written from a minimal package: one blank master,
//! one blank layout and a theme, at 10 x 7.5 inches. Slides are added as
//! text boxes, so every slide round-trips through `read_slide_text`.

use quick_xml::escape::escape;
use regex::Regex;
use serde_json::{json, Value};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::ToolError;
use crate::formatting::split_list;
use crate::tools::filesystem::{
    ensure_parent, path_to_display, resolve_existing, resolve_in_workspace,
};
use crate::tools::{optional_str, require_str, BoxFuture, Tool, ToolOutput};

use super::pptx::{slide_number, slide_parts};
use super::{expect_format, DocumentFormat};

const EMU_PER_INCH: f64 = 914_400.0;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/></Types>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

/// Group shape properties every shape tree starts with
const TREE_ROOT: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

static RELATIONSHIP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Id="rId(\d+)""#).expect("relationship id pattern is valid"));

static SLIDE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p:sldId\b[^>]*\bid="(\d+)""#).expect("slide id pattern is valid")
});

static SHAPE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p:cNvPr\b[^>]*\bid="(\d+)""#).expect("shape id pattern is valid")
});

/// Largest number captured by `pattern` in `xml`
fn max_captured(pattern: &Regex, xml: &str) -> Option<u32> {
    pattern
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .max()
}

fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                id, REL_TYPE, kind, target
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">{}</Relationships>"#,
        REL_NS, body
    )
}

/// Splice `insert` in front of the last occurrence of `closing`
fn insert_before(xml: &str, closing: &str, insert: &str) -> Result<String, ToolError> {
    let at = xml.rfind(closing).ok_or_else(|| {
        ToolError::ExecutionFailed(format!("Malformed presentation part: missing {}", closing))
    })?;
    Ok(format!("{}{}{}", &xml[..at], insert, &xml[at..]))
}

/// Every part of a zip package, in archive order
#[derive(Debug, Default)]
struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// The blank presentation every new file starts from
    fn blank() -> Self {
        let mut package = Self::default();
        package.put("[Content_Types].xml", CONTENT_TYPES);
        package.put(
            "_rels/.rels",
            relationships(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );
        package.put(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst></p:sldIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                NS
            ),
        );
        package.put(
            "ppt/_rels/presentation.xml.rels",
            relationships(&[
                ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
                ("rId2", "theme", "theme/theme1.xml"),
            ]),
        );
        package.put(
            "ppt/slideMasters/slideMaster1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
                NS, TREE_ROOT
            ),
        );
        package.put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        );
        package.put(
            "ppt/slideLayouts/slideLayout1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
                NS, TREE_ROOT
            ),
        );
        package.put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        );
        package.put("ppt/theme/theme1.xml", THEME);
        package
    }

    fn read(path: &Path) -> Result<Self, ToolError> {
        let bytes = std::fs::read(path)?;
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ToolError::failed("Failed to open PPTX archive", e))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ToolError::failed("Failed to read PPTX entry", e))?;
            if entry.is_dir() {
                continue;
            }
            let mut body = Vec::new();
            entry.read_to_end(&mut body)?;
            parts.push((entry.name().to_string(), body));
        }
        Ok(Self { parts })
    }

    fn write(&self, path: &Path) -> Result<(), ToolError> {
        let failed = |e: zip::result::ZipError| ToolError::failed("Failed to write PPTX", e);
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in &self.parts {
            zip.start_file(name.as_str(), options).map_err(failed)?;
            zip.write_all(body)?;
        }
        let bytes = zip.finish().map_err(failed)?.into_inner();
        std::fs::write(path, bytes)?;
        debug!(path = %path_to_display(path), parts = self.parts.len(), "Saved presentation");
        Ok(())
    }

    fn text(&self, name: &str) -> Result<String, ToolError> {
        let (_, body) = self
            .parts
            .iter()
            .find(|(part, _)| part == name)
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Missing package part {}", name)))?;
        String::from_utf8(body.clone())
            .map_err(|e| ToolError::failed(format!("Package part {} is not UTF-8", name), e))
    }

    /// Replace a part, or append it when new
    fn put(&mut self, name: &str, body: impl Into<Vec<u8>>) {
        let body = body.into();
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some((_, existing)) => *existing = body,
            None => self.parts.push((name.to_string(), body)),
        }
    }

    fn slides(&self) -> Vec<String> {
        slide_parts(self.parts.iter().map(|(name, _)| name.as_str()))
    }

    /// Append a slide holding `shapes` and return its 0-based index
    fn append_slide(&mut self, shapes: &str) -> Result<usize, ToolError> {
        let number = self
            .parts
            .iter()
            .filter_map(|(name, _)| slide_number(name))
            .max()
            .unwrap_or(0)
            + 1;
        let part = format!("ppt/slides/slide{}.xml", number);

        self.put(
            &part,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                NS, TREE_ROOT, shapes
            ),
        );
        self.put(
            &format!("ppt/slides/_rels/slide{}.xml.rels", number),
            relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        );

        let types = self.text("[Content_Types].xml")?;
        let types = insert_before(
            &types,
            "</Types>",
            &format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                part, SLIDE_CONTENT_TYPE
            ),
        )?;
        self.put("[Content_Types].xml", types);

        let rels = self.text("ppt/_rels/presentation.xml.rels")?;
        let rel_id = format!("rId{}", max_captured(&RELATIONSHIP_ID, &rels).unwrap_or(0) + 1);
        let rels = insert_before(
            &rels,
            "</Relationships>",
            &format!(
                r#"<Relationship Id="{}" Type="{}/slide" Target="slides/slide{}.xml"/>"#,
                rel_id, REL_TYPE, number
            ),
        )?;
        self.put("ppt/_rels/presentation.xml.rels", rels);

        let presentation = self.text("ppt/presentation.xml")?;
        let slide_id = max_captured(&SLIDE_ID, &presentation).map_or(256, |id| id + 1);
        let entry = format!(r#"<p:sldId id="{}" r:id="{}"/>"#, slide_id, rel_id);
        let presentation = if presentation.contains("</p:sldIdLst>") {
            insert_before(&presentation, "</p:sldIdLst>", &entry)?
        } else if presentation.contains("<p:sldIdLst/>") {
            presentation.replacen("<p:sldIdLst/>", &format!("<p:sldIdLst>{}</p:sldIdLst>", entry), 1)
        } else {
            let list = format!("<p:sldIdLst>{}</p:sldIdLst>", entry);
            let at = presentation
                .find("</p:sldMasterIdLst>")
                .map(|i| i + "</p:sldMasterIdLst>".len())
                .ok_or_else(|| {
                    ToolError::ExecutionFailed("Malformed presentation: no slide master list".into())
                })?;
            format!("{}{}{}", &presentation[..at], list, &presentation[at..])
        };
        self.put("ppt/presentation.xml", presentation);

        let slides = self.slides();
        Ok(slides.iter().position(|s| *s == part).unwrap_or(slides.len() - 1))
    }
}

/// Position and size of a shape, in EMU
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl Frame {
    fn inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        let emu = |inches: f64| (inches * EMU_PER_INCH).round() as i64;
        Self {
            x: emu(left),
            y: emu(top),
            cx: emu(width),
            cy: emu(height),
        }
    }
}

/// One line of text in a text box
struct Line<'a> {
    text: &'a str,
    size: u32,
    bold: bool,
    bullet: bool,
}

impl<'a> Line<'a> {
    fn plain(text: &'a str, size: u32) -> Self {
        Self {
            text,
            size,
            bold: false,
            bullet: false,
        }
    }

    fn heading(text: &'a str, size: u32) -> Self {
        Self {
            bold: true,
            ..Self::plain(text, size)
        }
    }

    fn bullet(text: &'a str, size: u32) -> Self {
        Self {
            bullet: true,
            ..Self::plain(text, size)
        }
    }

    fn to_xml(&self) -> String {
        let properties = if self.bullet {
            r#"<a:pPr marL="342900" indent="-342900"><a:buChar char="&#8226;"/></a:pPr>"#
        } else {
            ""
        };
        format!(
            r#"<a:p>{}<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
            properties,
            self.size * 100,
            u8::from(self.bold),
            escape(self.text)
        )
    }
}

fn text_box(id: u32, frame: Frame, lines: &[Line<'_>]) -> String {
    let paragraphs: String = lines.iter().map(Line::to_xml).collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        frame.x,
        frame.y,
        frame.cx,
        frame.cy,
        paragraphs,
        id = id
    )
}

fn existing_pptx(workspace: &Path, params: &Value) -> Result<PathBuf, ToolError> {
    let path = resolve_existing(workspace, require_str(params, "file_path")?)?;
    expect_format(&path, DocumentFormat::PowerPoint)?;
    Ok(path)
}

/// Append one slide to the presentation at `path`
fn add_slide(path: &Path, shapes: &str) -> Result<usize, ToolError> {
    let mut package = Package::read(path)?;
    let index = package.append_slide(shapes)?;
    package.write(path)?;
    Ok(index)
}

/// Tool for creating an empty presentation
pub struct CreatePresentation {
    workspace: PathBuf,
}

impl CreatePresentation {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for CreatePresentation {
    fn name(&self) -> &str {
        "create_presentation"
    }

    fn description(&self) -> &str {
        "Create a new empty PowerPoint presentation (.pptx), replacing any existing file"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path where the presentation will be saved")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = resolve_in_workspace(&self.workspace, require_str(&params, "file_path")?)?;
            expect_format(&path, DocumentFormat::PowerPoint)?;
            ensure_parent(&path).await?;
            Package::blank().write(&path)?;

            Ok(ToolOutput::success(format!(
                "PowerPoint presentation created successfully at: {}",
                path_to_display(&path)
            )))
        })
    }
}

/// Tool for appending a title slide
pub struct AddTitleSlide {
    workspace: PathBuf,
}

impl AddTitleSlide {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddTitleSlide {
    fn name(&self) -> &str {
        "add_title_slide"
    }

    fn description(&self) -> &str {
        "Add a title slide with an optional subtitle"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the PowerPoint file"
                },
                "title": {
                    "type": "string",
                    "description": "Slide title"
                },
                "subtitle": {
                    "type": "string",
                    "description": "Subtitle shown under the title",
                    "default": ""
                }
            },
            "required": ["file_path", "title"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_pptx(&self.workspace, &params)?;
            let title = require_str(&params, "title")?;

            let mut shapes = text_box(
                2,
                Frame::inches(0.5, 2.0, 9.0, 1.5),
                &[Line::heading(title, 44)],
            );
            if let Some(subtitle) = optional_str(&params, "subtitle") {
                shapes.push_str(&text_box(
                    3,
                    Frame::inches(1.0, 3.8, 8.0, 1.2),
                    &[Line::plain(subtitle, 24)],
                ));
            }
            let index = add_slide(&path, &shapes)?;

            Ok(ToolOutput::success(format!(
                "Title slide added successfully to: {}",
                path_to_display(&path)
            ))
            .with_metadata("slide_index", index))
        })
    }
}

/// Tool for appending a title-and-bullets slide
pub struct AddContentSlide {
    workspace: PathBuf,
}

impl AddContentSlide {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddContentSlide {
    fn name(&self) -> &str {
        "add_content_slide"
    }

    fn description(&self) -> &str {
        "Add a slide with a title and bullet points (comma-separated)"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(
            file_path: "string" => "Path to the PowerPoint file",
            title: "string" => "Slide title",
            content: "string" => "Comma-separated bullet points",
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_pptx(&self.workspace, &params)?;
            let title = require_str(&params, "title")?;
            let bullets = split_list(require_str(&params, "content")?);

            let lines: Vec<Line<'_>> = bullets.iter().map(|b| Line::bullet(b, 20)).collect();
            let mut shapes = text_box(
                2,
                Frame::inches(0.5, 0.3, 9.0, 1.2),
                &[Line::heading(title, 36)],
            );
            if !lines.is_empty() {
                shapes.push_str(&text_box(3, Frame::inches(0.5, 1.6, 9.0, 5.4), &lines));
            }
            let index = add_slide(&path, &shapes)?;

            Ok(ToolOutput::success(format!(
                "Content slide with {} bullets added successfully",
                bullets.len()
            ))
            .with_metadata("slide_index", index))
        })
    }
}

/// Tool for appending an empty slide
pub struct AddBlankSlide {
    workspace: PathBuf,
}

impl AddBlankSlide {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddBlankSlide {
    fn name(&self) -> &str {
        "add_blank_slide"
    }

    fn description(&self) -> &str {
        "Add a blank slide to a presentation"
    }

    fn parameters_schema(&self) -> Value {
        crate::tool_params!(file_path: "string" => "Path to the PowerPoint file")
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_pptx(&self.workspace, &params)?;
            let index = add_slide(&path, "")?;

            Ok(ToolOutput::success(format!(
                "Blank slide added successfully to: {}",
                path_to_display(&path)
            ))
            .with_metadata("slide_index", index))
        })
    }
}

/// Tool for placing a text box on an existing slide
pub struct AddTextBox {
    workspace: PathBuf,
}

impl AddTextBox {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for AddTextBox {
    fn name(&self) -> &str {
        "add_text_box"
    }

    fn description(&self) -> &str {
        "Add a text box to a slide (0-based index). Position and size are in inches."
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
                },
                "text": {
                    "type": "string",
                    "description": "Text content; newlines start new paragraphs"
                },
                "left": { "type": "number", "description": "Left position in inches", "default": 1.0 },
                "top": { "type": "number", "description": "Top position in inches", "default": 1.0 },
                "width": { "type": "number", "description": "Width in inches", "default": 5.0 },
                "height": { "type": "number", "description": "Height in inches", "default": 1.0 }
            },
            "required": ["file_path", "slide_index", "text"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let path = existing_pptx(&self.workspace, &params)?;
            let index = params["slide_index"]
                .as_i64()
                .ok_or_else(|| ToolError::InvalidParams("slide_index is required".into()))?;
            let text = require_str(&params, "text")?;
            let inches = |key: &str, default: f64| params[key].as_f64().unwrap_or(default);
            let frame = Frame::inches(
                inches("left", 1.0),
                inches("top", 1.0),
                inches("width", 5.0),
                inches("height", 1.0),
            );

            let mut package = Package::read(&path)?;
            let slides = package.slides();
            let part = usize::try_from(index)
                .ok()
                .and_then(|i| slides.get(i))
                .ok_or_else(|| {
                    ToolError::InvalidParams(format!(
                        "Slide index {} out of range (presentation has {} slides)",
                        index,
                        slides.len()
                    ))
                })?;

            let xml = package.text(part)?;
            let id = max_captured(&SHAPE_ID, &xml).unwrap_or(1) + 1;
            let mut lines: Vec<Line<'_>> = text.lines().map(|l| Line::plain(l, 18)).collect();
            if lines.is_empty() {
                lines.push(Line::plain("", 18));
            }
            let xml = insert_before(&xml, "</p:spTree>", &text_box(id, frame, &lines))?;
            package.put(part, xml);
            package.write(&path)?;

            Ok(ToolOutput::success(format!(
                "Text box added successfully to slide {}",
                index
            )))
        })
    }
}
