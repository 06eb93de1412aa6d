//! Document processing tools: reading and authoring PDF, Excel, Word and
//! PowerPoint files

mod excel;
mod excel_edit;
mod pdf;
mod pptx;
mod pptx_edit;
mod word;
mod word_edit;

pub use excel::{ListSheets, ReadCell, ReadSheet, SearchValue, WorkbookInfo};
pub use excel_edit::{AddSheet, ClearRange, CreateWorkbook, DeleteSheet, WriteCell, WriteRows};
pub use pdf::{CreatePdf, ExtractPdfPage, ExtractPdfText, MergePdfs, PdfInfo, RotatePdf, SplitPdf};
pub use pptx::{ReadSlideText, SlideCount};
pub use pptx_edit::{
    AddBlankSlide, AddContentSlide, AddTextBox, AddTitleSlide, CreatePresentation,
};
pub use word::ReadWordDocument;
pub use word_edit::{
    AddBulletList, AddHeading, AddPageBreak, AddParagraph, AddTable, CreateWordDocument,
    SetTableCell,
};

use std::path::Path;

use crate::error::ToolError;
use crate::tools::filesystem::extension_of;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Unknown,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Word,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::Excel,
            "pptx" => Self::PowerPoint,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(&extension_of(path))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF (.pdf)",
            Self::Word => "Word (.docx)",
            Self::Excel => "Excel (.xlsx, .xls, .ods)",
            Self::PowerPoint => "PowerPoint (.pptx)",
            Self::Unknown => "unknown",
        }
    }
}

/// Reject a file whose extension does not match the tool's format
pub(crate) fn expect_format(path: &Path, expected: DocumentFormat) -> Result<(), ToolError> {
    if DocumentFormat::from_path(path) == expected {
        return Ok(());
    }
    Err(ToolError::InvalidParams(format!(
        "Expected a {} file, got .{}",
        expected.label(),
        extension_of(path)
    )))
}
