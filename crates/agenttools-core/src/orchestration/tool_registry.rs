//! Tool Registry Factory Module
//!
//! Centralizes tool registration for every host and provides a builder
//! pattern for choosing tool families.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tools::document::{
    AddBlankSlide, AddBulletList, AddContentSlide, AddHeading, AddPageBreak, AddParagraph,
    AddSheet, AddTable, AddTextBox, AddTitleSlide, ClearRange, CreatePdf, CreatePresentation,
    CreateWordDocument, CreateWorkbook, DeleteSheet, ExtractPdfPage, ExtractPdfText, ListSheets,
    MergePdfs, PdfInfo, ReadCell, ReadSheet, ReadSlideText, ReadWordDocument, RotatePdf,
    SearchValue, SetTableCell, SlideCount, SplitPdf, WorkbookInfo, WriteCell, WriteRows,
};
use crate::tools::filesystem::{AppendFile, EnsureDir, ReadFile, WriteFile};
use crate::tools::shell::{CommandGate, RunShell};
use crate::tools::tabular::{
    ColumnStats, CsvInfo, CsvToJson, FilterCsv, MergeCsv, ReadCsv, SelectColumns, SortCsv,
};
use crate::tools::web::{
    DownloadFile, ExtractImages, ExtractLinks, ExtractText, FetchWebpage, FindElementsByTag,
    MakeGetRequest, MakePostRequest, WebClient,
};
use crate::tools::{ToolDefinition, ToolRegistry};

/// Builder for creating a tool registry with customizable options
pub struct ToolRegistryBuilder {
    workspace: PathBuf,
    config: Config,
    include_shell: bool,
    include_files: bool,
    include_tables: bool,
    include_web: bool,
    include_documents: bool,
}

impl ToolRegistryBuilder {
    /// Create a new builder with the given workspace path
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            config: Config::default(),
            include_shell: true,
            include_files: true,
            include_tables: true,
            include_web: true,
            include_documents: true,
        }
    }

    /// Use limits, denylist and client settings from a loaded config
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Enable/disable the guarded shell tool
    pub fn with_shell(mut self, enabled: bool) -> Self {
        self.include_shell = enabled;
        self
    }

    /// Enable/disable file I/O tools
    pub fn with_files(mut self, enabled: bool) -> Self {
        self.include_files = enabled;
        self
    }

    /// Enable/disable CSV tools
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.include_tables = enabled;
        self
    }

    /// Enable/disable web tools
    pub fn with_web(mut self, enabled: bool) -> Self {
        self.include_web = enabled;
        self
    }

    /// Enable/disable PDF and Office tools
    pub fn with_documents(mut self, enabled: bool) -> Self {
        self.include_documents = enabled;
        self
    }

    /// Build the tool registry with the configured options
    pub fn build(self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        let workspace = self.workspace;
        let config = self.config;

        if self.include_shell {
            let gate = CommandGate::from_config(&config.shell);
            tracing::debug!(patterns = gate.denylist().len(), "Registering run_shell");
            registry.register(Arc::new(RunShell::new(workspace.clone()).with_gate(gate)));
        }

        if self.include_files {
            registry.register(Arc::new(EnsureDir::new(workspace.clone())));
            registry.register(Arc::new(WriteFile::new(workspace.clone())));
            registry.register(Arc::new(AppendFile::new(workspace.clone())));
            registry.register(Arc::new(
                ReadFile::new(workspace.clone()).with_max_bytes(config.files.max_read_bytes),
            ));
        }

        if self.include_tables {
            registry.register(Arc::new(
                ReadCsv::new(workspace.clone()).with_max_rows(config.tables.csv_max_rows),
            ));
            registry.register(Arc::new(CsvInfo::new(workspace.clone())));
            registry.register(Arc::new(FilterCsv::new(workspace.clone())));
            registry.register(Arc::new(SortCsv::new(workspace.clone())));
            registry.register(Arc::new(ColumnStats::new(workspace.clone())));
            registry.register(Arc::new(MergeCsv::new(workspace.clone())));
            registry.register(Arc::new(SelectColumns::new(workspace.clone())));
            registry.register(Arc::new(CsvToJson::new(workspace.clone())));
        }

        if self.include_web {
            let client = WebClient::new(&config.web)
                .map_err(|e| Error::Config(format!("Web client unavailable: {}", e)))?;
            registry.register(Arc::new(FetchWebpage::new(client.clone())));
            registry.register(Arc::new(ExtractText::new(client.clone())));
            registry.register(Arc::new(ExtractLinks::new(client.clone())));
            registry.register(Arc::new(ExtractImages::new(client.clone())));
            registry.register(Arc::new(FindElementsByTag::new(client.clone())));
            registry.register(Arc::new(DownloadFile::new(client.clone(), workspace.clone())));
            registry.register(Arc::new(MakeGetRequest::new(client.clone())));
            registry.register(Arc::new(MakePostRequest::new(client)));
        }

        if self.include_documents {
            registry.register(Arc::new(ExtractPdfText::new(workspace.clone())));
            registry.register(Arc::new(PdfInfo::new(workspace.clone())));
            registry.register(Arc::new(ExtractPdfPage::new(workspace.clone())));
            registry.register(Arc::new(SplitPdf::new(workspace.clone())));
            registry.register(Arc::new(RotatePdf::new(workspace.clone())));
            registry.register(Arc::new(MergePdfs::new(workspace.clone())));
            registry.register(Arc::new(CreatePdf::new(workspace.clone())));

            registry.register(Arc::new(ListSheets::new(workspace.clone())));
            registry.register(Arc::new(
                ReadSheet::new(workspace.clone()).with_max_rows(config.tables.sheet_max_rows),
            ));
            registry.register(Arc::new(ReadCell::new(workspace.clone())));
            registry.register(Arc::new(WorkbookInfo::new(workspace.clone())));
            registry.register(Arc::new(
                SearchValue::new(workspace.clone())
                    .with_max_results(config.tables.search_max_results),
            ));
            registry.register(Arc::new(CreateWorkbook::new(workspace.clone())));
            registry.register(Arc::new(WriteCell::new(workspace.clone())));
            registry.register(Arc::new(WriteRows::new(workspace.clone())));
            registry.register(Arc::new(AddSheet::new(workspace.clone())));
            registry.register(Arc::new(DeleteSheet::new(workspace.clone())));
            registry.register(Arc::new(ClearRange::new(workspace.clone())));

            registry.register(Arc::new(ReadWordDocument::new(workspace.clone())));
            registry.register(Arc::new(CreateWordDocument::new(workspace.clone())));
            registry.register(Arc::new(AddHeading::new(workspace.clone())));
            registry.register(Arc::new(AddParagraph::new(workspace.clone())));
            registry.register(Arc::new(AddTable::new(workspace.clone())));
            registry.register(Arc::new(SetTableCell::new(workspace.clone())));
            registry.register(Arc::new(AddPageBreak::new(workspace.clone())));
            registry.register(Arc::new(AddBulletList::new(workspace.clone())));

            registry.register(Arc::new(SlideCount::new(workspace.clone())));
            registry.register(Arc::new(ReadSlideText::new(workspace.clone())));
            registry.register(Arc::new(CreatePresentation::new(workspace.clone())));
            registry.register(Arc::new(AddTitleSlide::new(workspace.clone())));
            registry.register(Arc::new(AddContentSlide::new(workspace.clone())));
            registry.register(Arc::new(AddBlankSlide::new(workspace.clone())));
            registry.register(Arc::new(AddTextBox::new(workspace)));
        }

        tracing::debug!(tool_count = registry.len(), "Tool registry built");
        Ok(registry)
    }
}

/// Definitions of every standard tool, for hosts that only need the schemas
pub fn standard_tool_definitions() -> Result<Vec<ToolDefinition>> {
    Ok(ToolRegistryBuilder::new(PathBuf::from("."))
        .build()?
        .list())
}
