//! Document tool tests
//!
//! Fixtures are built on the fly: Office files as stored zip archives,
//! PDFs with lopdf. Authoring tools are checked by reading their output
//! back through the reading tools.

use agenttools_core::error::ToolError;
use agenttools_core::tools::document::{
    AddBlankSlide, AddBulletList, AddContentSlide, AddHeading, AddPageBreak, AddParagraph,
    AddSheet, AddTable, AddTextBox, AddTitleSlide, ClearRange, CreatePdf, CreatePresentation,
    CreateWordDocument, CreateWorkbook, DeleteSheet, ExtractPdfPage, ExtractPdfText, ListSheets,
    MergePdfs, PdfInfo, ReadCell, ReadSheet, ReadSlideText, ReadWordDocument, RotatePdf,
    SearchValue, SetTableCell, SlideCount, SplitPdf, WorkbookInfo, WriteCell, WriteRows,
};
use agenttools_core::tools::Tool;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_zip(path: &Path, parts: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, body) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn text(output: &agenttools_core::ToolOutput) -> &str {
    output.content.as_str().expect("string content")
}

/// Create a test workspace
fn setup_workspace() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

mod excel_tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sales" sheetId="1" r:id="rId1"/><sheet name="Notes" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#;

    const SALES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:B3"/><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Region</t></is></c><c r="B1" t="inlineStr"><is><t>Revenue</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>North</t></is></c><c r="B2"><v>120</v></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>South</t></is></c><c r="B3"><v>95.5</v></c></row></sheetData></worksheet>"#;

    const NOTES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="B2"/><sheetData><row r="2"><c r="B2" t="inlineStr"><is><t>Call the North team</t></is></c></row></sheetData></worksheet>"#;

    fn setup_workbook() -> TempDir {
        let dir = setup_workspace();
        write_zip(
            &dir.path().join("report.xlsx"),
            &[
                ("[Content_Types].xml", CONTENT_TYPES),
                ("_rels/.rels", ROOT_RELS),
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/worksheets/sheet1.xml", SALES),
                ("xl/worksheets/sheet2.xml", NOTES),
            ],
        );
        dir
    }

    #[tokio::test]
    async fn test_list_sheets() {
        let dir = setup_workbook();
        let tool = ListSheets::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"path": "report.xlsx"})).await.unwrap();

        assert_eq!(output.content["status"], "ok");
        assert_eq!(output.content["sheets"], json!(["Sales", "Notes"]));
    }

    #[tokio::test]
    async fn test_read_first_sheet_by_default() {
        let dir = setup_workbook();
        let tool = ReadSheet::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"path": "report.xlsx"})).await.unwrap();

        assert_eq!(output.content["sheet"], "Sales");
        assert_eq!(output.content["row_count"], 3);
        assert_eq!(
            output.content["data"],
            json!([["Region", "Revenue"], ["North", 120], ["South", 95.5]])
        );
    }

    #[tokio::test]
    async fn test_read_sheet_caps_rows() {
        let dir = setup_workbook();
        let tool = ReadSheet::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "max_rows": 2}))
            .await
            .unwrap();

        assert_eq!(output.content["row_count"], 2);
    }

    #[tokio::test]
    async fn test_read_sheet_range() {
        let dir = setup_workbook();
        let tool = ReadSheet::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "cell_range": "B2:B3"}))
            .await
            .unwrap();

        assert_eq!(output.content["data"], json!([[120], [95.5]]));
    }

    #[tokio::test]
    async fn test_missing_sheet_lists_available() {
        let dir = setup_workbook();
        let tool = ReadSheet::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"path": "report.xlsx", "sheet_name": "Budget"}))
            .await;

        match result {
            Err(ToolError::ResourceNotFound(msg)) => assert_eq!(
                msg,
                "Sheet 'Budget' not found. Available sheets: Sales, Notes"
            ),
            other => panic!("expected ResourceNotFound, got {:?}", other.map(|o| o.content)),
        }
    }

    #[tokio::test]
    async fn test_read_cell() {
        let dir = setup_workbook();
        let tool = ReadCell::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "cell": "A2"}))
            .await
            .unwrap();
        assert_eq!(output.content["value"], "North");

        let output = tool
            .execute(json!({"path": "report.xlsx", "cell": "$B$3"}))
            .await
            .unwrap();
        assert_eq!(output.content["value"], 95.5);
    }

    #[tokio::test]
    async fn test_read_cell_outside_data_is_null() {
        let dir = setup_workbook();
        let tool = ReadCell::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "cell": "A1", "sheet_name": "Notes"}))
            .await
            .unwrap();

        assert!(output.content["value"].is_null());
    }

    #[tokio::test]
    async fn test_read_cell_bad_reference() {
        let dir = setup_workbook();
        let tool = ReadCell::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"path": "report.xlsx", "cell": "12"}))
            .await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_workbook_info() {
        let dir = setup_workbook();
        let tool = WorkbookInfo::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"path": "report.xlsx"})).await.unwrap();

        let sheets = &output.content["sheets"];
        assert_eq!(
            sheets[0],
            json!({"name": "Sales", "dimensions": "A1:B3", "max_row": 3, "max_column": 2})
        );
        assert_eq!(sheets[1]["dimensions"], "A1:B2");
    }

    #[tokio::test]
    async fn test_search_value_uses_absolute_cells() {
        let dir = setup_workbook();
        let tool = SearchValue::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "search_term": "NORTH", "sheet_name": "Notes"}))
            .await
            .unwrap();

        assert_eq!(output.content["match_count"], 1);
        assert_eq!(output.content["matches"][0]["cell"], "B2");
    }

    #[tokio::test]
    async fn test_search_value_numbers_and_limit() {
        let dir = setup_workbook();
        let tool = SearchValue::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "search_term": "o", "max_results": 2}))
            .await
            .unwrap();
        assert_eq!(output.content["match_count"], 2);
        assert_eq!(output.content["matches"][0]["cell"], "A1");

        let output = tool
            .execute(json!({"path": "report.xlsx", "search_term": "95.5"}))
            .await
            .unwrap();
        assert_eq!(output.content["matches"][0]["cell"], "B3");
    }

    #[tokio::test]
    async fn test_wrong_extension() {
        let dir = setup_workbook();
        std::fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();
        let tool = ListSheets::new(dir.path().to_path_buf());

        let result = tool.execute(json!({"path": "data.csv"})).await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_write_cell_keeps_existing_data() {
        let dir = setup_workbook();
        let tool = WriteCell::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "report.xlsx", "cell": "C1", "value": "Target"}))
            .await
            .unwrap();
        assert_eq!(output.content["sheet"], "Sales");

        let sheets = ListSheets::new(dir.path().to_path_buf())
            .execute(json!({"path": "report.xlsx"}))
            .await
            .unwrap();
        assert_eq!(sheets.content["sheets"], json!(["Sales", "Notes"]));

        let data = ReadSheet::new(dir.path().to_path_buf())
            .execute(json!({"path": "report.xlsx"}))
            .await
            .unwrap();
        assert_eq!(
            data.content["data"],
            json!([
                ["Region", "Revenue", "Target"],
                ["North", 120, null],
                ["South", 95.5, null]
            ])
        );

        let notes = ReadCell::new(dir.path().to_path_buf())
            .execute(json!({"path": "report.xlsx", "cell": "B2", "sheet_name": "Notes"}))
            .await
            .unwrap();
        assert_eq!(notes.content["value"], "Call the North team");
    }

    #[tokio::test]
    async fn test_writing_legacy_formats_is_refused() {
        let dir = setup_workbook();
        let tool = WriteCell::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"path": "old.xls", "cell": "A1", "value": "x"}))
            .await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
        assert!(!dir.path().join("old.xls").exists());
    }
}

mod excel_write_tests {
    use super::*;

    async fn read_all(dir: &TempDir, path: &str, sheet: &str) -> serde_json::Value {
        ReadSheet::new(dir.path().to_path_buf())
            .execute(json!({"path": path, "sheet_name": sheet}))
            .await
            .unwrap()
            .content["data"]
            .clone()
    }

    #[tokio::test]
    async fn test_create_workbook() {
        let dir = setup_workspace();
        let tool = CreateWorkbook::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "out/plan.xlsx", "sheet_names": "Data, Summary"}))
            .await
            .unwrap();
        assert_eq!(output.content["sheets"], json!(["Data", "Summary"]));

        let sheets = ListSheets::new(dir.path().to_path_buf())
            .execute(json!({"path": "out/plan.xlsx"}))
            .await
            .unwrap();
        assert_eq!(sheets.content["sheets"], json!(["Data", "Summary"]));

        let output = tool.execute(json!({"path": "blank.xlsx"})).await.unwrap();
        assert_eq!(output.content["sheets"], json!(["Sheet1"]));
    }

    #[tokio::test]
    async fn test_create_workbook_rejects_duplicate_sheets() {
        let dir = setup_workspace();
        let tool = CreateWorkbook::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"path": "dup.xlsx", "sheet_names": "A, A"}))
            .await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
        assert!(!dir.path().join("dup.xlsx").exists());
    }

    #[tokio::test]
    async fn test_write_cell_creates_workbook_and_coerces_numbers() {
        let dir = setup_workspace();
        let tool = WriteCell::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"path": "new.xlsx", "cell": "A1", "value": "42"}))
            .await
            .unwrap();
        assert_eq!(output.content["sheet"], "Sheet1");
        assert_eq!(output.content["value"], 42);

        tool.execute(json!({"path": "new.xlsx", "cell": "B1", "value": "3.5"}))
            .await
            .unwrap();
        tool.execute(json!({"path": "new.xlsx", "cell": "C1", "value": "v1.2"}))
            .await
            .unwrap();

        assert_eq!(read_all(&dir, "new.xlsx", "Sheet1").await, json!([[42, 3.5, "v1.2"]]));
    }

    #[tokio::test]
    async fn test_write_cell_creates_missing_sheet() {
        let dir = setup_workspace();
        let tool = WriteCell::new(dir.path().to_path_buf());

        tool.execute(json!({"path": "book.xlsx", "cell": "A1", "value": "Region"}))
            .await
            .unwrap();
        tool.execute(json!({
            "path": "book.xlsx",
            "cell": "B2",
            "value": "7",
            "sheet_name": "Totals"
        }))
        .await
        .unwrap();

        assert_eq!(read_all(&dir, "book.xlsx", "Sheet1").await, json!([["Region"]]));
        assert_eq!(
            read_all(&dir, "book.xlsx", "Totals").await,
            json!([[null, null], [null, 7]])
        );
    }

    #[tokio::test]
    async fn test_write_rows() {
        let dir = setup_workspace();
        let tool = WriteRows::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({
                "path": "people.xlsx",
                "data_json": r#"[["Name", "Age", "Active"], ["Ann", 30, true], "skipped", ["Bob", 41.5]]"#,
                "start_cell": "B2"
            }))
            .await
            .unwrap();

        assert_eq!(output.content["rows_written"], 3);
        assert_eq!(output.content["start_cell"], "B2");
        let data = ReadSheet::new(dir.path().to_path_buf())
            .execute(json!({"path": "people.xlsx", "cell_range": "B2:D5"}))
            .await
            .unwrap();
        assert_eq!(
            data.content["data"],
            json!([
                ["Name", "Age", "Active"],
                ["Ann", 30, true],
                [null, null, null],
                ["Bob", 41.5, null]
            ])
        );
    }

    #[tokio::test]
    async fn test_write_rows_rejects_bad_json() {
        let dir = setup_workspace();
        let tool = WriteRows::new(dir.path().to_path_buf());

        match tool
            .execute(json!({"path": "x.xlsx", "data_json": "[[1, 2"}))
            .await
        {
            Err(ToolError::InvalidParams(msg)) => assert!(msg.starts_with("Invalid JSON: ")),
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }

        match tool
            .execute(json!({"path": "x.xlsx", "data_json": r#"{"a": 1}"#}))
            .await
        {
            Err(ToolError::InvalidParams(msg)) => {
                assert_eq!(msg, "data_json must be a JSON array of arrays")
            }
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
        assert!(!dir.path().join("x.xlsx").exists());
    }

    #[tokio::test]
    async fn test_add_and_delete_sheets() {
        let dir = setup_workspace();
        CreateWorkbook::new(dir.path().to_path_buf())
            .execute(json!({"path": "book.xlsx"}))
            .await
            .unwrap();

        let add = AddSheet::new(dir.path().to_path_buf());
        let output = add
            .execute(json!({"path": "book.xlsx", "sheet_name": "Budget"}))
            .await
            .unwrap();
        assert_eq!(output.content["new_sheet"], "Budget");
        assert_eq!(output.content["all_sheets"], json!(["Sheet1", "Budget"]));

        match add
            .execute(json!({"path": "book.xlsx", "sheet_name": "Budget"}))
            .await
        {
            Err(ToolError::InvalidParams(msg)) => assert_eq!(msg, "Sheet 'Budget' already exists"),
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }

        let delete = DeleteSheet::new(dir.path().to_path_buf());
        let output = delete
            .execute(json!({"path": "book.xlsx", "sheet_name": "Sheet1"}))
            .await
            .unwrap();
        assert_eq!(output.content["deleted_sheet"], "Sheet1");
        assert_eq!(output.content["remaining_sheets"], json!(["Budget"]));

        let result = delete
            .execute(json!({"path": "book.xlsx", "sheet_name": "Budget"}))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));

        let result = delete
            .execute(json!({"path": "book.xlsx", "sheet_name": "Ghost"}))
            .await;
        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_sheet_needs_existing_workbook() {
        let dir = setup_workspace();
        let tool = AddSheet::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"path": "ghost.xlsx", "sheet_name": "S"}))
            .await;

        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_range() {
        let dir = setup_workspace();
        WriteRows::new(dir.path().to_path_buf())
            .execute(json!({
                "path": "grid.xlsx",
                "data_json": r#"[["a1", "b1", "c1"], ["a2", "b2", "c2"], ["a3", "b3", "c3"]]"#
            }))
            .await
            .unwrap();

        let output = ClearRange::new(dir.path().to_path_buf())
            .execute(json!({"path": "grid.xlsx", "cell_range": "B2:A1"}))
            .await
            .unwrap();

        assert_eq!(output.content["cells_cleared"], 4);
        assert_eq!(output.content["range"], "B2:A1");
        assert_eq!(
            read_all(&dir, "grid.xlsx", "Sheet1").await,
            json!([
                [null, null, "c1"],
                [null, null, "c2"],
                ["a3", "b3", "c3"]
            ])
        );
    }
}

mod word_tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Project Plan</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t>Phase one starts in May</w:t></w:r></w:p><w:p><w:r><w:t>Budget approved</w:t></w:r></w:p></w:body></w:document>"#;

    #[tokio::test]
    async fn test_read_word_document() {
        let dir = setup_workspace();
        write_zip(
            &dir.path().join("plan.docx"),
            &[("word/document.xml", DOCUMENT)],
        );
        let tool = ReadWordDocument::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"file_path": "plan.docx"})).await.unwrap();

        let body = text(&output);
        assert!(body.contains("Project Plan"));
        assert!(body.contains("Phase one starts in May"));
        assert!(body.contains("Budget approved"));
        assert!(body.lines().all(|l| !l.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = setup_workspace();
        let tool = ReadWordDocument::new(dir.path().to_path_buf());

        let result = tool.execute(json!({"file_path": "ghost.docx"})).await;

        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
    }
}

mod word_write_tests {
    use super::*;

    async fn new_document(dir: &TempDir, name: &str) {
        let output = CreateWordDocument::new(dir.path().to_path_buf())
            .execute(json!({"file_path": name}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Word document created successfully at: "));
    }

    async fn read_back(dir: &TempDir, name: &str) -> String {
        let output = ReadWordDocument::new(dir.path().to_path_buf())
            .execute(json!({"file_path": name}))
            .await
            .unwrap();
        text(&output).to_string()
    }

    #[tokio::test]
    async fn test_build_document() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();
        new_document(&dir, "plan.docx").await;

        let output = AddHeading::new(ws.clone())
            .execute(json!({"file_path": "plan.docx", "text": "Project Plan", "level": 0}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Heading added successfully to: "));

        let output = AddParagraph::new(ws.clone())
            .execute(json!({"file_path": "plan.docx", "text": "Phase one starts in May"}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Paragraph added successfully to: "));

        let output = AddBulletList::new(ws.clone())
            .execute(json!({"file_path": "plan.docx", "items": "Design, Build, "}))
            .await
            .unwrap();
        assert_eq!(text(&output), "Bullet list with 2 items added successfully");

        let output = AddPageBreak::new(ws.clone())
            .execute(json!({"file_path": "plan.docx"}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Page break added successfully to: "));

        let body = read_back(&dir, "plan.docx").await;
        let expected = ["Project Plan", "Phase one starts in May", "• Design", "• Build"];
        let positions: Vec<usize> = expected.iter().filter_map(|p| body.find(p)).collect();
        assert_eq!(positions.len(), expected.len(), "{:?}", body);
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", body);
    }

    #[tokio::test]
    async fn test_table_cells() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();
        new_document(&dir, "table.docx").await;

        let output = AddTable::new(ws.clone())
            .execute(json!({"file_path": "table.docx", "rows": 2, "cols": 3}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Table (2x3) added successfully to: "));

        let tool = SetTableCell::new(ws.clone());
        let output = tool
            .execute(json!({
                "file_path": "table.docx",
                "table_index": 0,
                "row": 1,
                "col": 2,
                "text": "Done"
            }))
            .await
            .unwrap();
        assert_eq!(text(&output), "Cell (1, 2) updated successfully in table 0");
        tool.execute(json!({
            "file_path": "table.docx",
            "table_index": 0,
            "row": 0,
            "col": 0,
            "text": "Task"
        }))
        .await
        .unwrap();

        let body = read_back(&dir, "table.docx").await;
        let task = body.find("Task").expect("first cell text");
        let done = body.find("Done").expect("last cell text");
        assert!(task < done);
    }

    #[tokio::test]
    async fn test_set_table_cell_out_of_range() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();
        new_document(&dir, "t.docx").await;
        let tool = SetTableCell::new(ws.clone());
        let cell = |table: i64, row: i64, col: i64| {
            json!({"file_path": "t.docx", "table_index": table, "row": row, "col": col, "text": "x"})
        };

        match tool.execute(cell(0, 0, 0)).await {
            Err(ToolError::InvalidParams(msg)) => assert_eq!(msg, "Table index 0 out of range"),
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }

        AddTable::new(ws)
            .execute(json!({"file_path": "t.docx", "rows": 1, "cols": 1}))
            .await
            .unwrap();
        match tool.execute(cell(0, 0, 1)).await {
            Err(ToolError::InvalidParams(msg)) => {
                assert_eq!(msg, "Cell position (0, 1) out of range")
            }
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
    }

    #[tokio::test]
    async fn test_heading_level_bounds() {
        let dir = setup_workspace();
        new_document(&dir, "h.docx").await;
        let tool = AddHeading::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"file_path": "h.docx", "text": "Deep", "level": 10}))
            .await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_edit_needs_existing_document() {
        let dir = setup_workspace();
        let tool = AddParagraph::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"file_path": "ghost.docx", "text": "hi"}))
            .await;

        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
    }
}

mod pptx_tests {
    use super::*;

    fn slide(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn setup_deck() -> TempDir {
        let dir = setup_workspace();
        let first = slide(&["Welcome", "Agenda for today"]);
        let second = slide(&[]);
        let tenth = slide(&["Closing remarks"]);
        write_zip(
            &dir.path().join("deck.pptx"),
            &[
                ("ppt/presentation.xml", "<p:presentation/>"),
                ("ppt/slides/slide10.xml", tenth.as_str()),
                ("ppt/slides/slide1.xml", first.as_str()),
                ("ppt/slides/slide2.xml", second.as_str()),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ],
        );
        dir
    }

    #[tokio::test]
    async fn test_slide_count() {
        let dir = setup_deck();
        let tool = SlideCount::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"file_path": "deck.pptx"})).await.unwrap();

        assert_eq!(text(&output), "Presentation has 3 slides");
    }

    #[tokio::test]
    async fn test_read_first_slide() {
        let dir = setup_deck();
        let tool = ReadSlideText::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"file_path": "deck.pptx", "slide_index": 0}))
            .await
            .unwrap();

        assert_eq!(text(&output), "Welcome\nAgenda for today");
    }

    #[tokio::test]
    async fn test_slides_ordered_numerically() {
        let dir = setup_deck();
        let tool = ReadSlideText::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"file_path": "deck.pptx", "slide_index": 2}))
            .await
            .unwrap();

        assert_eq!(text(&output), "Closing remarks");
    }

    #[tokio::test]
    async fn test_empty_slide() {
        let dir = setup_deck();
        let tool = ReadSlideText::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"file_path": "deck.pptx", "slide_index": 1}))
            .await
            .unwrap();

        assert_eq!(text(&output), "No text found on slide");
    }

    #[tokio::test]
    async fn test_slide_index_out_of_range() {
        let dir = setup_deck();
        let tool = ReadSlideText::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"file_path": "deck.pptx", "slide_index": 3}))
            .await;

        match result {
            Err(ToolError::InvalidParams(msg)) => assert_eq!(
                msg,
                "Slide index 3 out of range (presentation has 3 slides)"
            ),
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
    }

    #[tokio::test]
    async fn test_text_box_on_existing_slide() {
        let dir = setup_deck();
        let tool = AddTextBox::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"file_path": "deck.pptx", "slide_index": 2, "text": "Appendix"}))
            .await
            .unwrap();
        assert_eq!(text(&output), "Text box added successfully to slide 2");

        let output = ReadSlideText::new(dir.path().to_path_buf())
            .execute(json!({"file_path": "deck.pptx", "slide_index": 2}))
            .await
            .unwrap();
        assert_eq!(text(&output), "Closing remarks\nAppendix");
    }
}

mod pptx_write_tests {
    use super::*;

    async fn slide_text(dir: &TempDir, index: i64) -> String {
        let output = ReadSlideText::new(dir.path().to_path_buf())
            .execute(json!({"file_path": "deck.pptx", "slide_index": index}))
            .await
            .unwrap();
        text(&output).to_string()
    }

    async fn slide_count(dir: &TempDir) -> String {
        let output = SlideCount::new(dir.path().to_path_buf())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();
        text(&output).to_string()
    }

    #[tokio::test]
    async fn test_build_presentation() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();

        let output = CreatePresentation::new(ws.clone())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("PowerPoint presentation created successfully at: "));
        assert_eq!(slide_count(&dir).await, "Presentation has 0 slides");

        let output = AddTitleSlide::new(ws.clone())
            .execute(json!({
                "file_path": "deck.pptx",
                "title": "Quarterly Review",
                "subtitle": "Q3 results"
            }))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Title slide added successfully to: "));

        let output = AddContentSlide::new(ws.clone())
            .execute(json!({
                "file_path": "deck.pptx",
                "title": "Highlights",
                "content": "Revenue up, Costs down"
            }))
            .await
            .unwrap();
        assert_eq!(text(&output), "Content slide with 2 bullets added successfully");

        let output = AddBlankSlide::new(ws.clone())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();
        assert!(text(&output).starts_with("Blank slide added successfully to: "));
        assert_eq!(output.metadata["slide_index"], 2);

        assert_eq!(slide_count(&dir).await, "Presentation has 3 slides");
        assert_eq!(slide_text(&dir, 0).await, "Quarterly Review\nQ3 results");
        assert_eq!(slide_text(&dir, 1).await, "Highlights\nRevenue up\nCosts down");
        assert_eq!(slide_text(&dir, 2).await, "No text found on slide");
    }

    #[tokio::test]
    async fn test_text_boxes_escape_and_stack() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();
        CreatePresentation::new(ws.clone())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();
        AddBlankSlide::new(ws.clone())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();

        let tool = AddTextBox::new(ws);
        tool.execute(json!({"file_path": "deck.pptx", "slide_index": 0, "text": "R&D <draft>"}))
            .await
            .unwrap();
        tool.execute(json!({
            "file_path": "deck.pptx",
            "slide_index": 0,
            "text": "Line one\nLine two",
            "left": 0.5,
            "top": 3.0
        }))
        .await
        .unwrap();

        assert_eq!(slide_text(&dir, 0).await, "R&D <draft>\nLine one\nLine two");
    }

    #[tokio::test]
    async fn test_text_box_slide_out_of_range() {
        let dir = setup_workspace();
        let ws = dir.path().to_path_buf();
        CreatePresentation::new(ws.clone())
            .execute(json!({"file_path": "deck.pptx"}))
            .await
            .unwrap();

        let result = AddTextBox::new(ws)
            .execute(json!({"file_path": "deck.pptx", "slide_index": 0, "text": "x"}))
            .await;

        match result {
            Err(ToolError::InvalidParams(msg)) => assert_eq!(
                msg,
                "Slide index 0 out of range (presentation has 0 slides)"
            ),
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
    }
}

mod pdf_tests {
    use super::*;

    /// Three pages of Courier text plus an Info dictionary
    fn write_pdf(path: &Path) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for n in 1..=3 {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(24)],
                    ),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(600)]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Chapter {}", n))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(3),
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Annual Report"),
            "Author" => Object::string_literal("Finance Team"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.save(path).unwrap();
    }

    fn setup_pdf() -> TempDir {
        let dir = setup_workspace();
        write_pdf(&dir.path().join("report.pdf"));
        dir
    }

    fn page_count(path: &Path) -> usize {
        Document::load(path).unwrap().get_pages().len()
    }

    #[tokio::test]
    async fn test_extract_text() {
        let dir = setup_pdf();
        let tool = ExtractPdfText::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"file_path": "report.pdf"})).await.unwrap();

        let body = text(&output);
        assert!(body.contains("Chapter"), "{}", body);
        assert!(body.contains('3'), "{}", body);
    }

    #[tokio::test]
    async fn test_pdf_info() {
        let dir = setup_pdf();
        let tool = PdfInfo::new(dir.path().to_path_buf());

        let output = tool.execute(json!({"file_path": "report.pdf"})).await.unwrap();

        assert_eq!(
            text(&output),
            "Number of pages: 3\n\nMetadata:\n  /Title: Annual Report\n  /Author: Finance Team"
        );
        assert_eq!(output.metadata["pages"], 3);
    }

    #[tokio::test]
    async fn test_extract_page() {
        let dir = setup_pdf();
        let tool = ExtractPdfPage::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({
                "file_path": "report.pdf",
                "page_number": 2,
                "output_path": "pages/second.pdf"
            }))
            .await
            .unwrap();

        assert!(text(&output).starts_with("Page 2 extracted successfully to: "));
        assert_eq!(page_count(&dir.path().join("pages/second.pdf")), 1);
        assert_eq!(page_count(&dir.path().join("report.pdf")), 3);
    }

    #[tokio::test]
    async fn test_extract_page_out_of_range() {
        let dir = setup_pdf();
        let tool = ExtractPdfPage::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({
                "file_path": "report.pdf",
                "page_number": 4,
                "output_path": "nope.pdf"
            }))
            .await;

        match result {
            Err(ToolError::InvalidParams(msg)) => {
                assert_eq!(msg, "Page number 4 out of range (1-3)")
            }
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
        assert!(!dir.path().join("nope.pdf").exists());
    }

    #[tokio::test]
    async fn test_split() {
        let dir = setup_pdf();
        let tool = SplitPdf::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({"file_path": "report.pdf", "output_dir": "split"}))
            .await
            .unwrap();

        assert!(text(&output).starts_with("Successfully split PDF into 3 pages in: "));
        for n in 1..=3 {
            let page = dir.path().join(format!("split/page_{}.pdf", n));
            assert_eq!(page_count(&page), 1, "page_{}.pdf", n);
        }
    }

    #[tokio::test]
    async fn test_rotate() {
        let dir = setup_pdf();
        let tool = RotatePdf::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({
                "file_path": "report.pdf",
                "degrees": 270,
                "output_path": "rotated.pdf"
            }))
            .await
            .unwrap();

        assert!(text(&output).starts_with("PDF rotated 270 degrees and saved to: "));
        let doc = Document::load(dir.path().join("rotated.pdf")).unwrap();
        for id in doc.get_pages().values() {
            let page = doc.get_dictionary(*id).unwrap();
            assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 270);
        }
    }

    #[tokio::test]
    async fn test_rotate_rejects_odd_angles() {
        let dir = setup_pdf();
        let tool = RotatePdf::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({
                "file_path": "report.pdf",
                "degrees": 45,
                "output_path": "rotated.pdf"
            }))
            .await;

        match result {
            Err(ToolError::InvalidParams(msg)) => {
                assert_eq!(msg, "Degrees must be a multiple of 90 (90, 180, 270)")
            }
            other => panic!("expected InvalidParams, got {:?}", other.map(|o| o.content)),
        }
    }

    #[tokio::test]
    async fn test_create_pdf_paginates() {
        let dir = setup_workspace();
        let tool = CreatePdf::new(dir.path().to_path_buf());
        let lines: Vec<String> = (1..=60).map(|n| format!("line {}", n)).collect();

        let output = tool
            .execute(json!({"file_path": "notes/long.pdf", "text": lines.join("\n")}))
            .await
            .unwrap();

        assert!(text(&output).starts_with("PDF created successfully at: "));
        assert_eq!(output.metadata["pages"], 2);
        assert_eq!(page_count(&dir.path().join("notes/long.pdf")), 2);

        let extracted = ExtractPdfText::new(dir.path().to_path_buf())
            .execute(json!({"file_path": "notes/long.pdf"}))
            .await
            .unwrap();
        assert!(text(&extracted).contains("line 1"), "{}", text(&extracted));
    }

    #[tokio::test]
    async fn test_create_pdf_needs_pdf_extension() {
        let dir = setup_workspace();
        let tool = CreatePdf::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"file_path": "notes.txt", "text": "hello"}))
            .await;

        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_merge() {
        let dir = setup_pdf();
        CreatePdf::new(dir.path().to_path_buf())
            .execute(json!({"file_path": "appendix.pdf", "text": "Appendix A"}))
            .await
            .unwrap();
        let tool = MergePdfs::new(dir.path().to_path_buf());

        let output = tool
            .execute(json!({
                "output_path": "merged/all.pdf",
                "input_paths": "report.pdf, appendix.pdf, report.pdf"
            }))
            .await
            .unwrap();

        assert!(text(&output).starts_with("Successfully merged 3 PDFs into: "));
        let merged = Document::load(dir.path().join("merged/all.pdf")).unwrap();
        let pages = merged.get_pages();
        assert_eq!(pages.len(), 7);
        for id in pages.values() {
            let page = merged.get_dictionary(*id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
        }
    }

    #[tokio::test]
    async fn test_merge_missing_input_writes_nothing() {
        let dir = setup_pdf();
        let tool = MergePdfs::new(dir.path().to_path_buf());

        let result = tool
            .execute(json!({"output_path": "out.pdf", "input_paths": "report.pdf, ghost.pdf"}))
            .await;

        assert!(matches!(result, Err(ToolError::ResourceNotFound(_))));
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[tokio::test]
    async fn test_corrupt_pdf() {
        let dir = setup_workspace();
        std::fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();
        let tool = PdfInfo::new(dir.path().to_path_buf());

        let result = tool.execute(json!({"file_path": "broken.pdf"})).await;

        assert!(matches!(result, Err(ToolError::ExecutionFailed(_))));
    }
}
