//! Serialization of documents after transactions have closed

use pretty_assertions::assert_eq;
use redraft::{Document, PageOptions, PdfError};
use tempfile::TempDir;

fn xref_entries(pdf: &str) -> Vec<String> {
    let start = pdf.rfind("xref\n").unwrap();
    pdf[start..]
        .lines()
        .skip(2)
        .take_while(|line| !line.starts_with("trailer"))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_save_writes_pdf_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.pdf");

    let mut doc = Document::new();
    doc.set_title("Report").unwrap();
    doc.text("Hello").unwrap();
    doc.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(bytes.starts_with(b"%PDF-1.7\n"));
    assert!(text.contains("/Title (Report)"));
    assert!(text.contains("(Hello) Tj"));
    assert!(text.contains("/BaseFont /Helvetica"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn test_save_refuses_open_transaction() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("open.pdf");
    let mut doc = Document::new();

    let result = doc.transaction(|tx| {
        let saved = tx.save(&path);
        assert!(matches!(saved, Err(PdfError::TransactionMisuse(_))));
        let bytes = tx.to_bytes();
        assert!(matches!(bytes, Err(PdfError::TransactionMisuse(_))));
        Ok(())
    });

    assert!(result.unwrap());
    assert!(doc.to_bytes().is_ok());
}

#[test]
fn test_xref_has_free_entries_for_rolled_back_pages() {
    let mut doc = Document::new();
    let before = doc.store().max_number();
    doc.transaction(|tx| {
        tx.start_new_page(PageOptions::default())?;
        tx.start_new_page(PageOptions::default())?;
        tx.rollback()
    })
    .unwrap();
    doc.start_new_page(PageOptions::default()).unwrap();

    let pdf = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    let entries = xref_entries(&pdf);
    let size = doc.store().max_number() as usize + 1;

    assert_eq!(entries.len(), size);
    let free: Vec<usize> = entries
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, entry)| entry.ends_with(" f "))
        .map(|(number, _)| number)
        .collect();
    // Two pages, each with a resource dictionary and a content stream.
    assert_eq!(free, ((before as usize + 1)..=(before as usize + 6)).collect::<Vec<_>>());
    assert!(pdf.contains(&format!("/Size {size}")));
    assert!(pdf.contains("/Count 2"));
}

#[test]
fn test_output_is_deterministic_after_rollback() {
    let mut doc = Document::new();
    doc.text("A").unwrap();
    let before = doc.to_bytes().unwrap();

    doc.transaction(|tx| {
        tx.text("B")?;
        tx.set_title("changed")?;
        tx.rollback()
    })
    .unwrap();

    assert_eq!(doc.to_bytes().unwrap(), before);
}
