//! End-to-end renaming: real PDFs in, result archive out.

mod common;

use std::io::Cursor;

use common::harness::{archive_entries, archive_entry};
use common::*;

use pdfbatch::archive::{ingest_zip, SkipReason};
use pdfbatch::{write_results, BatchStatus, ContentStore, FileContentStore, NoopProgress};

const DOC_TYPE: &str = "nota-fiscal";
const PATTERN: &str = "NF + Número";

#[test]
fn duplicate_invoice_numbers_get_suffixed_entries() {
    let harness = TestHarness::new();
    let first = invoice_pdf("1001");
    harness.write_input("a.pdf", &first);
    harness.write_input("b.pdf", &invoice_pdf("1001"));
    harness.write_input("c.pdf", &unrelated_pdf());

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    let names: Vec<&str> = report.renamed.iter().map(|r| r.new_name.as_str()).collect();
    assert_eq!(names, vec!["NF_1001", "NF_1001_1", "NO_DATA_3"]);
    assert!(report.failed.is_empty());

    let output = harness.output_path("renamed.zip");
    let summary = write_results(report.renamed_pairs(), &content, &output).unwrap();
    assert!(summary.missing.is_empty());
    assert_eq!(
        archive_entries(&output),
        vec!["NF_1001.pdf", "NF_1001_1.pdf", "NO_DATA_3.pdf"]
    );
    assert_eq!(archive_entry(&output, "NF_1001.pdf"), first);
}

#[test]
fn unmatched_document_gets_placeholder_without_error() {
    let harness = TestHarness::new();
    harness.write_input("scan.pdf", &unrelated_pdf());

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].new_name, "NO_DATA_1");
    assert!(report.renamed[0].fallback);

    let batch = manager.get_batch(&report.batch_ids[0]).unwrap();
    assert_eq!(batch.status(), BatchStatus::Completed);
    assert_eq!(batch.processed_files(), 1);
    assert_eq!(batch.failed_files(), 0);
    assert!(batch.errors().is_empty());
}

#[test]
fn placeholders_number_files_across_batches() {
    let harness = TestHarness::with_batch_size(2);
    for i in 0..3 {
        harness.write_input(&format!("scan{}.pdf", i), &unrelated_pdf());
    }

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    assert_eq!(report.batch_ids.len(), 2);
    let second = manager.get_batch(&report.batch_ids[1]).unwrap();
    assert_eq!(second.results()[0].new_name, "NO_DATA_3");

    let names: Vec<&str> = report.renamed.iter().map(|r| r.new_name.as_str()).collect();
    assert_eq!(names, vec!["NO_DATA_1", "NO_DATA_2", "NO_DATA_3"]);
}

#[test]
fn unreadable_document_fails_alone() {
    let harness = TestHarness::new();
    harness.write_input("a_broken.pdf", b"this is not a pdf");
    harness.write_input("b_good.pdf", &invoice_pdf("2002"));

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "a_broken.pdf");
    assert!(!report.failed[0].error_message.starts_with("ERROR"));
    assert_eq!(report.renamed[0].new_name, "NF_2002");

    let batch = manager.get_batch(&report.batch_ids[0]).unwrap();
    assert_eq!(batch.status(), BatchStatus::Completed);
    assert_eq!(batch.processed_files(), 1);
    assert_eq!(batch.failed_files(), 1);
    assert!((batch.progress() - 1.0).abs() < f64::EPSILON);

    let output = harness.output_path("renamed.zip");
    write_results(report.renamed_pairs(), &content, &output).unwrap();
    assert_eq!(archive_entries(&output), vec!["NF_2002.pdf"]);
}

#[test]
fn names_stay_unique_across_batches() {
    let harness = TestHarness::with_batch_size(2);
    for i in 0..5 {
        harness.write_input(&format!("doc{}.pdf", i), &invoice_pdf("1001"));
    }

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    let sizes: Vec<usize> = report
        .batch_ids
        .iter()
        .map(|id| manager.get_batch(id).unwrap().total_files())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let names: Vec<&str> = report.renamed.iter().map(|r| r.new_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["NF_1001", "NF_1001_1", "NF_1001_2", "NF_1001_3", "NF_1001_4"]
    );
    assert_eq!(manager.counts().completed, 3);
}

#[test]
fn zip_upload_skips_unsafe_entries_and_renames_the_rest() {
    let harness = TestHarness::new();
    let upload = ZipBuilder::new()
        .directory("docs/")
        .file("docs/a.pdf", invoice_pdf("3003"))
        .file("other/a.pdf", invoice_pdf("3004"))
        .file("../evil.pdf", invoice_pdf("6666"))
        .file("/etc/abs.pdf", invoice_pdf("7777"))
        .file("__MACOSX/docs/._a.pdf", b"resource fork".to_vec())
        .file("readme.txt", b"hello".to_vec())
        .build();

    let ingested = ingest_zip(Cursor::new(upload)).unwrap();
    assert_eq!(ingested.content.names(), vec!["a.pdf", "a_1.pdf"]);
    assert_eq!(ingested.ignored, 3);
    let reasons: Vec<SkipReason> = ingested.skipped.iter().map(|s| s.reason).collect();
    assert_eq!(reasons, vec![SkipReason::PathTraversal, SkipReason::AbsolutePath]);

    let mut manager = harness.manager();
    let report = harness
        .driver()
        .run(&mut manager, &ingested.content, DOC_TYPE, PATTERN, &NoopProgress)
        .unwrap();

    let output = harness.output_path("renamed.zip");
    write_results(report.renamed_pairs(), &ingested.content, &output).unwrap();
    assert_eq!(archive_entries(&output), vec!["NF_3003.pdf", "NF_3004.pdf"]);
}

#[test]
fn unknown_document_type_creates_no_batches() {
    let harness = TestHarness::new();
    harness.write_input("a.pdf", &invoice_pdf("1001"));

    let content = FileContentStore::collect(&[&harness.input_dir]).unwrap();
    let mut manager = harness.manager();
    let result = harness
        .driver()
        .run(&mut manager, &content, "recibo-desconhecido", PATTERN, &NoopProgress);

    assert!(result.is_err());
    assert!(manager.get_all_batches().is_empty());
    assert!(!harness.store_path.exists());
}
