//! End-to-end tests of the size-targeting generation pipeline.

use pdfpad::{generate, GenerationRequest, PaddingDecision, PdfError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn output_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// In-use page objects, excluding the `/Type /Pages` tree node.
fn count_page_objects(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    text.matches("/Type /Page\n").count()
}

#[test]
fn generates_file_without_target() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "nosize.pdf");

    let request = GenerationRequest::new(&path, 3).unwrap();
    let summary = generate(&request).unwrap();

    assert!(path.exists());
    let size = fs::metadata(&path).unwrap().len();
    assert!(size > 0);
    assert_eq!(summary.page_count, 3);
    assert_eq!(summary.final_size, size);
    assert_eq!(summary.decision, PaddingDecision::NoTarget);

    // No size comparison happened, so nothing was appended
    assert_eq!(summary.bytes_appended(), 0);
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[test]
fn produces_exactly_the_requested_page_count() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "pagecount.pdf");

    let request = GenerationRequest::new(&path, 5).unwrap();
    generate(&request).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(count_page_objects(&bytes), 5);
    assert!(String::from_utf8_lossy(&bytes).contains("/Count 5\n"));
}

#[test]
fn single_page_document() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "one.pdf");

    generate(&GenerationRequest::new(&path, 1).unwrap()).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(count_page_objects(&bytes), 1);
    // The single page shows "1"
    assert!(String::from_utf8_lossy(&bytes).contains("(1) Tj"));
}

#[test]
fn pads_to_one_megabyte_target() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "size.pdf");

    let request = GenerationRequest::new(&path, 3)
        .unwrap()
        .with_target_size_mb(1.0);
    let summary = generate(&request).unwrap();

    let size = fs::metadata(&path).unwrap().len();
    assert!(size >= 1_048_576);
    assert_eq!(size, 1_048_576);
    assert_eq!(summary.final_size, size);
    assert!(matches!(summary.decision, PaddingDecision::Pad(_)));
}

#[test]
fn padding_suffix_is_filler_after_eof() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "suffix.pdf");

    let unpadded = {
        let probe = output_path(&dir, "probe.pdf");
        generate(&GenerationRequest::new(&probe, 2).unwrap()).unwrap();
        fs::metadata(&probe).unwrap().len()
    };

    let target = unpadded + 4321;
    let summary = generate(
        &GenerationRequest::new(&path, 2)
            .unwrap()
            .with_target_size(target),
    )
    .unwrap();

    assert_eq!(summary.decision, PaddingDecision::Pad(4321));
    assert_eq!(summary.bytes_appended(), 4321);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, target);

    let document = &bytes[..unpadded as usize];
    assert!(document.ends_with(b"%%EOF\n"));
    let suffix = &bytes[unpadded as usize..];
    assert!(suffix.iter().all(|&b| b == b' '));
}

#[test]
fn exact_match_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "exact.pdf");

    generate(&GenerationRequest::new(&path, 3).unwrap()).unwrap();
    let size = fs::metadata(&path).unwrap().len();
    let before = fs::read(&path).unwrap();

    // Regenerating with the measured size as target changes nothing
    let summary = generate(
        &GenerationRequest::new(&path, 3)
            .unwrap()
            .with_target_size(size),
    )
    .unwrap();

    assert_eq!(summary.decision, PaddingDecision::ExactMatch);
    assert_eq!(summary.final_size, size);
    let after = fs::read(&path).unwrap();
    assert_eq!(after.len(), before.len());
    assert!(after.ends_with(b"%%EOF\n"));
}

#[test]
fn over_target_warns_and_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "tiny_target.pdf");

    // ~104.86-byte target: the document itself is always larger
    let request = GenerationRequest::new(&path, 3)
        .unwrap()
        .with_target_size_mb(0.0001);
    let summary = generate(&request).unwrap();

    assert_eq!(summary.decision, PaddingDecision::AlreadyOverTarget);
    assert_eq!(summary.bytes_appended(), 0);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, summary.final_size);
    assert!(bytes.ends_with(b"%%EOF\n"));
    assert_eq!(count_page_objects(&bytes), 3);
}

#[test]
fn missing_output_directory_is_stream_open_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-subdir").join("out.pdf");

    let err = generate(&GenerationRequest::new(&path, 2).unwrap()).unwrap_err();
    assert!(matches!(err, PdfError::StreamOpen(_)));
    assert!(!path.exists());
}

#[test]
fn large_padding_request_is_chunked_correctly() {
    let dir = TempDir::new().unwrap();
    let path = output_path(&dir, "chunks.pdf");

    // Not a multiple of the 1024-byte chunk, exercising the tail write
    let request = GenerationRequest::new(&path, 1)
        .unwrap()
        .with_target_size(200_000);
    let summary = generate(&request).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 200_000);
    assert_eq!(summary.final_size, 200_000);
}
