use crate::archive::*;
use crate::types::ArchiveFormat;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a valid ZIP archive containing the given files
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Create a valid 7z archive from a source directory using sevenz_rust
fn create_7z_archive(archive_path: &Path, source_dir: &Path) {
    sevenz_rust::compress_to_path(source_dir, archive_path).unwrap();
}

/// Write a zip whose central directory claims two 2^63-byte members.
///
/// `ZipWriter` only emits truthful sizes, so the headers are laid out by
/// hand: stored entries with no data, `0xFFFFFFFF` size sentinels, and the
/// declared size carried in a Zip64 (`0x0001`) extra field.
fn create_forged_zip64_archive(archive_path: &Path) {
    const DECLARED_SIZE: u64 = 1 << 63;
    let names: [&[u8]; 2] = [b"a.bin", b"b.bin"];
    let mut bytes: Vec<u8> = Vec::new();
    let mut local_offsets = [0u32; 2];

    for (index, name) in names.iter().enumerate() {
        local_offsets[index] = bytes.len() as u32;
        bytes.extend_from_slice(&[0x50, 0x4b, 0x03, 0x04]); // local header signature
        bytes.extend_from_slice(&45u16.to_le_bytes()); // version needed
        bytes.extend_from_slice(&[0u8; 8]); // flags, method, mod time, mod date
        bytes.extend_from_slice(&0u32.to_le_bytes()); // crc32
        bytes.extend_from_slice(&0u32.to_le_bytes()); // compressed size
        bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // uncompressed size sentinel
        bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes()); // extra length
        bytes.extend_from_slice(name);
    }

    let central_dir_offset = bytes.len() as u32;
    for (index, name) in names.iter().enumerate() {
        bytes.extend_from_slice(&[0x50, 0x4b, 0x01, 0x02]); // central header signature
        bytes.extend_from_slice(&45u16.to_le_bytes()); // version made by
        bytes.extend_from_slice(&45u16.to_le_bytes()); // version needed
        bytes.extend_from_slice(&[0u8; 8]); // flags, method, mod time, mod date
        bytes.extend_from_slice(&0u32.to_le_bytes()); // crc32
        bytes.extend_from_slice(&0u32.to_le_bytes()); // compressed size
        bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // uncompressed size sentinel
        bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&12u16.to_le_bytes()); // extra field length
        bytes.extend_from_slice(&[0u8; 6]); // comment length, disk start, internal attrs
        bytes.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        bytes.extend_from_slice(&local_offsets[index].to_le_bytes());
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&1u16.to_le_bytes()); // Zip64 extra field tag
        bytes.extend_from_slice(&8u16.to_le_bytes()); // extra payload length
        bytes.extend_from_slice(&DECLARED_SIZE.to_le_bytes());
    }

    let central_dir_size = bytes.len() as u32 - central_dir_offset;
    bytes.extend_from_slice(&[0x50, 0x4b, 0x05, 0x06]); // end of central directory
    bytes.extend_from_slice(&[0u8; 4]); // disk numbers
    bytes.extend_from_slice(&2u16.to_le_bytes()); // entries on this disk
    bytes.extend_from_slice(&2u16.to_le_bytes()); // entries total
    bytes.extend_from_slice(&central_dir_size.to_le_bytes());
    bytes.extend_from_slice(&central_dir_offset.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes()); // comment length
    std::fs::write(archive_path, bytes).unwrap();
}

/// Unwrap a refused outcome, panicking on extraction
fn refusal(outcome: ArchiveReadOutcome) -> ArchiveRefusal {
    match outcome {
        ArchiveReadOutcome::Refused(refusal) => refusal,
        ArchiveReadOutcome::Extracted(_) => panic!("expected a refusal, archive was extracted"),
    }
}

// ===========================================================================
// Backend summarize/extract
// ===========================================================================

#[test]
fn zip_summarize_reports_member_names_and_total_size() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.zip");
    create_zip_archive(
        &archive_path,
        &[
            ("game/meta.yaml", b"Title: Example"),
            ("game/content/game.swf", b"\x00\x01\x02\x03\x04"),
        ],
    );

    let summary = ZipReader::summarize(&archive_path).unwrap();
    assert_eq!(summary.members.len(), 2);
    assert!(summary.members.contains(&"game/meta.yaml".to_string()));
    assert!(summary.members.contains(&"game/content/game.swf".to_string()));
    assert_eq!(summary.total_uncompressed_bytes, 14 + 5);
}

#[test]
fn zip_summarize_includes_directory_entries() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.zip");

    let file = std::fs::File::create(&archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    writer.add_directory("game/content/", options).unwrap();
    writer.start_file("game/meta.yaml", options).unwrap();
    std::io::Write::write_all(&mut writer, b"Title: X").unwrap();
    writer.finish().unwrap();

    let summary = ZipReader::summarize(&archive_path).unwrap();
    assert!(summary.members.contains(&"game/content/".to_string()));
    assert!(summary.members.contains(&"game/meta.yaml".to_string()));
}

#[test]
fn zip_summarize_saturates_forged_declared_sizes() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("forged.zip");
    create_forged_zip64_archive(&archive_path);

    let summary = ZipReader::summarize(&archive_path).unwrap();
    assert_eq!(summary.members.len(), 2);
    assert_eq!(
        summary.total_uncompressed_bytes,
        u64::MAX,
        "two 2^63 declarations must saturate, not wrap to zero"
    );
}

#[test]
fn zip_summarize_corrupt_archive_returns_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("corrupt.zip");
    std::fs::write(&archive_path, b"not a zip file at all").unwrap();

    let result = ZipReader::summarize(&archive_path);
    assert!(result.is_err());
}

#[test]
fn zip_extract_writes_files_under_dest() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.zip");
    create_zip_archive(&archive_path, &[("game/meta.yaml", b"Title: Example")]);

    let dest = temp_dir.path().join("extracted");
    std::fs::create_dir_all(&dest).unwrap();
    ZipReader::extract(&archive_path, &dest).unwrap();

    let content = std::fs::read_to_string(dest.join("game").join("meta.yaml")).unwrap();
    assert_eq!(content, "Title: Example");
}

#[test]
fn zip_extract_rejects_traversal_member() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("evil.zip");
    create_zip_archive(&archive_path, &[("../evil.txt", b"escape attempt")]);

    let dest = temp_dir.path().join("extracted");
    std::fs::create_dir_all(&dest).unwrap();
    let result = ZipReader::extract(&archive_path, &dest);
    assert!(result.is_err(), "traversal member must fail the extraction");
    assert!(!temp_dir.path().join("evil.txt").exists());
}

#[test]
fn sevenz_summarize_and_extract_roundtrip() {
    let temp_dir = TempDir::new().unwrap();

    let src_dir = temp_dir.path().join("source");
    std::fs::create_dir_all(src_dir.join("game").join("content")).unwrap();
    std::fs::write(src_dir.join("game").join("meta.yaml"), b"Title: Example").unwrap();
    std::fs::write(
        src_dir.join("game").join("content").join("game.swf"),
        b"\x46\x57\x53",
    )
    .unwrap();

    let archive_path = temp_dir.path().join("curation.7z");
    create_7z_archive(&archive_path, &src_dir);

    let summary = SevenZipReader::summarize(&archive_path).unwrap();
    assert!(
        summary
            .members
            .iter()
            .any(|member| member.ends_with("meta.yaml")),
        "members should list meta.yaml, got: {:?}",
        summary.members
    );
    assert!(summary.total_uncompressed_bytes >= 14 + 3);

    let dest = temp_dir.path().join("extracted");
    std::fs::create_dir_all(&dest).unwrap();
    SevenZipReader::extract(&archive_path, &dest).unwrap();
    let content = std::fs::read_to_string(dest.join("game").join("meta.yaml")).unwrap();
    assert_eq!(content, "Title: Example");
}

#[test]
fn sevenz_summarize_corrupt_archive_returns_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("corrupt.7z");
    std::fs::write(&archive_path, b"this is not a valid 7z archive").unwrap();

    let result = SevenZipReader::summarize(&archive_path);
    assert!(result.is_err());
}

// ===========================================================================
// read_archive
// ===========================================================================

#[tokio::test]
async fn read_archive_refuses_rar_submission() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.rar");
    std::fs::write(&archive_path, b"Rar!").unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    assert_eq!(refusal(outcome), ArchiveRefusal::Rar);
}

#[tokio::test]
async fn read_archive_refuses_unknown_extension() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.tar");
    std::fs::write(&archive_path, b"data").unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    assert_eq!(refusal(outcome), ArchiveRefusal::UnsupportedExtension);
}

#[tokio::test]
async fn read_archive_extension_match_is_case_sensitive() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.ZIP");
    std::fs::write(&archive_path, b"data").unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    assert_eq!(refusal(outcome), ArchiveRefusal::UnsupportedExtension);
}

#[tokio::test]
async fn read_archive_refuses_corrupt_zip() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("corrupt.zip");
    std::fs::write(&archive_path, b"garbage bytes, no central directory").unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    assert_eq!(refusal(outcome), ArchiveRefusal::Corrupt(ArchiveFormat::Zip));
}

#[tokio::test]
async fn read_archive_refuses_missing_file_as_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("never_written.7z");

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    assert_eq!(
        refusal(outcome),
        ArchiveRefusal::Corrupt(ArchiveFormat::SevenZip)
    );
}

#[tokio::test]
async fn read_archive_refuses_oversized_archive_before_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("big.zip");
    create_zip_archive(
        &archive_path,
        &[("game/content/huge.bin", [0u8; 100].as_slice())],
    );

    let scratch_parent = temp_dir.path().join("scratch");
    std::fs::create_dir_all(&scratch_parent).unwrap();

    let outcome = read_archive(&archive_path, 10, Some(&scratch_parent))
        .await
        .unwrap();
    assert_eq!(
        refusal(outcome),
        ArchiveRefusal::Oversized {
            actual_bytes: 100,
            limit_bytes: 10,
        }
    );

    // the ceiling check runs before any scratch directory is created
    assert_eq!(std::fs::read_dir(&scratch_parent).unwrap().count(), 0);
}

#[tokio::test]
async fn read_archive_refuses_forged_zip64_sizes_as_oversized() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("forged.zip");
    create_forged_zip64_archive(&archive_path);

    let outcome = read_archive(&archive_path, 50_000_000_000, None)
        .await
        .unwrap();
    assert_eq!(
        refusal(outcome),
        ArchiveRefusal::Oversized {
            actual_bytes: u64::MAX,
            limit_bytes: 50_000_000_000,
        }
    );
}

#[tokio::test]
async fn read_archive_extracts_valid_zip_and_removes_scratch_on_drop() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("curation.zip");
    create_zip_archive(
        &archive_path,
        &[
            ("game/meta.yaml", b"Title: Example"),
            ("game/content/game.swf", b"FWS"),
        ],
    );

    let scratch_parent = temp_dir.path().join("scratch");
    std::fs::create_dir_all(&scratch_parent).unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, Some(&scratch_parent))
        .await
        .unwrap();
    let extracted = match outcome {
        ArchiveReadOutcome::Extracted(extracted) => extracted,
        other => panic!("expected extraction, got: {other:?}"),
    };

    assert_eq!(extracted.format, ArchiveFormat::Zip);
    assert!(extracted.members.contains(&"game/meta.yaml".to_string()));
    assert!(extracted.root().join("game").join("meta.yaml").is_file());
    assert!(extracted.root().starts_with(&scratch_parent));

    drop(extracted);
    assert_eq!(
        std::fs::read_dir(&scratch_parent).unwrap().count(),
        0,
        "scratch directory must be removed once the handle drops"
    );
}

#[tokio::test]
async fn read_archive_extracts_valid_7z() {
    let temp_dir = TempDir::new().unwrap();

    let src_dir = temp_dir.path().join("source");
    std::fs::create_dir_all(src_dir.join("game")).unwrap();
    std::fs::write(src_dir.join("game").join("meta.yaml"), b"Title: Example").unwrap();

    let archive_path = temp_dir.path().join("curation.7z");
    create_7z_archive(&archive_path, &src_dir);

    let outcome = read_archive(&archive_path, u64::MAX, None).await.unwrap();
    let extracted = match outcome {
        ArchiveReadOutcome::Extracted(extracted) => extracted,
        other => panic!("expected extraction, got: {other:?}"),
    };

    assert_eq!(extracted.format, ArchiveFormat::SevenZip);
    assert!(extracted.root().join("game").join("meta.yaml").is_file());
}

#[tokio::test]
async fn read_archive_traversal_zip_is_corrupt_and_leaves_no_scratch() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("evil.zip");
    create_zip_archive(&archive_path, &[("../evil.txt", b"escape attempt")]);

    let scratch_parent = temp_dir.path().join("scratch");
    std::fs::create_dir_all(&scratch_parent).unwrap();

    let outcome = read_archive(&archive_path, u64::MAX, Some(&scratch_parent))
        .await
        .unwrap();
    assert_eq!(refusal(outcome), ArchiveRefusal::Corrupt(ArchiveFormat::Zip));
    assert_eq!(
        std::fs::read_dir(&scratch_parent).unwrap().count(),
        0,
        "failed extraction must not leave scratch directories behind"
    );
}

// ===========================================================================
// nested_archive_names
// ===========================================================================

#[test]
fn nested_archive_names_lists_inner_archives() {
    let members = vec![
        "batch/first.7z".to_string(),
        "batch/second.zip".to_string(),
        "batch/readme.txt".to_string(),
    ];
    assert_eq!(
        nested_archive_names(&members),
        vec!["batch/first.7z".to_string(), "batch/second.zip".to_string()]
    );
}

#[test]
fn nested_archive_names_empty_for_flat_curation() {
    let members = vec![
        "game/meta.yaml".to_string(),
        "game/content/game.swf".to_string(),
    ];
    assert!(nested_archive_names(&members).is_empty());
}

// ===========================================================================
// sum_declared_sizes
// ===========================================================================

#[test]
fn declared_size_sum_saturates_instead_of_wrapping() {
    assert_eq!(sum_declared_sizes([10, 20, 30]), 60);
    assert_eq!(sum_declared_sizes([1u64 << 63, 1u64 << 63]), u64::MAX);
    assert_eq!(sum_declared_sizes([u64::MAX, 1]), u64::MAX);
    assert_eq!(sum_declared_sizes([]), 0);
}
