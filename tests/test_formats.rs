mod common;

use std::fs::File;
use std::io::Read;

use common::{MODE_BLOB, MODE_BLOB_EXEC, MODE_LINK, MODE_TREE};
use gitarc::attrs::NoAttributes;
use gitarc::convert::Identity;
use gitarc::subst::PlaceholderFormatter;
use gitarc::{lookup_format, new_writer, write_archive, ArchiveRequest, ObjectStore, WriterOptions};

const MTIME: i64 = 1_700_000_000;

/// Small mixed-mode repo: a file, an executable, a symlink, one subtree.
fn sample_repo(dir: &std::path::Path) -> (ObjectStore, gix::ObjectId) {
    let repo = common::init_bare(dir);
    let readme = common::blob(&repo, b"hello\n");
    let run = common::blob(&repo, b"#!/bin/sh\n");
    let link = common::blob(&repo, b"README");
    let bin = common::tree(&repo, &[("run", MODE_BLOB_EXEC, run)]);
    let root = common::tree(
        &repo,
        &[
            ("README", MODE_BLOB, readme),
            ("bin", MODE_TREE, bin),
            ("link", MODE_LINK, link),
        ],
    );
    (ObjectStore::open(dir).unwrap(), root)
}

fn write_format(format: &str, out_path: &std::path::Path, store: &ObjectStore, root: gix::ObjectId) {
    let format = lookup_format(format).unwrap();
    let file = File::create(out_path).unwrap();
    let mut writer = new_writer(
        format,
        Box::new(file),
        WriterOptions {
            compression_level: None,
            mtime: MTIME,
        },
    )
    .unwrap();

    let mut request = ArchiveRequest::new(root);
    request.prefix = "proj/".to_string();
    write_archive(
        store,
        &request,
        &NoAttributes,
        &Identity,
        &PlaceholderFormatter,
        writer.as_mut(),
    )
    .unwrap();
}

fn collect_tar<R: Read>(reader: R) -> Vec<(String, u8, u32, u64, Vec<u8>)> {
    let mut archive = tar::Archive::new(reader);
    archive
        .entries()
        .unwrap()
        .map(|e| {
            let mut e = e.unwrap();
            let path = e.path().unwrap().to_string_lossy().into_owned();
            let kind = e.header().entry_type().as_byte();
            let mode = e.header().mode().unwrap();
            let mtime = e.header().mtime().unwrap();
            let mut content = Vec::new();
            e.read_to_end(&mut content).unwrap();
            (path, kind, mode, mtime, content)
        })
        .collect()
}

#[test]
fn tar_archive_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = sample_repo(&dir.path().join("repo"));
    let out = dir.path().join("out.tar");
    write_format("tar", &out, &store, root);

    let entries = collect_tar(File::open(&out).unwrap());
    let paths: Vec<&str> = entries.iter().map(|e| e.0.as_str()).collect();
    assert_eq!(
        paths,
        vec!["proj/", "proj/README", "proj/bin/", "proj/bin/run", "proj/link"]
    );

    let readme = &entries[1];
    assert_eq!(readme.2, 0o644);
    assert_eq!(readme.3, MTIME as u64);
    assert_eq!(readme.4, b"hello\n");

    let run = &entries[3];
    assert_eq!(run.1, b'0');
    assert_eq!(run.2, 0o755);

    // Symlinks carry their target in the link-name field, not as content.
    let link = &entries[4];
    assert_eq!(link.1, b'2');
    assert!(link.4.is_empty());
}

#[test]
fn tar_symlink_target_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = sample_repo(&dir.path().join("repo"));
    let out = dir.path().join("out.tar");
    write_format("tar", &out, &store, root);

    let mut archive = tar::Archive::new(File::open(&out).unwrap());
    let link = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap())
        .find(|e| e.path().unwrap().to_string_lossy() == "proj/link")
        .unwrap();
    let target = link.link_name().unwrap().unwrap();
    assert_eq!(target.to_string_lossy(), "README");
}

#[test]
fn tar_gz_archive_is_gzipped_tar() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = sample_repo(&dir.path().join("repo"));
    let out = dir.path().join("out.tar.gz");
    write_format("tar.gz", &out, &store, root);

    let mut raw = Vec::new();
    File::open(&out).unwrap().read_to_end(&mut raw).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let entries = collect_tar(flate2::read::GzDecoder::new(&raw[..]));
    let paths: Vec<&str> = entries.iter().map(|e| e.0.as_str()).collect();
    assert_eq!(
        paths,
        vec!["proj/", "proj/README", "proj/bin/", "proj/bin/run", "proj/link"]
    );
    assert_eq!(entries[1].4, b"hello\n");
}

#[test]
fn zip_archive_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = sample_repo(&dir.path().join("repo"));
    let out = dir.path().join("out.zip");
    write_format("zip", &out, &store, root);

    let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();

    let mut content = Vec::new();
    archive
        .by_name("proj/README")
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, b"hello\n");

    let run = archive.by_name("proj/bin/run").unwrap();
    assert_eq!(run.unix_mode().map(|m| m & 0o777), Some(0o755));
    drop(run);

    // Symlink entries record the target as content with link mode bits.
    let mut link = archive.by_name("proj/link").unwrap();
    assert_eq!(link.unix_mode(), Some(0o120777));
    let mut target = Vec::new();
    link.read_to_end(&mut target).unwrap();
    assert_eq!(target, b"README");
}

#[test]
fn zip_contains_directory_entries() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = sample_repo(&dir.path().join("repo"));
    let out = dir.path().join("out.zip");
    write_format("zip", &out, &store, root);

    let archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"proj/"));
    assert!(names.contains(&"proj/bin/"));
}
