//! PAK reader tests over synthetic archives.
//!
//! Fixtures are wire-format byte buffers built in memory: an optional data
//! region, the index, then the version-appropriate footer.

use std::io::Cursor;

use ue_container_reader::pak::{Block, Compression, Version, MAGIC};
use ue_container_reader::{Error, PakReader};

struct FooterFixture {
    version: Version,
    index_offset: u64,
    index_size: u64,
    encrypted: bool,
    encryption_guid: u128,
    compression_names: &'static [&'static str],
}

impl FooterFixture {
    fn new(version: Version, index_offset: u64, index_size: u64) -> Self {
        FooterFixture {
            version,
            index_offset,
            index_size,
            encrypted: false,
            encryption_guid: 0,
            compression_names: match version.compression_name_count() {
                0 => &[],
                4 => &["Zlib", "Oodle", "", ""],
                _ => &["Zlib", "Gzip", "Oodle", "Zstd", "LZ4"],
            },
        }
    }
}

fn write_footer(out: &mut Vec<u8>, fixture: &FooterFixture) {
    let start = out.len();
    if fixture.version.has_encryption_guid() {
        out.extend_from_slice(&fixture.encryption_guid.to_le_bytes());
    }
    if fixture.version.has_encrypted_flag() {
        out.push(fixture.encrypted as u8);
    }
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&u32::from(fixture.version.major()).to_le_bytes());
    out.extend_from_slice(&fixture.index_offset.to_le_bytes());
    out.extend_from_slice(&fixture.index_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 20]); // index hash
    if fixture.version.has_frozen_flag() {
        out.push(0);
    }
    for slot in 0..fixture.version.compression_name_count() {
        let mut name = [0u8; 32];
        let text = fixture.compression_names.get(slot).copied().unwrap_or("");
        name[..text.len()].copy_from_slice(text.as_bytes());
        out.extend_from_slice(&name);
    }
    assert_eq!(
        (out.len() - start) as u64,
        fixture.version.footer_size(),
        "footer builder out of sync for {}",
        fixture.version
    );
}

fn write_string(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(&(text.len() as i32 + 1).to_le_bytes());
    out.extend_from_slice(text.as_bytes());
    out.push(0);
}

fn write_utf16_string(out: &mut Vec<u8>, text: &str) {
    let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    out.extend_from_slice(&(-(units.len() as i32)).to_le_bytes());
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

struct EntryFixture {
    uncompressed_size: u64,
    /// On-the-wire slot value: 0 = uncompressed, v = footer slot v - 1.
    compression_wire: u32,
    timestamp: u64,
    blocks: &'static [(u64, u64)],
    flags: u8,
    compression_block_size: u32,
}

impl EntryFixture {
    fn stored(uncompressed_size: u64) -> Self {
        EntryFixture {
            uncompressed_size,
            compression_wire: 0,
            timestamp: 0,
            blocks: &[],
            flags: 0,
            compression_block_size: 0,
        }
    }
}

fn write_entry(out: &mut Vec<u8>, version: Version, fixture: &EntryFixture) {
    out.extend_from_slice(&0u64.to_le_bytes()); // offset
    out.extend_from_slice(&fixture.uncompressed_size.to_le_bytes()); // compressed size
    out.extend_from_slice(&fixture.uncompressed_size.to_le_bytes());
    if version == Version::V8A {
        out.push(fixture.compression_wire as u8);
    } else {
        out.extend_from_slice(&fixture.compression_wire.to_le_bytes());
    }
    if version.has_timestamps() {
        out.extend_from_slice(&fixture.timestamp.to_le_bytes());
    }
    out.extend_from_slice(&[0u8; 20]); // content hash
    if version.has_compression_blocks() && fixture.compression_wire != 0 {
        out.extend_from_slice(&(fixture.blocks.len() as u32).to_le_bytes());
        for (start, end) in fixture.blocks {
            out.extend_from_slice(&start.to_le_bytes());
            out.extend_from_slice(&end.to_le_bytes());
        }
    }
    if version.has_compression_blocks() {
        out.push(fixture.flags);
        out.extend_from_slice(&fixture.compression_block_size.to_le_bytes());
    }
}

/// Assemble a legacy-index archive: `[index][footer]`.
fn build_legacy_pak(version: Version, mount_point: &str, files: &[(&str, EntryFixture)]) -> Vec<u8> {
    assert!(
        !version.has_path_hash_index(),
        "legacy builder used for split-index {version}"
    );
    let mut index = Vec::new();
    write_string(&mut index, mount_point);
    index.extend_from_slice(&(files.len() as u32).to_le_bytes());
    for (path, entry) in files {
        write_string(&mut index, path);
        write_entry(&mut index, version, entry);
    }

    let mut out = Vec::new();
    let fixture = FooterFixture::new(version, 0, index.len() as u64);
    out.extend_from_slice(&index);
    write_footer(&mut out, &fixture);
    out
}

fn open(bytes: &[u8]) -> ue_container_reader::Result<PakReader> {
    PakReader::from_reader(&mut Cursor::new(bytes))
}

#[test]
fn empty_v11_archive_opens() {
    let mut bytes = Vec::new();
    write_footer(&mut bytes, &FooterFixture::new(Version::V11, 0, 0));

    let pak = open(&bytes).expect("open empty v11 archive");
    assert_eq!(pak.version(), Version::V11);
    assert!(!pak.encrypted_index());
    assert!(pak.files().is_empty(), "no files expected");
    assert!(pak.directories().is_empty(), "no directories expected");
}

#[test]
fn v5_archive_lists_files_and_directories() {
    let files = [
        ("a/b.uasset", EntryFixture::stored(100)),
        ("a/b.uexp", EntryFixture::stored(200)),
        ("c/d.umap", EntryFixture::stored(300)),
    ];
    let bytes = build_legacy_pak(Version::V5, "../../../", &files);

    let pak = open(&bytes).expect("open v5 archive");
    assert_eq!(pak.version(), Version::V5);
    assert_eq!(pak.mount_point(), "../../../");
    assert_eq!(pak.files(), vec!["a/b.uasset", "a/b.uexp", "c/d.umap"]);
    assert_eq!(pak.directories(), ["a", "c"]);
    assert_eq!(
        pak.entry("a/b.uexp").expect("entry present").uncompressed_size,
        200
    );
    assert!(pak.entry("missing").is_none());
}

#[test]
fn v3_compressed_entry_carries_blocks() {
    let files = [(
        "packed/data.bin",
        EntryFixture {
            uncompressed_size: 350,
            compression_wire: 2, // slot 1 = Gzip in the synthesized table
            timestamp: 0,
            blocks: &[(100, 200), (200, 350)],
            flags: 1,
            compression_block_size: 0x10000,
        },
    )];
    let bytes = build_legacy_pak(Version::V3, "../../../", &files);

    let pak = open(&bytes).expect("open v3 archive");
    let entry = pak.entry("packed/data.bin").expect("entry present");
    assert_eq!(entry.compression_slot, Some(1));
    assert_eq!(pak.footer().compression[1], Some(Compression::Gzip));
    assert_eq!(
        entry.blocks.as_deref(),
        Some(&[Block { start: 100, end: 200 }, Block { start: 200, end: 350 }][..])
    );
    assert_eq!(entry.flags, 1);
    assert!(entry.is_encrypted());
    assert!(!entry.is_deleted());
    assert_eq!(entry.compression_block_size, 0x10000);
}

#[test]
fn v1_entry_keeps_timestamp() {
    let files = [(
        "old/file.dat",
        EntryFixture {
            timestamp: 0x00C0_FFEE,
            ..EntryFixture::stored(64)
        },
    )];
    let bytes = build_legacy_pak(Version::V1, "../../../", &files);

    let pak = open(&bytes).expect("open v1 archive");
    assert_eq!(pak.version(), Version::V1);
    let entry = pak.entry("old/file.dat").expect("entry present");
    assert_eq!(entry.timestamp, Some(0x00C0_FFEE));
    assert!(entry.blocks.is_none());
}

#[test]
fn encrypted_index_is_refused_with_guid() {
    let guid = 0x0123_4567_89AB_CDEF_0011_2233_4455_6677u128;
    let mut bytes = vec![0u8; 16]; // stand-in for the encrypted index body
    let mut fixture = FooterFixture::new(Version::V11, 0, 16);
    fixture.encrypted = true;
    fixture.encryption_guid = guid;
    write_footer(&mut bytes, &fixture);

    match open(&bytes) {
        Err(Error::EncryptedContainer { encryption_guid }) => {
            assert_eq!(encryption_guid, Some(guid), "guid read before refusal");
        }
        other => panic!("expected EncryptedContainer, got {other:?}"),
    }
}

#[test]
fn footer_round_trips_for_every_version() {
    for version in Version::PROBE_ORDER {
        let mut fixture = FooterFixture::new(version, 0, 0);
        fixture.encryption_guid = 42;
        let mut bytes = Vec::new();
        write_footer(&mut bytes, &fixture);

        let pak = open(&bytes)
            .unwrap_or_else(|e| panic!("probe failed for {version}: {e}"));
        assert_eq!(pak.version(), version, "probe picked the wrong version");
        assert_eq!(pak.footer().magic, MAGIC);
        assert_eq!(
            pak.encryption_guid(),
            version.has_encryption_guid().then_some(42),
            "guid mismatch for {version}"
        );

        let expected: Vec<Option<Compression>> = match version.compression_name_count() {
            0 => vec![
                Some(Compression::Zlib),
                Some(Compression::Gzip),
                Some(Compression::Oodle),
            ],
            4 => vec![Some(Compression::Zlib), Some(Compression::Oodle), None, None],
            _ => vec![
                Some(Compression::Zlib),
                Some(Compression::Gzip),
                Some(Compression::Oodle),
                Some(Compression::Zstd),
                Some(Compression::Lz4),
            ],
        };
        assert_eq!(
            pak.footer().compression,
            expected,
            "compression table mismatch for {version}"
        );
    }
}

#[test]
fn utf16_mount_point_round_trips() {
    // Includes a non-BMP scalar to exercise surrogate-pair decoding.
    let mount = "data/😀/π";
    let mut index = Vec::new();
    write_utf16_string(&mut index, mount);
    index.extend_from_slice(&0u32.to_le_bytes()); // entry count
    index.extend_from_slice(&0u64.to_le_bytes()); // path hash seed
    index.extend_from_slice(&0u32.to_le_bytes()); // no path-hash index
    index.extend_from_slice(&0u32.to_le_bytes()); // no full directory index

    let mut bytes = index.clone();
    write_footer(
        &mut bytes,
        &FooterFixture::new(Version::V11, 0, index.len() as u64),
    );

    let pak = open(&bytes).expect("open v11 archive with UTF-16 mount point");
    assert_eq!(pak.mount_point(), mount);
    assert!(pak.files().is_empty());
}

#[test]
fn full_directory_index_builds_paths() {
    const INVALID: u32 = 0x8000_0000;

    // Referenced full-directory index sits at the start of the file.
    let mut fdi = Vec::new();
    fdi.extend_from_slice(&3u32.to_le_bytes());
    for (dir, files) in [
        ("/", vec![("root.txt", 1u32)]),
        ("a/", vec![("b.uasset", 2), ("dropped.bin", INVALID)]),
        ("c", vec![("d.umap", 3)]),
    ] {
        write_string(&mut fdi, dir);
        fdi.extend_from_slice(&(files.len() as u32).to_le_bytes());
        for (name, encoded_offset) in files {
            write_string(&mut fdi, name);
            fdi.extend_from_slice(&encoded_offset.to_le_bytes());
        }
    }

    let mut primary = Vec::new();
    write_string(&mut primary, "../../../");
    primary.extend_from_slice(&3u32.to_le_bytes()); // declared entry count
    primary.extend_from_slice(&0xFEEDu64.to_le_bytes()); // path hash seed
    primary.extend_from_slice(&1u32.to_le_bytes()); // path-hash index present
    primary.extend_from_slice(&0u64.to_le_bytes()); // its offset (body unused)
    primary.extend_from_slice(&0u64.to_le_bytes()); // its size
    primary.extend_from_slice(&[0u8; 20]);
    primary.extend_from_slice(&1u32.to_le_bytes()); // full directory index present
    primary.extend_from_slice(&0u64.to_le_bytes()); // fdi offset
    primary.extend_from_slice(&(fdi.len() as u64).to_le_bytes());
    primary.extend_from_slice(&[0u8; 20]);

    let mut bytes = fdi.clone();
    let index_offset = bytes.len() as u64;
    bytes.extend_from_slice(&primary);
    write_footer(
        &mut bytes,
        &FooterFixture::new(Version::V10, index_offset, primary.len() as u64),
    );

    let pak = open(&bytes).expect("open v10 archive");
    assert_eq!(pak.version(), Version::V10);
    assert_eq!(pak.files(), vec!["root.txt", "a/b.uasset", "c/d.umap"]);
    assert_eq!(pak.directories(), ["a", "c"]);
    // Physical descriptors live in an undecoded pool; listed entries are
    // placeholders.
    let entry = pak.entry("a/b.uasset").expect("entry present");
    assert_eq!(entry.uncompressed_size, 0);
    assert!(entry.compression_slot.is_none());
}

#[test]
fn duplicate_paths_keep_last_record() {
    let files = [
        ("x/y.z", EntryFixture::stored(1)),
        ("x/y.z", EntryFixture::stored(2)),
    ];
    let bytes = build_legacy_pak(Version::V5, "../../../", &files);

    let pak = open(&bytes).expect("open archive with duplicate path");
    assert_eq!(pak.files(), vec!["x/y.z"]);
    assert_eq!(pak.entry("x/y.z").expect("entry").uncompressed_size, 2);
}

#[test]
fn out_of_range_compression_slot_is_surfaced() {
    let files = [(
        "bad.bin",
        EntryFixture {
            compression_wire: 99,
            blocks: &[(0, 1)],
            ..EntryFixture::stored(1)
        },
    )];
    let bytes = build_legacy_pak(Version::V3, "../../../", &files);

    // Every candidate version fails; the probe must surface the deepest
    // failure (the v3 index decode), not whichever attempt ran last.
    match open(&bytes) {
        Err(Error::InvalidRecord(message)) => {
            assert!(
                message.contains("compression slot"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
}

#[test]
fn undersized_file_is_rejected() {
    let bytes = [0u8; 10];
    match open(&bytes) {
        Err(Error::Truncated { .. }) => {}
        other => panic!("expected Truncated, got {other:?}"),
    }
}
