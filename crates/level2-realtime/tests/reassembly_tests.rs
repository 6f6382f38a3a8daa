//! Reassembly properties: archive equivalence, completeness, gaps.

use bytes::Bytes;
use level2_common::{Moment, VolumeIndex};
use level2_decode::decode_record;
use level2_realtime::{reassemble_chunks, Chunk, ChunkIdentifier, ReassemblyError, VolumeStore};
use test_utils::{ChunkFixture, VolumeFixture};

fn to_chunks(fixtures: Vec<ChunkFixture>) -> Vec<Chunk> {
    let volume = VolumeIndex::new(42).unwrap();
    fixtures
        .into_iter()
        .map(|f| {
            Chunk::new(
                ChunkIdentifier::new("KDMX".to_string(), volume, f.name),
                Bytes::from(f.payload),
            )
        })
        .collect()
}

#[test]
fn complete_chunk_set_matches_archive_decode() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.5, 0.9, 1.3], 6, 24);

    let archive = decode_record(&fixture.archive_bytes()).expect("archive decode");
    let (live, is_complete) = reassemble_chunks(&to_chunks(fixture.chunks())).expect("reassembly");

    assert!(is_complete);
    assert!(
        live.approx_eq(&archive, 1e-6),
        "live volume must equal the archived volume"
    );
}

#[test]
fn chunk_order_does_not_matter() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9, 1.3], 4, 16);
    let mut chunks = to_chunks(fixture.chunks());
    chunks.reverse();

    let (live, is_complete) = reassemble_chunks(&chunks).expect("reassembly");
    let archive = decode_record(&fixture.archive_bytes()).expect("archive decode");

    assert!(is_complete);
    assert!(live.equivalent(&archive));
}

#[test]
fn missing_end_chunk_is_incomplete_not_an_error() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9, 1.3], 4, 16);
    let mut chunks = to_chunks(fixture.chunks());
    chunks.pop(); // drop the End chunk

    let (partial, is_complete) = reassemble_chunks(&chunks).expect("partial reassembly");
    assert!(!is_complete);
    // The first two sweeps are fully transmitted and decodable.
    assert_eq!(partial.sweeps(&Moment::Reflectivity).len(), 2);
}

#[test]
fn sequence_gap_is_fatal() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9, 1.3, 1.8], 4, 16);
    let mut chunks = to_chunks(fixture.chunks());
    chunks.remove(1); // drop an intermediate chunk

    let err = reassemble_chunks(&chunks).expect_err("gap must fail");
    match err {
        ReassemblyError::SequenceGap { expected, found } => {
            assert_eq!(expected, 2);
            assert_eq!(found, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn end_chunk_must_be_last() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9, 1.3], 4, 16);
    let mut fixtures = fixture.chunks();
    // Corrupt the roles so the End chunk sits mid-sequence: S, E, I.
    fixtures[1].name = "20240309-120000-002-E".to_string();
    fixtures[2].name = "20240309-120000-003-I".to_string();

    let err = reassemble_chunks(&to_chunks(fixtures)).expect_err("must fail");
    match err {
        ReassemblyError::InvalidChunkName(name) => {
            assert_eq!(name, "20240309-120000-003-I");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_start_chunk_is_incomplete() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9], 4, 16);
    let mut chunks = to_chunks(fixture.chunks());
    chunks.remove(0);

    let err = reassemble_chunks(&chunks).expect_err("must fail");
    assert!(matches!(err, ReassemblyError::IncompleteVolume { .. }));
}

#[test]
fn empty_chunk_set_is_incomplete() {
    let err = reassemble_chunks(&[]).expect_err("must fail");
    assert!(matches!(err, ReassemblyError::IncompleteVolume { .. }));
}

#[tokio::test]
async fn store_publishes_incremental_snapshots() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9, 1.3], 4, 16);
    let chunks = to_chunks(fixture.chunks());
    let index = VolumeIndex::new(7).unwrap();
    let store = VolumeStore::new();

    // First two chunks: partial volume.
    let partial = store.update(index, &chunks[..2]).await.expect("partial");
    assert!(!partial.is_complete);
    assert_eq!(partial.chunk_count, 2);
    assert!(store.expected_next().await.is_none());

    // Full set: replaces the partial snapshot and advances the feed.
    let complete = store.update(index, &chunks).await.expect("complete");
    assert!(complete.is_complete);
    assert_eq!(store.expected_next().await, Some(VolumeIndex::new(8).unwrap()));

    let published = store.get(index).await.expect("published");
    assert!(published.is_complete);
    assert!(published.volume.equivalent(&complete.volume));
}

#[tokio::test]
async fn store_wraps_expected_volume_at_999() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9], 4, 16);
    let chunks = to_chunks(fixture.chunks());
    let store = VolumeStore::new();

    let index = VolumeIndex::new(999).unwrap();
    store.update(index, &chunks).await.expect("update");
    assert_eq!(store.expected_next().await, Some(VolumeIndex::new(1).unwrap()));
}

#[tokio::test]
async fn store_updates_different_volumes_independently() {
    let fixture = VolumeFixture::two_moment(&[0.5, 0.9], 4, 16);
    let chunks = to_chunks(fixture.chunks());
    let store = std::sync::Arc::new(VolumeStore::new());

    let a = {
        let store = store.clone();
        let chunks = chunks.clone();
        tokio::spawn(async move {
            store
                .update(VolumeIndex::new(10).unwrap(), &chunks)
                .await
                .expect("volume 10")
        })
    };
    let b = {
        let store = store.clone();
        let chunks = chunks.clone();
        tokio::spawn(async move {
            store
                .update(VolumeIndex::new(11).unwrap(), &chunks)
                .await
                .expect("volume 11")
        })
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a.is_complete && b.is_complete);

    assert!(store.get(VolumeIndex::new(10).unwrap()).await.is_some());
    assert!(store.get(VolumeIndex::new(11).unwrap()).await.is_some());
    assert!(store.evict(VolumeIndex::new(10).unwrap()).await);
    assert!(store.get(VolumeIndex::new(10).unwrap()).await.is_none());
}
