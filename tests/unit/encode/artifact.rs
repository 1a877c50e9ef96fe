use super::*;

fn chunk(bytes: &[u8]) -> EncodedChunk {
    EncodedChunk {
        bytes: bytes.to_vec(),
    }
}

#[test]
fn chunks_are_concatenated_in_order() {
    let a = MediaArtifact::from_chunks("video/webm", &[chunk(b"ab"), chunk(b""), chunk(b"cde")]);
    assert_eq!(a.bytes(), b"abcde");
    assert_eq!(a.chunk_count(), 3);
    assert_eq!(a.len(), 5);
    assert!(!a.is_empty());
    assert_eq!(a.media_type(), "video/webm");
}

#[test]
fn suggested_name_follows_media_type() {
    let webm = MediaArtifact::from_chunks(WEBM_MEDIA_TYPE, &[]);
    assert_eq!(webm.suggested_file_name(), "raven-transition.webm");
    let raw = MediaArtifact::from_chunks(RAW_RGBA_MEDIA_TYPE, &[]);
    assert_eq!(raw.suggested_file_name(), "raven-transition.rgba");
    let other = MediaArtifact::from_chunks("application/octet-stream", &[]);
    assert_eq!(other.suggested_file_name(), "raven-transition.bin");
    assert!(other.is_empty());
}

#[test]
fn write_to_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out/clip.webm");
    let a = MediaArtifact::from_chunks(WEBM_MEDIA_TYPE, &[chunk(b"webm!")]);
    a.write_to(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"webm!");
}
