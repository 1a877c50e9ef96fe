use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RavenError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(RavenError::render("x").to_string().contains("render error:"));
    assert!(RavenError::encode("x").to_string().contains("encode error:"));
    assert!(
        RavenError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RavenError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
