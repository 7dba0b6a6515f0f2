use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AfterimageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AfterimageError::resource_unavailable("x")
            .to_string()
            .contains("resource unavailable:")
    );
    assert!(
        AfterimageError::dimension_mismatch("x")
            .to_string()
            .contains("dimension mismatch:")
    );
    assert!(
        AfterimageError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        AfterimageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AfterimageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: AfterimageError = serde_json::from_str::<u32>("not json").unwrap_err().into();
    assert!(matches!(err, AfterimageError::Serde(_)));
}
