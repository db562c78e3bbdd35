//! Integration tests for morpho-types.

use morpho_types::constants::{BAD_TET_VOLUME_THRESHOLD, COLLINEARITY_THRESHOLD, EPSILON, VERY_BIG};
use morpho_types::{MorphoError, MorphoResult};

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = MorphoError::InvalidMesh("tet 12 references vertex 900".into());
    assert!(err.to_string().contains("vertex 900"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
    let err: MorphoError = io.into();
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn result_alias_propagates() {
    fn inner() -> MorphoResult<u32> {
        Err(MorphoError::NotInitialized)
    }
    fn outer() -> MorphoResult<u32> {
        let v = inner()?;
        Ok(v + 1)
    }
    assert!(matches!(outer(), Err(MorphoError::NotInitialized)));
}

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn thresholds_are_ordered() {
    assert!(COLLINEARITY_THRESHOLD < 1.0);
    assert!(EPSILON > 0.0 && EPSILON < BAD_TET_VOLUME_THRESHOLD * 1.0e3);
    assert!(VERY_BIG > 1.0);
}
