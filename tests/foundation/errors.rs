//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use astrolabe_foundation::{EmpireId, Error, ErrorContext, ErrorKind, ObjectId};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_object_not_found() {
    let err = Error::object_not_found(ObjectId::new(42));
    assert!(matches!(err.kind, ErrorKind::ObjectNotFound(_)));
    assert!(format!("{err}").contains("42"));
}

#[test]
fn error_unknown_empire() {
    let err = Error::unknown_empire(EmpireId::new(7));
    assert!(matches!(err.kind, ErrorKind::UnknownEmpire(_)));
    assert!(format!("{err}").contains('7'));
}

#[test]
fn error_unknown_species() {
    let err = Error::unknown_species("SP_HUMAN");
    assert!(matches!(err.kind, ErrorKind::UnknownSpecies(_)));
    assert!(format!("{err}").contains("SP_HUMAN"));
}

#[test]
fn error_cyclic_resolution() {
    let err = Error::cyclic_resolution("BLD_LOOP");
    assert!(matches!(err.kind, ErrorKind::CyclicResolution(_)));
    assert_eq!(format!("{err}"), "cyclic content resolution: BLD_LOOP");
}

#[test]
fn error_invalid_topology() {
    let err = Error::invalid_topology("starlane from system 3 to itself");
    assert!(matches!(err.kind, ErrorKind::InvalidTopology(_)));
    assert!(format!("{err}").contains("system 3"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_optional() {
    let err = Error::missing_candidate("target");
    assert!(err.context.is_none());
}

#[test]
fn context_records_node_and_candidate() {
    let err = Error::type_mismatch("number", "string").with_context(
        ErrorContext::new()
            .with_node("ValueTest")
            .with_candidate(ObjectId::new(3))
            .with_frame("And"),
    );
    let ctx = err.context.expect("context attached");
    assert_eq!(ctx.node.as_deref(), Some("ValueTest"));
    assert_eq!(ctx.candidate, Some(ObjectId::new(3)));
    assert_eq!(ctx.stack, vec!["And".to_owned()]);

    let text = format!("{ctx}");
    assert!(text.starts_with("in ValueTest for candidate 3"));
    assert!(text.contains("within And"));
}
