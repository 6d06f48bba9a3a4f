//! Domain-specific assertions

use weavegraph_ir::features::compilation::{Transformation, TransformationKind};
use weavegraph_ir::pipeline::WeaveResult;
use weavegraph_ir::shared::models::DiagnosticKind;

/// Assert that the weave reported no diagnostics and rolled nothing back
pub fn assert_clean(result: &WeaveResult) {
    assert!(
        result.diagnostics.is_empty(),
        "Expected no diagnostics, got: {:?}",
        result.diagnostics
    );
    assert!(
        result.rolled_back.is_empty(),
        "Expected no rollback, got: {:?}",
        result.rolled_back
    );
}

/// Assert that exactly one diagnostic was reported and return its kind
pub fn single_diagnostic(result: &WeaveResult) -> &DiagnosticKind {
    assert_eq!(
        result.diagnostics.len(),
        1,
        "Expected one diagnostic, got: {:?}",
        result.diagnostics
    );
    &result.diagnostics[0].kind
}

/// Kind names of the log, in order
pub fn kind_names(log: &[std::sync::Arc<Transformation>]) -> Vec<&'static str> {
    log.iter().map(|t| t.kind.name()).collect()
}

/// Assert that orders are strictly increasing
pub fn assert_strictly_ordered(log: &[std::sync::Arc<Transformation>]) {
    for pair in log.windows(2) {
        assert!(
            pair[0].order < pair[1].order,
            "order {} followed by {}",
            pair[0].order,
            pair[1].order
        );
    }
}

/// Transformations of the given kind name
pub fn of_kind<'a>(
    log: &'a [std::sync::Arc<Transformation>],
    name: &str,
) -> Vec<&'a TransformationKind> {
    log.iter()
        .filter(|t| t.kind.name() == name)
        .map(|t| &t.kind)
        .collect()
}
