//! Free-text and structured justification supersede each other

mod common;

use common::*;
use lineage_domain::{Authorizations, SourceInfo, Visibility};
use lineage_index::{Justification, ProvenanceError};

fn source_info(source: &str) -> SourceInfo {
    SourceInfo {
        source_element_id: source.to_string(),
        text_property_key: String::new(),
        text_property_name: Some(TEXT.to_string()),
        start_offset: 10,
        end_offset: 25,
        snippet: Some("Acme Corp".to_string()),
    }
}

#[test]
fn test_free_text_supersedes_structured() {
    let (index, _graph, _events) = memory_index(&["v1", "v2"]);
    let auths = no_auths();

    index
        .set_structured("v1", &source_info("v2"), &Visibility::empty(), &auths)
        .unwrap();
    assert_eq!(index.for_vertex_justification("v1", &auths).unwrap().len(), 1);

    index
        .set_free_text("v1", "Seen on the company website", &Visibility::empty(), &auths)
        .unwrap();
    assert!(index.for_vertex_justification("v1", &auths).unwrap().is_empty());
    assert_eq!(
        index.justification_text("v1", &auths).unwrap().as_deref(),
        Some("Seen on the company website")
    );
}

#[test]
fn test_structured_supersedes_free_text() {
    let (index, _graph, _events) = memory_index(&["v1", "v2"]);
    let auths = no_auths();

    index
        .set_free_text("v1", "hearsay", &Visibility::empty(), &auths)
        .unwrap();
    let record = index
        .set_structured("v1", &source_info("v2"), &Visibility::empty(), &auths)
        .unwrap();

    assert_eq!(index.justification_text("v1", &auths).unwrap(), None);
    let info = index.source_info_for_vertex("v1", &auths).unwrap().unwrap();
    assert_eq!(info, source_info("v2"));
    assert_eq!(index.resolve_source_element(&record, &auths).unwrap(), "v2");
}

#[test]
fn test_structured_replaces_previous_structured() {
    let (index, _graph, _events) = memory_index(&["v1", "v2", "v3"]);
    let auths = no_auths();

    index
        .set_structured("v1", &source_info("v2"), &Visibility::empty(), &auths)
        .unwrap();
    index
        .set_structured("v1", &source_info("v3"), &Visibility::empty(), &auths)
        .unwrap();

    let records = index.for_vertex_justification("v1", &auths).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(index.resolve_source_element(&records[0], &auths).unwrap(), "v3");
}

#[test]
fn test_both_prior_states_are_valid() {
    let (index, _graph, _events) = memory_index(&["v1", "v2"]);
    let auths = no_auths();

    // Nothing set before either call
    index
        .add_justification(
            "v1",
            &Justification::FreeText("first".to_string()),
            &Visibility::empty(),
            &auths,
        )
        .unwrap();
    index
        .add_justification(
            "v1",
            &Justification::FreeText("second".to_string()),
            &Visibility::empty(),
            &auths,
        )
        .unwrap();
    assert_eq!(index.justification_text("v1", &auths).unwrap().as_deref(), Some("second"));

    let record = index
        .add_justification(
            "v1",
            &Justification::Structured(source_info("v2")),
            &Visibility::empty(),
            &auths,
        )
        .unwrap();
    assert!(record.is_some());
    assert_eq!(index.justification_text("v1", &auths).unwrap(), None);
}

#[test]
fn test_free_text_visibility_applies() {
    let (index, _graph, _events) = memory_index(&["v1"]);
    let writer = Authorizations::new(["secret"]);

    index
        .set_free_text("v1", "classified", &Visibility::new("secret"), &writer)
        .unwrap();
    assert_eq!(index.justification_text("v1", &no_auths()).unwrap(), None);
    assert_eq!(
        index.justification_text("v1", &writer).unwrap().as_deref(),
        Some("classified")
    );
}

#[test]
fn test_structured_with_bad_span_changes_nothing() {
    let (index, _graph, _events) = memory_index(&["v1", "v2"]);
    let auths = no_auths();
    index
        .set_free_text("v1", "keep me", &Visibility::empty(), &auths)
        .unwrap();

    let mut bad = source_info("v2");
    bad.start_offset = -1;
    let err = index
        .set_structured("v1", &bad, &Visibility::empty(), &auths)
        .unwrap_err();
    assert!(matches!(err, ProvenanceError::Validation(_)));
    assert_eq!(index.justification_text("v1", &auths).unwrap().as_deref(), Some("keep me"));

    let bad_label = index
        .set_structured("v1", &source_info("v2"), &Visibility::new("a&"), &auths)
        .unwrap_err();
    assert!(matches!(bad_label, ProvenanceError::Validation(_)));
    assert_eq!(index.justification_text("v1", &auths).unwrap().as_deref(), Some("keep me"));

    let missing_source = index
        .set_structured("v1", &source_info("ghost"), &Visibility::empty(), &auths)
        .unwrap_err();
    assert!(matches!(missing_source, ProvenanceError::NotFound(_)));
    assert_eq!(index.justification_text("v1", &auths).unwrap().as_deref(), Some("keep me"));
}

#[test]
fn test_rejected_structured_keeps_previous_record() {
    let (index, _graph, _events) = memory_index(&["v1", "v2", "v3"]);
    let auths = no_auths();
    index
        .set_structured("v1", &source_info("v2"), &Visibility::empty(), &auths)
        .unwrap();

    assert!(index
        .set_structured("v1", &source_info("v3"), &Visibility::new("(a"), &auths)
        .is_err());

    let info = index.source_info_for_vertex("v1", &auths).unwrap().unwrap();
    assert_eq!(info.source_element_id, "v2");
}
