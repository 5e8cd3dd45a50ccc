// crates/blockdrag-core/tests/block_model.rs
// ============================================================================
// Module: Block Model Tests
// Description: Decoding and conditional visibility of block variants.
// ============================================================================

//! Block model tests covering stored shapes and visibility rules.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::collections::BTreeMap;

use blockdrag_core::Block;
use blockdrag_core::BlockVariant;
use blockdrag_core::DocId;
use blockdrag_core::Fruit;
use blockdrag_core::Seed;
use blockdrag_core::SeedRef;
use blockdrag_core::Verifier;
use blockdrag_core::runtime::verify::MISSING_VALUE;
use common::Defect;
use common::FakeAdminUi;
use serde_json::json;

fn paths(block: &Block) -> Vec<&'static str> {
    block.visible_text_fields().into_iter().map(|field| field.path).collect()
}

#[test]
fn decodes_stored_parent_with_mixed_variants() {
    let stored = json!({
        "id": "64f0c",
        "blocks": [
            {
                "id": "row-a",
                "blockType": "apples",
                "blockName": "Apple A",
                "AppleKind": "Apple With Conditional fields",
                "showConditionalApple": true,
                "conditionalFields": { "ConditionalFieldApple": "Conditiional field apple A" },
                "seedApple": [{ "id": "s1", "name": "Seeds for Apple A - 1" }, "s2"]
            },
            {
                "id": "row-c",
                "blockType": "pears",
                "blockName": "Pear C",
                "PearType": "Pear C",
                "seedPear": null
            }
        ]
    });
    let fruit: Fruit = serde_json::from_value(stored).unwrap();
    assert_eq!(fruit.id, DocId::new("64f0c"));
    assert_eq!(fruit.blocks[0].variant(), BlockVariant::Apple);
    assert_eq!(fruit.blocks[0].seeds()[0].name(), Some("Seeds for Apple A - 1"));
    assert_eq!(fruit.blocks[0].seeds()[1], SeedRef::Id(DocId::new("s2")));
    assert_eq!(fruit.blocks[1].variant(), BlockVariant::Pear);
    assert!(fruit.blocks[1].seeds().is_empty());
}

#[test]
fn seed_references_serialize_as_ids() {
    let block = common::apple("A", "kind", None, vec![common::seed(7, "seven")]);
    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(value["blockType"], json!("apples"));
    assert_eq!(value["seedApple"], json!([7]));
    assert_eq!(value["showConditionalApple"], json!(false));
}

#[test]
fn apple_conditional_group_follows_its_toggle() {
    let shown = common::apple("A", "kind", Some("cond"), Vec::new());
    let hidden = common::apple("B", "kind", None, Vec::new());
    assert_eq!(paths(&shown), ["AppleKind", "conditionalFields.ConditionalFieldApple"]);
    assert_eq!(paths(&hidden), ["AppleKind"]);
}

#[test]
fn pear_conditional_field_is_gated_on_apple_toggle_key() {
    let own_toggle: Block = serde_json::from_value(json!({
        "blockType": "pears",
        "PearType": "p",
        "showConditionalPear": true,
        "ConditionalFieldPear": "x"
    }))
    .unwrap();
    assert_eq!(paths(&own_toggle), ["PearType"]);

    let sibling_gate: Block = serde_json::from_value(json!({
        "blockType": "pears",
        "PearType": "p",
        "showConditionalApple": true,
        "ConditionalFieldPear": "x"
    }))
    .unwrap();
    assert_eq!(paths(&sibling_gate), ["PearType", "ConditionalFieldPear"]);
    let fields = sibling_gate.visible_text_fields();
    assert_eq!(fields[1].value, Some("x"));
}

#[test]
fn resolve_seeds_populates_and_reports_unknown_ids() {
    let mut block: Block = serde_json::from_value(json!({
        "blockType": "pears",
        "seedPear": [1, 2]
    }))
    .unwrap();
    let mut lookup = BTreeMap::new();
    lookup.insert(DocId::Number(1), Seed {
        id: DocId::Number(1),
        name: Some("one".to_string()),
    });
    assert_eq!(block.resolve_seeds(&lookup), Err(DocId::Number(2)));

    lookup.insert(DocId::Number(2), Seed {
        id: DocId::Number(2),
        name: Some("two".to_string()),
    });
    block.resolve_seeds(&lookup).unwrap();
    let names: Vec<_> = block.seeds().iter().filter_map(SeedRef::name).collect();
    assert_eq!(names, ["one", "two"]);
}

#[tokio::test]
async fn hidden_conditional_field_is_never_compared() {
    let rendered = vec![common::apple("B", "kind", None, Vec::new())];
    let session = FakeAdminUi::with_blocks(rendered.clone());
    let report = Verifier::default().inspect(&session, &rendered).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.positions_checked, 1);
}

#[tokio::test]
async fn missing_conditional_field_is_a_mismatch() {
    let rendered = vec![common::apple("A", "kind", None, Vec::new())];
    let expected = vec![common::apple("A", "kind", Some("cond"), Vec::new())];
    let session = FakeAdminUi::with_blocks(rendered);
    let report = Verifier::default().inspect(&session, &expected).await.unwrap();
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].field, "conditionalFields.ConditionalFieldApple");
    assert_eq!(report.mismatches[0].expected, "cond");
}

#[tokio::test]
async fn extra_rendered_label_is_a_mismatch() {
    let rendered = vec![common::pear("C", "p", vec![common::seed(1, "a"), common::seed(2, "b")])];
    let expected = vec![common::pear("C", "p", vec![common::seed(1, "a")])];
    let session = FakeAdminUi::with_blocks(rendered);
    let report = Verifier::default().inspect(&session, &expected).await.unwrap();
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].field, "seedPear[1]");
    assert_eq!(report.mismatches[0].actual, "b");
}

/// Apple whose conditional group is switched on but holds no value.
fn apple_with_unset_conditional() -> Block {
    let mut block = common::apple("D", "kind", None, Vec::new());
    if let Block::Apple(apple) = &mut block {
        apple.show_conditional_apple = Some(true);
    }
    block
}

#[tokio::test]
async fn visible_unset_field_renders_empty_and_verifies_clean() {
    let mut untyped_pear = common::pear("E", "p", Vec::new());
    if let Block::Pear(pear) = &mut untyped_pear {
        pear.pear_type = None;
    }
    let expected = vec![apple_with_unset_conditional(), untyped_pear];
    assert_eq!(paths(&expected[0]), ["AppleKind", "conditionalFields.ConditionalFieldApple"]);
    let session = FakeAdminUi::with_blocks(expected.clone());
    let report = Verifier::default().inspect(&session, &expected).await.unwrap();
    assert!(report.is_clean(), "{report}");
    assert_eq!(report.positions_checked, 2);
}

#[tokio::test]
async fn visible_unset_field_without_an_input_reports_missing() {
    let expected = vec![apple_with_unset_conditional()];
    let session = FakeAdminUi::with_blocks(expected.clone());
    session.set_defect(Defect::UnsetInputsAbsent);
    let report = Verifier::default().inspect(&session, &expected).await.unwrap();
    assert_eq!(report.mismatches.len(), 1);
    let mismatch = &report.mismatches[0];
    assert_eq!(mismatch.field, "conditionalFields.ConditionalFieldApple");
    assert_eq!(mismatch.expected, "");
    assert_eq!(mismatch.actual, MISSING_VALUE);
}
