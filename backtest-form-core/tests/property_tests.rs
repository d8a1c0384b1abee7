//! Property tests for the parameter list and form stores.
//!
//! Uses proptest to verify:
//! 1. Append growth: each append adds exactly one blank row, old rows unchanged
//! 2. Update isolation: an in-bounds update changes one field of one row only
//! 3. Bounds: out-of-range updates fail and change nothing
//! 4. Reset: any reachable state resets to the initial state

use std::sync::Arc;

use backtest_form_core::{FormState, ParamField, ParameterList, ScalarField};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_field() -> impl Strategy<Value = ParamField> {
    prop_oneof![Just(ParamField::IndicatorId), Just(ParamField::Value)]
}

fn arb_scalar() -> impl Strategy<Value = ScalarField> {
    prop_oneof![
        Just(ScalarField::Coin),
        Just(ScalarField::Name),
        Just(ScalarField::StartDate),
        Just(ScalarField::EndDate),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z0-9.\\-]{0,12}"
}

#[derive(Debug, Clone)]
enum Edit {
    Append,
    Update { index: usize, field: ParamField, value: String },
    Scalar { field: ScalarField, value: String },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        Just(Edit::Append),
        (0..8usize, arb_field(), arb_text())
            .prop_map(|(index, field, value)| Edit::Update { index, field, value }),
        (arb_scalar(), arb_text()).prop_map(|(field, value)| Edit::Scalar { field, value }),
    ]
}

/// Build a list of `n + 1` rows with distinct contents.
fn seeded_list(n: usize) -> ParameterList {
    let mut list = ParameterList::new();
    for i in 0..n {
        list.append_row();
        list.update_field(i + 1, ParamField::IndicatorId, format!("ind{i}"))
            .unwrap();
        list.update_field(i + 1, ParamField::Value, format!("{i}.5"))
            .unwrap();
    }
    list
}

// ── 1. Append Growth ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn append_adds_exactly_one_row(seed in 0..6usize, appends in 1..10usize) {
        let mut list = seeded_list(seed);
        for _ in 0..appends {
            let before = list.clone();
            list.append_row();

            prop_assert_eq!(list.len(), before.len() + 1);
            for i in 0..before.len() {
                prop_assert_eq!(list.get(i), before.get(i));
                prop_assert!(Arc::ptr_eq(
                    list.row_handle(i).unwrap(),
                    before.row_handle(i).unwrap()
                ));
            }
            prop_assert!(list.get(before.len()).unwrap().is_blank());
        }
    }
}

// ── 2. Update Isolation ──────────────────────────────────────────────

proptest! {
    #[test]
    fn update_changes_only_target(
        seed in 0..6usize,
        index_frac in 0.0..1.0f64,
        field in arb_field(),
        value in arb_text(),
    ) {
        let mut list = seeded_list(seed);
        let index = ((list.len() as f64) * index_frac) as usize;
        let index = index.min(list.len() - 1);
        let before = list.clone();

        list.update_field(index, field, value.clone()).unwrap();

        prop_assert_eq!(list.len(), before.len());
        for i in 0..list.len() {
            if i == index {
                continue;
            }
            prop_assert_eq!(list.get(i), before.get(i));
            prop_assert!(Arc::ptr_eq(
                list.row_handle(i).unwrap(),
                before.row_handle(i).unwrap()
            ));
        }

        let row = list.get(index).unwrap();
        let old = before.get(index).unwrap();
        prop_assert_eq!(row.field(field), value.as_str());
        let other = match field {
            ParamField::IndicatorId => ParamField::Value,
            ParamField::Value => ParamField::IndicatorId,
        };
        prop_assert_eq!(row.field(other), old.field(other));
    }
}

// ── 3. Bounds ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn out_of_range_update_changes_nothing(
        seed in 0..6usize,
        overshoot in 0..100usize,
        field in arb_field(),
    ) {
        let mut list = seeded_list(seed);
        let before = list.clone();
        let index = list.len() + overshoot;

        prop_assert!(list.update_field(index, field, "x").is_err());
        prop_assert_eq!(&list, &before);
    }
}

// ── 4. Reset ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reset_from_any_state_is_initial(edits in prop::collection::vec(arb_edit(), 0..30)) {
        let mut form = FormState::new();
        for edit in edits {
            match edit {
                Edit::Append => form.append_row(),
                Edit::Update { index, field, value } => {
                    // Out-of-range edits are rejected; either way the list stays non-empty.
                    let _ = form.update_param_field(index, field, value);
                }
                Edit::Scalar { field, value } => form.set_scalar_field(field, value),
            }
            prop_assert!(form.parameters().len() >= 1);
        }

        let snapshot = form.compose_request();
        prop_assert_eq!(&snapshot, &form.compose_request());

        form.reset();
        prop_assert_eq!(form, FormState::default());
    }
}
