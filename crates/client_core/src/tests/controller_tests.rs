use shared::domain::YearValue;

use super::events::{FormEffect, FormEvent};
use super::*;
use crate::submission::{FailureKind, SubmissionFailure};
use crate::validation::{NEGATIVE, REQUIRED};

fn sample_catalog() -> CatalogResponse {
    CatalogResponse {
        companies: vec!["Maruti".into(), "Hyundai".into()],
        name: vec!["Maruti 800".into(), "Hyundai i20".into(), "Maruti Swift".into()],
        fuel_type: vec!["Petrol".into(), "Diesel".into()],
        year: vec![YearValue::Number(2015), YearValue::Number(2014)],
    }
}

fn ready_controller() -> FormController {
    let mut controller = FormController::new();
    let ticket = controller.begin_catalog_load().expect("ticket");
    assert!(controller.on_catalog_loaded(ticket, Ok(sample_catalog())));
    controller
}

fn fill(controller: &mut FormController) {
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    controller
        .on_field_change(FormField::Item, "Maruti 800")
        .expect("item");
    controller
        .on_field_change(FormField::FuelType, "Petrol")
        .expect("fuel");
    controller.on_field_change(FormField::Year, "2015").expect("year");
    controller
        .on_field_change(FormField::KmsDriven, "30000")
        .expect("kms");
}

fn expect_dispatch(outcome: Result<SubmitOutcome, InteractionError>) -> PendingSubmission {
    match outcome {
        Ok(SubmitOutcome::Dispatch(pending)) => pending,
        other => panic!("expected dispatch, got {other:?}"),
    }
}

#[test]
fn starts_loading_and_rejects_interaction() {
    let mut controller = FormController::new();
    assert!(controller.is_loading());
    assert_eq!(
        controller.on_field_change(FormField::KmsDriven, "10"),
        Err(InteractionError::Loading)
    );
    assert_eq!(controller.on_submit(), Err(InteractionError::Loading));
    assert!(controller.options(FormField::Group).is_empty());
}

#[test]
fn failed_catalog_load_still_becomes_ready_with_empty_options() {
    let mut controller = FormController::new();
    let ticket = controller.begin_catalog_load().expect("ticket");
    controller.on_catalog_loaded(ticket, Err(ServiceError::Transport("refused".into())));

    assert!(!controller.is_loading());
    assert!(controller.catalog().expect("catalog").is_empty());
    assert!(controller.catalog_load_error().is_some());
    assert_eq!(
        controller.on_field_change(FormField::Group, "Maruti"),
        Err(InteractionError::NotAnOption {
            field: FormField::Group,
            value: "Maruti".into(),
        })
    );
    match controller.on_submit() {
        Ok(SubmitOutcome::Blocked(validation)) => assert_eq!(validation.len(), 5),
        other => panic!("expected blocked submit, got {other:?}"),
    }
}

#[test]
fn catalog_load_is_issued_once_per_mount() {
    let mut controller = FormController::new();
    let ticket = controller.begin_catalog_load().expect("ticket");
    assert_eq!(controller.begin_catalog_load(), None);

    controller.on_catalog_loaded(ticket, Ok(sample_catalog()));
    assert_eq!(controller.begin_catalog_load(), None);

    controller.remount();
    assert!(controller.begin_catalog_load().is_some());
}

#[test]
fn selecting_group_filters_item_options() {
    let mut controller = ready_controller();
    assert!(controller.item_options().is_empty());

    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    assert_eq!(controller.item_options(), ["Maruti 800", "Maruti Swift"]);
    assert_eq!(
        controller.options(FormField::Year),
        vec!["2015".to_string(), "2014".to_string()]
    );
}

#[test]
fn changing_group_clears_item_outside_new_options() {
    let mut controller = ready_controller();
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    controller
        .on_field_change(FormField::Item, "Maruti Swift")
        .expect("item");

    controller
        .on_field_change(FormField::Group, "Hyundai")
        .expect("group");
    assert_eq!(controller.values().item, "");
    assert_eq!(controller.item_options(), ["Hyundai i20"]);

    controller.on_field_change(FormField::Group, "").expect("clear");
    assert!(controller.item_options().is_empty());
    assert_eq!(controller.values().item, "");
}

#[test]
fn reselecting_same_group_keeps_item() {
    let mut controller = ready_controller();
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    controller
        .on_field_change(FormField::Item, "Maruti 800")
        .expect("item");
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    assert_eq!(controller.values().item, "Maruti 800");
}

#[test]
fn item_must_belong_to_current_options() {
    let mut controller = ready_controller();
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    let err = controller
        .on_field_change(FormField::Item, "Hyundai i20")
        .expect_err("must reject");
    assert_eq!(
        err,
        InteractionError::NotAnOption {
            field: FormField::Item,
            value: "Hyundai i20".into(),
        }
    );
    assert_eq!(controller.values().item, "");
}

#[test]
fn errors_are_only_visible_for_touched_fields() {
    let mut controller = ready_controller();
    assert_eq!(controller.validation().len(), 5);
    assert!(controller.visible_errors().is_empty());

    controller
        .on_field_change(FormField::KmsDriven, "-5")
        .expect("kms");
    let visible = controller.visible_errors();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible.error(FormField::KmsDriven), Some(NEGATIVE));

    controller
        .on_field_change(FormField::KmsDriven, "5")
        .expect("kms");
    assert!(controller.visible_errors().is_empty());
}

#[test]
fn negative_kms_blocks_submit() {
    let mut controller = ready_controller();
    fill(&mut controller);
    controller
        .on_field_change(FormField::KmsDriven, "-5")
        .expect("kms");

    match controller.on_submit() {
        Ok(SubmitOutcome::Blocked(validation)) => {
            assert_eq!(validation.len(), 1);
            assert_eq!(validation.error(FormField::KmsDriven), Some(NEGATIVE));
            assert_eq!(&validation, controller.validation());
        }
        other => panic!("expected blocked submit, got {other:?}"),
    }
    assert_eq!(controller.submission(), &SubmissionState::Idle);
    assert_eq!(controller.values().kms_driven, "-5");
}

#[test]
fn submit_touches_all_fields() {
    let mut controller = ready_controller();
    controller
        .on_field_change(FormField::Group, "Maruti")
        .expect("group");
    let _ = controller.on_submit();
    let visible = controller.visible_errors();
    assert_eq!(visible.len(), 4);
    assert_eq!(visible.error(FormField::Item), Some(REQUIRED));
    assert!(FormField::ALL.iter().all(|field| controller.is_touched(*field)));
}

#[test]
fn successful_submission_snapshots_and_resets() {
    let mut controller = ready_controller();
    fill(&mut controller);
    let submitted = controller.values().clone();

    let pending = expect_dispatch(controller.on_submit());
    assert_eq!(pending.request.company, "Maruti");
    assert_eq!(pending.request.name, "Maruti 800");
    assert_eq!(controller.submission(), &SubmissionState::Pending);

    assert!(controller.on_prediction_resolved(
        pending.ticket,
        Ok(PredictResponse::success(250000.0))
    ));
    assert_eq!(
        controller.submission(),
        &SubmissionState::Succeeded {
            price: 250000.0,
            snapshot: submitted,
        }
    );
    assert!(controller.values().is_empty());
    assert!(controller.item_options().is_empty());
    assert!(controller.visible_errors().is_empty());
}

#[test]
fn failed_submission_reports_service_error_and_resets() {
    let mut controller = ready_controller();
    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());

    controller.on_prediction_resolved(
        pending.ticket,
        Ok(PredictResponse::failure("model unavailable")),
    );
    assert_eq!(
        controller.submission(),
        &SubmissionState::Failed(SubmissionFailure::semantic("model unavailable"))
    );
    assert!(controller.values().is_empty());
}

#[test]
fn on_success_only_policy_keeps_values_after_failure() {
    let mut controller = FormController::with_reset_policy(ResetPolicy::OnSuccessOnly);
    let ticket = controller.begin_catalog_load().expect("ticket");
    controller.on_catalog_loaded(ticket, Ok(sample_catalog()));
    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());

    controller.on_prediction_resolved(
        pending.ticket,
        Err(ServiceError::Transport("connection refused".into())),
    );
    match controller.submission() {
        SubmissionState::Failed(failure) => assert_eq!(failure.kind, FailureKind::Transport),
        other => panic!("unexpected state: {other:?}"),
    }
    assert_eq!(controller.values().item, "Maruti 800");
}

#[test]
fn double_submit_while_pending_dispatches_once() {
    let mut controller = ready_controller();
    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());
    assert_eq!(
        controller.on_submit(),
        Err(InteractionError::SubmissionPending)
    );
    assert!(controller.is_submitting());
    assert!(controller.on_prediction_resolved(pending.ticket, Ok(PredictResponse::success(1.0))));
    assert!(!controller.is_submitting());
}

#[test]
fn next_submit_attempt_clears_previous_outcome() {
    let mut controller = ready_controller();
    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());
    controller.on_prediction_resolved(pending.ticket, Ok(PredictResponse::success(1.0)));
    assert!(controller.submission().is_settled());

    let _ = controller.on_submit();
    assert_eq!(controller.submission(), &SubmissionState::Idle);
}

#[test]
fn reset_keeps_submission_outcome() {
    let mut controller = ready_controller();
    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());
    controller.on_prediction_resolved(pending.ticket, Ok(PredictResponse::success(7.0)));

    controller
        .on_field_change(FormField::KmsDriven, "12")
        .expect("kms");
    controller.reset();
    assert!(controller.values().is_empty());
    assert!(matches!(
        controller.submission(),
        SubmissionState::Succeeded { price, .. } if *price == 7.0
    ));
}

#[test]
fn responses_from_before_remount_are_ignored() {
    let mut controller = FormController::new();
    let stale_catalog = controller.begin_catalog_load().expect("ticket");
    controller.remount();
    let fresh_catalog = controller.begin_catalog_load().expect("ticket");

    assert!(!controller.on_catalog_loaded(stale_catalog, Ok(CatalogResponse::default())));
    assert!(controller.is_loading());
    assert!(controller.on_catalog_loaded(fresh_catalog, Ok(sample_catalog())));

    fill(&mut controller);
    let pending = expect_dispatch(controller.on_submit());
    controller.remount();
    assert!(!controller.on_prediction_resolved(pending.ticket, Ok(PredictResponse::success(3.0))));
    assert_eq!(controller.submission(), &SubmissionState::Idle);
}

#[test]
fn reducer_drives_full_cycle() {
    let mut controller = FormController::new();
    let FormEffect::LoadCatalog(ticket) = controller.apply(FormEvent::Remounted) else {
        panic!("expected catalog load");
    };
    assert_eq!(
        controller.apply(FormEvent::CatalogLoaded {
            ticket,
            result: Ok(sample_catalog()),
        }),
        FormEffect::Updated
    );

    for (field, value) in [
        (FormField::Group, "Maruti"),
        (FormField::Item, "Maruti 800"),
        (FormField::FuelType, "Petrol"),
        (FormField::Year, "2015"),
        (FormField::KmsDriven, "30000"),
    ] {
        assert_eq!(
            controller.apply(FormEvent::FieldChanged {
                field,
                value: value.to_string(),
            }),
            FormEffect::Updated
        );
    }

    let FormEffect::Dispatch(pending) = controller.apply(FormEvent::SubmitRequested) else {
        panic!("expected dispatch");
    };
    assert_eq!(
        controller.apply(FormEvent::SubmitRequested),
        FormEffect::Rejected(InteractionError::SubmissionPending)
    );
    assert_eq!(
        controller.apply(FormEvent::PredictionResolved {
            ticket: pending.ticket,
            result: Ok(PredictResponse::success(250000.0)),
        }),
        FormEffect::Updated
    );
    assert_eq!(
        controller.apply(FormEvent::PredictionResolved {
            ticket: pending.ticket,
            result: Ok(PredictResponse::success(1.0)),
        }),
        FormEffect::Ignored
    );
    assert_eq!(controller.apply(FormEvent::OutcomeDismissed), FormEffect::Updated);
    assert_eq!(controller.submission(), &SubmissionState::Idle);
}
