mod common;

use kira_dwiqc::ctx::Ctx;
use kira_dwiqc::error::QcError;
use kira_dwiqc::pipeline::stage0_gradients::Stage0Gradients;
use kira_dwiqc::pipeline::stage8_validate::Stage8Validate;
use kira_dwiqc::pipeline::{Pipeline, Stage};
use kira_dwiqc::protocol::Protocol;
use kira_dwiqc::qc::{run_left, run_qc};
use kira_dwiqc::statistics::CheckCategory;
use kira_dwiqc::status::{QcStatus, ValidationFlags};
use kira_dwiqc::volume::{B_VALUE_KEY, ImageGeometry};

use common::{clean_session, inject_gradient_motion, inject_slice_dropout};

#[test]
fn clean_acquisition_passes_everything() {
    let session = clean_session(1, 60);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert!(run.is_complete(), "{:?}", run.error);
    assert_eq!(run.status.bits(), 0);
    assert!(run.excluded.is_empty());
    assert_eq!(run.counts, run.surviving);
    let counts = run.surviving.unwrap();
    assert_eq!(counts.baseline_number, 1);
    assert_eq!(counts.gradient_dir_number, 60);
    assert_eq!(counts.gradient_number, 60);
    assert_eq!(counts.b_value_number, 1);
}

#[test]
fn slice_dropout_in_one_direction() {
    let mut session = clean_session(1, 60);
    inject_slice_dropout(&mut session, 17);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert!(run.is_complete());
    assert_eq!(run.status.bits(), QcStatus::SLICE_WISE);
    assert_eq!(run.excluded.len(), 1);
    assert_eq!(run.excluded.get(&17), Some(&CheckCategory::SliceWise));
    let surviving = run.surviving.as_ref().unwrap();
    assert_eq!(surviving.gradient_dir_number, 59);
    assert_eq!(surviving.gradient_number, 59);
    assert_eq!(surviving.baseline_number, 1);
}

#[test]
fn bad_gradient_fraction_boundary() {
    let mut protocol = Protocol::default();
    protocol.limits.max_bad_gradient_fraction = 0.1;

    let mut session = clean_session(1, 60);
    for idx in 1..=6 {
        inject_gradient_motion(&mut session, idx);
    }
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert_eq!(run.excluded.len(), 6);
    assert!(run.status.gradient_wise_failed);
    assert!(!run.status.too_many_bad_gradients);

    inject_gradient_motion(&mut session, 7);
    let run = run_qc(&volume, &protocol, session.checkers());
    assert_eq!(run.excluded.len(), 7);
    assert!(run.status.too_many_bad_gradients);
    assert_eq!(
        run.status.bits(),
        QcStatus::GRADIENT_WISE | QcStatus::TOO_MANY_BAD_GRADIENTS
    );
}

#[test]
fn too_few_directions_sets_bit_zero() {
    let session = clean_session(1, 5);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());
    assert!(run.is_complete());
    assert_eq!(run.status.bits(), QcStatus::TOO_FEW_DIRECTIONS);
}

#[test]
fn too_few_directions_with_checks_disabled() {
    let mut protocol = Protocol::default();
    protocol.slice.check = false;
    protocol.interlace.check = false;
    protocol.gradient.check = false;
    let session = clean_session(0, 3);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert!(run.status.too_few_directions);
    assert!(run.status.missing_baseline);
    assert_eq!(run.outcomes.slice, None);
}

#[test]
fn single_shell_without_baseline_sets_bit_one() {
    let session = clean_session(0, 30);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());
    assert_eq!(run.status.bits(), QcStatus::MISSING_BASELINE);
}

#[test]
fn orientation_mismatch_sets_only_image_bit() {
    let session = clean_session(1, 60);
    let mut reference = common::geometry();
    reference.directions = [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
    let mut protocol = Protocol::default();
    protocol.image.reference = Some(reference);

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert_eq!(run.status.bits(), QcStatus::IMAGE_MISMATCH);
    let geometry = run.geometry.unwrap();
    assert!(geometry.orientation);
    assert!(!geometry.size && !geometry.spacing && !geometry.origin);
    assert!(!run.conformance_forced);
}

#[test]
fn forced_conformance_keeps_image_bit() {
    let session = clean_session(1, 10);
    let mut protocol = Protocol::default();
    protocol.image.reference = Some(ImageGeometry::identity([4, 4, 18], [2.0, 2.0, 2.5]));
    protocol.image.force_conformance = true;

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert!(run.is_complete());
    assert!(run.conformance_forced);
    assert!(run.geometry.unwrap().size);
    assert_eq!(run.status.bits(), QcStatus::IMAGE_MISMATCH);
    assert_eq!(run.warnings.len(), 1);
}

#[test]
fn diffusion_mismatch_sets_bit_four() {
    let session = clean_session(1, 60);
    let mut protocol = Protocol::default();
    protocol.diffusion.b_value = Some(2000.0);

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert_eq!(run.status.bits(), QcStatus::DIFFUSION_MISMATCH);
    assert!(run.diffusion.unwrap().b_value_mismatch);
}

#[test]
fn interlace_outlier_sets_bit_six() {
    let mut session = clean_session(1, 60);
    if let Some(interlace) = session.interlace.as_mut() {
        interlace[30].correlation = 0.5;
    }
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());
    assert_eq!(run.status.bits(), QcStatus::INTERLACE_WISE);
    assert_eq!(run.excluded.get(&30), Some(&CheckCategory::InterlaceWise));
    assert_eq!(run.surviving.unwrap().gradient_dir_number, 59);
}

#[test]
fn tolerated_bad_gradients_do_not_fail_category() {
    let mut session = clean_session(1, 60);
    inject_gradient_motion(&mut session, 3);
    let mut protocol = Protocol::default();
    protocol.gradient.max_bad_gradients = 1;

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert_eq!(run.status.bits(), 0);
    assert_eq!(run.excluded.len(), 1);
    assert_eq!(run.surviving.unwrap().gradient_number, 59);
}

#[test]
fn surviving_counts_never_exceed_original() {
    let mut session = clean_session(2, 30);
    inject_slice_dropout(&mut session, 0);
    inject_gradient_motion(&mut session, 5);
    inject_gradient_motion(&mut session, 6);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    let counts = run.counts.unwrap();
    let surviving = run.surviving.unwrap();
    assert!(surviving.baseline_number <= counts.baseline_number);
    assert!(surviving.b_value_number <= counts.b_value_number);
    assert!(surviving.gradient_dir_number <= counts.gradient_dir_number);
    assert!(surviving.gradient_number <= counts.gradient_number);
    assert_eq!(surviving.repetitions.len(), counts.repetitions.len());
    for (s, c) in surviving.repetitions.iter().zip(&counts.repetitions) {
        assert!(s <= c);
    }
    assert_eq!(surviving.gradient_number, 28);
}

#[test]
fn missing_collaborator_output_keeps_earlier_bits() {
    let mut session = clean_session(1, 60);
    session.interlace = None;
    let mut reference = common::geometry();
    reference.origin = [1.0, 0.0, 0.0];
    let mut protocol = Protocol::default();
    protocol.image.reference = Some(reference);

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert!(!run.is_complete());
    assert!(matches!(
        run.error,
        Some(QcError::Collaborator {
            stage: "stage4_interlace",
            ..
        })
    ));
    assert_eq!(run.status.bits(), QcStatus::IMAGE_MISMATCH);
    assert_eq!(run.outcomes.slice, Some(false));
    assert_eq!(run.outcomes.validation, Some(ValidationFlags::default()));
    assert!(run.surviving.is_none());
}

#[test]
fn invalid_threshold_is_configuration_error() {
    let mut session = clean_session(1, 60);
    inject_slice_dropout(&mut session, 4);
    let mut protocol = Protocol::default();
    protocol.interlace.translation = -1.0;

    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert!(matches!(run.error, Some(QcError::Configuration(_))));
    assert_eq!(run.status.bits(), QcStatus::SLICE_WISE);
}

#[test]
fn missing_b_value_aborts_before_checks() {
    let mut session = clean_session(1, 10);
    session.header.metadata.remove(B_VALUE_KEY);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());
    let err = run.error.as_ref().unwrap();
    assert!(err.is_load_failure());
    assert_eq!(run.status.bits(), 0);
    assert!(run.outcomes.image.is_none());
}

#[test]
fn left_pass_runs_over_survivors() {
    let mut session = clean_session(1, 60);
    inject_slice_dropout(&mut session, 17);
    let volume = session.volume().unwrap();
    let protocol = Protocol::default();
    let run = run_qc(&volume, &protocol, session.checkers());

    let left = run_left(&volume, &run, &protocol, session.checkers()).unwrap();
    assert!(left.is_complete());
    assert_eq!(left.volumes, 60);
    assert!(!left.source_index.contains(&17));
    assert_eq!(left.status.bits(), 0);
    assert_eq!(left.surviving.unwrap().gradient_dir_number, 59);
    // first run is left untouched
    assert_eq!(run.status.bits(), QcStatus::SLICE_WISE);
}

#[test]
fn left_pass_skipped_without_exclusions() {
    let session = clean_session(1, 60);
    let volume = session.volume().unwrap();
    let protocol = Protocol::default();
    let run = run_qc(&volume, &protocol, session.checkers());
    assert!(run_left(&volume, &run, &protocol, session.checkers()).is_none());
}

#[test]
fn too_few_directions_kept_when_run_is_incomplete() {
    let mut session = clean_session(1, 3);
    session.interlace = None;
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert!(!run.is_complete());
    assert!(run.status.too_few_directions);
    assert_eq!(run.status.bits(), QcStatus::TOO_FEW_DIRECTIONS);
    assert!(run.surviving.is_none());
}

#[test]
fn missing_baseline_kept_when_run_is_incomplete() {
    let mut session = clean_session(0, 30);
    session.slice = None;
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert!(!run.is_complete());
    assert_eq!(run.status.bits(), QcStatus::MISSING_BASELINE);
}

#[test]
fn rejected_averaged_baseline_drops_every_merged_baseline() {
    let mut session = clean_session(2, 60);
    inject_gradient_motion(&mut session, 0);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert!(run.is_complete(), "{:?}", run.error);
    assert_eq!(run.excluded.get(&0), Some(&CheckCategory::GradientWise));
    assert_eq!(run.excluded.get(&1), Some(&CheckCategory::GradientWise));
    let surviving = run.surviving.as_ref().unwrap();
    assert_eq!(surviving.baseline_number, 0);
    assert_eq!(surviving.gradient_number, 60);
    assert_eq!(
        run.status.bits(),
        QcStatus::GRADIENT_WISE | QcStatus::MISSING_BASELINE
    );

    let survivors = run.survivors();
    assert_eq!(survivors.len(), 60);
    assert!(!survivors.contains(&0) && !survivors.contains(&1));
}

#[test]
fn averaged_baseline_keeps_merged_baselines_when_accepted() {
    let mut session = clean_session(2, 60);
    inject_gradient_motion(&mut session, 5);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    assert_eq!(run.excluded.len(), 1);
    assert_eq!(run.surviving.unwrap().baseline_number, 2);
}

#[test]
fn custom_pipeline_from_default_stages() {
    let session = clean_session(1, 4);
    let volume = session.volume().unwrap();
    let protocol = Protocol::default();
    let mut ctx = Ctx::new(&volume, &protocol, session.checkers());

    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(Stage0Gradients::default()),
        Box::new(Stage8Validate::default()),
    ];
    Pipeline::new(stages).run(&mut ctx).unwrap();

    assert!(ctx.outcomes.slice.is_none());
    assert!(ctx.outcomes.validation.unwrap().too_few_directions);
    assert_eq!(ctx.surviving.unwrap().gradient_dir_number, 4);
}
