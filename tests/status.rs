use kira_dwiqc::status::{QcStatus, StageOutcomes, ValidationFlags};

#[test]
fn clean_outcomes_encode_to_zero() {
    let outcomes = StageOutcomes {
        image: Some(false),
        diffusion: Some(false),
        slice: Some(false),
        interlace: Some(false),
        gradient: Some(false),
        validation: Some(ValidationFlags::default()),
    };
    let status = QcStatus::encode(&outcomes);
    assert!(status.is_ok());
    assert!(status.fired().is_empty());
}

#[test]
fn skipped_stages_leave_bits_clear() {
    let status = QcStatus::encode(&StageOutcomes::default());
    assert_eq!(status.bits(), 0);
}

#[test]
fn bits_follow_fixed_layout() {
    let outcomes = StageOutcomes {
        image: Some(true),
        slice: Some(true),
        validation: Some(ValidationFlags {
            too_few_directions: true,
            ..ValidationFlags::default()
        }),
        ..StageOutcomes::default()
    };
    let status = QcStatus::encode(&outcomes);
    assert_eq!(status.bits(), 0x01 | 0x08 | 0x20);
    assert_eq!(
        status.fired(),
        vec!["too_few_directions", "image_mismatch", "slice_wise"]
    );
}

#[test]
fn from_bits_inverts_bits() {
    for bits in [0u8, 0x04, 0x42, 0x90, 0xff] {
        assert_eq!(QcStatus::from_bits(bits).bits(), bits);
    }
    let status = QcStatus::from_bits(QcStatus::GRADIENT_WISE);
    assert!(status.gradient_wise_failed);
    assert!(!status.interlace_wise_failed);
}
