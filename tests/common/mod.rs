#![allow(dead_code)]

use kira_dwiqc::io::recorded::RecordedSession;
use kira_dwiqc::statistics::RegistrationMeasure;
use kira_dwiqc::volume::{DwiHeader, ImageGeometry};

pub const SLICES: usize = 20;

pub fn geometry() -> ImageGeometry {
    ImageGeometry::identity([4, 4, SLICES], [2.0, 2.0, 2.5])
}

/// `baselines` zero vectors followed by `directions` distinct unit vectors.
pub fn gradient_vectors(baselines: usize, directions: usize) -> Vec<[f64; 3]> {
    let mut out = vec![[0.0; 3]; baselines];
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    for i in 0..directions {
        let z = 1.0 - (i as f64 + 0.5) * 2.0 / directions as f64;
        let r = (1.0 - z * z).sqrt();
        let theta = golden * i as f64;
        out.push([r * theta.cos(), r * theta.sin(), z]);
    }
    out
}

pub fn clean_measure(i: usize, translation: f64) -> RegistrationMeasure {
    RegistrationMeasure {
        correlation: 0.95 + 0.001 * (i % 5) as f64,
        translation: [translation, 0.0, 0.0],
        rotation: [0.05, 0.0, 0.0],
    }
}

pub fn session_from_vectors(vectors: &[[f64; 3]], b_value: f64) -> RecordedSession {
    let n = vectors.len();
    RecordedSession {
        header: DwiHeader::new(geometry(), b_value, vectors),
        volumes: n,
        slice: Some(
            (0..n)
                .map(|i| vec![0.95 + 0.001 * (i % 5) as f64; SLICES])
                .collect(),
        ),
        interlace: Some((0..n).map(|i| clean_measure(i, 0.1)).collect()),
        gradient: Some((0..n).map(|i| clean_measure(i, 0.2)).collect()),
    }
}

/// A clean acquisition: every checker reports unremarkable values.
pub fn clean_session(baselines: usize, directions: usize) -> RecordedSession {
    session_from_vectors(&gradient_vectors(baselines, directions), 1000.0)
}

/// Puts a dropout into one slice of volume `index`.
pub fn inject_slice_dropout(session: &mut RecordedSession, index: usize) {
    if let Some(slice) = session.slice.as_mut() {
        slice[index][SLICES / 2] = 0.1;
    }
}

/// Gives volume `index` a rigid motion well above every threshold.
pub fn inject_gradient_motion(session: &mut RecordedSession, index: usize) {
    if let Some(gradient) = session.gradient.as_mut() {
        gradient[index].translation = [5.0, 0.0, 0.0];
    }
}
