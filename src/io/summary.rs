use crate::gradients::DiffusionCounts;
use crate::schema::v1::{DwiQcV1, RunReport};
use crate::status::QcStatus;

pub fn format_summary(report: &DwiQcV1) -> String {
    let mut out = String::new();
    out.push_str(&format!("kira-dwiqc v{}\n", report.version));
    out.push_str(&format!("Input: {}\n", report.input));
    push_run(&mut out, "", &report.run);
    if let Some(left) = &report.left {
        push_run(&mut out, "Left ", left);
    }
    out
}

fn push_run(out: &mut String, prefix: &str, run: &RunReport) {
    let b_value = run
        .b_value
        .map(|b| format!("{b}"))
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "{}Volumes: {}, b-value: {}\n",
        prefix, run.volumes, b_value
    ));

    let fired = QcStatus::from_bits(run.status.value).fired();
    let flags = if fired.is_empty() {
        "none".to_string()
    } else {
        fired.join(", ")
    };
    out.push_str(&format!(
        "{}Status: 0x{:02x} ({})\n",
        prefix, run.status.value, flags
    ));
    if let Some(err) = &run.status.error {
        out.push_str(&format!("{}Incomplete: {}\n", prefix, err));
    }
    if let Some(geometry) = &run.geometry {
        if geometry.conformance_forced {
            out.push_str(&format!(
                "{}Geometry: mask 0x{:02x}, conformance forced\n",
                prefix, geometry.mask
            ));
        }
    }
    if let (Some(counts), Some(surviving)) = (&run.counts, &run.surviving) {
        out.push_str(&format!("{}Counts: {}\n", prefix, format_counts(counts, surviving)));
    }
    if !run.excluded.is_empty() {
        let indices: Vec<String> = run
            .excluded
            .iter()
            .map(|e| format!("{}:{}", e.index, e.category.as_str()))
            .collect();
        out.push_str(&format!("{}Excluded: {}\n", prefix, indices.join(", ")));
    }
}

fn format_counts(counts: &DiffusionCounts, surviving: &DiffusionCounts) -> String {
    format!(
        "baselines {}/{}, b-values {}/{}, directions {}/{}, gradients {}/{}",
        surviving.baseline_number,
        counts.baseline_number,
        surviving.b_value_number,
        counts.b_value_number,
        surviving.gradient_dir_number,
        counts.gradient_dir_number,
        surviving.gradient_number,
        counts.gradient_number
    )
}
