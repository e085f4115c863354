mod common;

use kira_dwiqc::io::json_writer::{build_report, write_json};
use kira_dwiqc::protocol::Protocol;
use kira_dwiqc::qc::{run_left, run_qc};
use kira_dwiqc::schema::v1::DwiQcV1;
use serde_json::Value;
use tempfile::TempDir;

use common::{clean_session, inject_gradient_motion};

#[test]
fn json_report_populated() {
    let mut session = clean_session(1, 20);
    inject_gradient_motion(&mut session, 4);
    let volume = session.volume().unwrap();
    let protocol = Protocol::default();
    let run = run_qc(&volume, &protocol, session.checkers());
    let left = run_left(&volume, &run, &protocol, session.checkers());

    let report = build_report("session.json", &run, left.as_ref());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["tool"], "kira-dwiqc");
    assert_eq!(json["schema_version"], "v1");
    assert_eq!(json["input"], "session.json");
    assert_eq!(json["run"]["volumes"], 21);
    assert_eq!(json["run"]["status"]["value"], 0x80);
    assert_eq!(json["run"]["status"]["flags"]["gradient_wise_failed"], true);
    assert_eq!(json["run"]["status"]["complete"], true);
    assert_eq!(json["run"]["geometry"]["mask"], 0);
    assert_eq!(json["run"]["excluded"][0]["index"], 4);
    assert_eq!(json["run"]["excluded"][0]["category"], "gradient_wise");
    assert_eq!(json["run"]["counts"]["gradient_number"], 20);
    assert_eq!(json["run"]["surviving"]["gradient_number"], 19);
    assert!(json["run"]["statistics"]["slice"]["all"]["means"].is_array());
    assert_eq!(json["left"]["volumes"], 20);
}

#[test]
fn incomplete_run_reports_error() {
    let mut session = clean_session(1, 10);
    session.slice = None;
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());

    let json = serde_json::to_value(build_report("x", &run, None)).unwrap();
    assert_eq!(json["run"]["status"]["complete"], false);
    assert!(
        json["run"]["status"]["error"]
            .as_str()
            .unwrap()
            .contains("stage3_slice")
    );
    assert!(json["run"]["surviving"].is_null());
    assert!(json["left"].is_null());
}

#[test]
fn written_report_parses_back() {
    let session = clean_session(1, 8);
    let volume = session.volume().unwrap();
    let run = run_qc(&volume, &Protocol::default(), session.checkers());
    let report = build_report("session.json", &run, None);

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dwiqc.json");
    write_json(&path, &report).unwrap();
    let parsed: DwiQcV1 = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.run.status.value, 0);
    assert_eq!(parsed.run.surviving, report.run.surviving);
}
