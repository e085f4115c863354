use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-dwiqc").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn protocol_show_prints_default_protocol() {
    let mut cmd = Command::cargo_bin("kira-dwiqc").unwrap();
    let output = cmd.arg("protocol").arg("show").output().unwrap();
    assert!(output.status.success());
    let protocol: kira_dwiqc::protocol::Protocol =
        serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(protocol, kira_dwiqc::protocol::Protocol::default());
}
