#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

pub fn workspace(prefix: &str) -> (TempDir, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("Doc_DIT_System");
    std::fs::create_dir_all(&root).expect("workspace root");
    (temp, root)
}

pub fn docdit() -> Command {
    let mut cmd = cargo_bin_cmd!("docdit");
    cmd.env_remove("DOCDIT_BASE_DIR")
        .env_remove("DOCDIT_RESTARTED")
        .env("NO_COLOR", "1");
    cmd
}

pub fn stdout(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

pub fn stderr(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr")
}
