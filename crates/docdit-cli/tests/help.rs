mod common;

use common::{docdit, stdout};

#[test]
fn top_level_help_lists_commands() {
    let assert = docdit().arg("--help").assert().success();
    let output = stdout(&assert);
    assert!(output.contains("Create Doc DIT workspace installer"), "{output}");
    assert!(output.contains("setup"), "setup missing: {output}");
    assert!(output.contains("key"), "key missing: {output}");
    assert!(output.contains("--base-dir"), "base-dir missing: {output}");
}

#[test]
fn key_help_mentions_replace() {
    let assert = docdit().args(["key", "--help"]).assert().success();
    let output = stdout(&assert);
    assert!(output.contains("docdit key [--replace]"), "{output}");
    assert!(output.contains("Prompt for a new key without asking first"), "{output}");
}
