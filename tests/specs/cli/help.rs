use crate::prelude::*;

#[test]
fn top_level_help_lists_every_subcommand() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("up")
        .stdout_has("down")
        .stdout_has("status")
        .stdout_has("run-once")
        .stdout_has("ask")
        .stdout_has("tail-audit");
}

#[test]
fn version_flag_prints_a_version_and_exits_zero() {
    cli().args(&["--version"]).passes().stdout_has("umcc");
}
