use crate::Cli;

use std::path::PathBuf;

use clap::Parser;
use googletest::prelude::*;

#[test]
fn given_no_arguments_when_parsed_then_defaults_apply() {
    let cli = Cli::try_parse_from(["sk-server"]).unwrap();

    assert_that!(cli.config, eq(&PathBuf::from("config.conf")));
    assert_that!(cli.disable_aux_servers, eq(false));
}

#[test]
fn given_flags_when_parsed_then_values_taken() {
    let cli = Cli::try_parse_from([
        "sk-server",
        "--config",
        "/etc/sk/service.conf",
        "--disable-aux-servers",
    ])
    .unwrap();

    assert_that!(cli.config, eq(&PathBuf::from("/etc/sk/service.conf")));
    assert_that!(cli.disable_aux_servers, eq(true));
}

#[test]
fn given_unknown_flag_when_parsed_then_rejected() {
    let result = Cli::try_parse_from(["sk-server", "--verbose-please"]);

    assert_that!(result.is_err(), eq(true));
}
