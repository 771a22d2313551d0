use crate::tests::{capture, captured};
use crate::{Field, Logger};

use googletest::assert_that;
use googletest::prelude::{contains_substring, ends_with, eq, len, some};
use log::Level;
use serial_test::serial;

#[test]
#[serial]
fn given_service_logger_when_info_then_base_fields_follow_call_fields() {
    // Given
    capture();
    let logger = Logger::for_service("svc", "1.2.3", "production");

    // When
    logger.info("server started", &[Field::server("api")]);

    // Then
    let lines = captured();
    assert_that!(lines, len(eq(1)));
    assert_that!(lines[0].level, eq(Level::Info));
    assert_that!(
        lines[0].message.as_str(),
        eq("server started server=api env=production version=1.2.3 service=svc")
    );
}

#[test]
#[serial]
fn given_logger_when_logging_then_caller_location_recorded() {
    // Given
    capture();
    let logger = Logger::default();

    // When
    logger.warn("careful", &[]);

    // Then
    let lines = captured();
    assert_that!(lines[0].file.as_deref(), some(ends_with("logger.rs")));
    assert_that!(lines[0].message.as_str(), eq("careful"));
}

#[test]
#[serial]
fn given_child_logger_when_logging_then_parent_and_child_fields_present() {
    // Given
    capture();
    let parent = Logger::new(vec![Field::service("svc")]);
    let child = parent.with(vec![Field::server("metrics")]);

    // When
    child.debug("tick", &[]);

    // Then
    assert_that!(
        captured()[0].message.as_str(),
        eq("tick service=svc server=metrics")
    );
    assert_that!(parent.fields(), len(eq(1)));
}

#[test]
#[serial]
fn given_fatal_when_logged_then_error_level_with_fatal_flag() {
    // Given
    capture();
    let logger = Logger::default();

    // When
    logger.fatal("cannot start", &[]);

    // Then
    let lines = captured();
    assert_that!(lines[0].level, eq(Level::Error));
    assert_that!(lines[0].message.as_str(), contains_substring("fatal=true"));
}

#[test]
#[serial]
fn given_ok_result_when_log_if_error_then_nothing_logged() {
    // Given
    capture();
    let logger = Logger::default();
    let result: Result<(), std::io::Error> = Ok(());

    // When
    logger.log_if_error("close failed", &result, &[]);

    // Then
    assert_that!(captured(), len(eq(0)));
}

#[test]
#[serial]
fn given_err_result_when_log_if_error_then_error_logged_with_cause() {
    // Given
    capture();
    let logger = Logger::default();
    let result: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));

    // When
    logger.log_if_error("close failed", &result, &[Field::server("api")]);

    // Then
    let lines = captured();
    assert_that!(lines, len(eq(1)));
    assert_that!(lines[0].level, eq(Level::Error));
    assert_that!(
        lines[0].message.as_str(),
        eq("close failed server=api error=boom")
    );
}

#[test]
#[serial]
fn given_max_level_info_when_debug_then_suppressed() {
    // Given
    capture();
    log::set_max_level(log::LevelFilter::Info);
    let logger = Logger::default();

    // When
    logger.debug("noise", &[]);
    logger.info("signal", &[]);

    // Then
    let lines = captured();
    assert_that!(lines, len(eq(1)));
    assert_that!(lines[0].message.as_str(), eq("signal"));
}
