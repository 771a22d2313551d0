use crate::{TelemetryError, initialize};

use googletest::assert_that;
use googletest::prelude::eq;
use log::LevelFilter;

#[test]
fn given_unwritable_log_path_when_initialize_then_logger_error() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let log_file = blocker.join("app.log");

    // When
    let result = initialize(LevelFilter::Info, Some(log_file), false);

    // Then
    assert_that!(
        matches!(result, Err(TelemetryError::Logger { .. })),
        eq(true)
    );
}
