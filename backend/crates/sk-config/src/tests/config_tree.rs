use crate::{ConfigError, ConfigTree};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{eq, none, ok};

fn tree(contents: &str) -> ConfigTree {
    ConfigTree::from_table(toml::from_str(contents).unwrap())
}

#[test]
fn given_nested_key_when_get_string_then_returns_value() {
    // Given
    let tree = tree("[servers.api]\naddr = \"127.0.0.1:80\"\n");

    // When / Then
    assert_that!(
        tree.get_string("servers.api.addr"),
        ok(eq("127.0.0.1:80"))
    );
    assert_that!(tree.contains("servers.api"), eq(true));
}

#[test]
fn given_absent_key_when_get_string_then_missing_key() {
    // Given
    let tree = tree("[servers]\n");

    // When
    let result = tree.get_string("servers.api.addr");

    // Then
    assert_that!(
        matches!(result, Err(ConfigError::MissingKey { .. })),
        eq(true)
    );
}

#[test]
fn given_path_through_scalar_when_lookup_then_none() {
    // Given
    let tree = tree("name = \"x\"\n");

    // When / Then
    assert_that!(tree.lookup("name.inner"), none());
}

#[test]
fn given_wrong_type_when_strict_get_then_invalid_value() {
    // Given
    let tree = tree("port = \"eighty\"\nflag = 1\n");

    // When / Then
    assert_that!(
        matches!(tree.get_int("port"), Err(ConfigError::InvalidValue { .. })),
        eq(true)
    );
    assert_that!(
        matches!(tree.get_bool("flag"), Err(ConfigError::InvalidValue { .. })),
        eq(true)
    );
}

#[test]
fn given_wrong_type_when_get_or_then_default() {
    // Given
    let tree = tree("port = \"eighty\"\n");

    // When / Then
    assert_that!(tree.get_int_or("port", 80), eq(80));
    assert_that!(tree.get_bool_or("missing", true), eq(true));
    assert_that!(
        tree.get_string_or("missing", "fallback").as_str(),
        eq("fallback")
    );
}

#[test]
fn given_duration_forms_when_get_duration_then_parsed() {
    // Given
    let tree = tree("a = \"1m 30s\"\nb = 45\nc = -1\n");

    // When / Then
    assert_that!(tree.get_duration("a"), ok(eq(&Duration::from_secs(90))));
    assert_that!(tree.get_duration("b"), ok(eq(&Duration::from_secs(45))));
    assert_that!(
        matches!(tree.get_duration("c"), Err(ConfigError::InvalidValue { .. })),
        eq(true)
    );
    assert_that!(
        tree.get_duration_or("absent", Duration::from_secs(7)),
        eq(Duration::from_secs(7))
    );
}

#[test]
fn given_string_list_when_get_string_list_then_all_items() {
    // Given
    let tree = tree("origins = [\"a\", \"b\"]\nmixed = [\"a\", 1]\n");

    // When / Then
    assert_that!(
        tree.get_string_list("origins"),
        ok(eq(&vec!["a".to_string(), "b".to_string()]))
    );
    assert_that!(
        tree.get_string_list_or("mixed", &["z"]),
        eq(&vec!["z".to_string()])
    );
}

#[test]
fn given_missing_section_when_section_then_defaults() {
    // Given
    let tree = tree("");

    // When
    let database: crate::DatabaseConfig = tree.section("database").unwrap();

    // Then
    assert_that!(database.max_connections, eq(20));
    assert_that!(database.path.as_str(), eq("skeleton.db"));
}
