use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn database_url_is_required() {
    let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn defaults_apply_when_unset() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();
    assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.pdf_fetch_timeout, Duration::from_secs(DEFAULT_PDF_FETCH_TIMEOUT_SECS));
    assert_eq!(cfg.pdf_connect_timeout, Duration::from_secs(DEFAULT_PDF_CONNECT_TIMEOUT_SECS));
}

#[test]
fn overrides_are_parsed() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("BIND_ADDR", "127.0.0.1:8080"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("PDF_FETCH_TIMEOUT_SECS", " 45 "),
    ]))
    .unwrap();
    assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
    assert_eq!(cfg.db_max_connections, 12);
    assert_eq!(cfg.pdf_fetch_timeout, Duration::from_secs(45));
}

#[test]
fn garbage_numbers_fall_back_to_defaults() {
    let cfg = ServerConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("DB_MAX_CONNECTIONS", "lots"),
        ("PDF_FETCH_TIMEOUT_SECS", "-3"),
    ]))
    .unwrap();
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.pdf_fetch_timeout, Duration::from_secs(DEFAULT_PDF_FETCH_TIMEOUT_SECS));
}
