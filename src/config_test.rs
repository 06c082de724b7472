use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let config = HostConfig::from_lookup(lookup(&[])).expect("config");
    assert_eq!(config.port, 3000);
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    assert_eq!(config.assets_dir, PathBuf::from("client/public"));
}

#[test]
fn reads_overrides() {
    let config = HostConfig::from_lookup(lookup(&[("PORT", " 8080 "), ("BIND_ADDR", "127.0.0.1"), ("ASSETS_DIR", "/srv/www")]))
        .expect("config");
    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    assert_eq!(config.assets_dir, PathBuf::from("/srv/www"));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = HostConfig::from_lookup(lookup(&[("PORT", "  "), ("BIND_ADDR", "")])).expect("config");
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn rejects_invalid_values() {
    assert_eq!(
        HostConfig::from_lookup(lookup(&[("PORT", "http")])),
        Err(ConfigError::InvalidPort("http".to_owned()))
    );
    assert_eq!(
        HostConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])),
        Err(ConfigError::InvalidAddress("localhost".to_owned()))
    );
}
