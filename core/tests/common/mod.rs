#![allow(dead_code)]

use stackrag_core::config::{Config, ConfigOverrides, ConfigToml};
use stackrag_core::config_types::SearchMode;
use stackrag_memory::Document;

/// Some sandboxes forbid binding even loopback sockets; wiremock cannot run
/// there.
pub fn network_unavailable() -> bool {
    if std::net::TcpListener::bind("127.0.0.1:0").is_err() {
        println!("Skipping test due to sandbox network bind restrictions.");
        return true;
    }
    false
}

pub fn pet_documents() -> Vec<Document> {
    vec![
        Document::new("alpha about cats", "cats", "felines"),
        Document::new("beta about dogs", "dogs", "canines"),
        Document::new("gamma about fish", "fish", "aquatic"),
    ]
}

/// Keyword embedding: one axis per animal plus a small constant so no
/// vector is ever zero.
pub fn keyword_embedding(text: &str) -> Vec<f32> {
    let t = text.to_lowercase();
    let axis = |word: &str| if t.contains(word) { 1.0 } else { 0.0 };
    vec![axis("cat"), axis("dog"), axis("fish"), 0.01]
}

pub fn test_config(base_url: &str, mode: SearchMode) -> Config {
    let cfg = ConfigToml { documents: Some(pet_documents()), ..Default::default() };
    let overrides = ConfigOverrides {
        base_url: Some(base_url.to_string()),
        search_mode: Some(mode),
        ..Default::default()
    };
    Config::load_from_base_config_with_overrides(cfg, overrides).unwrap()
}
