//! Configuration tests

use super::project::{LinkedOrganization, LinkedProject};
use super::*;
use crate::api::types::User;

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that serialized config can be parsed back.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<Config, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_with_identity() {
    let config = Config {
        api_url: "https://api.hopsule.com".into(),
        web_url: "https://hopsule.com".into(),
        token: "tok-123".into(),
        project: "proj-1".into(),
        organization: "org-1".into(),
        user: Some(User {
            id: "u1".into(),
            email: "dev@example.com".into(),
            name: "Dev".into(),
            avatar_url: None,
        }),
    };

    let parsed: Config = toml::from_str(&config.to_toml()).expect("round-trip");
    assert_eq!(parsed.api_url, "https://api.hopsule.com");
    assert_eq!(parsed.token, "tok-123");
    assert_eq!(parsed.user.as_ref().map(|u| u.email.as_str()), Some("dev@example.com"));
}

/// A config file without the optional fields still parses.
#[test]
fn test_config_parses_minimal_file() {
    let parsed: Config =
        toml::from_str("api_url = \"http://localhost:8080\"\nweb_url = \"http://localhost:3000\"\n")
            .expect("minimal config should parse");
    assert!(parsed.token.is_empty());
    assert!(parsed.user.is_none());
    assert!(!parsed.is_authenticated());
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth state
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_is_authenticated_follows_token() {
    let mut config = Config::default();
    assert!(!config.is_authenticated());

    config.token = "tok".into();
    assert!(config.is_authenticated());
}

#[test]
fn test_clear_auth_keeps_defaults() {
    let mut config = Config {
        token: "tok".into(),
        project: "proj-1".into(),
        organization: "org-1".into(),
        user: Some(User {
            id: "u1".into(),
            email: "dev@example.com".into(),
            name: "Dev".into(),
            avatar_url: None,
        }),
        ..Config::default()
    };

    config.clear_auth();

    assert!(!config.is_authenticated());
    assert!(config.user.is_none());
    // Org/project defaults survive logout
    assert_eq!(config.project, "proj-1");
    assert_eq!(config.organization, "org-1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Project link file
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_project_link_found_in_parent_dir() {
    let root = std::env::temp_dir().join(format!("hopsule-link-test-{}", std::process::id()));
    let nested = root.join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let link = ProjectLink {
        version: 0,
        project: LinkedProject {
            id: "proj-1".into(),
            slug: "backend".into(),
            name: "Backend".into(),
            organization: LinkedOrganization {
                id: "org-1".into(),
                slug: "acme".into(),
                name: "Acme".into(),
            },
        },
    };
    write_project_link(&root, &link).unwrap();

    let (found, path) = find_project_link(&nested).expect("link should be found upward");
    assert_eq!(found.project.id, "proj-1");
    assert_eq!(found.version, 1, "version 0 is rewritten to the current version");
    assert!(path.ends_with(PROJECT_LINK_FILE));

    std::fs::remove_dir_all(&root).unwrap();
}
