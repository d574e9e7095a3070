//! Startup against a mocked bot network, through to role checks on the cached roles.

mod common;

use assert_matches::assert_matches;
use common::fixtures::*;
use guildkit::checks::{RoleCache, RoleCheck, STAFF_ROLE, VERIFIED_ROLE, check_role};
use guildkit::config::Settings;
use guildkit::network::DataScope;
use guildkit::setup::{BotSetup, SetupError};
use pretty_assertions::assert_eq;
use serde_json::json;
use serenity::all::{GuildId, RoleId};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn bot_network() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bots/data/42"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bot_document()))
        .mount(&server)
        .await;
    server
}

fn settings(base_url: String, data_dir: &std::path::Path) -> Settings {
    let data_dir = data_dir.display().to_string();
    Settings::from_lookup(move |key: &str| {
        let value = match key {
            "TOKEN" => "abc.def.ghi".to_string(),
            "BNC_BASE_URL" => base_url.clone(),
            "BNC_API_KEY" => "test-key".to_string(),
            "APPLICATION_ID" => "42".to_string(),
            "DEFAULT_SCOPES" => "version,startup_info,roles".to_string(),
            "DATA_DIR" => data_dir.clone(),
            _ => return None,
        };
        Some(value)
    })
    .unwrap()
}

#[tokio::test]
async fn preflight_caches_roles_for_checks() {
    common::init();
    let server = bot_network().await;
    let dir = tempfile::TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let setup = BotSetup::new(settings(server.uri(), &data_dir));

    assert_eq!(
        setup.settings().default_scopes,
        vec![DataScope::Version, DataScope::StartupInfo, DataScope::Roles]
    );

    setup.prepare_data_dir().unwrap();
    let preflight = setup.preflight().await.unwrap();

    assert_eq!(preflight.status, Some(json!({ "status": "ok" })));
    assert_eq!(preflight.scopes.get("startup_info"), Some(&json!("ready")));
    assert!(setup.startup_info("guildkit").await.starts_with("Launched with Version 3.1.0 at "));

    let roles = RoleCache::load(&data_dir.join("roles.json"));
    let guild = Some(GuildId::new(GUILD_ID));
    let staff = [RoleId::new(STAFF_ROLE_ID)];

    assert_eq!(check_role(&roles, guild, &staff, STAFF_ROLE), RoleCheck::Allowed);
    assert_eq!(check_role(&roles, guild, &staff, VERIFIED_ROLE), RoleCheck::MissingRole);
    // Role names absent from the cache deny access.
    assert_eq!(check_role(&roles, guild, &staff, "Moderator"), RoleCheck::MissingRole);
    assert_eq!(
        check_role(&roles, Some(GuildId::new(OTHER_GUILD_ID)), &staff, STAFF_ROLE),
        RoleCheck::MissingRole
    );
}

#[tokio::test]
async fn unreachable_network_stops_startup() {
    common::init();
    let dir = tempfile::TempDir::new().unwrap();
    let setup = BotSetup::new(settings("http://127.0.0.1:9".to_string(), dir.path()));

    assert_matches!(setup.preflight().await, Err(SetupError::NetworkUnavailable));
}

#[tokio::test]
async fn placeholder_token_refuses_to_run() {
    common::init();
    let dir = tempfile::TempDir::new().unwrap();
    let data_dir = dir.path().display().to_string();
    let settings = Settings::from_lookup(move |key: &str| match key {
        "TOKEN" => Some("NO_TOKEN_ADDED".to_string()),
        "NODE_CONNECTION" => Some("false".to_string()),
        "DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
    .unwrap();

    let result = BotSetup::new(settings).run(guildkit::commands::all()).await;

    assert_matches!(result, Err(SetupError::MissingToken));
}
