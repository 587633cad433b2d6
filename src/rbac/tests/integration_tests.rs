//! End-to-end access decisions over loaded role files

use cretoai_rbac::{
    AutoAttach, CallChain, RbacConfig, RbacError, Role, RoleRecord, RoleRegistry, RuleRecord,
    User,
};
use std::io::Write;
use std::sync::Arc;
use std::thread;

const ROLES_JSON: &str = r#"[
    {
        "id": "everyone",
        "name": "Everyone",
        "auto": "all",
        "access": [
            {"path": "/public/**", "permission": "read"}
        ]
    },
    {
        "id": "analyst",
        "name": "Analyst",
        "description": "Visible data plus reports",
        "access": [
            {"path": "data/visible/**", "permission": "read, write"},
            {"path": "data/restricted/**", "permission": "read", "via": "procedure/reports/**"},
            {"path": "data/visible/locked/**", "permission": ""}
        ]
    },
    {
        "id": "legacy",
        "access": [
            {"type": "procedure", "name": "system/status"},
            {"type": "procedure", "regexp": "^app/.*"},
            {"regexp": "files/.*\\.txt", "permission": "search"},
            {"path": "data/internal/**", "permission": "internal"},
            {"type": "procedure", "name": "report/export", "caller": "report/run"}
        ]
    },
    {
        "id": "admin",
        "auto": "none",
        "access": [
            {"regex": "^admin/.*$", "permission": "all"}
        ]
    }
]"#;

fn registry() -> RoleRegistry {
    RoleRegistry::from_json(ROLES_JSON, &RbacConfig::default()).unwrap()
}

// ============================================================================
// ACCESS DECISIONS
// ============================================================================

#[test]
fn test_glob_full_match_semantics() {
    let single = Role::new(RoleRecord::new("g").with_rule(RuleRecord::path("data/*/foo", "read")));
    let deep = Role::new(RoleRecord::new("g").with_rule(RuleRecord::path("data/**", "read")));
    let chain = CallChain::empty();

    assert!(single.has_access("data/x/foo", "read", &chain));
    assert!(!single.has_access("data/x/y/foo", "read", &chain));
    assert!(deep.has_access("data/x/foo", "read", &chain));
    assert!(deep.has_access("data/x/y/foo", "read", &chain));
}

#[test]
fn test_case_insensitive_paths() {
    let role = Role::new(
        RoleRecord::new("c").with_rule(RuleRecord::path("/data/confidential/**", "read")),
    );
    assert!(role.has_access("data/CONFIDENTIAL/report", "read", &CallChain::empty()));
}

#[test]
fn test_via_gating() {
    let registry = registry();
    let analyst = User::new("alice").with_role("analyst");

    let through_reports = CallChain::new(["procedure/reports/list"]);
    let through_system = CallChain::new(["procedure/system/procedure/call"]);

    assert!(registry.has_access(Some(&analyst), "data/restricted/overview", "read", &through_reports));
    assert!(!registry.has_access(Some(&analyst), "data/restricted/overview", "read", &through_system));
    assert!(!registry.has_access(Some(&analyst), "data/restricted/overview", "read", &CallChain::empty()));
}

#[test]
fn test_wall_off_does_not_revoke() {
    let registry = registry();
    let analyst = User::new("alice").with_role("analyst");
    let chain = CallChain::empty();

    // The blank rule grants nothing on its own, but the broader rule still applies
    assert!(registry.has_access(Some(&analyst), "data/visible/locked/x", "write", &chain));
}

#[test]
fn test_admin_wildcard() {
    let registry = registry();
    let admin = User::new("root").with_role("admin");
    let chain = CallChain::empty();

    assert!(registry.has_access(Some(&admin), "admin/user", "write", &chain));
    assert!(registry.has_access(Some(&admin), "admin/user", "custom-permission", &chain));
    assert!(!registry.has_access(Some(&admin), "data/other/info", "read", &chain));
}

#[test]
fn test_auto_attach_membership() {
    let registry = registry();
    let chain = CallChain::empty();

    assert!(registry.has_access(None, "public/index.html", "read", &chain));
    assert!(!registry.has_access(None, "data/visible/info", "read", &chain));
    assert!(!registry.has_access(Some(&User::new("bob")), "admin/user", "read", &chain));
}

// ============================================================================
// LEGACY RECORDS
// ============================================================================

#[test]
fn test_legacy_rules_loaded() {
    let registry = registry();
    let user = User::new("old-timer").with_role("legacy");
    let chain = CallChain::empty();

    assert!(registry.has_access(Some(&user), "procedure/system/status", "read", &chain));
    assert!(!registry.has_access(Some(&user), "procedure/system/status", "write", &chain));
    assert!(registry.has_access(Some(&user), "procedure/app/list", "read", &chain));
    assert!(registry.has_access(Some(&user), "files/notes.txt", "search", &chain));
    assert!(!registry.has_access(Some(&user), "files/notes.md", "search", &chain));
}

#[test]
fn test_legacy_internal_and_caller_gated() {
    let registry = registry();
    let user = User::new("old-timer").with_role("legacy");

    let external = CallChain::new(["procedure/system/storage/read", "procedure/report/run"]);
    let system_only = CallChain::new(["procedure/system/storage/read"]);

    assert!(registry.has_access(Some(&user), "data/internal/x", "read", &external));
    assert!(!registry.has_access(Some(&user), "data/internal/x", "read", &system_only));

    assert!(registry.has_access(Some(&user), "procedure/report/export", "read", &external));
    assert!(!registry.has_access(Some(&user), "procedure/report/export", "read", &system_only));
}

#[test]
fn test_normalized_records_are_canonical() {
    let registry = registry();
    let role = registry.get("legacy").unwrap();

    for rule in role.rules() {
        assert!(rule.record().legacy.is_empty());
        assert!(rule.record().pattern_source().is_ok());
    }
    assert_eq!(role.rules()[2].record().regex.as_deref(), Some("files/.*\\.txt"));
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ROLES_JSON.as_bytes()).unwrap();

    let registry = RoleRegistry::from_path(file.path(), &RbacConfig::default()).unwrap();
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.get("everyone").unwrap().auto(), AutoAttach::AllUsers);
    assert_eq!(registry.get("analyst").unwrap().description(), "Visible data plus reports");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = RoleRegistry::from_path(dir.path().join("absent.json"), &RbacConfig::default());
    assert!(matches!(result, Err(RbacError::Io(_))));
}

#[test]
fn test_strict_loading() {
    let json = r#"[{"id": "bad", "access": [{"path": "a/**", "regex": "a/.*", "permission": "read"}]}]"#;

    let lenient = RoleRegistry::from_json(json, &RbacConfig::default()).unwrap();
    let user = User::new("u").with_role("bad");
    assert!(!lenient.has_access(Some(&user), "a/b", "read", &CallChain::empty()));

    let strict = RbacConfig {
        strict: true,
        ..Default::default()
    };
    let result = RoleRegistry::from_json(json, &strict);
    assert!(matches!(result, Err(RbacError::InvalidRule { ref role, index: 0, .. }) if role == "bad"));
}

#[test]
fn test_strict_loading_accepts_normalized_legacy() {
    let strict = RbacConfig {
        strict: true,
        ..Default::default()
    };
    assert!(RoleRegistry::from_json(ROLES_JSON, &strict).is_ok());
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_checks_on_fresh_registry() {
    let registry = Arc::new(registry());
    let mut handles = vec![];

    for i in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let analyst = User::new(format!("user{}", i)).with_role("analyst");
            let chain = CallChain::new(["procedure/reports/list"]);
            let path = format!("data/restricted/item{}", i);

            registry.has_access(Some(&analyst), &path, "read", &chain)
                && !registry.has_access(Some(&analyst), &path, "write", &chain)
        }));
    }

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
