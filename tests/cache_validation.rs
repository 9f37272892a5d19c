use rpcnav::cache::NavigationCache;
use rpcnav::config::NavConfig;
use rpcnav::locate;
use rpcnav::navigate;
use rpcnav::parse::Workspace;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, source).unwrap();
    }
    dir
}

fn build_cache(repo: &TempDir, timeout: Duration) -> NavigationCache {
    let config = NavConfig::load(repo.path(), None).unwrap();
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();
    let mapping = navigate::build_procedure_map(&mut ws, &root, &config);
    let mut cache = NavigationCache::new(timeout);
    cache.set(mapping, &ws.loaded_paths());
    cache
}

const ROUTER: &str = r#"
const claimsProc = t.procedure.query(() => []);
const billingRouter = router({ claims: claimsProc });
export const appRouter = router({ billing: billingRouter });
"#;

#[test]
fn cached_scan_serves_repeat_lookups() {
    let repo = write_repo(&[("index.ts", ROUTER)]);
    let mut cache = build_cache(&repo, Duration::from_secs(3600));
    let mapping = cache.get().expect("cache should be warm");
    assert!(mapping.contains_key("api.billing.claims"));
    // Second read hits the same stored mapping.
    assert!(cache.get().is_some());
}

#[test]
fn edit_to_contributing_file_invalidates_cache() {
    let repo = write_repo(&[("index.ts", ROUTER)]);
    let mut cache = build_cache(&repo, Duration::from_secs(3600));
    assert!(cache.get().is_some());
    fs::write(
        repo.path().join("index.ts"),
        "export const appRouter = router({ renamed: p });\n",
    )
    .unwrap();
    assert!(cache.get().is_none(), "stale mapping must not be served");
}

#[test]
fn unrelated_file_does_not_invalidate_cache() {
    let repo = write_repo(&[("index.ts", ROUTER)]);
    let mut cache = build_cache(&repo, Duration::from_secs(3600));
    fs::write(repo.path().join("notes.md"), "scratch\n").unwrap();
    assert!(cache.get().is_some());
}

#[test]
fn zero_timeout_expires_immediately() {
    let repo = write_repo(&[("index.ts", ROUTER)]);
    let mut cache = build_cache(&repo, Duration::from_millis(0));
    assert!(cache.get().is_none());
}

#[test]
fn rebuild_after_invalidation_reflects_new_structure() {
    let repo = write_repo(&[("index.ts", ROUTER)]);
    let mut cache = build_cache(&repo, Duration::from_secs(3600));
    assert!(cache.get().unwrap().contains_key("api.billing.claims"));

    fs::write(
        repo.path().join("index.ts"),
        r#"
export const appRouter = router({
  audit: t.procedure.query(() => []),
});
"#,
    )
    .unwrap();
    assert!(cache.get().is_none());

    let mut cache = build_cache(&repo, Duration::from_secs(3600));
    let mapping = cache.get().unwrap();
    assert!(mapping.contains_key("api.audit"));
    assert!(!mapping.contains_key("api.billing.claims"));
}
