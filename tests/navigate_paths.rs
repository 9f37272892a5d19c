use rpcnav::config::NavConfig;
use rpcnav::locate;
use rpcnav::model::TargetKind;
use rpcnav::navigate;
use rpcnav::parse::Workspace;
use std::fs;
use std::path::Path;
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

fn load_config(repo: &Path) -> NavConfig {
    NavConfig::load(repo, None).unwrap()
}

#[test]
fn explicit_config_resolves_nested_procedure() {
    let repo = write_repo(&[
        (
            "rpcnav.json",
            r#"{ "router": { "filePath": "server/router.ts", "variableName": "appRouter" } }"#,
        ),
        (
            "server/router.ts",
            r#"
import { billingRouter } from "./billing";
export const appRouter = router({
  billing: billingRouter,
  health: t.procedure.query(() => "ok"),
});
"#,
        ),
        (
            "server/billing.ts",
            r#"
export const claimsProcedure = t.procedure
  .input(z.object({ id: z.string() }))
  .query(({ input }) => fetchClaims(input.id));

export const billingRouter = router({
  claims: claimsProcedure,
});
"#,
        ),
    ]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();
    assert_eq!(root.name, "appRouter");

    let target = navigate::navigate(&mut ws, &root, "api.billing.claims", "api", &config);
    assert!(target.file.ends_with("billing.ts"));
    assert_eq!(target.kind, TargetKind::Procedure);
    assert_eq!(target.line, 2);
    assert_eq!(target.column, 14);
    assert_eq!(target.procedure_name.as_deref(), Some("claimsProcedure"));
}

#[test]
fn auto_discovery_finds_main_router_in_index_file() {
    let repo = write_repo(&[
        (
            "src/index.ts",
            r#"
export const appRouter = createTRPCRouter({
  user: userRouter,
});
const userRouter = createTRPCRouter({
  me: t.procedure.query(() => null),
});
"#,
        ),
        (
            "src/unrelated.ts",
            "export const helper = () => 1;\n",
        ),
    ]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();
    assert!(root.file.path.ends_with("index.ts"));

    let target = navigate::navigate(&mut ws, &root, "api.user.me", "api", &config);
    assert_eq!(target.kind, TargetKind::InlineProcedure);
    assert_eq!(target.procedure_name.as_deref(), Some("me"));
    assert_eq!(target.line, 6);
}

#[test]
fn inline_nested_router_resolves_without_intermediate_variable() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
export const appRouter = router({
  admin: router({
    stats: t.procedure.query(() => ({})),
  }),
});
"#,
    )]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    let target = navigate::navigate(&mut ws, &root, "api.admin.stats", "api", &config);
    assert_eq!(target.kind, TargetKind::InlineProcedure);
    assert_eq!(target.line, 4);
}

#[test]
fn partial_path_degrades_to_deepest_router() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
const billingRouter = router({ claims: c });
export const appRouter = router({ billing: billingRouter });
"#,
    )]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    // A misspelled leaf lands on its parent router, not a failure.
    let target = navigate::navigate(&mut ws, &root, "api.billing.claimz", "api", &config);
    assert_eq!(target.kind, TargetKind::Router);
    assert_eq!(target.line, 2);
    assert!(target.procedure_name.is_none());

    // A misspelled middle segment lands on the root router.
    let target = navigate::navigate(&mut ws, &root, "api.billingg.claims", "api", &config);
    assert_eq!(target.kind, TargetKind::Router);
    assert_eq!(target.line, 3);
}

#[test]
fn prefix_resolves_no_deeper_than_extension() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
const claimsProc = t.procedure.query(() => []);
const billingRouter = router({ claims: claimsProc });
export const appRouter = router({ billing: billingRouter });
"#,
    )]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    let parent = navigate::navigate(&mut ws, &root, "api.billing", "api", &config);
    let child = navigate::navigate(&mut ws, &root, "api.billing.claims", "api", &config);
    assert_eq!(parent.kind, TargetKind::Router);
    assert_eq!(parent.line, 3);
    assert_eq!(child.kind, TargetKind::Procedure);
    assert_eq!(child.line, 2);
}

#[test]
fn depth_bound_stops_runaway_paths() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
export const appRouter = router({ a: router({ b: router({ c: router({ d: p }) }) }) });
"#,
    )]);
    let mut config = load_config(repo.path());
    config.max_depth = 2;
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    let target = navigate::navigate(&mut ws, &root, "api.a.b.c.d", "api", &config);
    // Resolution halts at the bound and reports the deepest router
    // reached.
    assert_eq!(target.kind, TargetKind::Router);
}

#[test]
fn wrapped_and_plain_object_routers_both_navigate() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
const legacyRouter = {
  ping: t.procedure.query(() => "pong"),
};
export const appRouter = router({ legacy: legacyRouter });
"#,
    )]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    let target = navigate::navigate(&mut ws, &root, "api.legacy.ping", "api", &config);
    assert_eq!(target.kind, TargetKind::InlineProcedure);
    assert_eq!(target.line, 3);
}

#[test]
fn satisfies_wrapper_on_router_object_is_transparent() {
    let repo = write_repo(&[(
        "index.ts",
        r#"
export const appRouter = router({
  ping: t.procedure.query(() => "pong"),
} satisfies RouterDef);
"#,
    )]);
    let config = load_config(repo.path());
    let mut ws = Workspace::new();
    let root = locate::locate(&mut ws, &config).unwrap();

    let target = navigate::navigate(&mut ws, &root, "api.ping", "api", &config);
    assert_eq!(target.kind, TargetKind::InlineProcedure);
}
