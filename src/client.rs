//! Client-type resolution: from a client variable (`api`, `trpc`) back
//! to the router value its generic type argument names. Works across
//! files and packages on syntax alone: the client initializer's type
//! argument names a type alias, the alias is a `typeof` query over the
//! router variable, and the variable resolves to the router declaration.

use crate::config::NavConfig;
use crate::imports;
use crate::model::{DeclRef, Miss, RouterTypeInfo};
use crate::parse::{self, ParsedFile, Workspace};
use std::path::Path;
use std::rc::Rc;
use tree_sitter::Node;

/// Resolve the router declaration behind a client variable used in
/// `usage_file`. Every step returns `Miss` on absence; nothing here
/// raises.
pub fn resolve_router_from_client(
    ws: &mut Workspace,
    usage_file: &Path,
    variable: &str,
    config: &NavConfig,
) -> Result<RouterTypeInfo, Miss> {
    let file = ws.load(usage_file)?;
    let client_decl = imports::resolve_identifier(ws, &file, variable)?;
    let type_name = client_type_name(&client_decl, config).ok_or_else(|| {
        tracing::debug!(variable, "client initializer carries no router type argument");
        Miss::Malformed
    })?;
    let client_file = Rc::clone(&client_decl.file);
    let alias = imports::resolve_type_identifier(ws, &client_file, &type_name)?;
    let router_name = queried_value_name(&alias).ok_or_else(|| {
        tracing::debug!(alias = %type_name, "type alias is not a typeof query");
        Miss::Malformed
    })?;
    let alias_file = Rc::clone(&alias.file);
    let router_decl = imports::resolve_identifier(ws, &alias_file, &router_name)?;
    let router_file = router_decl.file.path.clone();
    Ok(RouterTypeInfo {
        decl: router_decl,
        router_file,
    })
}

/// The router type name from a client declaration: the first type
/// argument of a recognized initializer call
/// (`createTRPCReact<AppRouter>()`), falling back to a text scan of the
/// declarator for erased or unusual initializer shapes.
fn client_type_name(decl: &DeclRef, config: &NavConfig) -> Option<String> {
    if let Some(node) = decl.node() {
        if let Some(name) = type_argument_of_initializer(&decl.file, node, config) {
            return Some(name);
        }
    }
    generic_from_text(decl, config)
}

fn type_argument_of_initializer(
    file: &Rc<ParsedFile>,
    declaration: Node<'_>,
    config: &NavConfig,
) -> Option<String> {
    let initializer = parse::declaration_initializer(declaration)?;
    let call = parse::unwrap_expression(initializer);
    if call.kind() != "call_expression" {
        return None;
    }
    let callee = parse::call_callee(call)?;
    let callee_text = file.text(callee);
    let last_segment = callee_text.rsplit('.').next().unwrap_or(callee_text);
    let recognized = config
        .patterns
        .client_initializers
        .iter()
        .any(|init| init == last_segment)
        || last_segment == config.patterns.utils_method;
    if !recognized {
        return None;
    }
    let type_args = call.child_by_field_name("type_arguments")?;
    let first = type_args.named_child(0)?;
    parse::leading_identifier(file.text(first))
}

/// Text-scan fallback: find `Initializer<TypeName` or any `<` preceded
/// by a word containing `TRPC` in the declarator source. Covers
/// initializers hidden behind wrappers the tree walk does not unwrap.
fn generic_from_text(decl: &DeclRef, config: &NavConfig) -> Option<String> {
    let text = &decl.file.source[decl.start..decl.end];
    for init in &config.patterns.client_initializers {
        if let Some(pos) = text.find(init.as_str()) {
            let rest = &text[pos + init.len()..];
            if let Some(stripped) = rest.trim_start().strip_prefix('<') {
                if let Some(name) = parse::leading_identifier(stripped) {
                    return Some(name);
                }
            }
        }
    }
    for (idx, _) in text.match_indices('<') {
        let before = text[..idx].trim_end();
        if !trailing_word(before).contains("TRPC") {
            continue;
        }
        if let Some(name) = parse::leading_identifier(&text[idx + 1..]) {
            return Some(name);
        }
    }
    None
}

/// The identifier run ending at the end of `text`, empty when the last
/// char is not an identifier char. Walks char boundaries so non-ASCII
/// punctuation in the declarator never splits a codepoint.
fn trailing_word(text: &str) -> &str {
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' {
            start = idx;
        } else {
            break;
        }
    }
    &text[start..]
}

/// For a `type AppRouter = typeof appRouter` alias, the queried value
/// name (`appRouter`).
fn queried_value_name(alias: &DeclRef) -> Option<String> {
    let node = alias.node()?;
    let value = node.child_by_field_name("value")?;
    if value.kind() == "type_query" {
        let text = alias.file.text(value);
        let stripped = text.trim_start().strip_prefix("typeof")?;
        return parse::leading_identifier(stripped);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, source).unwrap();
        }
        (dir, Workspace::new())
    }

    #[test]
    fn resolves_client_generic_to_router_declaration() {
        let (dir, mut ws) = setup(&[
            (
                "client.ts",
                "import type { AppRouter } from './router';\n\
                 export const api = createTRPCReact<AppRouter>();\n",
            ),
            (
                "router.ts",
                "export const appRouter = router({ ping: p });\n\
                 export type AppRouter = typeof appRouter;\n",
            ),
        ]);
        let config = NavConfig::default();
        let info = resolve_router_from_client(
            &mut ws,
            &dir.path().join("client.ts"),
            "api",
            &config,
        )
        .unwrap();
        assert_eq!(info.decl.name, "appRouter");
        assert!(info.router_file.ends_with("router.ts"));
    }

    #[test]
    fn unwraps_casts_around_initializer_call() {
        let (dir, mut ws) = setup(&[(
            "all.ts",
            "export const trpcRouter = router({ ping: p });\n\
             export type Routes = typeof trpcRouter;\n\
             export const trpc = createTRPCProxyClient<Routes>({}) as any;\n",
        )]);
        let config = NavConfig::default();
        let info =
            resolve_router_from_client(&mut ws, &dir.path().join("all.ts"), "trpc", &config)
                .unwrap();
        assert_eq!(info.decl.name, "trpcRouter");
    }

    #[test]
    fn text_fallback_finds_trpc_generic() {
        let (dir, mut ws) = setup(&[(
            "all.ts",
            "export const appRouter = router({ ping: p });\n\
             export type AppRouter = typeof appRouter;\n\
             export const api = wrapClient(createMyTRPCThing<AppRouter>());\n",
        )]);
        let config = NavConfig::default();
        let info =
            resolve_router_from_client(&mut ws, &dir.path().join("all.ts"), "api", &config)
                .unwrap();
        assert_eq!(info.decl.name, "appRouter");
    }

    #[test]
    fn missing_type_argument_is_malformed() {
        let (dir, mut ws) = setup(&[(
            "client.ts",
            "export const api = makeClient();\n",
        )]);
        let config = NavConfig::default();
        let miss = resolve_router_from_client(
            &mut ws,
            &dir.path().join("client.ts"),
            "api",
            &config,
        )
        .unwrap_err();
        assert_eq!(miss, Miss::Malformed);
    }

    #[test]
    fn non_ascii_declarator_text_is_not_a_client() {
        let (dir, mut ws) = setup(&[(
            "client.ts",
            "export const api = make(\"\u{2192}x<y\");\n",
        )]);
        let config = NavConfig::default();
        let miss = resolve_router_from_client(
            &mut ws,
            &dir.path().join("client.ts"),
            "api",
            &config,
        )
        .unwrap_err();
        assert_eq!(miss, Miss::Malformed);
    }

    #[test]
    fn alias_that_is_not_typeof_is_malformed() {
        let (dir, mut ws) = setup(&[(
            "all.ts",
            "export type AppRouter = { ping: unknown };\n\
             export const api = createTRPCReact<AppRouter>();\n",
        )]);
        let config = NavConfig::default();
        let miss =
            resolve_router_from_client(&mut ws, &dir.path().join("all.ts"), "api", &config)
                .unwrap_err();
        assert_eq!(miss, Miss::Malformed);
    }
}
