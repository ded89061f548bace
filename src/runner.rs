//! CLI execution and command dispatch logic.
//!
//! This module keeps [`main`] minimal by providing a single entry point that
//! loads the manifest, replays it onto a wiring spec and renders whatever the
//! selected command asks for.

use crate::builder::{DefaultBuilders, ResolveOptions};
use crate::cli::{BuildArgs, Cli, Commands};
use crate::ir::{ApplicationGraph, render_namespace, to_dot};
use crate::manifest;
use crate::wiring::WiringSpec;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Execute the parsed [`Cli`] commands.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, declares invalid
/// wiring, fails to resolve, or the output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    let (spec, default_roots) = load_spec(cli)?;
    match command {
        Commands::Build(args) => {
            ensure_configured(&spec)?;
            let roots = pick_roots(args.roots, &default_roots);
            let options = ResolveOptions {
                check_node_kinds: !args.allow_kind_mismatch,
                ..resolve_options(cli)
            };
            let graph = build(&spec, &roots, options)?;
            let rendered = render_graph(&graph, args.json, args.wrap_defaults)?;
            match args.emit {
                Some(path) => write_and_log(&output_path(cli, &path), &rendered),
                None => write_stdout(&rendered),
            }
        }
        Commands::Defs => write_stdout(&spec.to_string()),
        Commands::Graph(args) => {
            ensure_configured(&spec)?;
            let roots = pick_roots(args.roots, &default_roots);
            let graph = build(&spec, &roots, resolve_options(cli))?;
            write_stdout(to_dot(&graph).trim_end())
        }
        Commands::Check => {
            ensure_configured(&spec)?;
            let graph = build(&spec, &default_roots, resolve_options(cli))?;
            write_stdout(&format!(
                "{}: {} top-level nodes, {} dependencies",
                graph.name(),
                graph.nodes().len(),
                graph.dependencies().len()
            ))
        }
    }
}

/// Path of the manifest named by `cli`, relative to `--directory` if given.
#[must_use]
pub fn manifest_path(cli: &Cli) -> PathBuf {
    output_path(cli, &cli.file)
}

fn output_path(cli: &Cli, path: &Path) -> PathBuf {
    cli.directory
        .as_ref()
        .map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
}

fn load_spec(cli: &Cli) -> Result<(WiringSpec, Vec<String>)> {
    let path = manifest_path(cli);
    let manifest = manifest::from_path(&path)
        .with_context(|| format!("loading manifest at {}", path.display()))?;
    let ast_json = serde_json::to_string_pretty(&manifest).context("serialising manifest")?;
    debug!("AST:\n{ast_json}");
    Ok(manifest::to_spec(&manifest))
}

fn resolve_options(cli: &Cli) -> ResolveOptions {
    let defaults = ResolveOptions::default();
    ResolveOptions {
        max_depth: cli.max_depth.unwrap_or(defaults.max_depth),
        ..defaults
    }
}

fn pick_roots(requested: Vec<String>, defaults: &[String]) -> Vec<String> {
    if requested.is_empty() {
        defaults.to_vec()
    } else {
        requested
    }
}

/// Fail if the manifest declared invalid wiring, logging each problem.
fn ensure_configured(spec: &WiringSpec) -> Result<()> {
    for err in spec.errors() {
        warn!(callsite = err.callsite(), "{err}");
    }
    spec.err().context("invalid wiring configuration")
}

fn build(spec: &WiringSpec, roots: &[String], options: ResolveOptions) -> Result<ApplicationGraph> {
    spec.build_ir_with(roots, options)
        .with_context(|| format!("building application `{}`", spec.name()))
}

fn render_graph(graph: &ApplicationGraph, json: bool, wrap_defaults: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(&graph.summary()).context("serialising graph");
    }
    if wrap_defaults {
        let wrapped = DefaultBuilders::standard()
            .apply(graph)
            .context("wrapping floating nodes")?;
        return Ok(render_namespace(graph.name(), "Application", &[], &wrapped));
    }
    Ok(graph.to_string())
}

/// Write `content` to `path` and log the file's location.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
fn write_and_log(path: &Path, content: &str) -> Result<()> {
    fs::write(path, format!("{content}\n"))
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Generated graph at {}", path.display());
    Ok(())
}

fn write_stdout(content: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{content}").context("writing to stdout")?;
    out.flush().context("flushing stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], vec!["a", "b"])]
    #[case(vec!["c".to_owned()], vec!["c"])]
    fn requested_roots_override_manifest(#[case] requested: Vec<String>, #[case] expected: Vec<&str>) {
        let defaults = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(pick_roots(requested, &defaults), expected);
    }

    #[test]
    fn manifest_path_honours_directory() {
        let cli = Cli {
            file: PathBuf::from("Wiringfile"),
            directory: Some(PathBuf::from("app")),
            verbose: false,
            max_depth: Some(4),
            command: None,
        };
        assert_eq!(manifest_path(&cli), PathBuf::from("app/Wiringfile"));
        assert_eq!(resolve_options(&cli).max_depth, 4);
    }
}
