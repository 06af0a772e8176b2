//! phpdocmd — generate cross-linked markdown documentation from PHPDoc
//! comments.
//!
//! The target may be a single class name, a comma-separated list of
//! names, a source directory, or a glob pattern:
//!
//! - `phpdocmd '\Acme\Parser' --src src/`
//! - `phpdocmd src/ -o API.md`
//! - `phpdocmd 'src/**/*.php' --see`

mod assemble;
mod discover;
mod error;
mod links;
mod model;
mod parser;
mod render;
mod resolve;
mod types;

use anyhow::{Context, Result};
use assemble::AssembleOptions;
use clap::Parser;
use regex::Regex;
use resolve::{ClassResolver, ResolverOptions, TypeRegistry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "phpdocmd",
    about = "Generate markdown documentation for classes and their PHPDoc comments"
)]
struct Cli {
    /// Class name, comma-separated class names, source directory, or
    /// glob pattern
    target: String,

    /// Directory scanned for class declarations referenced by name
    #[arg(long, default_value = ".")]
    src: String,

    /// Directories to ignore when scanning, a comma-separated list of
    /// name suffixes
    #[arg(short = 'i', long, default_value = "")]
    ignore: String,

    /// The visibility of the methods to include, a comma-separated list
    #[arg(long, default_value = "")]
    visibility: String,

    /// Full regular expression method names must match to be included
    #[arg(long)]
    method_regex: Option<String>,

    /// The slug of the table generator to use
    #[arg(long, default_value = "default")]
    table_generator: String,

    /// Include @see references in the output
    #[arg(long)]
    see: bool,

    /// Leave out entities tagged @internal
    #[arg(long)]
    no_internal: bool,

    /// Write the document to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // A bad generator slug fails before any parsing work begins
    let mut generator = render::create_generator(&cli.table_generator)?;

    let ignore = split_list(&cli.ignore);
    let mut registry = TypeRegistry::default();

    let src_dir = Path::new(&cli.src);
    if src_dir.is_dir() {
        let files = discover::php_files(src_dir, &ignore)?;
        debug!("scanning {} files under {}", files.len(), cli.src);
        for path in &files {
            register_file(&mut registry, path);
        }
    } else if cli.src != "." {
        warn!("source directory {} not found", cli.src);
    }

    let target = cli.target.trim();
    let mut single_class = false;
    let names: Vec<String> = if target.contains(',') {
        split_list(target)
            .into_iter()
            .filter(|name| {
                let known = registry.contains(name);
                if !known {
                    warn!("skipping unknown class {}", name);
                }
                known
            })
            .collect()
    } else if Path::new(target).is_dir() {
        let files = discover::php_files(Path::new(target), &ignore)?;
        collect_classes(&mut registry, &files)
    } else if target.contains(['*', '?', '[']) {
        let files = discover::expand_glob(target)?;
        collect_classes(&mut registry, &files)
    } else {
        single_class = true;
        vec![target.to_string()]
    };

    let options = ResolverOptions {
        visibility: parse_visibility(&cli.visibility),
        method_regex: cli
            .method_regex
            .as_deref()
            .map(compile_method_regex)
            .transpose()?,
    };
    let mut resolver = ClassResolver::new(registry, options);

    debug!("documenting {} requested classes", names.len());
    let assemble_options = AssembleOptions {
        include_see: cli.see,
        exclude_internal: cli.no_internal,
        single_class,
    };
    let document = assemble::assemble(
        &mut resolver,
        generator.as_mut(),
        &names,
        &assemble_options,
    )?;

    match &cli.output {
        Some(path) => fs::write(path, &document)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", document),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("phpdocmd=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phpdocmd=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Parse one source file into the registry; unreadable files are skipped
/// with a warning.
fn register_file(registry: &mut TypeRegistry, path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => {
            for class in parser::php::parse(&content) {
                registry.add(class);
            }
        }
        Err(e) => warn!("skipping {}: {}", path.display(), e),
    }
}

/// Parse each file into the registry and collect its class names, grouped
/// per namespace with namespaces in sorted order.
fn collect_classes(registry: &mut TypeRegistry, files: &[PathBuf]) -> Vec<String> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for path in files {
        match fs::read_to_string(path) {
            Ok(content) => {
                for class in parser::php::parse(&content) {
                    entries.push((class.namespace.clone(), class.name.clone()));
                    registry.add(class);
                }
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    discover::group_by_namespace(entries)
        .into_iter()
        .flatten()
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_visibility(raw: &str) -> Vec<String> {
    let listed = split_list(raw);
    if listed.is_empty() {
        ResolverOptions::default().visibility
    } else {
        listed
    }
}

/// The whole method name must match, so the pattern is anchored.
fn compile_method_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .with_context(|| format!("invalid method regex: {}", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_splitting_trims_and_drops_empties() {
        assert_eq!(split_list("a, b ,,c"), ["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn default_visibility_set() {
        assert_eq!(
            parse_visibility(""),
            ["public", "protected", "abstract", "final"]
        );
    }

    #[test]
    fn explicit_visibility_overrides_default() {
        assert_eq!(parse_visibility(" private , public "), ["private", "public"]);
    }

    #[test]
    fn method_regex_matches_whole_name() {
        let re = compile_method_regex("get.*").unwrap();
        assert!(re.is_match("getId"));
        assert!(!re.is_match("wrapGetId"));
    }

    #[test]
    fn invalid_method_regex_is_an_error() {
        assert!(compile_method_regex("(").is_err());
    }
}
