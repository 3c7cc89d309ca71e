use crate::config::TsConfig;
use crate::files::collect_sources;
use crate::writer::{WriteOutcome, WritePolicy};
use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use sveltedts_common::paths::{normalize, rel_path_json, relative_path};
use sveltedts_common::{CompilerOptions, RealFileSystem};
use sveltedts_core::{emit_script_declarations, generate_component_declarations, GenerationConfig};
use sveltedts_emitter::DtsEmitter;
use sveltedts_transform::SvelteTransformer;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Directories containing Svelte components
    #[arg(value_name = "SOURCE_DIR", required = true)]
    pub src_dirs: Vec<PathBuf>,

    /// Output directory for declarations (defaults to compilerOptions.declarationDir)
    #[arg(long = "declaration-dir", alias = "declarationDir", value_name = "DIR")]
    pub declaration_dir: Option<PathBuf>,

    /// Replace declaration files that already exist
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    #[arg(long = "no-overwrite", overrides_with = "overwrite", hide = true)]
    pub no_overwrite: bool,

    /// Report what would be written without touching the disk
    #[arg(short = 'n', long = "dry-run", alias = "dryRun")]
    pub dry_run: bool,

    /// Force strict mode on
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Force strict mode off
    #[arg(long = "no-strict", overrides_with = "strict")]
    pub no_strict: bool,

    /// Also emit declarations for plain .ts files
    #[arg(long = "run-on-ts", alias = "runOnTs", overrides_with = "no_run_on_ts")]
    pub run_on_ts: bool,

    #[arg(long = "no-run-on-ts", overrides_with = "run_on_ts", hide = true)]
    pub no_run_on_ts: bool,

    /// Component file extensions
    #[arg(long, value_name = "EXT", default_values_t = vec![".svelte".to_string()], hide = true)]
    pub extensions: Vec<String>,

    /// Path to tsconfig.json (searched upward from the working directory by default)
    #[arg(short = 'p', long, value_name = "FILE")]
    pub project: Option<PathBuf>,
}

impl GenerateArgs {
    fn overwrite(&self) -> bool {
        self.overwrite && !self.no_overwrite
    }

    fn run_on_ts(&self) -> bool {
        self.run_on_ts && !self.no_run_on_ts
    }

    /// Explicit strict flag, `None` when tsconfig decides
    fn strict_override(&self) -> Option<bool> {
        match (self.strict, self.no_strict) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Summary {
    written: usize,
    dry_run: usize,
    skipped: usize,
    missing: usize,
}

impl Summary {
    fn record(&mut self, outcome: WriteOutcome, source: &Path, destination: &Path) {
        match outcome {
            WriteOutcome::Written => {
                self.written += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path(source),
                    relative_path(destination)
                );
            }
            WriteOutcome::DryRun => {
                self.dry_run += 1;
                println!(
                    "  {} {} → {}",
                    "•".cyan(),
                    relative_path(source),
                    relative_path(destination)
                );
            }
            WriteOutcome::Exists => {
                self.skipped += 1;
                println!(
                    "  {} {} exists, skipping (use --overwrite)",
                    "•".yellow(),
                    relative_path(destination)
                );
            }
            WriteOutcome::NoOutput => {
                self.missing += 1;
                println!("  {} No declarations for {}", "✗".red(), relative_path(source));
            }
        }
    }

    fn print(&self, dry_run: bool) {
        println!();
        if dry_run {
            println!("✨ {} {} files would be written", "Dry run:".green().bold(), self.dry_run);
        } else {
            println!("✨ {} Wrote {} declaration files", "Done".green().bold(), self.written);
        }
        if self.skipped > 0 {
            println!("   {} existing files left untouched", self.skipped);
        }
        if self.missing > 0 {
            println!("   {} files produced no declarations", self.missing.to_string().red());
        }
    }
}

/// Generate declarations for every component under the given source directories
pub fn generate(args: GenerateArgs, cwd: &Path) -> Result<()> {
    let policy = WritePolicy {
        dry_run: args.dry_run,
        overwrite: args.overwrite(),
    };
    if policy.dry_run {
        println!("{}", "Dry run enabled, will not change anything!".yellow());
    }

    let tsconfig_path = match &args.project {
        Some(project) => Some(absolutize(cwd, project)),
        None => TsConfig::find(cwd),
    };
    let tsconfig = match &tsconfig_path {
        Some(path) => TsConfig::load(path)?,
        None => TsConfig::default(),
    };
    if let Some(path) = &tsconfig.path {
        println!("Using tsconfig {}", rel_path_json(path));
    }

    let options = compiler_options(&args, cwd, tsconfig.compiler_options);
    let declaration_dir = options
        .declaration_dir
        .clone()
        .ok_or_else(|| anyhow!("No output directory, pass --declaration-dir or set compilerOptions.declarationDir"))?;

    let src_dirs: Vec<PathBuf> = args.src_dirs.iter().map(|dir| absolutize(cwd, dir)).collect();
    for dir in &src_dirs {
        if !dir.is_dir() {
            bail!("Source directory {} does not exist", rel_path_json(dir));
        }
    }

    let listed: Vec<String> = src_dirs.iter().map(|dir| rel_path_json(dir)).collect();
    println!(
        "Generating declarations for svelte files [{}] -> {}.",
        listed.join(", "),
        rel_path_json(&declaration_dir)
    );
    println!();

    let transformer = SvelteTransformer::new();
    let emitter = DtsEmitter::new();
    let fs = RealFileSystem;
    let mut summary = Summary::default();

    for src_dir in &src_dirs {
        let sources = collect_sources(src_dir, &args.extensions, options.allows_js());
        debug!(
            dir = %src_dir.display(),
            components = sources.components.len(),
            scripts = sources.scripts.len(),
            "collected sources"
        );

        let config = GenerationConfig::new(src_dir, &declaration_dir)
            .with_extensions(args.extensions.clone())
            .with_components(sources.components)
            .with_compiler_options(options.clone());

        let table = generate_component_declarations(&config, &transformer, &emitter, &fs)?;
        for entry in table.entries() {
            let outcome = policy.persist(entry.destination_path(), entry.captured_output())?;
            summary.record(outcome, entry.component_path(), entry.destination_path());
        }

        if args.run_on_ts() {
            let scripts = emit_script_declarations(&sources.scripts, &config, &emitter, &fs)?;
            for (source, declaration) in &scripts {
                let outcome = policy.persist(
                    &declaration.destination_path,
                    declaration.captured_output.as_deref(),
                )?;
                summary.record(outcome, source, &declaration.destination_path);
            }
        }
    }

    summary.print(policy.dry_run);
    Ok(())
}

/// Merge command line overrides into the tsconfig options
fn compiler_options(args: &GenerateArgs, cwd: &Path, mut options: CompilerOptions) -> CompilerOptions {
    if let Some(strict) = args.strict_override() {
        options.strict = Some(strict);
    }
    if let Some(dir) = &args.declaration_dir {
        options.declaration_dir = Some(absolutize(cwd, dir));
    } else if let Some(dir) = options.declaration_dir.take() {
        options.declaration_dir = Some(absolutize(cwd, &dir));
    }
    options.declaration_only()
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    normalize(&cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: GenerateArgs,
    }

    fn parse(argv: &[&str]) -> GenerateArgs {
        TestCli::try_parse_from(std::iter::once("svelte2dts").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["src"]);
        assert_eq!(args.src_dirs, vec![PathBuf::from("src")]);
        assert_eq!(args.extensions, vec![".svelte".to_string()]);
        assert!(!args.overwrite());
        assert!(!args.dry_run);
        assert!(!args.run_on_ts());
        assert_eq!(args.strict_override(), None);
    }

    #[test]
    fn test_source_dir_is_required() {
        assert!(TestCli::try_parse_from(["svelte2dts"]).is_err());
    }

    #[test]
    fn test_negated_flags_take_the_last_value() {
        let args = parse(&["src", "--overwrite", "--no-overwrite", "--no-strict"]);
        assert!(!args.overwrite());
        assert_eq!(args.strict_override(), Some(false));

        let args = parse(&["src", "--no-strict", "--strict", "--runOnTs", "-n"]);
        assert_eq!(args.strict_override(), Some(true));
        assert!(args.run_on_ts());
        assert!(args.dry_run);
    }

    #[test]
    fn test_compiler_options_prefer_command_line() {
        let args = parse(&["src", "--declaration-dir", "out/types", "--strict"]);
        let from_tsconfig = CompilerOptions {
            strict: Some(false),
            declaration_dir: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };

        let options = compiler_options(&args, Path::new("/proj"), from_tsconfig);

        assert_eq!(options.declaration_dir, Some(PathBuf::from("/proj/out/types")));
        assert_eq!(options.strict, Some(true));
        assert!(options.declaration);
        assert!(options.emit_declaration_only);
    }

    #[test]
    fn test_tsconfig_declaration_dir_is_kept() {
        let args = parse(&["src"]);
        let from_tsconfig = CompilerOptions {
            declaration_dir: Some(PathBuf::from("/proj/types")),
            ..Default::default()
        };

        let options = compiler_options(&args, Path::new("/proj/app"), from_tsconfig);
        assert_eq!(options.declaration_dir, Some(PathBuf::from("/proj/types")));
    }

    #[test]
    fn test_generate_writes_declarations() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/lib")).unwrap();
        std::fs::write(
            root.join("tsconfig.json"),
            r#"{ "compilerOptions": { "declarationDir": "./types", /* strict */ "strict": true, } }"#,
        )
        .unwrap();
        std::fs::write(
            root.join("src/Counter.svelte"),
            "<script lang=\"ts\">\n  export let count: number = 0;\n</script>\n\n<button>{count}</button>\n",
        )
        .unwrap();
        std::fs::write(root.join("src/lib/util.ts"), "export const answer = 42;\n").unwrap();

        generate(parse(&["src", "--run-on-ts"]), root).unwrap();

        let counter = std::fs::read_to_string(root.join("types/Counter.svelte.d.ts")).unwrap();
        assert!(counter.contains("export default class Counter"));
        let util = std::fs::read_to_string(root.join("types/lib/util.d.ts")).unwrap();
        assert_eq!(util, "export declare const answer = 42;\n");
        assert!(!root.join("src/Counter.svelte.tsx").exists());
    }

    #[test]
    fn test_generate_dry_run_and_missing_source_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/Empty.svelte"), "<p>hi</p>\n").unwrap();

        generate(parse(&["src", "--declaration-dir", "types", "--dry-run"]), root).unwrap();
        assert!(!root.join("types").exists());

        let err = generate(parse(&["missing", "--declaration-dir", "types"]), root).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_generate_requires_an_output_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("tsconfig.json"), "{}").unwrap();

        let err = generate(parse(&["src"]), temp.path()).unwrap_err();
        assert!(err.to_string().contains("--declaration-dir"));
    }
}
