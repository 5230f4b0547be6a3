//! Template upgrade command.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use walkdir::WalkDir;

use templift_transform::{normalize_template, upgrade_template, UpgradeOptions};

use crate::config::ConfigFile;

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Template files or directories ("-" reads stdin)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Rewrite files in place
    #[arg(short, long, conflicts_with_all = ["out_dir", "check"])]
    write: bool,

    /// Write upgraded templates under this directory
    #[arg(short, long, conflicts_with = "check")]
    out_dir: Option<PathBuf>,

    /// Only report templates that would change
    #[arg(long)]
    check: bool,

    /// Controller alias to strip (repeatable, overrides config)
    #[arg(long = "ctrl", value_name = "NAME")]
    ctrl: Vec<String>,

    /// Do not strip any controller alias
    #[arg(long, conflicts_with = "ctrl")]
    no_ctrl: bool,
}

/// Where upgraded templates go.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    Stdout,
    InPlace,
    OutDir(PathBuf),
    Check,
}

/// A template found on disk.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Path to read from
    pub path: PathBuf,

    /// Path relative to the input root, used for --out-dir
    pub relative: PathBuf,
}

/// Outcome of a batch run.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub processed: usize,
    pub changed: usize,
    pub failed: usize,
}

impl UpgradeArgs {
    /// Upgrade options from the flags, falling back to the config file.
    fn options(&self, configured: UpgradeOptions) -> UpgradeOptions {
        if self.no_ctrl {
            UpgradeOptions::with_controller_vars(Vec::<String>::new())
        } else if !self.ctrl.is_empty() {
            UpgradeOptions::with_controller_vars(self.ctrl.iter().cloned())
        } else {
            configured
        }
    }

    fn mode(&self) -> OutputMode {
        if self.write {
            OutputMode::InPlace
        } else if let Some(dir) = &self.out_dir {
            OutputMode::OutDir(dir.clone())
        } else if self.check {
            OutputMode::Check
        } else {
            OutputMode::Stdout
        }
    }

    /// Whether input comes from stdin; "-" must be the only path.
    fn reads_stdin(&self) -> Result<bool> {
        if !self.paths.iter().any(|p| p.as_os_str() == "-") {
            return Ok(false);
        }
        if self.paths.len() > 1 {
            anyhow::bail!("\"-\" (stdin) cannot be combined with other paths");
        }
        Ok(true)
    }
}

/// Run the upgrade command.
pub fn run(args: UpgradeArgs, config: ConfigFile) -> Result<()> {
    let options = args.options(config.upgrade.options);

    if args.reads_stdin()? {
        return upgrade_stdin(&options);
    }

    let mode = args.mode();
    let files = discover_templates(&args.paths, &config.upgrade.extensions)?;
    tracing::info!("Upgrading {} templates...", files.len());

    let summary = process(&files, &options, &mode)?;

    tracing::info!(
        "Processed {} templates: {} changed, {} failed",
        summary.processed,
        summary.changed,
        summary.failed
    );

    finish(&summary, &mode)
}

/// Turn a batch summary into the command's exit status.
fn finish(summary: &Summary, mode: &OutputMode) -> Result<()> {
    if summary.failed > 0 {
        anyhow::bail!("{} templates failed to upgrade", summary.failed);
    }
    if *mode == OutputMode::Check && summary.changed > 0 {
        anyhow::bail!("{} templates need upgrading", summary.changed);
    }
    Ok(())
}

fn upgrade_stdin(options: &UpgradeOptions) -> Result<()> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;

    let output = upgrade_template(&source, options)?;
    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write stdout")?;

    Ok(())
}

/// Expand paths into template files, walking directories recursively.
pub fn discover_templates(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<TemplateFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .with_context(|| format!("Not a file path: {}", path.display()))?;
            files.push(TemplateFile {
                path: path.clone(),
                relative,
            });
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if !entry.file_type().is_file() || !has_extension(entry_path, extensions) {
                    continue;
                }

                let relative = entry_path
                    .strip_prefix(path)
                    .unwrap_or(entry_path)
                    .to_path_buf();
                files.push(TemplateFile {
                    path: entry_path.to_path_buf(),
                    relative,
                });
            }
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }

    Ok(files)
}

/// Match on the full file name so multi-part extensions (`tpl.html`) work.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    extensions
        .iter()
        .any(|ext| filename.ends_with(&format!(".{}", ext.trim_start_matches('.'))))
}

/// Upgrade templates in parallel and emit them according to `mode`.
///
/// A template counts as changed when the upgrade differs from the source
/// after parse and serialize normalization. Read, upgrade and write errors
/// are logged and counted per file; the rest of the batch still runs.
pub fn process(
    files: &[TemplateFile],
    options: &UpgradeOptions,
    mode: &OutputMode,
) -> Result<Summary> {
    let results: Vec<Result<(String, String)>> = files
        .par_iter()
        .map(|file| {
            let source = fs::read_to_string(&file.path)
                .with_context(|| format!("Failed to read {}", file.path.display()))?;
            let normalized = normalize_template(&source)
                .with_context(|| format!("Failed to parse {}", file.path.display()))?;
            let output = upgrade_template(&source, options)
                .with_context(|| format!("Failed to upgrade {}", file.path.display()))?;
            Ok((normalized, output))
        })
        .collect();

    let mut summary = Summary::default();
    let mut stdout = io::stdout().lock();

    for (file, result) in files.iter().zip(results) {
        summary.processed += 1;

        let (normalized, output) = match result {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!("{:#}", e);
                summary.failed += 1;
                continue;
            }
        };

        let changed = normalized != output;
        if changed {
            summary.changed += 1;
        }

        if let Err(e) = emit(file, &output, changed, mode, &mut stdout) {
            tracing::error!("{:#}", e);
            summary.failed += 1;
        }
    }

    Ok(summary)
}

fn emit(
    file: &TemplateFile,
    output: &str,
    changed: bool,
    mode: &OutputMode,
    stdout: &mut impl Write,
) -> Result<()> {
    match mode {
        OutputMode::Stdout => {
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write stdout")?;
        }
        OutputMode::Check => {
            if changed {
                tracing::info!("Would upgrade {}", file.path.display());
            }
        }
        OutputMode::InPlace => {
            if changed {
                fs::write(&file.path, output)
                    .with_context(|| format!("Failed to write {}", file.path.display()))?;
                tracing::debug!("Upgraded {}", file.path.display());
            }
        }
        OutputMode::OutDir(dir) => {
            let target = dir.join(&file.relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, output)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::debug!("Wrote {}", target.display());
        }
    }

    Ok(())
}
