//! Grading configuration: `.gradekit.json` lookup and `extends` chains.
//!
//! A course directory usually holds one config per section that extends a
//! shared department file. The nearest `.gradekit.json` at or above the
//! submission directory wins; with none, the built-in rubric applies.

mod schema;

pub use schema::{Config, DEFAULT_PASS_THRESHOLD};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".gradekit.json";

/// Load the effective config for grading submissions in `work_dir`.
///
/// `custom_path` (from `--config`) is taken relative to `work_dir` and must exist.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = match custom_path {
        Some(p) => {
            let path = work_dir.join(p);
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path
        }
        None => match nearest_config(work_dir) {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    tracing::debug!(path = %path.display(), "loading config");

    // Leaf first; each later entry is the file the previous one extends
    let chain = read_extends_chain(&path)?;
    let merged = chain
        .into_iter()
        .rev()
        .reduce(|base, mut derived| {
            derived.merge_from(base);
            derived
        })
        .unwrap_or_default();
    Ok(merged)
}

fn read_extends_chain(leaf: &Path) -> Result<Vec<Config>> {
    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    let mut next = Some(leaf.to_path_buf());

    while let Some(path) = next.take() {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !seen.insert(key) {
            anyhow::bail!("Circular extends detected in config: {}", path.display());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in config: {}", path.display()))?;

        if let Some(reference) = config.extends.take() {
            next = Some(extends_target(&path, &reference)?);
        }
        chain.push(config);
    }
    Ok(chain)
}

/// `extends` is relative to the file that names it; `.json` is implied
fn extends_target(from: &Path, reference: &str) -> Result<PathBuf> {
    let mut target = from.parent().unwrap_or(Path::new(".")).join(reference);
    if target.extension().is_none() {
        target.set_extension("json");
    }
    if !target.is_file() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            target.display(),
            from.display()
        );
    }
    Ok(target)
}

fn nearest_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Compile the `ignore` globs. They match paths relative to the submission directory.
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    patterns
        .iter()
        .try_fold(GlobSetBuilder::new(), |mut builder, pattern| {
            let glob = Glob::new(pattern)
                .with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
            builder.add(glob);
            Ok::<_, anyhow::Error>(builder)
        })?
        .build()
        .context("Failed to compile ignore patterns")
}

pub fn is_ignored(relative: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(relative)
}

/// Write `.gradekit.json` into `dir`. An existing file is never replaced.
pub fn write_config(dir: &Path, config: &Config) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(&path, json + "\n")
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(path)
}
