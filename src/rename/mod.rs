//! Project template renaming
//!
//! Rewrites the scaffold's placeholder names (`example`, `Example`, ...) in a
//! fixed set of files. Each substitution is literal and replaces every
//! occurrence. Missing files are skipped with a warning; read or write
//! failures are reported and the remaining files are still processed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// One literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    fn new(from: &str, to: impl Into<String>) -> Self {
        Self {
            from: from.to_string(),
            to: to.into(),
        }
    }
}

/// A file (relative to the project root) and the substitutions applied to it.
#[derive(Debug, Clone)]
pub struct RenameTarget {
    pub path: &'static str,
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Updated,
    Missing,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RenameReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl RenameReport {
    pub fn updated(&self) -> usize {
        self.count(|o| *o == FileOutcome::Updated)
    }

    pub fn missing(&self) -> usize {
        self.count(|o| *o == FileOutcome::Missing)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// `myapp` -> `Myapp`
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Files touched by a rename and what changes in each.
pub fn targets(new_name: &str) -> Vec<RenameTarget> {
    let title = title_case(new_name);

    vec![
        RenameTarget {
            path: "README.md",
            replacements: vec![Replacement::new("example_db", format!("{}_db", new_name))],
        },
        RenameTarget {
            path: "backend/migrations/20240101000000_initial.sql",
            replacements: vec![
                Replacement::new("examples", new_name),
                Replacement::new("idx_examples_name", format!("idx_{}_name", new_name)),
                Replacement::new(
                    "update_examples_updated_at",
                    format!("update_{}_updated_at", new_name),
                ),
            ],
        },
        RenameTarget {
            path: "backend/src/models.rs",
            replacements: vec![
                Replacement::new("Example", title.clone()),
                Replacement::new("CreateExample", format!("Create{}", title)),
                Replacement::new("UpdateExample", format!("Update{}", title)),
            ],
        },
        RenameTarget {
            path: "frontend/src/App.tsx",
            replacements: vec![Replacement::new(
                "Example Application",
                format!("{} Application", title),
            )],
        },
    ]
}

/// Apply replacements in order; each one sees the output of the previous.
pub fn apply_replacements(content: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .fold(content.to_string(), |acc, r| acc.replace(&r.from, &r.to))
}

fn validate_name(new_name: &str) -> Result<()> {
    if new_name.trim().is_empty() {
        bail!("New project name must not be empty");
    }
    if new_name.chars().any(char::is_whitespace) {
        bail!("New project name must not contain whitespace: '{}'", new_name);
    }
    Ok(())
}

/// Rename the project rooted at `root`. Never stops at the first bad file.
pub fn rename_project(root: &Path, new_name: &str) -> Result<RenameReport> {
    validate_name(new_name)?;

    let mut report = RenameReport::default();
    for target in targets(new_name) {
        let path = root.join(target.path);
        let outcome = rename_file(&path, &target.replacements);
        match &outcome {
            FileOutcome::Updated => println!("Updated {}", path.display()),
            FileOutcome::Missing => tracing::warn!("File not found: {}", path.display()),
            FileOutcome::Failed(reason) => {
                tracing::error!("Error processing {}: {}", path.display(), reason)
            }
        }
        report.files.push((path, outcome));
    }

    Ok(report)
}

fn rename_file(path: &Path, replacements: &[Replacement]) -> FileOutcome {
    if !path.exists() {
        return FileOutcome::Missing;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return FileOutcome::Failed(format!("read failed: {}", e)),
    };

    let updated = apply_replacements(&content, replacements);
    match fs::write(path, updated) {
        Ok(()) => FileOutcome::Updated,
        Err(e) => FileOutcome::Failed(format!("write failed: {}", e)),
    }
}

/// CLI entry point: rename and print next steps.
pub fn run(root: &Path, new_name: &str) -> Result<()> {
    let report = rename_project(root, new_name)?;

    tracing::debug!(
        "Rename finished: {} updated, {} missing, {} failed",
        report.updated(),
        report.missing(),
        report.failed()
    );

    println!();
    println!("Project renamed successfully!");
    println!("Next steps:");
    println!("1. Recreate your database with the new name");
    println!("2. Run the migrations again");
    println!("3. Rebuild and restart your application");

    Ok(())
}
