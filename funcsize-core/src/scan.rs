//! Repository scanning
//!
//! A repository source is either a local directory or a remote URL. Remote
//! sources are shallow-cloned for the duration of the scan. Every supported
//! file is parsed with a fresh detector, in parallel on the worker pool;
//! unreadable files are recorded as skipped and never abort the repository.

use crate::config::ResolvedConfig;
use crate::discover::collect_source_files;
use crate::git;
use crate::language::parse_file;
use crate::record::FunctionRecord;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Where a repository comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySource {
    Local(PathBuf),
    Remote(String),
}

impl RepositorySource {
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if git::is_remote(source) {
            RepositorySource::Remote(source.to_string())
        } else {
            RepositorySource::Local(PathBuf::from(source))
        }
    }

    /// Display name for reports
    pub fn name(&self) -> String {
        match self {
            RepositorySource::Remote(url) => git::repo_name(url),
            RepositorySource::Local(path) => {
                let name = git::repo_name(&path.to_string_lossy());
                if name == "repository" {
                    // `.` and similar: name the directory they resolve to
                    path.canonicalize()
                        .ok()
                        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                        .unwrap_or(name)
                } else {
                    name
                }
            }
        }
    }
}

/// A file that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Result of scanning one repository
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryScan {
    pub name: String,
    pub source: String,
    /// All detected functions, ordered by file then start line
    pub functions: Vec<FunctionRecord>,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Read repository sources from a list file
///
/// One entry per line; blank lines and `#` comments are ignored.
pub fn read_repository_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read repository list: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Scan one repository source
///
/// Checks `cancel` before each file; a cancelled scan returns an error.
pub fn scan_repository(
    source: &str,
    config: &ResolvedConfig,
    cancel: &AtomicBool,
) -> Result<RepositoryScan> {
    let parsed = RepositorySource::parse(source);
    let name = parsed.name();

    match &parsed {
        RepositorySource::Remote(url) => {
            let checkout = git::clone_shallow(url, config.clone_timeout, cancel)?;
            scan_tree(checkout.path(), name, source, config, cancel)
        }
        RepositorySource::Local(path) => {
            if !path.exists() {
                anyhow::bail!("repository path does not exist: {}", path.display());
            }
            scan_tree(path, name, source, config, cancel)
        }
    }
}

fn scan_tree(
    root: &Path,
    name: String,
    source: &str,
    config: &ResolvedConfig,
    cancel: &AtomicBool,
) -> Result<RepositoryScan> {
    let files = collect_source_files(root, config)?;
    tracing::debug!(repository = %name, files = files.len(), "scanning repository");

    // Files are parsed on the current rayon pool; None marks a cancelled file
    let outcomes: Vec<_> = files
        .par_iter()
        .map(|file| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some((file, parse_file(&file.path, file.language, &file.relative)))
        })
        .collect();

    if outcomes.iter().any(Option::is_none) {
        anyhow::bail!("scan of {} cancelled", name);
    }

    let mut functions = Vec::new();
    let mut skipped = Vec::new();
    let mut files_scanned = 0;

    for (file, outcome) in outcomes.into_iter().flatten() {
        match outcome {
            Ok(records) => {
                tracing::debug!(
                    file = %file.relative,
                    language = file.language.name(),
                    functions = records.len(),
                    "parsed file"
                );
                functions.extend(records);
                files_scanned += 1;
            }
            Err(e) => {
                tracing::warn!(file = %file.relative, error = %e.source, "skipping file");
                skipped.push(SkippedFile {
                    path: file.relative.clone(),
                    reason: e.source.to_string(),
                });
            }
        }
    }

    // Stable: within a file, records with equal start keep closing order
    functions.sort_by(|a, b| {
        a.file_path()
            .cmp(b.file_path())
            .then(a.start_line().cmp(&b.start_line()))
    });

    Ok(RepositoryScan {
        name,
        source: source.to_string(),
        functions,
        files_scanned,
        skipped,
    })
}

/// Scan many repositories in parallel on `config.jobs` threads
///
/// Returns one result per source, in input order. `on_done` is called from
/// worker threads as each repository finishes.
pub fn scan_repositories<F>(
    sources: &[String],
    config: &ResolvedConfig,
    cancel: &AtomicBool,
    on_done: F,
) -> Result<Vec<Result<RepositoryScan>>>
where
    F: Fn(&str, &Result<RepositoryScan>) + Sync,
{
    if config.jobs == 0 {
        anyhow::bail!("jobs must be at least 1");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .thread_name(|i| format!("funcsize-worker-{}", i))
        .build()
        .context("failed to build worker pool")?;

    Ok(pool.install(|| {
        sources
            .par_iter()
            .map(|source| {
                let result = scan_repository(source, config, cancel);
                if let Err(e) = &result {
                    let message = format!("{:#}", e);
                    tracing::warn!(repository = %source, error = %message, "repository failed");
                }
                on_done(source, &result);
                result
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_repository_source_parse() {
        assert_eq!(
            RepositorySource::parse("https://github.com/org/repo.git"),
            RepositorySource::Remote("https://github.com/org/repo.git".to_string())
        );
        assert_eq!(
            RepositorySource::parse(" ./local "),
            RepositorySource::Local(PathBuf::from("./local"))
        );
        assert_eq!(RepositorySource::parse("git@host:org/repo.git").name(), "repo");
    }

    #[test]
    fn test_read_repository_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.txt");
        fs::write(
            &path,
            "# repos\nhttps://github.com/org/a.git\n\n  ./local  \n# trailing\n",
        )
        .unwrap();

        let repos = read_repository_list(&path).unwrap();
        assert_eq!(repos, vec!["https://github.com/org/a.git", "./local"]);
    }

    #[test]
    fn test_read_missing_repository_list() {
        assert!(read_repository_list(Path::new("/nonexistent/repos.txt")).is_err());
    }

    #[test]
    fn test_scan_local_repository() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        write(&root, "src/app.js", "function main() {\n  run();\n  stop();\n}\n");
        write(&root, "tools/gen.py", "def gen():\n    return 1\n");
        write(&root, "README.md", "# readme\n");

        let config = ResolvedConfig::defaults().unwrap();
        let cancel = AtomicBool::new(false);
        let scan = scan_repository(&root.to_string_lossy(), &config, &cancel).unwrap();

        assert_eq!(scan.name, "project");
        assert_eq!(scan.files_scanned, 2);
        assert!(scan.skipped.is_empty());
        let found: Vec<_> = scan
            .functions
            .iter()
            .map(|f| (f.file_path(), f.name(), f.size()))
            .collect();
        assert_eq!(
            found,
            vec![("src/app.js", "main", 4), ("tools/gen.py", "gen", 2)]
        );
    }

    #[test]
    fn test_scan_missing_repository_is_error() {
        let config = ResolvedConfig::defaults().unwrap();
        let cancel = AtomicBool::new(false);
        let err = scan_repository("/nonexistent/project", &config, &cancel).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_cancelled_scan_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.js", "function a() {\n}\n");

        let config = ResolvedConfig::defaults().unwrap();
        let cancel = AtomicBool::new(true);
        assert!(scan_repository(&dir.path().to_string_lossy(), &config, &cancel).is_err());
    }

    #[test]
    fn test_scan_repositories_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("alpha");
        let b = dir.path().join("beta");
        write(&a, "a.ts", "function a() {\n}\n");
        write(&b, "B.java", "class B {\n  void b() {\n  }\n}\n");

        let sources = vec![
            b.to_string_lossy().into_owned(),
            "/nonexistent/gamma".to_string(),
            a.to_string_lossy().into_owned(),
        ];
        let config = ResolvedConfig::defaults().unwrap();
        let cancel = AtomicBool::new(false);
        let done = std::sync::atomic::AtomicUsize::new(0);

        let results = scan_repositories(&sources, &config, &cancel, |_, _| {
            done.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(done.load(Ordering::Relaxed), 3);
        assert_eq!(results[0].as_ref().unwrap().name, "beta");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().name, "alpha");
    }
}
