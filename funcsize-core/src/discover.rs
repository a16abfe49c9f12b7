//! Source file discovery
//!
//! Walks a repository root and returns every file with a supported
//! extension, sorted by path so that scans are deterministic.

use crate::config::ResolvedConfig;
use crate::language::Language;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Dependency and build output directories never traversed
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "build",
    "out",
    "dist",
    "bin",
    "obj",
    "__pycache__",
    "venv",
];

/// TypeScript declaration file suffixes (no function bodies)
const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

/// A file selected for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute or caller-relative path used to open the file
    pub path: PathBuf,
    /// Path relative to the repository root, `/`-separated
    pub relative: String,
    pub language: Language,
}

/// Collect supported source files under `root`
///
/// `root` may also be a single file, in which case it is returned on its
/// own if supported. Unreadable subdirectories are skipped with a warning.
pub fn collect_source_files(root: &Path, config: &ResolvedConfig) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let metadata = fs::metadata(root)
        .with_context(|| format!("failed to read metadata: {}", root.display()))?;

    if metadata.is_file() {
        let base = root.parent().unwrap_or(Path::new(""));
        if let Some(file) = source_file(root.to_path_buf(), base, config) {
            files.push(file);
        }
    } else if metadata.is_dir() {
        let entries = fs::read_dir(root)
            .with_context(|| format!("failed to read directory: {}", root.display()))?;
        for entry in entries.flatten() {
            process_dir_entry(entry.path(), root, config, &mut files);
        }
    } else {
        anyhow::bail!("not a file or directory: {}", root.display());
    }

    // Sort files for deterministic order
    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    Ok(files)
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str, config: &ResolvedConfig) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name) || config.skips_dir(name)
}

fn is_declaration_file(name: &str) -> bool {
    DECLARATION_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Process one directory entry, pushing source files or recursing into dirs
fn process_dir_entry(
    path: PathBuf,
    root: &Path,
    config: &ResolvedConfig,
    files: &mut Vec<SourceFile>,
) {
    let metadata = match fs::symlink_metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
            return;
        }
    };

    if metadata.is_symlink() {
        return;
    }

    if metadata.is_dir() {
        if let Some(name) = path.file_name().and_then(OsStr::to_str) {
            if is_skipped_dir(name, config) {
                return;
            }
        }
        match fs::read_dir(&path) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    process_dir_entry(entry.path(), root, config, files);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory");
            }
        }
    } else if metadata.is_file() {
        if let Some(file) = source_file(path, root, config) {
            files.push(file);
        }
    }
}

fn source_file(path: PathBuf, root: &Path, config: &ResolvedConfig) -> Option<SourceFile> {
    let name = path.file_name().and_then(OsStr::to_str)?;
    if is_declaration_file(name) {
        return None;
    }
    let language = Language::from_path(&path)?;
    let relative = relative_path(&path, root);
    if !config.should_include(Path::new(&relative)) {
        return None;
    }
    Some(SourceFile {
        path,
        relative,
        language,
    })
}

/// Render `path` relative to `root` with `/` separators
fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuncsizeConfig;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn relatives(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn test_collects_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/b.ts");
        touch(dir.path(), "src/a.js");
        touch(dir.path(), "App.java");
        touch(dir.path(), "lib/util.py");
        touch(dir.path(), "Svc.cs");
        touch(dir.path(), "README.md");

        let config = ResolvedConfig::defaults().unwrap();
        let files = collect_source_files(dir.path(), &config).unwrap();
        assert_eq!(
            relatives(&files),
            vec!["App.java", "Svc.cs", "lib/util.py", "src/a.js", "src/b.ts"]
        );
        assert_eq!(files[0].language, Language::Java);
        assert_eq!(files[1].language, Language::CSharp);
    }

    #[test]
    fn test_skips_hidden_and_dependency_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".git/hooks/x.js");
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "venv/lib/site.py");
        touch(dir.path(), "obj/Gen.cs");
        touch(dir.path(), "src/keep.js");

        let config = ResolvedConfig::defaults().unwrap();
        let files = collect_source_files(dir.path(), &config).unwrap();
        assert_eq!(relatives(&files), vec!["src/keep.js"]);
    }

    #[test]
    fn test_skips_declaration_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "types/index.d.ts");
        touch(dir.path(), "types/index.ts");

        let config = ResolvedConfig::defaults().unwrap();
        let files = collect_source_files(dir.path(), &config).unwrap();
        assert_eq!(relatives(&files), vec!["types/index.ts"]);
    }

    #[test]
    fn test_config_skip_dirs_and_globs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "vendor/lib.js");
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "src/app.test.js");
        touch(dir.path(), "scripts/run.py");

        let config = FuncsizeConfig {
            include: vec!["src/**".to_string()],
            exclude: vec!["**/*.test.js".to_string()],
            skip_dirs: vec!["vendor".to_string()],
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let files = collect_source_files(dir.path(), &config).unwrap();
        assert_eq!(relatives(&files), vec!["src/app.js"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main.py");

        let config = ResolvedConfig::defaults().unwrap();
        let files = collect_source_files(&dir.path().join("main.py"), &config).unwrap();
        assert_eq!(relatives(&files), vec!["main.py"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let config = ResolvedConfig::defaults().unwrap();
        assert!(collect_source_files(Path::new("/nonexistent/repo"), &config).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "real/a.js");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let config = ResolvedConfig::defaults().unwrap();
        let files = collect_source_files(dir.path(), &config).unwrap();
        assert_eq!(relatives(&files), vec!["real/a.js"]);
    }
}
