use anyhow::{bail, Result};
use ignore::WalkBuilder;
use serde::Serialize;
use shared::mention::{match_base_path, normalize_query, prefix_len_ignore_case};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MentionIndexOptions {
    pub roots: Vec<PathBuf>,
    pub max_results: usize,
}

/// A path offered in the mention dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionCandidate {
    /// Allowed folder the entry was found under
    pub root: PathBuf,
    /// Root-relative path with `/` separators; folders end in `/`
    pub path: String,
    /// Prefix of `path` confirmed by the query (empty for an empty query)
    pub matched: String,
    pub is_dir: bool,
}

impl MentionCandidate {
    pub fn full_path(&self) -> PathBuf {
        self.root.join(self.path.trim_end_matches('/'))
    }
}

pub struct MentionIndex {
    opts: MentionIndexOptions,
}

impl MentionIndex {
    pub fn new(opts: MentionIndexOptions) -> Self {
        Self { opts }
    }

    /// List files and folders under the roots that extend `query`.
    ///
    /// An empty query lists the top level of each root only. Dotfiles are
    /// offered like any other entry; `.gitignore` rules and the `.git`
    /// folder are excluded.
    pub fn candidates(&self, query: &str) -> Result<Vec<MentionCandidate>> {
        if self.opts.roots.is_empty() {
            bail!("No folders are available for mentions");
        }

        let needle = normalize_query(query);
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for root in &self.opts.roots {
            let prune_root = root.clone();
            let prune_needle = needle.clone();
            let walker = WalkBuilder::new(root)
                .hidden(false)
                .ignore(true)
                .git_ignore(true)
                .git_exclude(true)
                .require_git(false)
                .max_depth(needle.is_empty().then_some(1))
                .filter_entry(move |dent| {
                    let is_dir = dent.file_type().is_some_and(|t| t.is_dir());
                    if is_dir && dent.file_name() == ".git" {
                        return false;
                    }
                    match relative_path(&prune_root, dent.path(), is_dir) {
                        Some(rel) if is_dir => may_contain_matches(&rel, &prune_needle),
                        _ => true,
                    }
                })
                .build();

            for dent in walker {
                let dent = match dent {
                    Ok(d) => d,
                    Err(e) => {
                        debug!(error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };
                if dent.depth() == 0 {
                    continue;
                }
                let is_dir = dent.file_type().is_some_and(|t| t.is_dir());
                let Some(path) = relative_path(root, dent.path(), is_dir) else {
                    continue;
                };
                let matched = match_base_path(&path, query);
                if !needle.is_empty() && matched.is_empty() {
                    continue;
                }
                // The same root may be configured twice
                if seen.insert((root.clone(), path.clone())) {
                    results.push(MentionCandidate {
                        root: root.clone(),
                        path,
                        matched,
                        is_dir,
                    });
                }
            }
        }

        // Folders first, then alphabetical ignoring case, then by root
        results.sort_by_cached_key(|c| (!c.is_dir, c.path.to_lowercase(), c.root.clone()));
        results.truncate(self.opts.max_results);
        debug!(query, count = results.len(), "Mention candidates");
        Ok(results)
    }
}

fn relative_path(root: &Path, path: &Path, is_dir: bool) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    if parts.is_empty() {
        return None;
    }
    let mut joined = parts.join("/");
    if is_dir {
        joined.push('/');
    }
    Some(joined)
}

/// A folder can only hold matches if it lies on the query's path or extends it.
fn may_contain_matches(dir: &str, needle: &str) -> bool {
    prefix_len_ignore_case(dir, needle).is_some() || prefix_len_ignore_case(needle, dir).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("Docs")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join(".github/workflows")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "").unwrap();
        fs::write(root.join("Docs/readme.md"), "# Hi").unwrap();
        fs::write(root.join("target/out.bin"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(root.join(".github/workflows/ci.yml"), "").unwrap();
        fs::write(root.join("notes.md"), "").unwrap();
        fs::write(root.join(".gitignore"), "target/\n").unwrap();
        dir
    }

    fn index_for(roots: &[&TempDir], max_results: usize) -> MentionIndex {
        MentionIndex::new(MentionIndexOptions {
            roots: roots.iter().map(|d| d.path().to_path_buf()).collect(),
            max_results,
        })
    }

    fn index(dir: &TempDir, max_results: usize) -> MentionIndex {
        index_for(&[dir], max_results)
    }

    fn paths(candidates: &[MentionCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.path.as_str()).collect()
    }

    #[test]
    fn test_empty_query_lists_top_level() {
        let dir = fixture();
        let results = index(&dir, 50).candidates("").unwrap();
        assert_eq!(
            paths(&results),
            vec![".github/", "Docs/", "src/", ".gitignore", "notes.md"]
        );
        assert!(results.iter().all(|c| c.matched.is_empty()));
    }

    #[test]
    fn test_prefix_query_descends_into_folders() {
        let dir = fixture();
        let results = index(&dir, 50).candidates("src/").unwrap();
        assert_eq!(
            paths(&results),
            vec!["src/", "src/nested/", "src/lib.rs", "src/main.rs", "src/nested/deep.rs"]
        );
    }

    #[test]
    fn test_match_is_case_insensitive_and_keeps_casing() {
        let dir = fixture();
        let results = index(&dir, 50).candidates("docs\\r").unwrap();
        assert_eq!(paths(&results), vec!["Docs/readme.md"]);
        assert_eq!(results[0].matched, "Docs/r");
        assert!(!results[0].is_dir);
    }

    #[test]
    fn test_non_ascii_folder_matches_lowercase_query() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ΟΔΟΣ")).unwrap();
        fs::write(dir.path().join("ΟΔΟΣ/a.md"), "").unwrap();

        let idx = index(&dir, 50);
        let upper = idx.candidates("ΟΔΟΣ").unwrap();
        let lower = idx.candidates("οδοσ").unwrap();
        assert_eq!(paths(&lower), vec!["ΟΔΟΣ/", "ΟΔΟΣ/a.md"]);
        assert_eq!(paths(&upper), paths(&lower));
        assert_eq!(lower[1].matched, "ΟΔΟΣ");
    }

    #[test]
    fn test_dotfiles_are_offered_but_git_folder_is_not() {
        let dir = fixture();
        let results = index(&dir, 50).candidates(".git").unwrap();
        assert_eq!(
            paths(&results),
            vec![".github/", ".github/workflows/", ".github/workflows/ci.yml", ".gitignore"]
        );
        assert!(results.iter().all(|c| !c.path.starts_with(".git/")));
    }

    #[test]
    fn test_gitignored_entries_are_skipped() {
        let dir = fixture();
        assert!(index(&dir, 50).candidates("tar").unwrap().is_empty());
    }

    #[test]
    fn test_same_name_in_two_roots_keeps_both() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("notes.md"), "one").unwrap();
        fs::write(second.path().join("notes.md"), "two").unwrap();

        let results = index_for(&[&first, &second], 50).candidates("notes").unwrap();
        assert_eq!(paths(&results), vec!["notes.md", "notes.md"]);

        let mut roots: Vec<_> = results.iter().map(|c| c.root.clone()).collect();
        roots.sort();
        let mut expected = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        expected.sort();
        assert_eq!(roots, expected);

        for c in &results {
            assert!(c.full_path().is_file());
            assert!(c.full_path().starts_with(&c.root));
        }
    }

    #[test]
    fn test_duplicate_root_is_listed_once() {
        let dir = fixture();
        let results = index_for(&[&dir, &dir], 50).candidates("notes").unwrap();
        assert_eq!(paths(&results), vec!["notes.md"]);
    }

    #[test]
    fn test_result_cap() {
        let dir = fixture();
        let results = index(&dir, 2).candidates("s").unwrap();
        assert_eq!(paths(&results), vec!["src/", "src/nested/"]);
    }

    #[test]
    fn test_no_roots_is_an_error() {
        let idx = MentionIndex::new(MentionIndexOptions {
            roots: vec![],
            max_results: 10,
        });
        assert!(idx.candidates("a").is_err());
    }
}
