//! Version-control seam.
//!
//! Every engine commit names its paths explicitly: the commit carries those
//! paths and nothing else, whatever else happens to be modified or staged in
//! the working tree.

use crate::error::{EngineError, EngineResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Branch and commit operations the engine needs.
pub trait Vcs {
    /// Name of the checked-out branch.
    fn current_branch(&self) -> EngineResult<String>;

    /// Whether a local branch exists.
    fn branch_exists(&self, name: &str) -> EngineResult<bool>;

    /// Create `name` at the current head and check it out.
    fn create_branch(&self, name: &str) -> EngineResult<()>;

    /// Check out an existing branch.
    fn checkout(&self, name: &str) -> EngineResult<()>;

    /// Commit exactly `paths` (relative to the repository root, additions
    /// and deletions alike) with `message`.
    fn commit(&self, paths: &[PathBuf], message: &str) -> EngineResult<()>;

    /// Merge `branch` into the current branch with a merge commit.
    fn merge(&self, branch: &str, message: &str) -> EngineResult<()>;
}

/// `git` subprocess implementation
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run git with `args`, returning trimmed stdout.
    fn run_git(&self, args: &[&str]) -> EngineResult<String> {
        log::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| EngineError::Vcs {
                command: format!("git {}", args.join(" ")),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(EngineError::Vcs {
                command: format!("git {}", args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn path_args(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| p.display().to_string()).collect()
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> EngineResult<String> {
        // symbolic-ref also works on an unborn branch
        self.run_git(&["symbolic-ref", "--short", "HEAD"])
    }

    fn branch_exists(&self, name: &str) -> EngineResult<bool> {
        let reference = format!("refs/heads/{name}");
        let status = Command::new("git")
            .args(["show-ref", "--verify", "--quiet", &reference])
            .current_dir(&self.root)
            .status()
            .map_err(|e| EngineError::Vcs {
                command: format!("git show-ref {reference}"),
                message: e.to_string(),
            })?;
        Ok(status.success())
    }

    fn create_branch(&self, name: &str) -> EngineResult<()> {
        self.run_git(&["checkout", "-b", name]).map(|_| ())
    }

    fn checkout(&self, name: &str) -> EngineResult<()> {
        self.run_git(&["checkout", name]).map(|_| ())
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> EngineResult<()> {
        let paths = Self::path_args(paths);

        let mut add: Vec<&str> = vec!["add", "--all", "--"];
        add.extend(paths.iter().map(String::as_str));
        self.run_git(&add)?;

        let mut commit: Vec<&str> = vec!["commit", "--quiet", "-m", message, "--"];
        commit.extend(paths.iter().map(String::as_str));
        self.run_git(&commit).map(|_| ())
    }

    fn merge(&self, branch: &str, message: &str) -> EngineResult<()> {
        self.run_git(&["merge", "--no-ff", "--quiet", "-m", message, branch])
            .map(|_| ())
    }
}

/// Whether `root` is inside a git work tree.
pub fn is_git_repository(root: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(root)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryCommit, MemoryVcs};

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::Vcs;
    use crate::error::{EngineError, EngineResult};
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};

    /// A commit as recorded by [`MemoryVcs`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MemoryCommit {
        pub branch: String,
        pub message: String,
        pub paths: Vec<PathBuf>,
        /// Branch merged in, for merge commits
        pub merged: Option<String>,
    }

    #[derive(Debug, Default)]
    struct State {
        current: String,
        branches: BTreeSet<String>,
        commits: Vec<MemoryCommit>,
        /// When set, `commit` fails with this message (a rejecting hook)
        reject_commits: Option<String>,
    }

    /// In-memory branch bookkeeping for tests. Clones share state, so a test
    /// can keep a handle while the engine borrows another.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryVcs {
        state: Arc<Mutex<State>>,
    }

    impl MemoryVcs {
        /// Start on `branch`.
        pub fn new(branch: &str) -> Self {
            let state = State {
                current: branch.to_string(),
                branches: BTreeSet::from([branch.to_string()]),
                commits: Vec::new(),
                reject_commits: None,
            };
            Self {
                state: Arc::new(Mutex::new(state)),
            }
        }

        fn lock(&self) -> MutexGuard<'_, State> {
            match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }

        pub fn commits(&self) -> Vec<MemoryCommit> {
            self.lock().commits.clone()
        }

        pub fn last_commit(&self) -> Option<MemoryCommit> {
            self.lock().commits.last().cloned()
        }

        pub fn branches(&self) -> Vec<String> {
            self.lock().branches.iter().cloned().collect()
        }

        /// Make every following commit fail with `reason`, or accept commits
        /// again with `None`.
        pub fn reject_commits(&self, reason: Option<&str>) {
            self.lock().reject_commits = reason.map(String::from);
        }
    }

    impl Vcs for MemoryVcs {
        fn current_branch(&self) -> EngineResult<String> {
            Ok(self.lock().current.clone())
        }

        fn branch_exists(&self, name: &str) -> EngineResult<bool> {
            Ok(self.lock().branches.contains(name))
        }

        fn create_branch(&self, name: &str) -> EngineResult<()> {
            let mut state = self.lock();
            if !state.branches.insert(name.to_string()) {
                return Err(EngineError::Vcs {
                    command: format!("checkout -b {name}"),
                    message: "branch already exists".to_string(),
                });
            }
            state.current = name.to_string();
            Ok(())
        }

        fn checkout(&self, name: &str) -> EngineResult<()> {
            let mut state = self.lock();
            if !state.branches.contains(name) {
                return Err(EngineError::Vcs {
                    command: format!("checkout {name}"),
                    message: "no such branch".to_string(),
                });
            }
            state.current = name.to_string();
            Ok(())
        }

        fn commit(&self, paths: &[PathBuf], message: &str) -> EngineResult<()> {
            let mut state = self.lock();
            if let Some(reason) = &state.reject_commits {
                return Err(EngineError::Vcs {
                    command: "commit".to_string(),
                    message: reason.clone(),
                });
            }
            let commit = MemoryCommit {
                branch: state.current.clone(),
                message: message.to_string(),
                paths: paths.to_vec(),
                merged: None,
            };
            state.commits.push(commit);
            Ok(())
        }

        fn merge(&self, branch: &str, message: &str) -> EngineResult<()> {
            let mut state = self.lock();
            if !state.branches.contains(branch) {
                return Err(EngineError::Vcs {
                    command: format!("merge {branch}"),
                    message: "no such branch".to_string(),
                });
            }
            let commit = MemoryCommit {
                branch: state.current.clone(),
                message: message.to_string(),
                paths: Vec::new(),
                merged: Some(branch.to_string()),
            };
            state.commits.push(commit);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "vcs_test.rs"]
mod tests;
