//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use hop_core::{HopConfig, PatchId, RepoLayout};
use hop_engine::test_utils::write_unit;
use hop_engine::{init, MemoryVcs};
use tempfile::TempDir;

pub const PROD: &str = "ho-prod";

pub struct Repo {
    // Kept alive for the test's duration
    _dir: TempDir,
    pub layout: RepoLayout,
    pub config: HopConfig,
    pub vcs: MemoryVcs,
}

impl Repo {
    /// Initialised repository on the production branch.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = RepoLayout::new(dir.path());
        let vcs = MemoryVcs::new(PROD);
        let config = init(&layout, "app", PROD, &vcs).expect("init");
        Self {
            _dir: dir,
            layout,
            config,
            vcs,
        }
    }

    pub fn add_unit(&self, id: &PatchId, name: &str, content: &str) {
        write_unit(&self.layout.patch_dir(id), name, content);
    }

    pub fn stage_lines(&self, version: hop_core::Version) -> Vec<String> {
        std::fs::read_to_string(self.layout.stage_file(version))
            .expect("read stage file")
            .lines()
            .map(String::from)
            .collect()
    }
}

pub fn pid(id: &str) -> PatchId {
    PatchId::parse(id).expect("valid patch id")
}
