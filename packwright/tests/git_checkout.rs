//! Version suffixes derived from a real git checkout.
//!
//! These tests drive `git` through `SystemCommandExecutor` against a
//! temporary repository, so they need a `git` binary on `PATH`.

use camino::Utf8PathBuf;
use packwright::exec::{CommandExecutor, SystemCommandExecutor};
use packwright::version::scm::GitSourceControl;
use packwright::version::{VersionSuffix, resolve_version_suffix};
use rstest::{fixture, rstest};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(30);

struct Checkout {
    _dir: TempDir,
    root: Utf8PathBuf,
    executor: SystemCommandExecutor,
}

impl Checkout {
    fn git(&self, args: &[&str]) -> String {
        let mut full = vec!["-C", self.root.as_str()];
        full.extend_from_slice(args);
        let output = self.executor.run("git", &full).expect("git runs");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_owned()
    }

    fn write(&self, path: &str, contents: &str) {
        let file = self.root.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(file, contents).expect("failed to write file");
    }

    fn short_head(&self) -> String {
        self.git(&["rev-parse", "--short", "HEAD"])
    }

    fn suffix(&self) -> VersionSuffix {
        let scm = GitSourceControl::new(&self.executor, &self.root);
        resolve_version_suffix(false, &scm)
    }
}

#[fixture]
fn checkout() -> Checkout {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8");
    let checkout = Checkout {
        _dir: dir,
        root,
        executor: SystemCommandExecutor::with_timeout(TIMEOUT),
    };

    checkout.git(&["init", "--quiet"]);
    checkout.git(&["config", "user.email", "builds@example.test"]);
    checkout.git(&["config", "user.name", "Build Bot"]);
    checkout.git(&["config", "commit.gpgsign", "false"]);
    checkout.write("build.gradle", "plugins {}\n");
    checkout.git(&["add", "build.gradle"]);
    checkout.git(&["commit", "--quiet", "-m", "Initial commit"]);
    checkout
}

fn expect_git(suffix: VersionSuffix, head: &str, dirty: bool) {
    match suffix {
        VersionSuffix::Git { id, dirty: actual } => {
            assert_eq!(id.as_str(), head);
            assert_eq!(actual, dirty);
        }
        other => panic!("expected a git suffix, got {other:?}"),
    }
}

#[rstest]
fn clean_checkout_uses_the_current_short_id(checkout: Checkout) {
    let head = checkout.short_head();
    expect_git(checkout.suffix(), &head, false);
}

#[rstest]
fn modified_tracked_file_marks_the_build_dirty(checkout: Checkout) {
    checkout.write("build.gradle", "plugins { id 'java' }\n");
    let head = checkout.short_head();
    expect_git(checkout.suffix(), &head, true);
}

#[rstest]
fn untracked_file_marks_the_build_dirty(checkout: Checkout) {
    checkout.write("notes.txt", "todo\n");
    let head = checkout.short_head();
    expect_git(checkout.suffix(), &head, true);
}

#[rstest]
fn many_untracked_files_resolve_without_waiting_for_the_timeout(checkout: Checkout) {
    for index in 0..2000 {
        checkout.write(
            &format!("generated-output-with-a-long-descriptive-name-{index:04}.class"),
            "",
        );
    }
    let head = checkout.short_head();

    let started = Instant::now();
    let suffix = checkout.suffix();

    assert!(started.elapsed() < TIMEOUT, "git status hit the timeout");
    expect_git(suffix, &head, true);
}

#[rstest]
fn new_commit_changes_the_id(checkout: Checkout) {
    let first = checkout.short_head();
    checkout.write("gradle.properties", "mod_version=0.3.9\n");
    checkout.git(&["add", "gradle.properties"]);
    checkout.git(&["commit", "--quiet", "-m", "Add properties"]);
    let second = checkout.short_head();

    assert_ne!(first, second);
    expect_git(checkout.suffix(), &second, false);
}
