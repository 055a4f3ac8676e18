//! Publishing the exported site to a git remote.
//!
//! The publish procedure runs the exporter, checks whether the output
//! directory actually changed, and only then stages, commits, and pushes.
//! Export failures abort before any git command runs, so a broken export
//! can never produce a broken commit.
//!
//! Git access goes through the [`Vcs`] trait so the procedure can be tested
//! without a repository.

use std::path::Path;
use std::process::Command;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::{self, ExportReport};
use crate::storage::Storage;

/// Version control operations the publisher needs.
pub trait Vcs {
    /// Whether the working tree has changes under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn has_changes(&self, dir: &Path) -> Result<bool>;

    /// Stage everything under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn stage(&self, dir: &Path) -> Result<()>;

    /// Commit the staged changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch to `remote`/`branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}

/// [`Vcs`] implementation shelling out to the `git` binary.
#[derive(Debug)]
pub struct GitCli {
    /// Directory the git commands run in.
    repo_root: std::path::PathBuf,
}

impl GitCli {
    /// Git client operating on the repository at `repo_root`.
    #[must_use]
    pub fn new(repo_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Run a git subcommand, returning stdout on success.
    fn run(&self, action: &'static str, args: &[&str]) -> Result<String> {
        debug!("Running git {}", args.join(" "));
        let output = Command::new("git")
            .current_dir(&self.repo_root)
            .args(args)
            .output()
            .map_err(|e| Error::vcs(action, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::vcs(action, stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Vcs for GitCli {
    fn has_changes(&self, dir: &Path) -> Result<bool> {
        let dir = dir.to_string_lossy();
        let stdout = self.run("status", &["status", "--porcelain", "--", &dir])?;
        Ok(!stdout.trim().is_empty())
    }

    fn stage(&self, dir: &Path) -> Result<()> {
        let dir = dir.to_string_lossy();
        self.run("add", &["add", "--", &dir])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run("commit", &["commit", "-m", message])?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run("push", &["push", remote, branch])?;
        Ok(())
    }
}

/// How a publish run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The export produced no changes; nothing was committed.
    NoChanges,
    /// Changes were committed but not pushed.
    Committed {
        /// The commit message used.
        message: String,
    },
    /// Changes were committed and pushed.
    Pushed {
        /// The commit message used.
        message: String,
    },
}

/// The commit message for a publish at the given time.
#[must_use]
pub fn commit_message(now: NaiveDateTime) -> String {
    format!("Update site: {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Export the site and publish any resulting changes.
///
/// Runs the exporter with `now`'s date as the reference date, then walks the
/// git steps: stage the output directory, check whether it actually differs,
/// commit with a timestamped message, and push unless `push` is false. When
/// the export produces no diff the procedure stops cleanly with
/// [`PublishOutcome::NoChanges`].
///
/// # Errors
///
/// Propagates export errors (before any git command has run) and git
/// failures. A failed push leaves the commit in place;
/// [`Error::is_push_failure`] identifies that case.
pub fn publish(
    storage: &Storage,
    config: &Config,
    vcs: &dyn Vcs,
    output_dir: Option<&Path>,
    push: bool,
    now: NaiveDateTime,
) -> Result<(ExportReport, PublishOutcome)> {
    let report = export::export(storage, config, output_dir, now.date())?;

    vcs.stage(&report.output_dir)?;
    if !vcs.has_changes(&report.output_dir)? {
        info!("No changes in {}", report.output_dir.display());
        return Ok((report, PublishOutcome::NoChanges));
    }

    let message = commit_message(now);
    vcs.commit(&message)?;
    info!("Committed: {message}");

    if !push {
        return Ok((report, PublishOutcome::Committed { message }));
    }

    vcs.push(&config.publish.remote, &config.publish.branch)?;
    info!(
        "Pushed to {}/{}",
        config.publish.remote, config.publish.branch
    );
    Ok((report, PublishOutcome::Pushed { message }))
}

/// Today's local date, the exporter reference when none is given.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aircraft, AircraftClass, Flight, FlightHours, Landings, Pilot, Role};
    use std::cell::RefCell;

    /// Records calls and returns scripted answers.
    struct FakeVcs {
        calls: RefCell<Vec<String>>,
        has_changes: bool,
        fail_push: bool,
    }

    impl FakeVcs {
        fn new(has_changes: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                has_changes,
                fail_push: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Vcs for FakeVcs {
        fn has_changes(&self, _dir: &Path) -> Result<bool> {
            self.calls.borrow_mut().push("has_changes".to_string());
            Ok(self.has_changes)
        }

        fn stage(&self, _dir: &Path) -> Result<()> {
            self.calls.borrow_mut().push("stage".to_string());
            Ok(())
        }

        fn commit(&self, message: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("commit:{message}"));
            Ok(())
        }

        fn push(&self, remote: &str, branch: &str) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("push:{remote}/{branch}"));
            if self.fail_push {
                return Err(Error::vcs("push", "remote rejected"));
            }
            Ok(())
        }
    }

    fn seeded_storage() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_pilot(&Pilot::new("Jane", "Doe", Role::Pilot))
            .unwrap();
        storage
            .insert_aircraft(&Aircraft::new(
                "N12345",
                "C172",
                AircraftClass::SingleEngineLand,
            ))
            .unwrap();
        storage
            .insert_flight(
                1,
                &Flight {
                    id: None,
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    aircraft: Aircraft::new("N12345", "C172", AircraftClass::SingleEngineLand),
                    route: String::new(),
                    hours: FlightHours {
                        total: 1.0,
                        pic: 1.0,
                        ..FlightHours::default()
                    },
                    landings: Landings::default(),
                    instructor: None,
                    passengers: vec![],
                    notes: String::new(),
                },
            )
            .unwrap();
        storage
    }

    fn test_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_commit_message_format() {
        assert_eq!(commit_message(test_now()), "Update site: 2024-06-01 14:30:05");
    }

    #[test]
    fn test_publish_no_changes_short_circuits() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVcs::new(false);

        let (_, outcome) = publish(
            &storage,
            &Config::default(),
            &vcs,
            Some(dir.path()),
            true,
            test_now(),
        )
        .unwrap();

        assert_eq!(outcome, PublishOutcome::NoChanges);
        assert_eq!(vcs.calls(), vec!["stage", "has_changes"]);
    }

    #[test]
    fn test_publish_commits_and_pushes() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVcs::new(true);
        let config = Config::default();

        let (report, outcome) = publish(
            &storage,
            &config,
            &vcs,
            Some(dir.path()),
            true,
            test_now(),
        )
        .unwrap();

        assert_eq!(report.flight_count, 1);
        assert_eq!(
            outcome,
            PublishOutcome::Pushed {
                message: "Update site: 2024-06-01 14:30:05".to_string()
            }
        );
        assert_eq!(
            vcs.calls(),
            vec![
                "stage",
                "has_changes",
                "commit:Update site: 2024-06-01 14:30:05",
                "push:origin/main",
            ]
        );
    }

    #[test]
    fn test_publish_no_push_stops_after_commit() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVcs::new(true);

        let (_, outcome) = publish(
            &storage,
            &Config::default(),
            &vcs,
            Some(dir.path()),
            false,
            test_now(),
        )
        .unwrap();

        assert!(matches!(outcome, PublishOutcome::Committed { .. }));
        assert!(!vcs.calls().iter().any(|c| c.starts_with("push")));
    }

    #[test]
    fn test_export_failure_runs_no_git_commands() {
        // No pilot seeded, so the export fails immediately.
        let storage = Storage::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVcs::new(true);

        let result = publish(
            &storage,
            &Config::default(),
            &vcs,
            Some(dir.path()),
            true,
            test_now(),
        );

        assert!(matches!(result, Err(Error::PrimaryPilotMissing { .. })));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_push_failure_leaves_commit() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        let mut vcs = FakeVcs::new(true);
        vcs.fail_push = true;

        let result = publish(
            &storage,
            &Config::default(),
            &vcs,
            Some(dir.path()),
            true,
            test_now(),
        );

        let err = result.unwrap_err();
        assert!(err.is_push_failure());
        // The commit happened before the push failed.
        assert!(vcs.calls().iter().any(|c| c.starts_with("commit")));
    }

    #[test]
    fn test_publish_uses_configured_remote_and_branch() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVcs::new(true);
        let mut config = Config::default();
        config.publish.remote = "pages".to_string();
        config.publish.branch = "gh-pages".to_string();

        publish(&storage, &config, &vcs, Some(dir.path()), true, test_now()).unwrap();
        assert!(vcs.calls().contains(&"push:pages/gh-pages".to_string()));
    }
}
