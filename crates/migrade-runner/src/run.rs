use std::fs;

use migrade_config::MigradeConfig;
use migrade_core::{PluginCatalog, ScriptInfo};
use migrade_gate::{decide, Leniency, MigrationState, RunFacts, VersionStore};
use migrade_loader::{ScriptFile, SqlLineFilter};

use crate::error::RunnerError;
use crate::session::{PreparedScript, SqlSession};

/// What happened to one candidate script during the decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Included,
    Excluded,
    /// The path does not match the naming convention; never eligible.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDecision {
    pub rel: String,
    pub outcome: DecisionOutcome,
}

/// Outcome of a whole run, for reporting.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub enabled: bool,
    pub empty_db: bool,
    pub never_ran: bool,
    pub decisions: Vec<ScriptDecision>,
    pub applied: usize,
    pub staged_writes: usize,
}

impl RunReport {
    fn disabled() -> Self {
        Self::default()
    }

    pub fn included(&self) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(|d| d.outcome == DecisionOutcome::Included)
            .map(|d| d.rel.as_str())
    }
}

/// Dry-run the decision pass: parse and gate every script against the given
/// facts without touching the filesystem, the engine, or the durable store.
pub fn plan_decisions<V: VersionStore>(
    config: &MigradeConfig,
    facts: RunFacts,
    store: &mut V,
    catalog: PluginCatalog,
    scripts: &[ScriptFile],
) -> Vec<ScriptDecision> {
    let leniency = Leniency {
        accept_snapshot: config.accept_snapshot,
        accept_unstable: config.accept_unstable,
    };
    let mut state = MigrationState::new(facts, leniency, config.namespace(), catalog, store);
    let decisions = decide_all(&mut state, scripts);
    // state dropped here: nothing staged ever reaches the store
    decisions
}

fn decide_all<V: VersionStore>(
    state: &mut MigrationState<'_, V>,
    scripts: &[ScriptFile],
) -> Vec<ScriptDecision> {
    let mut decisions = Vec::with_capacity(scripts.len());
    for script in scripts {
        let outcome = match ScriptInfo::parse(&script.rel) {
            None => {
                tracing::info!(path = %script.rel, "could not determine what to do with file");
                DecisionOutcome::Unmatched
            }
            Some(info) => {
                let included = decide(&info, state);
                tracing::info!(path = %script.rel, included, "inclusion decision");
                if included {
                    DecisionOutcome::Included
                } else {
                    DecisionOutcome::Excluded
                }
            }
        };
        decisions.push(ScriptDecision {
            rel: script.rel.clone(),
            outcome,
        });
    }
    decisions
}

/// Runs one whole migration pass at startup.
pub struct RunCoordinator {
    config: MigradeConfig,
}

impl RunCoordinator {
    pub fn new(config: MigradeConfig) -> Self {
        Self { config }
    }

    /// Probe database facts, gate every candidate script, hand the filtered
    /// batch to the engine, and commit bookkeeping only if the whole
    /// changelog applied. The session is released on every exit path; a
    /// close error after a fully successful apply is a known benign race and
    /// is suppressed.
    pub fn run<S: SqlSession, V: VersionStore>(
        &self,
        mut session: S,
        store: &mut V,
        catalog: PluginCatalog,
        scripts: &[ScriptFile],
        filter: &SqlLineFilter,
    ) -> Result<RunReport, RunnerError> {
        if !self.config.enabled() {
            tracing::info!("migration runner not enabled");
            return Ok(RunReport::disabled());
        }
        tracing::info!("migration runner starting");

        let never_ran = match session.scalar_count(self.config.bookkeeping_probe()) {
            Ok(count) => count == 0,
            Err(err) => return Err(close_after(session, RunnerError::Probe(err))),
        };
        let empty_db = match session.scalar_count(self.config.empty_db_probe()) {
            Ok(count) => count == 0,
            Err(err) => return Err(close_after(session, RunnerError::Probe(err))),
        };
        let facts = RunFacts { empty_db, never_ran };
        tracing::info!(empty_db, never_ran, "database facts probed");

        let leniency = Leniency {
            accept_snapshot: self.config.accept_snapshot,
            accept_unstable: self.config.accept_unstable,
        };
        let mut state =
            MigrationState::new(facts, leniency, self.config.namespace(), catalog, store);
        let decisions = decide_all(&mut state, scripts);

        let mut prepared = Vec::new();
        for script in scripts {
            let included = decisions
                .iter()
                .any(|d| d.rel == script.rel && d.outcome == DecisionOutcome::Included);
            if !included {
                continue;
            }
            let sql = match fs::read_to_string(&script.path) {
                Ok(sql) => sql,
                Err(source) => {
                    return Err(close_after(
                        session,
                        RunnerError::Script {
                            path: script.rel.clone(),
                            source,
                        },
                    ));
                }
            };
            prepared.push(PreparedScript {
                path: script.rel.clone(),
                sql: filter.filter_sql(&sql),
            });
        }

        if let Err(err) = session.apply(&prepared) {
            // the state and its staging area are discarded: no partial
            // version bump, so re-running the whole process stays safe
            return Err(close_after(session, RunnerError::Apply(err)));
        }

        let staged_writes = match state.commit() {
            Ok(written) => written,
            Err(err) => return Err(close_after(session, RunnerError::Commit(err))),
        };

        if let Err(err) = session.close() {
            // benign double-close race reported by some pools after a fully
            // successful apply
            tracing::warn!(error = %err, "session close failed after successful apply, suppressed");
        }

        let applied = prepared.len();
        tracing::info!(applied, staged_writes, "migration runner ended");
        Ok(RunReport {
            enabled: true,
            empty_db,
            never_ran,
            decisions,
            applied,
            staged_writes,
        })
    }
}

fn close_after<S: SqlSession>(session: S, err: RunnerError) -> RunnerError {
    if let Err(close_err) = session.close() {
        tracing::warn!(error = %close_err, "session close failed after run failure");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrade_gate::MemoryStore;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    use crate::session::SessionError;

    #[derive(Default)]
    struct FakeSession {
        table_count: i64,
        changelog_count: i64,
        fail_apply: bool,
        fail_close: bool,
        applied: Rc<RefCell<Vec<PreparedScript>>>,
        closed: Rc<RefCell<bool>>,
    }

    impl SqlSession for FakeSession {
        fn scalar_count(&mut self, sql: &str) -> Result<i64, SessionError> {
            if sql.contains("DATABASECHANGELOG") {
                Ok(self.changelog_count)
            } else {
                Ok(self.table_count)
            }
        }

        fn apply(&mut self, scripts: &[PreparedScript]) -> Result<(), SessionError> {
            if self.fail_apply {
                return Err(SessionError("syntax error in changelog".into()));
            }
            self.applied.borrow_mut().extend_from_slice(scripts);
            Ok(())
        }

        fn close(self) -> Result<(), SessionError> {
            *self.closed.borrow_mut() = true;
            if self.fail_close {
                Err(SessionError("connection already closed".into()))
            } else {
                Ok(())
            }
        }
    }

    fn write_script(root: &Path, rel: &str, sql: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, sql).unwrap();
    }

    fn scripts_on_disk(root: &Path) -> Vec<ScriptFile> {
        migrade_loader::discover_scripts(root).unwrap()
    }

    fn forms_catalog() -> PluginCatalog {
        let mut catalog = PluginCatalog::new();
        catalog.insert("forms", "1.2.0");
        catalog
    }

    fn enabled_config() -> MigradeConfig {
        MigradeConfig {
            enabled: true,
            ..Default::default()
        }
    }

    #[rstest]
    fn disabled_config_is_a_no_op() {
        let coordinator = RunCoordinator::new(MigradeConfig::default());
        let mut store = MemoryStore::new();
        let session = FakeSession::default();

        let report = coordinator
            .run(
                session,
                &mut store,
                PluginCatalog::new(),
                &[],
                &SqlLineFilter::identity(),
            )
            .unwrap();

        assert!(!report.enabled);
        assert!(store.entries().is_empty());
    }

    #[rstest]
    fn empty_database_applies_only_the_create_script() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/plugin/create_db_forms.sql",
            "create table forms (id int);",
        );
        write_script(
            tmp.path(),
            "plugins/forms/upgrade/update_db_forms-1.0.0-1.2.0.sql",
            "alter table forms add col int;",
        );
        let scripts = scripts_on_disk(tmp.path());

        let applied = Rc::new(RefCell::new(Vec::new()));
        let session = FakeSession {
            table_count: 0,
            changelog_count: 0,
            applied: Rc::clone(&applied),
            ..Default::default()
        };
        let mut store = MemoryStore::new();

        let report = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap();

        assert!(report.empty_db);
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.included().collect::<Vec<_>>(),
            vec!["plugins/forms/plugin/create_db_forms.sql"]
        );
        assert_eq!(applied.borrow().len(), 1);

        // the installed version is the metadata-declared one, not the
        // excluded update's destination
        assert_eq!(
            store.entries().get("core.plugins.status.forms.version"),
            Some(&"1.2.0".to_string())
        );
        assert_eq!(
            store
                .entries()
                .get("core.plugins.status.forms.lastRunScriptType"),
            Some(&"create/init".to_string())
        );
    }

    #[rstest]
    fn only_strictly_newer_updates_are_applied() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/upgrade/update_db_forms-0.8.0-0.9.0.sql",
            "-- old",
        );
        write_script(
            tmp.path(),
            "plugins/forms/upgrade/update_db_forms-1.0.0-1.2.0.sql",
            "-- new",
        );
        let scripts = scripts_on_disk(tmp.path());

        let session = FakeSession {
            table_count: 42,
            changelog_count: 1,
            ..Default::default()
        };
        let mut store: MemoryStore = [(
            "core.plugins.status.forms.version".to_string(),
            "1.0.0".to_string(),
        )]
        .into_iter()
        .collect();

        let report = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap();

        assert_eq!(
            report.included().collect::<Vec<_>>(),
            vec!["plugins/forms/upgrade/update_db_forms-1.0.0-1.2.0.sql"]
        );
        assert_eq!(
            store
                .entries()
                .get("core.plugins.status.forms.lastRunScriptType"),
            Some(&"update".to_string())
        );
    }

    #[rstest]
    fn apply_failure_discards_staged_writes_and_closes_the_session() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/plugin/create_db_forms.sql",
            "create table forms (id int);",
        );
        let scripts = scripts_on_disk(tmp.path());

        let closed = Rc::new(RefCell::new(false));
        let session = FakeSession {
            fail_apply: true,
            closed: Rc::clone(&closed),
            ..Default::default()
        };
        let mut store = MemoryStore::new();

        let err = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap_err();

        assert!(matches!(err, RunnerError::Apply(_)));
        assert!(store.entries().is_empty());
        assert!(*closed.borrow());
    }

    #[rstest]
    fn close_race_after_successful_apply_is_suppressed() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/plugin/create_db_forms.sql",
            "create table forms (id int);",
        );
        let scripts = scripts_on_disk(tmp.path());

        let session = FakeSession {
            fail_close: true,
            ..Default::default()
        };
        let mut store = MemoryStore::new();

        let report = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap();

        // the run still commits: the failure happened after the changelog
        // fully applied
        assert_eq!(report.applied, 1);
        assert!(!store.entries().is_empty());
    }

    #[rstest]
    fn close_failure_does_not_mask_an_apply_failure() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/plugin/create_db_forms.sql",
            "create table forms (id int);",
        );
        let scripts = scripts_on_disk(tmp.path());

        let session = FakeSession {
            fail_apply: true,
            fail_close: true,
            ..Default::default()
        };
        let mut store = MemoryStore::new();

        let err = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap_err();

        assert!(matches!(err, RunnerError::Apply(_)));
        assert!(store.entries().is_empty());
    }

    #[rstest]
    fn filter_rewrites_script_content_before_the_engine() {
        let tmp = TempDir::new().unwrap();
        write_script(
            tmp.path(),
            "plugins/forms/plugin/create_db_forms.sql",
            "create table forms (c LONG VARCHAR);\n",
        );
        let scripts = scripts_on_disk(tmp.path());

        let filter = SqlLineFilter::compile(&[migrade_loader::RewriteRule {
            pattern: "LONG VARCHAR".to_string(),
            replace: "TEXT".to_string(),
        }])
        .unwrap();

        let applied = Rc::new(RefCell::new(Vec::new()));
        let session = FakeSession {
            applied: Rc::clone(&applied),
            ..Default::default()
        };
        let mut store = MemoryStore::new();

        RunCoordinator::new(enabled_config())
            .run(session, &mut store, forms_catalog(), &scripts, &filter)
            .unwrap();

        assert_eq!(applied.borrow()[0].sql, "create table forms (c TEXT);\n");
    }

    #[rstest]
    fn unmatched_files_are_reported_and_never_applied() {
        let tmp = TempDir::new().unwrap();
        write_script(tmp.path(), "plugins/forms/notes.sql", "-- not a script");
        let scripts = scripts_on_disk(tmp.path());

        let session = FakeSession::default();
        let mut store = MemoryStore::new();

        let report = RunCoordinator::new(enabled_config())
            .run(
                session,
                &mut store,
                forms_catalog(),
                &scripts,
                &SqlLineFilter::identity(),
            )
            .unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(
            report.decisions[0].outcome,
            DecisionOutcome::Unmatched
        );
    }

    #[rstest]
    fn plan_decisions_writes_nothing() {
        let scripts = vec![
            ScriptFile {
                rel: "plugins/forms/plugin/create_db_forms.sql".to_string(),
                path: "unused".into(),
            },
            ScriptFile {
                rel: "plugins/forms/upgrade/update_db_forms-1.0.0-1.2.0.sql".to_string(),
                path: "unused".into(),
            },
        ];
        let mut store = MemoryStore::new();
        let facts = RunFacts {
            empty_db: true,
            never_ran: true,
        };

        let decisions = plan_decisions(
            &enabled_config(),
            facts,
            &mut store,
            forms_catalog(),
            &scripts,
        );

        assert_eq!(decisions[0].outcome, DecisionOutcome::Included);
        assert_eq!(decisions[1].outcome, DecisionOutcome::Excluded);
        assert!(store.entries().is_empty());
    }
}
