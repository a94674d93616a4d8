use migrade_core::ScriptInfo;

use crate::error::GateError;
use crate::state::{LastRunKind, MigrationState};
use crate::store::VersionStore;

/// Decide whether one script runs, staging bookkeeping as a side effect.
///
/// Scripts must be fed in ascending path order across the whole run: later
/// decisions for the same plugin overwrite earlier staged entries, so the
/// recorded `lastRunScriptType` reflects the final script applied.
///
/// A durable-store read failure excludes the script and lets the run
/// continue; one unreadable plugin record must not abort the whole pass.
pub fn decide<S: VersionStore>(info: &ScriptInfo, state: &mut MigrationState<'_, S>) -> bool {
    let plugin = info.full_plugin().to_string();

    let include = if state.empty_db() {
        // an empty database can only be bootstrapped via create scripts
        let include = info.is_create();
        if include {
            state.stage_last_run(&plugin, LastRunKind::Create);
        }
        include
    } else if state.never_ran() {
        // tables exist but no bookkeeping: the database was provisioned
        // externally, install nothing
        false
    } else {
        match decide_with_history(info, state, &plugin) {
            Ok(include) => include,
            Err(err) => {
                tracing::error!(plugin = %plugin, error = %err, "version lookup failed, script excluded");
                false
            }
        }
    };

    // the durable store reflects the latest known version after every run,
    // even for plugins whose scripts were all excluded
    match state.declared_version(&plugin).map(str::to_string) {
        Some(version) => state.stage_version(&plugin, &version),
        None => tracing::error!(plugin = %plugin, "no plugin metadata, version not staged"),
    }

    include
}

fn decide_with_history<S: VersionStore>(
    info: &ScriptInfo,
    state: &mut MigrationState<'_, S>,
    plugin: &str,
) -> Result<bool, GateError> {
    let Some(installed) = state.installed_version(plugin)? else {
        // new plugin on an already-migrated database
        let include = info.is_create();
        if include {
            state.stage_last_run(plugin, LastRunKind::Create);
        }
        return Ok(include);
    };

    if info.is_create() {
        return Ok(false);
    }
    let Some(dst) = info.dst_version() else {
        return Ok(false);
    };

    let mut include = *dst > installed;
    if !include
        && *dst == installed
        && ((installed.is_snapshot() && state.accept_snapshot())
            || (installed.is_unstable() && state.accept_unstable()))
        && state.last_run_kind(plugin)? == Some(LastRunKind::Update)
    {
        // reopened window: an evolving pre-release may re-run its latest
        // update script under explicit operator opt-in
        include = true;
    }

    if include {
        state.stage_last_run(plugin, LastRunKind::Update);
    }
    Ok(include)
}
