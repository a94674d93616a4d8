use crate::version::PluginVersion;

/// Name of the pseudo-plugin owning scripts outside any `plugins/` segment.
pub const CORE_PLUGIN: &str = "core";

const SQL_EXT: &str = ".sql";
const CREATE_PREFIXES: [&str; 2] = ["create_db_", "init_db_"];
const UPDATE_PREFIXES: [&str; 2] = ["update_db_", "upgrade_db_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Create,
    Update,
}

/// What a migration script's path says about it: owning plugin, kind, and,
/// for update scripts, the version range it migrates.
///
/// Expected layout:
/// `.../plugins/<plugin>/[modules/<module>/]{plugin|upgrade}/<name>.sql`,
/// where `<name>` is `create_db_<token>` / `init_db_<token>` for create
/// scripts and `update_db_<token>-<src>-<dst>` for update scripts. Paths
/// without a `plugins/` segment belong to the core system.
#[derive(Debug, Clone)]
pub struct ScriptInfo {
    plugin: String,
    full_plugin: String,
    kind: ScriptKind,
    src_version: Option<PluginVersion>,
    dst_version: Option<PluginVersion>,
}

impl ScriptInfo {
    /// Classify a script path. Returns `None` for anything that does not
    /// match the naming convention; such files are never eligible to run.
    pub fn parse(path: &str) -> Option<Self> {
        let normalized = path.replace('\\', "/");
        if !normalized.to_ascii_lowercase().ends_with(SQL_EXT) {
            return None;
        }

        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let file = *segments.last()?;
        let stem = &file[..file.len() - SQL_EXT.len()];

        let (plugin, full_plugin) = owning_plugin(&segments)?;

        if CREATE_PREFIXES.iter().any(|p| stem.starts_with(p)) {
            return Some(Self {
                plugin,
                full_plugin,
                kind: ScriptKind::Create,
                src_version: None,
                dst_version: None,
            });
        }

        let rest = UPDATE_PREFIXES
            .iter()
            .find_map(|p| stem.strip_prefix(p))?;
        // A version never contains a bare dash, so an update stem is exactly
        // <name token>-<src>-<dst>.
        let parts: Vec<&str> = rest.split('-').collect();
        if parts.len() != 3 || parts[0].is_empty() {
            return None;
        }
        let src_version = PluginVersion::parse(parts[1]).ok()?;
        let dst_version = PluginVersion::parse(parts[2]).ok()?;

        Some(Self {
            plugin,
            full_plugin,
            kind: ScriptKind::Update,
            src_version: Some(src_version),
            dst_version: Some(dst_version),
        })
    }

    /// Innermost owning plugin, e.g. `forms`.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Plugin name with the module suffix when the script lives under a
    /// module subpath, e.g. `forms-template`.
    pub fn full_plugin(&self) -> &str {
        &self.full_plugin
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn is_create(&self) -> bool {
        self.kind == ScriptKind::Create
    }

    /// Declared source version; present only on update scripts.
    pub fn src_version(&self) -> Option<&PluginVersion> {
        self.src_version.as_ref()
    }

    /// Declared destination version; present only on update scripts.
    pub fn dst_version(&self) -> Option<&PluginVersion> {
        self.dst_version.as_ref()
    }
}

fn owning_plugin(segments: &[&str]) -> Option<(String, String)> {
    let Some(plugins_idx) = segments.iter().position(|s| *s == "plugins") else {
        return Some((CORE_PLUGIN.to_string(), CORE_PLUGIN.to_string()));
    };
    // the filename itself can never be the plugin directory
    if plugins_idx + 1 >= segments.len() - 1 {
        return None;
    }
    let plugin = segments[plugins_idx + 1].to_string();

    let after_plugin = &segments[plugins_idx + 2..];
    let module = after_plugin
        .iter()
        .position(|s| *s == "modules")
        .and_then(|i| {
            // modules/<module>/ must still be followed by the filename
            if plugins_idx + 2 + i + 1 < segments.len() - 1 {
                Some(after_plugin[i + 1])
            } else {
                None
            }
        });

    let full_plugin = match module {
        Some(module) => format!("{plugin}-{module}"),
        None => plugin.clone(),
    };
    Some((plugin, full_plugin))
}
