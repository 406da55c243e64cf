//! Location of the registry, run log and output directory.
//!
//! Everything lives under a base directory: the executable's directory when
//! a registry sits next to it, otherwise the current directory. A registry
//! missing from the base directory is also looked up in the platform config
//! directory:
//! - Linux: `~/.config/navroll/scheme_codes.json`
//! - macOS: `~/Library/Application Support/navroll/scheme_codes.json`
//! - Windows: `%APPDATA%\navroll\scheme_codes.json`

use std::path::{Path, PathBuf};

/// Registry file name.
pub(crate) const REGISTRY_FILE: &str = "scheme_codes.json";

/// Run log file name.
pub(crate) const LOG_FILE: &str = "app_log.txt";

/// Output directory name.
pub(crate) const OUTPUT_DIR: &str = "outputs";

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPaths {
    pub(crate) base_dir: PathBuf,
    pub(crate) registry: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) log_file: PathBuf,
}

impl RunPaths {
    /// Resolve paths, letting explicit values override the defaults.
    pub(crate) fn resolve(
        base_dir: Option<PathBuf>,
        registry: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        log_file: Option<PathBuf>,
    ) -> Self {
        let base_dir = base_dir.unwrap_or_else(default_base_dir);
        let registry = registry.unwrap_or_else(|| default_registry_path(&base_dir, config_registry_path()));
        let output_dir = output_dir.unwrap_or_else(|| base_dir.join(OUTPUT_DIR));
        let log_file = log_file.unwrap_or_else(|| base_dir.join(LOG_FILE));

        Self {
            base_dir,
            registry,
            output_dir,
            log_file,
        }
    }
}

/// Directory of the running executable, if it holds a registry.
fn executable_dir_with_registry() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.to_path_buf();
    dir.join(REGISTRY_FILE).is_file().then_some(dir)
}

/// Default base directory.
pub(crate) fn default_base_dir() -> PathBuf {
    executable_dir_with_registry()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Registry location in the platform config directory.
pub(crate) fn config_registry_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("navroll").join(REGISTRY_FILE))
}

/// Registry in `base_dir`, falling back to `fallback` when only that exists.
///
/// When neither exists the base-directory path is returned so the load error
/// names the primary location.
pub(crate) fn default_registry_path(base_dir: &Path, fallback: Option<PathBuf>) -> PathBuf {
    let primary = base_dir.join(REGISTRY_FILE);
    if primary.is_file() {
        return primary;
    }
    fallback.filter(|p| p.is_file()).unwrap_or(primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("navroll-paths-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_under_base_dir() {
        let base = scratch_dir("defaults");
        let paths = RunPaths::resolve(Some(base.clone()), None, None, None);

        assert_eq!(paths.output_dir, base.join("outputs"));
        assert_eq!(paths.log_file, base.join("app_log.txt"));
        assert_eq!(paths.base_dir, base);
    }

    #[test]
    fn test_explicit_paths_win() {
        let base = scratch_dir("explicit");
        let paths = RunPaths::resolve(
            Some(base),
            Some(PathBuf::from("/etc/navroll/codes.json")),
            Some(PathBuf::from("/tmp/reports")),
            Some(PathBuf::from("/tmp/navroll.log")),
        );

        assert_eq!(paths.registry, PathBuf::from("/etc/navroll/codes.json"));
        assert_eq!(paths.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(paths.log_file, PathBuf::from("/tmp/navroll.log"));
    }

    #[test]
    fn test_registry_falls_back_to_config_copy() {
        let base = scratch_dir("fallback-base");
        let config = scratch_dir("fallback-config").join(REGISTRY_FILE);
        std::fs::write(&config, "{}").unwrap();

        assert_eq!(default_registry_path(&base, Some(config.clone())), config);
    }

    #[test]
    fn test_registry_prefers_base_dir() {
        let base = scratch_dir("prefer-base");
        std::fs::write(base.join(REGISTRY_FILE), "{}").unwrap();
        let config = scratch_dir("prefer-config").join(REGISTRY_FILE);
        std::fs::write(&config, "{}").unwrap();

        assert_eq!(
            default_registry_path(&base, Some(config)),
            base.join(REGISTRY_FILE)
        );
    }

    #[test]
    fn test_missing_registry_points_at_base_dir() {
        let base = scratch_dir("missing");
        let missing_fallback = base.join("nowhere").join(REGISTRY_FILE);

        assert_eq!(
            default_registry_path(&base, Some(missing_fallback)),
            base.join(REGISTRY_FILE)
        );
    }
}
