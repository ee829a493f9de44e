use crate::callout::settings::CalloutSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const CALLOUT_SETTINGS_FILE_NAME: &str = "callout_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(CALLOUT_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<CalloutSettings> {
    let path = resolve_settings_path()?;
    load_from_path(&path)
}

pub fn save(settings: &CalloutSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<CalloutSettings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no callout settings file; using defaults");
        return Ok(CalloutSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read callout settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(CalloutSettings::default());
    }

    let mut loaded: CalloutSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize callout settings file {}", path.display()))?;
    if loaded.sanitize() {
        tracing::warn!(path = %path.display(), "callout settings contained negative values; clamped to zero");
    }
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &CalloutSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create callout settings parent folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize callout settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write callout settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{load_from_path, save_to_path, settings_path_from_exe_path, CALLOUT_SETTINGS_FILE_NAME};
    use crate::callout::settings::CalloutSettings;
    use crate::callout::side::Side;
    use crate::callout::style::Color;
    use std::path::Path;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/myapp/bin/callout_demo");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/myapp/bin").join(CALLOUT_SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CALLOUT_SETTINGS_FILE_NAME);
        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded, CalloutSettings::default());
    }

    #[test]
    fn empty_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CALLOUT_SETTINGS_FILE_NAME);
        std::fs::write(&path, "  \n").expect("write empty file");
        assert_eq!(load_from_path(&path).expect("load"), CalloutSettings::default());
    }

    #[test]
    fn store_roundtrip_serialization() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(CALLOUT_SETTINGS_FILE_NAME);

        let settings = CalloutSettings {
            corner_radius: 14.0,
            side: Side::BottomLeft,
            border_color: Color::rgba(1, 2, 3, 255),
            ..CalloutSettings::default()
        };

        save_to_path(&path, &settings).expect("save settings");
        let loaded = load_from_path(&path).expect("load settings");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn negative_values_are_clamped_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CALLOUT_SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{"border_width": -5.0, "view_margin": 4.0}"#).expect("write");
        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded.border_width, 0.0);
        assert_eq!(loaded.view_margin, 4.0);
    }

    #[test]
    fn malformed_json_reports_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CALLOUT_SETTINGS_FILE_NAME);
        std::fs::write(&path, "{not json").expect("write");
        let err = load_from_path(&path).expect_err("malformed");
        assert!(format!("{err:#}").contains(CALLOUT_SETTINGS_FILE_NAME));
    }
}
