//! Mapping from upstream condition identifiers to local icon assets.
//!
//! Upstream vocabularies combine a base condition with a day/night qualifier
//! (`clear-day`, `partly-cloudy-night`, ...). Day variants share the plain
//! base-name asset, night variants use an `nt_` prefixed one, and anything
//! that does not resolve to a file falls back to `unknown.png`.

use std::path::{Path, PathBuf};

use crate::model::WeatherDetails;

const UNKNOWN: &str = "unknown";

/// Resolve `identifier` to an icon under `root`.
///
/// The returned path always exists as long as `<root>/unknown.png` does.
pub fn resolve_icon(root: &Path, identifier: Option<&str>) -> PathBuf {
    let identifier = match identifier {
        Some(id) if !id.is_empty() => id,
        _ => UNKNOWN,
    };

    let candidate = if identifier.contains("day") {
        let base = identifier.replace("day", "").replace('-', "");
        root.join(format!("{base}.png"))
    } else if identifier.contains("night") {
        let base = identifier.replace("night", "").replace('-', "");
        root.join(format!("nt_{base}.png"))
    } else {
        root.join(format!("{identifier}.png"))
    };

    if candidate.exists() {
        candidate
    } else {
        unknown_icon(root)
    }
}

pub fn unknown_icon(root: &Path) -> PathBuf {
    root.join(format!("{UNKNOWN}.png"))
}

/// Icon root plus the sentinel record built against it.
#[derive(Debug, Clone)]
pub struct IconSet {
    root: PathBuf,
    sentinel: WeatherDetails,
}

impl IconSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let sentinel = WeatherDetails {
            icon_path: resolve_icon(&root, None),
            ..WeatherDetails::default()
        };

        Self { root, sentinel }
    }

    /// `<install dir>/icons/256x256`, falling back to the working directory
    /// when the executable location cannot be determined.
    pub fn default_root() -> PathBuf {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("icons").join("256x256")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, identifier: Option<&str>) -> PathBuf {
        resolve_icon(&self.root, identifier)
    }

    pub fn unknown(&self) -> PathBuf {
        unknown_icon(&self.root)
    }

    /// The all-default record returned whenever no real data is available.
    pub fn sentinel(&self) -> &WeatherDetails {
        &self.sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn icon_dir(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in names.iter().chain(std::iter::once(&"unknown.png")) {
            fs::write(dir.path().join(name), b"png").expect("write icon");
        }
        dir
    }

    #[test]
    fn day_identifiers_strip_qualifier_and_hyphens() {
        let dir = icon_dir(&["clear.png", "partlycloudy.png"]);

        assert_eq!(resolve_icon(dir.path(), Some("clear-day")), dir.path().join("clear.png"));
        assert_eq!(
            resolve_icon(dir.path(), Some("partly-cloudy-day")),
            dir.path().join("partlycloudy.png")
        );
    }

    #[test]
    fn night_identifiers_use_prefixed_asset() {
        let dir = icon_dir(&["nt_clear.png", "nt_partlycloudy.png"]);

        assert_eq!(
            resolve_icon(dir.path(), Some("clear-night")),
            dir.path().join("nt_clear.png")
        );
        assert_eq!(
            resolve_icon(dir.path(), Some("partly-cloudy-night")),
            dir.path().join("nt_partlycloudy.png")
        );
    }

    #[test]
    fn plain_identifiers_map_directly() {
        let dir = icon_dir(&["rain.png"]);

        assert_eq!(resolve_icon(dir.path(), Some("rain")), dir.path().join("rain.png"));
    }

    #[test]
    fn missing_assets_fall_back_to_unknown() {
        let dir = icon_dir(&[]);
        let unknown = dir.path().join("unknown.png");

        assert_eq!(resolve_icon(dir.path(), Some("clear-day")), unknown);
        assert_eq!(resolve_icon(dir.path(), Some("clear-night")), unknown);
        assert_eq!(resolve_icon(dir.path(), Some("tornado")), unknown);
    }

    #[test]
    fn absent_or_empty_identifier_is_unknown() {
        let dir = icon_dir(&["clear.png"]);
        let unknown = dir.path().join("unknown.png");

        assert_eq!(resolve_icon(dir.path(), None), unknown);
        assert_eq!(resolve_icon(dir.path(), Some("")), unknown);
        assert_eq!(resolve_icon(dir.path(), Some("unknown")), unknown);
    }

    #[test]
    fn day_wins_over_night_when_both_present() {
        // "day" is checked before "night".
        let dir = icon_dir(&["andnight.png"]);

        assert_eq!(
            resolve_icon(dir.path(), Some("day-and-night")),
            dir.path().join("andnight.png")
        );
    }

    #[test]
    fn sentinel_carries_unknown_icon() {
        let dir = icon_dir(&[]);
        let icons = IconSet::new(dir.path());

        let sentinel = icons.sentinel();
        assert_eq!(sentinel.icon_path, dir.path().join("unknown.png"));
        assert_eq!(sentinel.humidity, 0);
        assert_eq!(sentinel.pressure, 0);
    }
}
