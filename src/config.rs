use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Deserializer};
use tracing::info;

/// Slide duration when `slide-seconds` (or the whole config file) is absent.
pub const UNSET_SLIDE_SECONDS: i64 = 10;
/// Slide duration used when `slide-seconds` is non-positive or unparsable.
pub const DEFAULT_SLIDE_SECONDS: i64 = 5;
/// Safety cap on the number of images a single scan keeps.
pub const DEFAULT_MAX_FILES: usize = 10_000;

const DEFAULT_KEY_REPEAT: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Root directory to scan recursively (and watch) for images.
    pub photo_library_path: PathBuf,
    /// Seconds each image stays on screen before auto-advance.
    #[serde(deserialize_with = "lenient_seconds")]
    pub slide_seconds: i64,
    /// Step interval while an arrow key is held.
    #[serde(with = "humantime_serde")]
    pub key_repeat_interval: Duration,
    /// Quiet period folded into a single rescan; zero posts immediately.
    #[serde(with = "humantime_serde")]
    pub rescan_debounce: Duration,
    /// Maximum number of images kept from a scan.
    pub max_files: usize,
    /// Letterbox colour.
    pub background: [u8; 3],
    /// Borderless fullscreen window; windowed when false.
    pub fullscreen: bool,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                config = %path.display(),
                "configuration file not found; using defaults"
            );
            return Ok(Self::default());
        }
        Self::from_yaml_file(path)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.max_files > 0, "max-files must be greater than zero");
        ensure!(
            !self.key_repeat_interval.is_zero(),
            "key-repeat-interval must be greater than zero"
        );
        Ok(self)
    }

    /// Auto-advance period. Non-positive values fall back to five seconds.
    pub fn slide_interval(&self) -> Duration {
        let secs = if self.slide_seconds > 0 {
            self.slide_seconds
        } else {
            DEFAULT_SLIDE_SECONDS
        };
        Duration::from_secs(secs.unsigned_abs())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            photo_library_path: PathBuf::from("."),
            slide_seconds: UNSET_SLIDE_SECONDS,
            key_repeat_interval: DEFAULT_KEY_REPEAT,
            rescan_debounce: Duration::ZERO,
            max_files: DEFAULT_MAX_FILES,
            background: [0, 0, 0],
            fullscreen: true,
        }
    }
}

/// Accept integers, floats and strings with a leading integer ("10", "7s").
/// Anything else becomes the default instead of a parse error.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_yaml::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_yaml::Value::String(s) => leading_integer(s),
        _ => None,
    };
    Ok(parsed.unwrap_or(DEFAULT_SLIDE_SECONDS))
}

fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_matches_atoi() {
        assert_eq!(leading_integer("10"), Some(10));
        assert_eq!(leading_integer("  7 seconds"), Some(7));
        assert_eq!(leading_integer("-3"), Some(-3));
        assert_eq!(leading_integer("+4"), Some(4));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn non_positive_seconds_use_default_interval() {
        for secs in [0, -1, -30] {
            let cfg = Configuration {
                slide_seconds: secs,
                ..Default::default()
            };
            assert_eq!(cfg.slide_interval(), Duration::from_secs(5));
        }
    }
}
