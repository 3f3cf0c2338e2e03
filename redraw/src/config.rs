//! Replay settings, saved and loaded from user preferences.

use redraw_core::ReplayConfig;

const DOCUMENTATION: &str = r#"# Redraw replay settings. You may edit this file, but formatting and comments will not be
# preserved. Every key is optional.

# commands_per_update = 200     # Commands applied per frame while playing.
# layer_count = 5
# canvas_width = 1080           # Height follows from each session's aspect ratio.
# follow_user_switch = false    # Reselect the drawing user on user-switch commands.
#
# [[layers]]                    # Per-layer options, top-most first.
# visible = true

"#;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no preferences directory on this platform")]
    NoPreferencesDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

pub struct Settings {
    failed_to_load: bool,
    pub replay: ReplayConfig,
}
impl Settings {
    const FILENAME: &'static str = "replay.toml";
    /// Load from the preferences directory, or defaults if that fails for any reason.
    #[must_use]
    pub fn load() -> Self {
        let loaded = preferences_dir()
            .ok_or(ConfigError::NoPreferencesDir)
            .and_then(|mut path| {
                path.push(Self::FILENAME);
                Self::read(&path)
            });
        match loaded {
            Ok(replay) => Self {
                failed_to_load: false,
                replay,
            },
            Err(err) => {
                log::warn!("replay settings unavailable ({err}), defaulting");
                Self {
                    failed_to_load: true,
                    replay: ReplayConfig::default(),
                }
            }
        }
    }
    pub fn read(path: &std::path::Path) -> Result<ReplayConfig, ConfigError> {
        let string = std::fs::read_to_string(path)?;
        Ok(parse(&string)?)
    }
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    pub fn save(&self) -> Result<(), ConfigError> {
        let mut preferences = preferences_dir().ok_or(ConfigError::NoPreferencesDir)?;
        // Not recursive. A missing parent is the user's business.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(&self.replay)?;
        std::fs::write(preferences, string)?;
        Ok(())
    }
}

pub fn parse(string: &str) -> Result<ReplayConfig, toml::de::Error> {
    toml::from_str(string)
}
