const DOCUMENTATION: &str = r#"# Noted settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys are case sensitive. Missing keys take their default.

# Examples:
# width = 1700
# [canvas]
# reduce_strokes = true
# eraser_thickness = 0.01

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of rendered pages, in pixels.
    pub width: u32,
    /// Handed to every canvas opened.
    pub canvas: noted_core::settings::Settings,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            // 8.5in at 200dpi
            width: 1700,
            canvas: noted_core::settings::Settings::default(),
        }
    }
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Load the user's settings, or defaults if unavailable for some reason.
    /// A missing file is created with the defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(mut path) = preferences_dir() else {
            log::warn!("No preferences dir, using default settings.");
            return Self::default();
        };
        path.push(Self::FILENAME);
        if !path.exists() {
            let settings = Self::default();
            if let Err(e) = settings.save() {
                log::warn!("Failed to save default settings:\n{e:?}");
            }
            return settings;
        }
        Self::load_or_default(&path)
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        let settings: anyhow::Result<Self> = (|| {
            let string = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&string)?)
        })();
        match settings {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings at {path:?} unreadable, defaulting:\n{e:?}");
                Self::default()
            }
        }
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(preferences, string)?;
        Ok(())
    }
}
