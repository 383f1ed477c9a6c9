pub mod settings;

use settings::Settings;
use std::path::Path;

/// File name looked up by [`load_settings`].
pub const SETTINGS_FILE_NAME: &str = "jxl_wrapper.yaml";

/// Load `jxl_wrapper.yaml` from `dir`.
///
/// Returns the default settings when the file does not exist.
pub fn load_settings(dir: &Path) -> crate::error::Result<Settings> {
    let settings_path = dir.join(SETTINGS_FILE_NAME);

    if settings_path.exists() {
        Settings::from_file(&settings_path)
    } else {
        Ok(Settings::default())
    }
}
