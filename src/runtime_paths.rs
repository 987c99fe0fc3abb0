use std::{env, path::PathBuf};

use crate::{DESKTOP_ROOT_ENV, DESKTOP_STATE_FILE};

const DEFAULT_DATA_DIR_NAME: &str = ".parley";

fn data_dir_from(override_value: Option<String>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(raw) = override_value {
        let path = PathBuf::from(raw.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    home_dir.map(|home| home.join(DEFAULT_DATA_DIR_NAME))
}

pub(crate) fn desktop_data_dir() -> Option<PathBuf> {
    data_dir_from(env::var(DESKTOP_ROOT_ENV).ok(), home::home_dir())
}

pub(crate) fn desktop_state_path() -> Option<PathBuf> {
    desktop_data_dir().map(|dir| dir.join(DESKTOP_STATE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_prefers_non_blank_override() {
        assert_eq!(
            data_dir_from(Some(" /opt/parley ".to_string()), Some(PathBuf::from("/home/u"))),
            Some(PathBuf::from("/opt/parley"))
        );
    }

    #[test]
    fn data_dir_falls_back_to_home_for_blank_override() {
        assert_eq!(
            data_dir_from(Some("   ".to_string()), Some(PathBuf::from("/home/u"))),
            Some(PathBuf::from("/home/u/.parley"))
        );
        assert_eq!(data_dir_from(None, None), None);
    }
}
