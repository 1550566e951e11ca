use std::{fs::File, io::Read, path::PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

const CONFIG_FILE_NAME: &str = "config.toml";

pub fn find_config_file(use_local: bool) -> PathBuf {
    let local = PathBuf::from(".").join(CONFIG_FILE_NAME);
    if use_local {
        return local;
    }

    #[cfg(unix)]
    let home = std::env::var_os("HOME");
    #[cfg(windows)]
    let home = std::env::var_os("APPDATA");

    #[cfg(any(unix, windows))]
    if let Some(home) = home {
        let mut path = PathBuf::from(home);

        if cfg!(unix) {
            path = path.join(".config");
        }

        path = path.join(crate::APPLICATION_NAME).join(CONFIG_FILE_NAME);

        if path.exists() {
            return path;
        }
    }

    local
}

pub fn read_config(use_local: bool) -> ConfigResult<String> {
    let filename = find_config_file(use_local);

    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = String::new();
    fd.read_to_string(&mut buf)?;

    Ok(buf)
}
