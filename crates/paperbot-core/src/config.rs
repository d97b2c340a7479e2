use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot, sourced from the environment.
///
/// `TELEGRAM_BOT_TOKEN` is required up front; the conversion and search
/// credentials are optional and the matching feature reports itself as
/// unconfigured when first used.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,

    // External services
    pub convertapi_secret: Option<String>,
    pub tenor_api_key: Option<String>,

    // Filesystem
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,

    // Rasterization tool (poppler's pdftoppm)
    pub raster_tool_path: PathBuf,

    // Delivery pacing between consecutive uploads to one chat
    pub upload_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let convertapi_secret = env_str("CONVERTAPI_SECRET").and_then(non_empty);
        let tenor_api_key = env_str("TENOR_API_KEY").and_then(non_empty);

        let temp_dir = PathBuf::from(env_str("TEMP_DIR").unwrap_or("/tmp/paperbot".to_string()));
        let output_dir = env_path("OUTPUT_DIR").unwrap_or_else(|| temp_dir.join("converted"));

        // Ensure working directories exist before the first invocation.
        fs::create_dir_all(&temp_dir)?;
        fs::create_dir_all(&output_dir)?;

        let raster_tool_path = env_path("RASTER_TOOL_PATH")
            .or_else(|| which_in_path("pdftoppm"))
            .unwrap_or_else(|| PathBuf::from("/usr/bin/pdftoppm"));

        let upload_delay = Duration::from_millis(env_u64("UPLOAD_DELAY_MS").unwrap_or(1000));

        Ok(Self {
            telegram_bot_token,
            convertapi_secret,
            tenor_api_key,
            temp_dir,
            output_dir,
            raster_tool_path,
            upload_delay,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn which_in_path(binary: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        let candidate = dir.join(binary);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_executable_file(p: &Path) -> bool {
    if !p.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(md) = fs::metadata(p) {
            return (md.permissions().mode() & 0o111) != 0;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_filters_whitespace() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("key".to_string()), Some("key".to_string()));
    }

    #[test]
    fn dotenv_parsing_does_not_override_existing_env() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(".env");
        fs::write(&dotenv, "PAPERBOT_TEST_EXISTING=from_file\nPAPERBOT_TEST_NEW='quoted'\n")
            .unwrap();

        env::set_var("PAPERBOT_TEST_EXISTING", "from_env");
        load_dotenv_if_present(&dotenv);

        assert_eq!(env::var("PAPERBOT_TEST_EXISTING").unwrap(), "from_env");
        assert_eq!(env::var("PAPERBOT_TEST_NEW").unwrap(), "quoted");

        env::remove_var("PAPERBOT_TEST_EXISTING");
        env::remove_var("PAPERBOT_TEST_NEW");
    }
}
