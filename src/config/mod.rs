//! Layered settings: built-in defaults, then `.cdbgrc`, then the environment.

use std::{collections::HashMap, env, fs, path::PathBuf, time::Duration};

use directories::BaseDirs;

/// Recognized keys with their defaults. Path defaults are filled in at load time.
const DEFAULTS: &[(&str, &str)] = &[
    ("PYTHON_CMD", if cfg!(windows) { "python" } else { "python3" }),
    ("CXX_CMD", "g++"),
    ("CXX_FLAGS", ""),
    ("RUN_TIMEOUT_MS", "5000"),
    ("COMPILE_TIMEOUT_MS", "10000"),
    ("WORK_DIR", ""),
    ("PROJECTS_PATH", ""),
    ("USER_ID", "local"),
    ("WATCH_INTERVAL_MS", "500"),
    ("API_BASE_URL", "default"),
    ("DEFAULT_MODEL", "gpt-4o-mini"),
    ("REQUEST_TIMEOUT", "60"),
    ("CACHE_PATH", ""),
    ("CACHE_LENGTH", "100"),
    ("PRETTIFY_MARKDOWN", "true"),
    ("LOG_LEVEL", "warn"),
];

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    /// When false, `get` does not consult the process environment.
    read_env: bool,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let config_path = app_dir().join(".cdbgrc");
        let mut inner = defaults();

        match fs::read_to_string(&config_path) {
            Ok(text) => inner.extend(parse_rc(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => eprintln!("ignoring {}: {}", config_path.display(), e),
        }
        inner.extend(env::vars().filter(|(k, _)| is_config_key(k)));

        Self { inner, read_env: true, config_path }
    }

    /// Defaults overlaid with `pairs`; ignores both the rc file and the environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut inner = defaults();
        inner.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self { inner, read_env: false, config_path: app_dir().join(".cdbgrc") }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let from_env = self.read_env.then(|| env::var(key).ok()).flatten();
        from_env.or_else(|| self.inner.get(key).cloned())
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key)?.trim().parse().ok()
    }

    pub fn get_millis(&self, key: &str) -> Option<Duration> {
        let ms: u64 = self.get(key)?.trim().parse().ok()?;
        Some(Duration::from_millis(ms))
    }

    /// Empty values count as unset.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.get_path("CACHE_PATH")
            .unwrap_or_else(|| env::temp_dir().join("code_debugger").join("cache"))
    }

    pub fn projects_path(&self) -> PathBuf {
        self.get_path("PROJECTS_PATH").unwrap_or_else(|| app_dir().join("projects"))
    }

    pub fn work_dir(&self) -> PathBuf {
        self.get_path("WORK_DIR").unwrap_or_else(env::temp_dir)
    }
}

/// `KEY=value` lines; blank lines and `#` comments are skipped.
fn parse_rc(text: &str) -> impl Iterator<Item = (String, String)> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
}

fn is_config_key(k: &str) -> bool {
    DEFAULTS.iter().any(|(key, _)| *key == k) || k.starts_with("CDBG_") || k.starts_with("OPENAI_")
}

fn defaults() -> HashMap<String, String> {
    DEFAULTS.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn app_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("code_debugger")
}
