//! Configuration: a dotted-key store layered over the YAML file, and the
//! typed [`Settings`] view a run reads once at start.
//!
//! ```text
//! lookup("browser.headless")
//!   1. env BROWSER_HEADLESS  (coerced: bool, float, int, list, string)
//!   2. BROWSER_HEADLESS in ./.env (process env wins over the file)
//!   3. value set/merged in-process (CLI overrides)
//!   4. config/config.yaml
//!   5. built-in default (Settings)
//! ```

use crate::browser::{BrowserConfig, BrowserKind};
use crate::logging::{parse_retention, LogConfig, LogFormat, LogRotation};
use crate::result::{ShopError, ShopResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the YAML file
pub const DEFAULT_CONFIG_FILE: &str = "config/config.yaml";

/// Dotenv file read next to the working directory
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default site under test
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

/// Environment variable consulted for a dotted key
#[must_use]
pub fn env_key(key: &str) -> String {
    key.to_uppercase().replace('.', "_")
}

/// Interpret a raw environment string: `true`/`false`, then a float when it
/// contains `.`, then an integer, then a comma list, else the string itself.
#[must_use]
pub fn coerce(raw: &str) -> Value {
    let lower = raw.to_lowercase();
    if lower == "true" || lower == "false" {
        return Value::Bool(lower == "true");
    }
    if raw.contains('.') {
        if let Ok(f) = raw.trim().parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    } else if let Ok(i) = raw.trim().parse::<i64>() {
        return Value::Number(i.into());
    }
    if raw.contains(',') {
        return Value::Array(
            raw.split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        );
    }
    Value::String(raw.to_string())
}

/// Where environment lookups go
#[derive(Debug, Clone, Default)]
enum EnvSource {
    #[default]
    Process,
    Fixed(BTreeMap<String, String>),
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// `KEY=value` pairs of a dotenv file; a missing file is empty
fn read_dotenv(path: &Path) -> ShopResult<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let unreadable =
        |e: dotenvy::Error| ShopError::config(format!("cannot read {}: {e}", path.display()));
    let mut vars = BTreeMap::new();
    for item in dotenvy::from_path_iter(path).map_err(unreadable)? {
        let (key, value) = item.map_err(unreadable)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Dotted-key configuration store
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    tree: Value,
    env: EnvSource,
    dotenv: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Load a YAML file. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShopError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        let mut store = Self::from_yaml_str(&text)?.with_dotenv_file(DEFAULT_ENV_FILE)?;
        store.path = Some(path.to_path_buf());
        crate::logging::data_operation("Loaded configuration", Some(&path.display().to_string()));
        Ok(store)
    }

    /// Parse YAML text; an empty document is an empty tree
    pub fn from_yaml_str(text: &str) -> ShopResult<Self> {
        let tree: Value = if text.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_yaml_ng::from_str(text)?
        };
        let tree = match tree {
            Value::Null => Value::Object(Map::new()),
            obj @ Value::Object(_) => obj,
            other => {
                return Err(ShopError::config(format!(
                    "config root must be a mapping, found {other}"
                )))
            }
        };
        Ok(Self {
            path: None,
            tree,
            env: EnvSource::Process,
            dotenv: BTreeMap::new(),
        })
    }

    /// Layer a dotenv file under the environment. A missing file is
    /// ignored; a malformed one is an error.
    pub fn with_dotenv_file(mut self, path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();
        self.dotenv = read_dotenv(path)?;
        if !self.dotenv.is_empty() {
            crate::logging::data_operation("Loaded environment file", Some(&path.display().to_string()));
        }
        Ok(self)
    }

    /// Resolve environment overrides from a fixed map instead of the process
    #[must_use]
    pub fn with_env(mut self, vars: BTreeMap<String, String>) -> Self {
        self.env = EnvSource::Fixed(vars);
        self
    }

    /// File the store was loaded from
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whole tree, without environment overrides
    #[must_use]
    pub const fn all(&self) -> &Value {
        &self.tree
    }

    /// Value for a dotted key: environment first, then the dotenv file,
    /// then the tree
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let name = env_key(key);
        if let Some(raw) = self.env.get(&name).or_else(|| self.dotenv.get(&name).cloned()) {
            return Some(coerce(&raw));
        }
        key.split('.')
            .try_fold(&self.tree, |node, part| node.get(part))
            .cloned()
    }

    /// Typed value for a dotted key, `default` when absent or ill-typed
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => match serde_json::from_value(value) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(target: "shopcheck::config", key, error = %e, "ignoring ill-typed value");
                    default
                }
            },
        }
    }

    /// Set a dotted key, creating intermediate mappings
    pub fn set(&mut self, key: &str, value: impl Serialize) -> ShopResult<()> {
        let value = serde_json::to_value(value)?;
        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(ShopError::config("empty config key"));
        };
        let mut node = &mut self.tree;
        for part in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return Err(ShopError::config(format!("cannot descend into {key}")));
            };
            node = map
                .entry((*part).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            map.insert((*last).to_string(), value);
        }
        Ok(())
    }

    /// Deep-merge a mapping over the tree
    pub fn merge(&mut self, overlay: Value) {
        merge_values(&mut self.tree, overlay);
    }

    /// Write the tree as YAML, to `path` or back to the file it came from
    pub fn save(&self, path: Option<&Path>) -> ShopResult<PathBuf> {
        let target = path
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&target, serde_yaml_ng::to_string(&self.tree)?)?;
        Ok(target)
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// =============================================================================
// TYPED SETTINGS
// =============================================================================

/// Test-data file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFiles {
    /// Users template and generated users
    pub users_file: PathBuf,
    /// Products template
    pub products_file: PathBuf,
    /// Scenario sheets
    pub scenarios_file: PathBuf,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("data/users.json"),
            products_file: PathBuf::from("data/products.json"),
            scenarios_file: PathBuf::from("data/test_data.json"),
        }
    }
}

impl DataFiles {
    /// Directory holding the data files
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.users_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Effective settings of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Site origin
    pub base_url: String,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Ceiling for element waits
    pub explicit_wait: Duration,
    /// Logging settings
    pub logging: LogConfig,
    /// Artifact root
    pub reports_dir: PathBuf,
    /// Test-data files
    pub data: DataFiles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserConfig::default(),
            explicit_wait: Duration::from_secs(15),
            logging: LogConfig::default(),
            reports_dir: PathBuf::from("reports"),
            data: DataFiles::default(),
        }
    }
}

impl Settings {
    /// Load the YAML file and build settings from it
    pub fn load(path: impl AsRef<Path>) -> ShopResult<Self> {
        Self::from_store(&ConfigStore::load(path)?)
    }

    /// Typed view of a store, with defaults for anything absent
    pub fn from_store(store: &ConfigStore) -> ShopResult<Self> {
        let defaults = Self::default();

        let kind = match store.get("browser.default") {
            Some(Value::String(name)) => name.parse::<BrowserKind>()?,
            Some(other) => {
                return Err(ShopError::config(format!(
                    "browser.default must be a name, found {other}"
                )))
            }
            None => defaults.browser.kind,
        };
        let (window_width, window_height) = match store.get("browser.window_size") {
            Some(value) => parse_window_size(&value)?,
            None => (defaults.browser.window_width, defaults.browser.window_height),
        };
        let args = match store.get("browser.chrome_options") {
            Some(Value::Array(items)) => items.iter().map(scalar_string).collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s],
            _ => Vec::new(),
        };

        let browser = BrowserConfig {
            kind,
            headless: store.get_or("browser.headless", defaults.browser.headless),
            window_width,
            window_height,
            executable: store.get_or::<Option<PathBuf>>("browser.executable", None),
            args,
            sandbox: store.get_or("browser.sandbox", true),
            implicit_wait: seconds(store, "browser.implicit_wait", defaults.browser.implicit_wait),
            page_load_timeout: seconds(
                store,
                "browser.page_load_timeout",
                defaults.browser.page_load_timeout,
            ),
        };

        let logging = LogConfig {
            level: store.get_or("logging.level", defaults.logging.level.clone()),
            file: match store.get("logging.file") {
                Some(Value::Bool(false)) => None,
                Some(Value::String(s)) if s.is_empty() => None,
                Some(Value::String(s)) => Some(PathBuf::from(s)),
                _ => defaults.logging.file.clone(),
            },
            format: store.get_or("logging.format", LogFormat::Text),
            console: store.get_or("logging.console", true),
            rotation: match store.get("logging.rotation") {
                Some(Value::String(s)) => s.parse()?,
                Some(Value::Number(n)) => match n.as_u64() {
                    Some(bytes) if bytes > 0 => LogRotation::Size(bytes),
                    _ => return Err(ShopError::config(format!("logging.rotation: bad size {n}"))),
                },
                Some(other) => {
                    return Err(ShopError::config(format!(
                        "logging.rotation must be a size or period, found {other}"
                    )))
                }
                None => defaults.logging.rotation,
            },
            retention: match store.get("logging.retention") {
                Some(Value::String(s)) => parse_retention(&s)?,
                Some(Value::Number(n)) => parse_retention(&n.to_string())?,
                Some(other) => {
                    return Err(ShopError::config(format!(
                        "logging.retention must be a period, found {other}"
                    )))
                }
                None => defaults.logging.retention,
            },
        };

        let base_url: String = store.get_or("app.base_url", defaults.base_url.clone());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ShopError::config(format!(
                "app.base_url must be an http(s) URL, found {base_url}"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            browser,
            explicit_wait: seconds(store, "browser.explicit_wait", defaults.explicit_wait),
            logging,
            reports_dir: store.get_or("reports.dir", defaults.reports_dir),
            data: DataFiles {
                users_file: store.get_or("test_data.users_file", defaults.data.users_file),
                products_file: store.get_or("test_data.products_file", defaults.data.products_file),
                scenarios_file: store
                    .get_or("test_data.scenarios_file", defaults.data.scenarios_file),
            },
        })
    }

    /// `reports/screenshots`
    #[must_use]
    pub fn screenshots_dir(&self) -> PathBuf {
        self.reports_dir.join("screenshots")
    }

    /// `reports/page_sources`
    #[must_use]
    pub fn page_sources_dir(&self) -> PathBuf {
        self.reports_dir.join("page_sources")
    }

    /// `reports/logs`
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.reports_dir.join("logs")
    }
}

fn seconds(store: &ConfigStore, key: &str, default: Duration) -> Duration {
    let secs: f64 = store.get_or(key, default.as_secs_f64());
    if secs.is_finite() && secs >= 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        tracing::warn!(target: "shopcheck::config", key, secs, "ignoring negative duration");
        default
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `"1920,1080"`, `"1920x1080"` or `[1920, 1080]`
fn parse_window_size(value: &Value) -> ShopResult<(u32, u32)> {
    let parts: Vec<String> = match value {
        Value::String(s) => s
            .split(|c| c == ',' || c == 'x')
            .map(|p| p.trim().to_string())
            .collect(),
        Value::Array(items) => items.iter().map(scalar_string).collect(),
        other => {
            return Err(ShopError::config(format!(
                "browser.window_size must be \"W,H\", found {other}"
            )))
        }
    };
    match parts.as_slice() {
        [w, h] => {
            let parse = |s: &str| {
                s.parse::<u32>().map_err(|_| {
                    ShopError::config(format!("browser.window_size has a bad dimension: {s}"))
                })
            };
            Ok((parse(w)?, parse(h)?))
        }
        _ => Err(ShopError::config(format!(
            "browser.window_size must have two dimensions, found {value}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const YAML: &str = r#"
app:
  base_url: "https://automationexercise.com/"
browser:
  default: chrome
  headless: false
  implicit_wait: 10
  explicit_wait: 15
  page_load_timeout: 30
  window_size: "1920,1080"
  chrome_options:
    - "--no-sandbox"
    - "--disable-dev-shm-usage"
logging:
  level: INFO
  file: reports/logs/automation.log
"#;

    fn store(env: &[(&str, &str)]) -> ConfigStore {
        ConfigStore::from_yaml_str(YAML).unwrap().with_env(
            env.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    mod coerce_tests {
        use super::*;

        #[test]
        fn test_bool() {
            assert_eq!(coerce("TRUE"), json!(true));
            assert_eq!(coerce("false"), json!(false));
        }

        #[test]
        fn test_numbers() {
            assert_eq!(coerce("10"), json!(10));
            assert_eq!(coerce("2.5"), json!(2.5));
        }

        #[test]
        fn test_list() {
            assert_eq!(coerce("a, b ,c"), json!(["a", "b", "c"]));
        }

        #[test]
        fn test_dotted_non_number_is_string() {
            assert_eq!(
                coerce("https://example.com"),
                json!("https://example.com")
            );
        }

        #[test]
        fn test_env_key() {
            assert_eq!(env_key("browser.implicit_wait"), "BROWSER_IMPLICIT_WAIT");
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_get_nested() {
            let s = store(&[]);
            assert_eq!(s.get("browser.default"), Some(json!("chrome")));
            assert_eq!(s.get("browser.missing"), None);
            assert_eq!(s.get_or("browser.explicit_wait", 0u64), 15);
        }

        #[test]
        fn test_env_overrides_file() {
            let s = store(&[("BROWSER_HEADLESS", "true"), ("BROWSER_IMPLICIT_WAIT", "3")]);
            assert!(s.get_or("browser.headless", false));
            assert_eq!(s.get_or("browser.implicit_wait", 0u64), 3);
        }

        #[test]
        fn test_dotenv_overrides_file() {
            let dir = tempfile::tempdir().unwrap();
            let dotenv = dir.path().join(".env");
            std::fs::write(
                &dotenv,
                "# local overrides\nBROWSER_HEADLESS=true\nAPP_BASE_URL=\"http://localhost:8080\"\n",
            )
            .unwrap();
            let s = store(&[]).with_dotenv_file(&dotenv).unwrap();
            assert!(s.get_or("browser.headless", false));
            assert_eq!(s.get("app.base_url"), Some(json!("http://localhost:8080")));
            assert_eq!(s.get_or("browser.implicit_wait", 0u64), 10);
        }

        #[test]
        fn test_process_env_beats_dotenv() {
            let dir = tempfile::tempdir().unwrap();
            let dotenv = dir.path().join(".env");
            std::fs::write(&dotenv, "BROWSER_IMPLICIT_WAIT=7\n").unwrap();
            let s = store(&[("BROWSER_IMPLICIT_WAIT", "3")])
                .with_dotenv_file(&dotenv)
                .unwrap();
            assert_eq!(s.get_or("browser.implicit_wait", 0u64), 3);
        }

        #[test]
        fn test_missing_dotenv_is_ignored() {
            let dir = tempfile::tempdir().unwrap();
            let s = store(&[]).with_dotenv_file(dir.path().join(".env")).unwrap();
            assert_eq!(s.get("browser.default"), Some(json!("chrome")));
        }

        #[test]
        fn test_ill_typed_falls_back() {
            let s = store(&[("BROWSER_EXPLICIT_WAIT", "soon")]);
            assert_eq!(s.get_or("browser.explicit_wait", 15u64), 15);
        }

        #[test]
        fn test_set_creates_path() {
            let mut s = store(&[]);
            s.set("reports.dir", "out").unwrap();
            s.set("browser.headless", true).unwrap();
            assert_eq!(s.get("reports.dir"), Some(json!("out")));
            assert_eq!(s.get("browser.headless"), Some(json!(true)));
            assert_eq!(s.get("browser.default"), Some(json!("chrome")));
        }

        #[test]
        fn test_merge_is_deep() {
            let mut s = store(&[]);
            s.merge(json!({"browser": {"headless": true}, "extra": 1}));
            assert_eq!(s.get("browser.headless"), Some(json!(true)));
            assert_eq!(s.get("browser.implicit_wait"), Some(json!(10)));
            assert_eq!(s.get("extra"), Some(json!(1)));
        }

        #[test]
        fn test_missing_file_is_error() {
            let err = ConfigStore::load("/nonexistent/config.yaml").unwrap_err();
            assert!(matches!(err, ShopError::Config { .. }));
        }

        #[test]
        fn test_non_mapping_root_rejected() {
            assert!(ConfigStore::from_yaml_str("- a\n- b\n").is_err());
        }

        #[test]
        fn test_save_and_reload() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("config.yaml");
            let mut s = store(&[]);
            s.set("app.base_url", "https://shop.test").unwrap();
            let written = s.save(Some(&path)).unwrap();
            assert_eq!(written, path);
            let reloaded = ConfigStore::load(&path).unwrap().with_env(BTreeMap::new());
            assert_eq!(reloaded.get("app.base_url"), Some(json!("https://shop.test")));
            assert_eq!(reloaded.path(), Some(path.as_path()));
        }
    }

    mod settings_tests {
        use super::*;

        #[test]
        fn test_defaults_without_file_values() {
            let s = ConfigStore::from_yaml_str("").unwrap().with_env(BTreeMap::new());
            let settings = Settings::from_store(&s).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.base_url, "https://automationexercise.com");
            assert_eq!(settings.explicit_wait, Duration::from_secs(15));
            assert_eq!(settings.browser.implicit_wait, Duration::from_secs(10));
            assert_eq!(settings.browser.page_load_timeout, Duration::from_secs(30));
            assert_eq!(settings.data.users_file, PathBuf::from("data/users.json"));
        }

        #[test]
        fn test_from_yaml() {
            let settings = Settings::from_store(&store(&[])).unwrap();
            assert_eq!(settings.base_url, "https://automationexercise.com");
            assert_eq!(settings.browser.kind, BrowserKind::Chrome);
            assert_eq!(
                (settings.browser.window_width, settings.browser.window_height),
                (1920, 1080)
            );
            assert_eq!(settings.browser.args.len(), 2);
            assert!(settings.browser.sandbox_disabled());
        }

        #[test]
        fn test_env_window_size_list() {
            let settings =
                Settings::from_store(&store(&[("BROWSER_WINDOW_SIZE", "1280,720")])).unwrap();
            assert_eq!(settings.browser.window_width, 1280);
            assert_eq!(settings.browser.window_height, 720);
        }

        #[test]
        fn test_bad_window_size() {
            assert!(Settings::from_store(&store(&[("BROWSER_WINDOW_SIZE", "wide")])).is_err());
        }

        #[test]
        fn test_unknown_browser_rejected() {
            let err = Settings::from_store(&store(&[("BROWSER_DEFAULT", "netscape")])).unwrap_err();
            assert!(matches!(err, ShopError::UnsupportedBrowser { .. }));
        }

        #[test]
        fn test_bad_base_url_rejected() {
            assert!(Settings::from_store(&store(&[("APP_BASE_URL", "ftp://shop")])).is_err());
        }

        #[test]
        fn test_fractional_wait() {
            let settings =
                Settings::from_store(&store(&[("BROWSER_EXPLICIT_WAIT", "1.5")])).unwrap();
            assert_eq!(settings.explicit_wait, Duration::from_millis(1500));
        }

        #[test]
        fn test_log_rotation_and_retention() {
            let settings = Settings::from_store(&store(&[
                ("LOGGING_ROTATION", "daily"),
                ("LOGGING_RETENTION", "2 weeks"),
            ]))
            .unwrap();
            assert_eq!(settings.logging.rotation, LogRotation::Daily);
            assert_eq!(settings.logging.retention, Duration::from_secs(14 * 86_400));

            let settings = Settings::from_store(&store(&[("LOGGING_RETENTION", "7")])).unwrap();
            assert_eq!(settings.logging.retention, Duration::from_secs(7 * 86_400));
            assert_eq!(settings.logging.rotation, LogRotation::default());
        }

        #[test]
        fn test_bad_log_rotation_rejected() {
            let err = Settings::from_store(&store(&[("LOGGING_ROTATION", "sometimes")])).unwrap_err();
            assert!(matches!(err, ShopError::Config { .. }));
        }

        #[test]
        fn test_artifact_dirs() {
            let settings = Settings::default();
            assert_eq!(settings.screenshots_dir(), PathBuf::from("reports/screenshots"));
            assert_eq!(settings.page_sources_dir(), PathBuf::from("reports/page_sources"));
            assert_eq!(settings.data.data_dir(), PathBuf::from("data"));
        }
    }

    proptest! {
        #[test]
        fn prop_integers_coerce_to_numbers(n in -100_000i64..100_000) {
            prop_assert_eq!(coerce(&n.to_string()), json!(n));
        }

        #[test]
        fn prop_plain_words_stay_strings(word in "[a-z]{1,12}") {
            prop_assume!(word != "true" && word != "false");
            prop_assert_eq!(coerce(&word), Value::String(word.clone()));
        }
    }
}
