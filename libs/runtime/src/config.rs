use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::resolve_home_dir;

/// Directory under the user's home used when `home_dir` is not set.
pub const DEFAULT_HOME_SUBDIR: &str = ".user_search";

/// Environment prefix; `APP__MODULES__USER_SEARCH__API_URL=...` sets
/// `modules.user_search.api_url`.
pub const ENV_PREFIX: &str = "APP__";

/// Process configuration: where logs go, how verbose they are, and one opaque
/// settings object per module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Resolved to an absolute, existing directory on load.
    #[serde(default)]
    pub home_dir: String,
    /// `None` until a file or the environment provides logging sections.
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files, each one becoming `modules.<module>`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    #[serde(default)]
    pub modules: HashMap<String, Value>,
}

/// Section name → settings; "default" covers every crate without its own
/// section.
pub type LoggingConfig = HashMap<String, LogSection>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    /// Empty disables the file sink for this section.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Quiet console, detailed rotating file under `<home_dir>/logs`.
pub fn default_logging_config() -> LoggingConfig {
    let section = LogSection {
        console_level: "warn".into(),
        file: "logs/user_search.log".into(),
        file_level: "debug".into(),
        max_backups: Some(3),
        max_size_mb: Some(100),
    };
    LoggingConfig::from([("default".to_string(), section)])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: Some(default_logging_config()),
            ..Self::empty()
        }
    }
}

impl AppConfig {
    fn empty() -> Self {
        Self {
            home_dir: String::new(),
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        }
    }

    /// Defaults, then the YAML file, then `APP__` environment variables; later
    /// layers win. `home_dir` is normalized and `modules_dir` merged afterwards.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(Self::empty()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        config.resolve_home()?;
        if let Some(dir) = config.modules_dir.clone() {
            for (module, file) in module_files(Path::new(&dir))? {
                let settings: Value = Figment::from(Yaml::file(&file))
                    .extract()
                    .with_context(|| format!("Invalid module config {}", file.display()))?;
                config.modules.insert(module, settings);
            }
        }
        Ok(config)
    }

    /// `load_layered` when a path is given, built-in defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        let Some(path) = config_path else {
            let mut config = Self::default();
            config.resolve_home()?;
            return Ok(config);
        };
        Self::load_layered(path)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to render configuration as YAML")
    }

    pub fn module_config(&self, module_name: &str) -> Option<&Value> {
        self.modules.get(module_name)
    }

    /// Set `modules.<module_name>.<key>`, replacing a non-object module entry.
    pub fn set_module_value(&mut self, module_name: &str, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let entry = self
            .modules
            .entry(module_name.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        match entry {
            Value::Object(settings) => {
                settings.insert(key.to_string(), value);
            }
            other => {
                *other = Value::Object(serde_json::Map::from_iter([(key.to_string(), value)]));
            }
        }
    }

    /// `-v` raises the default console level to debug, `-vv` and above to trace.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }

    fn resolve_home(&mut self) -> Result<()> {
        let home = resolve_home_dir(&self.home_dir, DEFAULT_HOME_SUBDIR)
            .context("Failed to resolve home_dir")?;
        self.home_dir = home.to_string_lossy().into_owned();
        Ok(())
    }
}

/// Command line arguments that influence configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

/// `(module name, path)` for every `*.yaml` / `*.yml` file in `dir`, sorted by
/// path. A missing directory yields nothing.
fn module_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list modules_dir {}", dir.display()))?
    {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if !path.is_file() || !is_yaml {
            continue;
        }
        if let Some(module) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((module.to_owned(), path.clone()));
        }
    }
    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}
