//! Runtime settings, read from the environment with fixed defaults.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TEMPLATE: &str = "data/DSC Report-Empty-2512.docx";
pub const DEFAULT_OUTPUT_DIR: &str = "./reports";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Template used when a generate request does not name one.
    pub template_path: PathBuf,
    /// Base directory for relative output paths.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `DSC_REPORT_*` variables. Blank or unparseable
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match value("DSC_REPORT_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid DSC_REPORT_PORT '{}'", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            host: value("DSC_REPORT_HOST").unwrap_or(defaults.host),
            port,
            template_path: value("DSC_REPORT_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            output_dir: value("DSC_REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Relative output paths are placed under `output_dir`.
    pub fn resolve_output(&self, output_path: &str) -> PathBuf {
        let path = PathBuf::from(output_path);
        if path.is_absolute() {
            path
        } else {
            self.output_dir.join(path)
        }
    }
}
