//! Installer configuration.
//!
//! [`ToolSpec`] names the managed tool and how its artifacts are located.
//! [`InstallerConfig`] adds the filesystem roots and run policy. Both can be
//! loaded from a TOML file; anything the file omits keeps its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform::ResolvedArch;
use crate::version::RequestedVersion;
use crate::{Error, Result};

/// Default tool identifier used in cache keys.
pub const DEFAULT_TOOL_NAME: &str = "python-embedded";

/// Default human name used in messages.
pub const DEFAULT_DISPLAY_NAME: &str = "Python";

/// Default download URL template.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://www.python.org/ftp/python/{version}/python-{version}-embed-{arch}.zip";

/// Environment variable naming the runner's tool cache.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

/// Environment variable naming the runner's scratch directory.
pub const TEMP_DIR_ENV: &str = "RUNNER_TEMP";

/// The managed tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSpec {
    /// Identifier used in every cache key.
    pub name: String,
    /// Name used in operator-facing messages.
    pub display_name: String,
    /// Download URL template with `{version}` and `{arch}` placeholders.
    pub url_template: String,
}

impl Default for ToolSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOOL_NAME.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl ToolSpec {
    /// Expand the URL template for a version and architecture.
    #[must_use]
    pub fn download_url(&self, version: &RequestedVersion, arch: ResolvedArch) -> String {
        self.url_template
            .replace("{version}", version.as_str())
            .replace("{arch}", arch.as_str())
    }

    /// Check the tool definition is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty name or a template missing
    /// either placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("tool name must not be empty"));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(Error::configuration(format!(
                "tool name '{}' must be a single path component",
                self.name
            )));
        }
        for placeholder in ["{version}", "{arch}"] {
            if !self.url_template.contains(placeholder) {
                return Err(Error::configuration_with_help(
                    format!("url_template is missing the {placeholder} placeholder"),
                    format!("The default template is {DEFAULT_URL_TEMPLATE}"),
                ));
            }
        }
        Ok(())
    }
}

/// Full installer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// The managed tool.
    pub tool: ToolSpec,
    /// Root of the versioned tool cache.
    pub cache_root: PathBuf,
    /// Scratch directory for downloads and extraction.
    pub temp_root: PathBuf,
    /// Report pipeline failures that carry no message instead of silently
    /// ending the run.
    pub report_opaque_failures: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tool: ToolSpec::default(),
            cache_root: default_cache_root(),
            temp_root: default_temp_root(),
            report_opaque_failures: false,
        }
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    tool: Option<ToolSpec>,
    cache_root: Option<PathBuf>,
    temp_root: Option<PathBuf>,
    report_opaque_failures: Option<bool>,
}

impl InstallerConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML configuration file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// describes an invalid tool.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "read config"))?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Configuration { message, help } => Error::Configuration {
                message: format!("{}: {message}", path.display()),
                help,
            },
            other => other,
        })
    }

    /// Parse TOML configuration text on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed TOML or an invalid tool.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::configuration(e.to_string()))?;

        let mut config = Self::default();
        if let Some(tool) = file.tool {
            config.tool = tool;
        }
        if let Some(root) = file.cache_root {
            config.cache_root = root;
        }
        if let Some(root) = file.temp_root {
            config.temp_root = root;
        }
        if let Some(report) = file.report_opaque_failures {
            config.report_opaque_failures = report;
        }
        config.tool.validate()?;
        Ok(config)
    }

    /// Set the tool.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = tool;
        self
    }

    /// Set the cache root.
    #[must_use]
    pub fn with_cache_root(mut self, path: PathBuf) -> Self {
        self.cache_root = path;
        self
    }

    /// Set the scratch directory.
    #[must_use]
    pub fn with_temp_root(mut self, path: PathBuf) -> Self {
        self.temp_root = path;
        self
    }

    /// Set whether message-less pipeline failures are reported.
    #[must_use]
    pub fn with_report_opaque_failures(mut self, report: bool) -> Self {
        self.report_opaque_failures = report;
        self
    }
}

/// Default tool cache root: `$RUNNER_TOOL_CACHE`, else `<cache dir>/pyembed/tools`.
#[must_use]
pub fn default_cache_root() -> PathBuf {
    non_empty_env(TOOL_CACHE_ENV).unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("pyembed")
            .join("tools")
    })
}

/// Default scratch directory: `$RUNNER_TEMP`, else `<temp dir>/pyembed`.
#[must_use]
pub fn default_temp_root() -> PathBuf {
    non_empty_env(TEMP_DIR_ENV).unwrap_or_else(|| std::env::temp_dir().join("pyembed"))
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
