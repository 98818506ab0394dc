use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KaliMcpError, Result};

/// Groups of tools that can be switched on or off as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    /// dpkg-backed package enumeration
    Packages,
    /// Burp Suite launch, scan and control actions
    Burp,
    /// Arbitrary security tool invocation and category listing
    Security,
    /// URL/base64 encoding helpers and random strings
    Encoding,
    /// Raw HTTP request helpers
    Http,
}

impl Toolset {
    pub fn all() -> Vec<Toolset> {
        vec![
            Toolset::Packages,
            Toolset::Burp,
            Toolset::Security,
            Toolset::Encoding,
            Toolset::Http,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub toolsets: Vec<Toolset>,
    pub shell: ShellConfig,
    pub packages: PackagesConfig,
    pub burp: BurpConfig,
    pub http: HttpConfig,
    pub encoding: EncodingConfig,
    pub transport: TransportConfig,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell used to run interpolated command lines (`<program> -c <line>`)
    pub program: String,
    /// Upper bound for awaited commands; `None` waits forever
    pub timeout_ms: Option<u64>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "/bin/bash".to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Command producing a dpkg-style listing (`ii  <name>  <version> ...`)
    pub query_command: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            query_command: "dpkg -l".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurpConfig {
    pub executable: String,
    pub community_executable: String,
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub allow_config_edit: bool,
}

impl Default for BurpConfig {
    fn default() -> Self {
        Self {
            executable: "burpsuite".to_string(),
            community_executable: "burpsuite-community".to_string(),
            enabled: true,
            host: "localhost".to_string(),
            port: 9876,
            allow_config_edit: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub max_body_chars: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_body_chars: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Longest string `generate_random_string` will produce
    pub max_random_length: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            max_random_length: 65536,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub max_message_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            log_file: None,
            toolsets: Toolset::all(),
            shell: ShellConfig::default(),
            packages: PackagesConfig::default(),
            burp: BurpConfig::default(),
            http: HttpConfig::default(),
            encoding: EncodingConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// Nothing is logged here because logging is configured from the result;
    /// the caller reports the returned source once the logger is up.
    pub fn load(config_path: Option<&PathBuf>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = config_path {
            let config = Self::load_from_file(path)?;
            return Ok((config, ConfigSource::File(path.clone())));
        }

        Self::load_first_existing(&Self::default_locations())
    }

    /// `~/.config/<project>/<project>.yml`, then `./<project>.yml`
    fn default_locations() -> Vec<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        let file_name = format!("{}.yml", project_name);

        let mut locations = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join(project_name).join(&file_name));
        }
        locations.push(PathBuf::from(file_name));
        locations
    }

    /// Load the first candidate that exists; defaults only when none does
    ///
    /// A file that exists but does not load is an error. Falling through to
    /// the defaults would enable every toolset.
    fn load_first_existing(candidates: &[PathBuf]) -> Result<(Self, ConfigSource)> {
        for path in candidates {
            if path.exists() {
                let config = Self::load_from_file(path)?;
                return Ok((config, ConfigSource::File(path.clone())));
            }
        }
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Parse a YAML document into a validated config
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            KaliMcpError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;

        Self::from_yaml(&content)
            .map_err(|e| KaliMcpError::Config(format!("Invalid config {}: {}", path.as_ref().display(), e)))
    }

    fn validate(&self) -> Result<()> {
        if self.shell.program.trim().is_empty() {
            return Err(KaliMcpError::Config("shell.program must not be empty".into()));
        }
        if self.toolsets.is_empty() {
            return Err(KaliMcpError::Config("at least one toolset must be enabled".into()));
        }
        if self.encoding.max_random_length == 0 {
            return Err(KaliMcpError::Config("encoding.max_random_length must be positive".into()));
        }
        if self.transport.max_message_bytes == 0 {
            return Err(KaliMcpError::Config("transport.max_message_bytes must be positive".into()));
        }
        Ok(())
    }

    pub fn has_toolset(&self, toolset: Toolset) -> bool {
        self.toolsets.contains(&toolset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.shell.program, "/bin/bash");
        assert!(config.shell.timeout_ms.is_none());
        assert_eq!(config.packages.query_command, "dpkg -l");
        assert_eq!(config.burp.executable, "burpsuite");
        assert_eq!(config.burp.community_executable, "burpsuite-community");
        assert_eq!(config.burp.port, 9876);
        assert_eq!(config.http.max_body_chars, 5000);
        assert_eq!(config.toolsets.len(), 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("burp:\n  port: 8080\n").unwrap();
        assert_eq!(config.burp.port, 8080);
        assert_eq!(config.burp.host, "localhost");
        assert_eq!(config.shell.program, "/bin/bash");
    }

    #[test]
    fn test_toolsets_from_yaml() {
        let config = Config::from_yaml("toolsets: [packages]\n").unwrap();
        assert!(config.has_toolset(Toolset::Packages));
        assert!(!config.has_toolset(Toolset::Burp));
    }

    #[test]
    fn test_unknown_toolset_rejected() {
        let result = Config::from_yaml("toolsets: [metasploit]\n");
        assert!(matches!(result, Err(KaliMcpError::Yaml(_))));
    }

    #[test]
    fn test_empty_toolsets_rejected() {
        let result = Config::from_yaml("toolsets: []\n");
        assert!(matches!(result, Err(KaliMcpError::Config(_))));
    }

    #[test]
    fn test_empty_shell_rejected() {
        let result = Config::from_yaml("shell:\n  program: \"\"\n");
        assert!(matches!(result, Err(KaliMcpError::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug\nshell:\n  program: sh\n  timeout_ms: 5000").unwrap();

        let path = file.path().to_path_buf();
        let (config, source) = Config::load(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::File(path.clone()));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.shell.program, "sh");
        assert_eq!(config.shell.timeout_ms, Some(5000));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/kali-mcp.yml");
        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(KaliMcpError::Config(_))));
    }

    #[test]
    fn test_broken_default_location_is_an_error() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("kali-mcp.yml");
        let fallback = dir.path().join("fallback.yml");
        fs::write(&primary, "toolsets: [packages, metasploit]\n").unwrap();
        fs::write(&fallback, "toolsets: [packages]\n").unwrap();

        let err = Config::load_first_existing(&[primary.clone(), fallback]).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, KaliMcpError::Config(_)));
        assert!(message.contains(&primary.display().to_string()));
        assert!(message.contains("metasploit"));
    }

    #[test]
    fn test_first_existing_location_wins() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        let present = dir.path().join("present.yml");
        fs::write(&present, "toolsets: [encoding]\n").unwrap();

        let (config, source) = Config::load_first_existing(&[missing, present.clone()]).unwrap();
        assert_eq!(source, ConfigSource::File(present));
        assert_eq!(config.toolsets, vec![Toolset::Encoding]);
    }

    #[test]
    fn test_no_location_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let (config, source) = Config::load_first_existing(&[dir.path().join("none.yml")]).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(source.to_string(), "built-in defaults");
        assert_eq!(config.toolsets.len(), 5);
    }

    #[test]
    fn test_zero_random_length_rejected() {
        let result = Config::from_yaml("encoding:\n  max_random_length: 0\n");
        assert!(matches!(result, Err(KaliMcpError::Config(_))));
    }
}
