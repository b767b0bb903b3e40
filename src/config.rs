//! Site configuration.
//!
//! Configuration is layered. Each layer is a sparse TOML table merged on top
//! of the previous one, then the result is deserialized and validated:
//!
//! ```text
//! 1. stock defaults        (SiteConfig::default)
//! 2. habitare.toml         (optional, --config to point elsewhere)
//! 3. environment variables (.env is loaded first, if present)
//! ```
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5444
//!
//! [paths]
//! database = "data/habitare.db"
//! uploads = "public/uploads"
//! public_dir = "public"
//!
//! [auth]
//! admin_username = "admin"
//! admin_password = "habitare2024"
//! session_secret = "habitare-secret-key-change-in-production"
//! session_ttl_hours = 24
//!
//! [api]
//! key = "habitare-api-key-2024"
//!
//! [tracking]
//! shop_base_url = "https://loja.habitare.com/produtos"
//! source = "revista-habitare"
//!
//! [brand]
//! name = "Revista Habitare"
//! tagline = "Arquitetura, design e ativações para marcas que pensam como publishers."
//! instagram_url = "https://www.instagram.com"
//! marketplace_url = "/em-desenvolvimento"
//!
//! [colors.light]
//! background = "#f7f3ee"
//! ...
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Key |
//! |----------|-----|
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `DATABASE_PATH` | `paths.database` |
//! | `UPLOAD_DIR` | `paths.uploads` |
//! | `PUBLIC_DIR` | `paths.public_dir` |
//! | `ADMIN_USERNAME` | `auth.admin_username` |
//! | `ADMIN_PASSWORD` | `auth.admin_password` |
//! | `SESSION_SECRET` | `auth.session_secret` |
//! | `API_KEY` | `api.key` |
//! | `SHOP_BASE_URL` | `tracking.shop_base_url` |
//! | `TRACKING_SOURCE` | `tracking.source` |
//! | `INSTAGRAM_URL` | `brand.instagram_url` |
//! | `MARKETPLACE_URL` | `brand.marketplace_url` |
//!
//! Unknown keys in the file are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "habitare.toml";

/// Complete site configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub tracking: TrackingConfig,
    pub brand: BrandConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".into()));
        }
        if self.auth.admin_username.trim().is_empty() {
            return Err(ConfigError::Validation(
                "auth.admin_username must not be empty".into(),
            ));
        }
        if self.auth.session_secret.len() < 16 {
            return Err(ConfigError::Validation(
                "auth.session_secret must be at least 16 bytes".into(),
            ));
        }
        if self.auth.session_ttl_hours == 0 {
            return Err(ConfigError::Validation(
                "auth.session_ttl_hours must be non-zero".into(),
            ));
        }
        if self.api.key.trim().is_empty() {
            return Err(ConfigError::Validation("api.key must not be empty".into()));
        }
        if self.tracking.source.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tracking.source must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Log a warning for every credential still at its stock value.
    pub fn warn_on_stock_secrets(&self) {
        let stock = SiteConfig::default();
        if self.auth.admin_password == stock.auth.admin_password {
            warn!("auth.admin_password is the stock default; set ADMIN_PASSWORD");
        }
        if self.auth.session_secret == stock.auth.session_secret {
            warn!("auth.session_secret is the stock default; set SESSION_SECRET");
        }
        if self.api.key == stock.api.key {
            warn!("api.key is the stock default; set API_KEY");
        }
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5444,
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// SQLite database file. Created on first start.
    pub database: PathBuf,
    /// Where admin uploads are written; served under `/uploads`.
    pub uploads: PathBuf,
    /// Extra static files (icons, images) served from the site root.
    pub public_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("data/habitare.db"),
            uploads: PathBuf::from("public/uploads"),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Admin credential and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    /// Key used to sign session cookies.
    pub session_secret: String,
    /// Session lifetime, refreshed on every authenticated request.
    pub session_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "habitare2024".to_string(),
            session_secret: "habitare-secret-key-change-in-production".to_string(),
            session_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Shared key required by every `/api` endpoint except `/api/doc`.
    pub key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: "habitare-api-key-2024".to_string(),
        }
    }
}

/// Defaults for outbound product links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfig {
    /// Base for pin call-to-action paths that are not absolute URLs.
    pub shop_base_url: String,
    /// Default `utm_source`.
    pub source: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            shop_base_url: "https://loja.habitare.com/produtos".to_string(),
            source: "revista-habitare".to_string(),
        }
    }
}

/// Publication identity shown in page chrome and the web app manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandConfig {
    pub name: String,
    pub short_name: String,
    pub tagline: String,
    pub instagram_url: String,
    pub marketplace_url: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Revista Habitare".to_string(),
            short_name: "Habitare".to_string(),
            tagline: "Arquitetura, design e ativações para marcas que pensam como publishers."
                .to_string(),
            instagram_url: "https://www.instagram.com".to_string(),
            marketplace_url: "/em-desenvolvimento".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Bylines, captions, metadata.
    pub text_muted: String,
    pub border: String,
    /// Pins, links, buttons.
    pub accent: String,
    pub accent_contrast: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f7f3ee".to_string(),
            text: "#1d1a16".to_string(),
            text_muted: "#6f665c".to_string(),
            border: "#e2d9ce".to_string(),
            accent: "#a4582c".to_string(),
            accent_contrast: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#141210".to_string(),
            text: "#f1ebe3".to_string(),
            text_muted: "#a89c8f".to_string(),
            border: "#3a332c".to_string(),
            accent: "#e0915f".to_string(),
            accent_contrast: "#141210".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every override is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Environment variable → dotted config key.
const ENV_KEYS: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATABASE_PATH", "paths.database"),
    ("UPLOAD_DIR", "paths.uploads"),
    ("PUBLIC_DIR", "paths.public_dir"),
    ("ADMIN_USERNAME", "auth.admin_username"),
    ("ADMIN_PASSWORD", "auth.admin_password"),
    ("SESSION_SECRET", "auth.session_secret"),
    ("API_KEY", "api.key"),
    ("SHOP_BASE_URL", "tracking.shop_base_url"),
    ("TRACKING_SOURCE", "tracking.source"),
    ("INSTAGRAM_URL", "brand.instagram_url"),
    ("MARKETPLACE_URL", "brand.marketplace_url"),
];

/// Build an overlay table from environment variables.
///
/// `lookup` is `std::env::var` in production and a map in tests. `PORT`
/// must parse as a port number; everything else is taken as a string.
pub fn env_overlay(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<toml::Value, ConfigError> {
    let mut root = toml::value::Table::new();
    for (var, key) in ENV_KEYS {
        let Some(raw) = lookup(var) else { continue };
        let value = if *key == "server.port" {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("{var} is not a valid port: {raw}")))?;
            toml::Value::Integer(i64::from(port))
        } else {
            toml::Value::String(raw)
        };
        let (section, field) = key.split_once('.').expect("env keys are dotted");
        root.entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()))
            .as_table_mut()
            .expect("sections are tables")
            .insert(field.to_string(), value);
    }
    Ok(toml::Value::Table(root))
}

/// Merge overlays in order onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the full configuration: stock defaults, then `path` (if it exists),
/// then the process environment.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let file = load_raw_config(path)?;
    let env = env_overlay(|var| std::env::var(var).ok())?;
    resolve_config(file.into_iter().chain(Some(env)))
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Habitare Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Environment variables (see the
# comments on each key) override this file; a .env file is read first.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
host = "0.0.0.0"            # HOST
port = 5444                 # PORT

# ---------------------------------------------------------------------------
# Filesystem
# ---------------------------------------------------------------------------
[paths]
database = "data/habitare.db"   # DATABASE_PATH
uploads = "public/uploads"      # UPLOAD_DIR, served under /uploads
public_dir = "public"           # PUBLIC_DIR, icons and other static files

# ---------------------------------------------------------------------------
# Admin back-office
# ---------------------------------------------------------------------------
[auth]
admin_username = "admin"                                  # ADMIN_USERNAME
admin_password = "habitare2024"                           # ADMIN_PASSWORD
session_secret = "habitare-secret-key-change-in-production" # SESSION_SECRET
session_ttl_hours = 24

# ---------------------------------------------------------------------------
# Read API
# ---------------------------------------------------------------------------
[api]
key = "habitare-api-key-2024"   # API_KEY

# ---------------------------------------------------------------------------
# Product links
# ---------------------------------------------------------------------------
[tracking]
shop_base_url = "https://loja.habitare.com/produtos"   # SHOP_BASE_URL
source = "revista-habitare"                            # TRACKING_SOURCE

# ---------------------------------------------------------------------------
# Brand
# ---------------------------------------------------------------------------
[brand]
name = "Revista Habitare"
short_name = "Habitare"
tagline = "Arquitetura, design e ativações para marcas que pensam como publishers."
instagram_url = "https://www.instagram.com"   # INSTAGRAM_URL
marketplace_url = "/em-desenvolvimento"       # MARKETPLACE_URL

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f7f3ee"
text = "#1d1a16"
text_muted = "#6f665c"      # Bylines, captions
border = "#e2d9ce"
accent = "#a4582c"          # Pins, links, buttons
accent_contrast = "#ffffff"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#141210"
text = "#f1ebe3"
text_muted = "#a89c8f"
border = "#3a332c"
accent = "#e0915f"
accent_contrast = "#141210"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
    --color-accent-contrast: {light_accent_contrast};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
        --color-accent-contrast: {dark_accent_contrast};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        light_accent_contrast = colors.light.accent_contrast,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
        dark_accent_contrast = colors.dark.accent_contrast,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_is_valid() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn default_bind_address() {
        assert_eq!(SiteConfig::default().bind_address(), "0.0.0.0:5444");
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config([value]).unwrap();
        let stock = SiteConfig::default();
        assert_eq!(config.server.port, stock.server.port);
        assert_eq!(config.auth.admin_username, stock.auth.admin_username);
        assert_eq!(config.brand.name, stock.brand.name);
        assert_eq!(config.colors.dark.accent, stock.colors.dark.accent);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[brand]
name = "Habitare Sul"

[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.brand.name, "Habitare Sul");
        assert_eq!(config.colors.light.background, "#fafafa");
        // Defaults preserved
        assert_eq!(config.brand.short_name, "Habitare");
        assert_eq!(config.colors.light.text, "#1d1a16");
        assert_eq!(config.server.port, 5444);
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.accent = "#ff0000".to_string();
        colors.dark.accent = "#00ff00".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-accent: #ff0000"));
        assert!(css.contains("--color-accent: #00ff00"));
        assert!(css.contains("prefers-color-scheme: dark"));
    }

    // =========================================================================
    // Layering
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let file = load_raw_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert!(file.is_none());
        let config = resolve_config(file).unwrap();
        assert_eq!(config.api.key, "habitare-api-key-2024");
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[server]
port = 8080

[tracking]
source = "newsletter"
"#,
        )
        .unwrap();

        let config = resolve_config(load_raw_config(&path).unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tracking.source, "newsletter");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn env_overrides_file() {
        let file: toml::Value = toml::from_str("[api]\nkey = \"from-file\"\n").unwrap();
        let env: HashMap<&str, &str> = [("API_KEY", "from-env"), ("PORT", "9000")].into();
        let overlay = env_overlay(|k| env.get(k).map(|v| v.to_string())).unwrap();

        let config = resolve_config([file, overlay]).unwrap();
        assert_eq!(config.api.key, "from-env");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn env_overlay_empty_without_variables() {
        let overlay = env_overlay(no_env).unwrap();
        assert!(overlay.as_table().unwrap().is_empty());
    }

    #[test]
    fn env_overlay_rejects_bad_port() {
        let result = env_overlay(|k| (k == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn env_paths_become_paths() {
        let overlay =
            env_overlay(|k| (k == "DATABASE_PATH").then(|| "/tmp/x.db".to_string())).unwrap();
        let config = resolve_config([overlay]).unwrap();
        assert_eq!(config.paths.database, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[server]\nprot = 1\n").unwrap();
        assert!(matches!(resolve_config([overlay]), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let overlay: toml::Value = toml::from_str("[galleries]\nx = 1\n").unwrap();
        assert!(resolve_config([overlay]).is_err());
    }

    #[test]
    fn short_session_secret_rejected() {
        let overlay: toml::Value = toml::from_str("[auth]\nsession_secret = \"short\"\n").unwrap();
        let err = resolve_config([overlay]).unwrap_err();
        assert!(err.to_string().contains("session_secret"));
    }

    #[test]
    fn empty_api_key_rejected() {
        let overlay: toml::Value = toml::from_str("[api]\nkey = \"  \"\n").unwrap();
        assert!(matches!(
            resolve_config([overlay]),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_port_rejected() {
        let overlay: toml::Value = toml::from_str("[server]\nport = 0\n").unwrap();
        assert!(resolve_config([overlay]).is_err());
    }
}
