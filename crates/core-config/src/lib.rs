//! Configuration loading and parsing.
//!
//! Parses `oxsay.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [wrap]
//! column = 60        # unset: wrap at the viewport width
//! limit = 8
//! exceed = 5
//! hyphen = "-"
//! tab_width = 8
//!
//! [colors]
//! balloon = "\u001b[34m"
//! link = "\u001b[34m"
//!
//! [output]
//! attribute_mode = "color"   # or "plain"
//! truncate_from = "bottom"   # or "top"
//! info_level = 0             # 0 strips template metadata, 1/2 keep it
//! ```
//!
//! Every field is optional. A missing file yields defaults; a file that does
//! not parse yields defaults plus a `warn` on target `config`. Unknown fields
//! are ignored so older binaries accept newer files.
//!
//! The wrap column is clamped to the viewport width at application time
//! (`Config::apply_context`); the raw parsed value is retained so a different
//! viewport can re-clamp.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

const CONFIG_FILE: &str = "oxsay.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportContext {
    /// Terminal columns; 0 when unknown.
    pub columns: u16,
    /// Terminal rows; 0 when unknown.
    pub rows: u16,
}

impl ViewportContext {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    pub fn width(&self) -> Option<usize> {
        (self.columns > 0).then_some(self.columns as usize)
    }

    pub fn height(&self) -> Option<usize> {
        (self.rows > 0).then_some(self.rows as usize)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WrapConfig {
    #[serde(default)]
    pub column: Option<u16>,
    #[serde(default = "WrapConfig::default_limit")]
    pub limit: usize,
    #[serde(default = "WrapConfig::default_exceed")]
    pub exceed: usize,
    #[serde(default = "WrapConfig::default_hyphen")]
    pub hyphen: String,
    #[serde(default = "WrapConfig::default_tab_width")]
    pub tab_width: usize,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            column: None,
            limit: Self::default_limit(),
            exceed: Self::default_exceed(),
            hyphen: Self::default_hyphen(),
            tab_width: Self::default_tab_width(),
        }
    }
}

impl WrapConfig {
    const fn default_limit() -> usize {
        8
    }
    const fn default_exceed() -> usize {
        5
    }
    fn default_hyphen() -> String {
        "-".to_string()
    }
    const fn default_tab_width() -> usize {
        8
    }
}

/// Raw SGR sequences; empty means no color.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ColorConfig {
    #[serde(default)]
    pub balloon: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_attribute_mode")]
    pub attribute_mode: String,
    #[serde(default = "OutputConfig::default_truncate_from")]
    pub truncate_from: String,
    #[serde(default)]
    pub info_level: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            attribute_mode: Self::default_attribute_mode(),
            truncate_from: Self::default_truncate_from(),
            info_level: 0,
        }
    }
}

impl OutputConfig {
    fn default_attribute_mode() -> String {
        "color".to_string()
    }
    fn default_truncate_from() -> String {
        "bottom".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub wrap: WrapConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,              // file contents as read
    pub source: Option<PathBuf>,          // file the values came from
    pub file: ConfigFile,                 // parsed (or default) data
    pub effective_wrap_column: Option<u16>, // clamped to the viewport
}

/// Config path: `./oxsay.toml` when present, else the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxsay").join(CONFIG_FILE);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading config {}", path.display()));
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                bytes = content.len(),
                "config_loaded"
            );
            let effective_wrap_column = file.wrap.column;
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
                effective_wrap_column,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp the configured wrap column to the viewport width. Returns the
    /// effective column (`None` means wrap at the viewport width).
    pub fn apply_context(&mut self, ctx: ViewportContext) -> Option<u16> {
        let raw = self.file.wrap.column;
        let effective = match (raw, ctx.columns) {
            (Some(column), width) if width > 0 && column > width => {
                info!(
                    target: "config",
                    raw = column,
                    clamped = width,
                    viewport_columns = ctx.columns,
                    viewport_rows = ctx.rows,
                    "wrap_column_clamped"
                );
                Some(width)
            }
            (column, _) => column,
        };
        self.effective_wrap_column = effective;
        effective
    }
}
