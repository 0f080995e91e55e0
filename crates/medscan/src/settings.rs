use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::cli::{CliArgs, CliSources, OcrBackendChoice};
use medscan_extract::{ExtractorConfig, SelectorConfig};
use medscan_ocr::RecognitionSettings;
use medscan_preprocess::PreprocessConfig;
use medscan_sources::AggregatorConfig;
use medscan_types::CandidateLimits;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    ocr_backend: Option<String>,
    combined_text: Option<bool>,
    pretty: Option<bool>,
    dump_dir: Option<String>,
    source_timeout_ms: Option<u64>,
    source_priority: Option<Vec<String>>,
    candidate_min_len: Option<usize>,
    candidate_max_len: Option<usize>,
    confidence_weight: Option<f32>,
    length_weight: Option<f32>,
    char_whitelist: Option<String>,
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub ocr_backend: OcrBackendChoice,
    pub combined_text: bool,
    pub pretty: bool,
    pub output: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
    pub aggregator: AggregatorConfig,
    pub selector: SelectorConfig,
    pub extractor: ExtractorConfig,
    pub recognition: RecognitionSettings,
    pub preprocess: PreprocessConfig,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            ocr_backend: OcrBackendChoice::Auto,
            combined_text: false,
            pretty: false,
            output: None,
            dump_dir: None,
            aggregator: AggregatorConfig::default(),
            selector: SelectorConfig::default(),
            extractor: ExtractorConfig::default(),
            recognition: RecognitionSettings::default(),
            preprocess: PreprocessConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        return read_config(path).map(|(config, path)| (config, Some(path)));
    }

    if let Some(project_path) = project_config_path() {
        if project_path.exists() {
            return read_config(project_path).map(|(config, path)| (config, Some(path)));
        }
    }

    let Some(default_path) = default_config_path() else {
        return Ok((FileConfig::default(), None));
    };
    if !default_path.exists() {
        return Ok((FileConfig::default(), None));
    }
    read_config(default_path).map(|(config, path)| (config, Some(path)))
}

fn read_config(path: PathBuf) -> Result<(FileConfig, PathBuf), ConfigError> {
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok((config, path))
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));

    let mut ocr_backend = cli.ocr_backend;
    if !sources.ocr_backend_from_cli {
        if let Some(value) = normalize_string(file.ocr_backend) {
            ocr_backend = OcrBackendChoice::from_str(&value, true).map_err(|_| {
                ConfigError::InvalidValue {
                    path: config_path.clone(),
                    field: "ocr_backend",
                    value,
                }
            })?;
        }
    }

    let mut combined_text = cli.combined_text;
    if !sources.combined_text_from_cli {
        if let Some(value) = file.combined_text {
            combined_text = value;
        }
    }

    let mut pretty = cli.pretty;
    if !sources.pretty_from_cli {
        if let Some(value) = file.pretty {
            pretty = value;
        }
    }

    let dump_dir = match cli.dump_dir.clone() {
        Some(dir) => Some(expand_pathbuf(dir)),
        None => normalize_string(file.dump_dir)
            .and_then(|value| resolve_path_from_config(value, config_dir.as_deref())),
    };

    let mut timeout_ms = cli.source_timeout_ms;
    if !sources.source_timeout_from_cli {
        if let Some(value) = file.source_timeout_ms {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    path: config_path.clone(),
                    field: "source_timeout_ms",
                    value: value.to_string(),
                });
            }
            timeout_ms = value;
        }
    }

    let mut aggregator = AggregatorConfig {
        per_source_timeout: Duration::from_millis(timeout_ms),
        ..AggregatorConfig::default()
    };
    if !cli.source_priority.is_empty() {
        aggregator.priority = cli.source_priority.clone();
    } else if let Some(priority) = file.source_priority {
        let priority: Vec<String> = priority
            .into_iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();
        if !priority.is_empty() {
            aggregator.priority = priority;
        }
    }

    let mut limits = CandidateLimits::default();
    if let Some(value) = file.candidate_min_len {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                path: config_path.clone(),
                field: "candidate_min_len",
                value: value.to_string(),
            });
        }
        limits.min_len = value;
    }
    if let Some(value) = file.candidate_max_len {
        limits.max_len = value;
    }
    if limits.min_len > limits.max_len {
        return Err(ConfigError::InvalidValue {
            path: config_path,
            field: "candidate_max_len",
            value: limits.max_len.to_string(),
        });
    }

    let mut selector = SelectorConfig::default();
    if let Some(value) = file.confidence_weight {
        selector.confidence_weight = value;
    }
    if let Some(value) = file.length_weight {
        selector.length_weight = value;
    }

    let mut recognition = RecognitionSettings::default();
    if let Some(value) = normalize_string(file.char_whitelist) {
        recognition.char_whitelist = value;
    }

    Ok(EffectiveSettings {
        ocr_backend,
        combined_text,
        pretty,
        output: cli.output.clone(),
        dump_dir,
        aggregator,
        selector,
        extractor: ExtractorConfig { limits },
        recognition,
        preprocess: PreprocessConfig::default(),
    })
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "medscan", "medscan").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir().ok().map(|dir| dir.join("medscan.toml"))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home_path(s),
        None => path,
    }
}

fn resolve_path_from_config(value: String, base: Option<&Path>) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_home_path(trimmed);
    if expanded.is_absolute() || base.is_none() {
        Some(expanded)
    } else {
        Some(base.unwrap().join(expanded))
    }
}

fn expand_home_path(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(stripped) = value.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(value)
}
