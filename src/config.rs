use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GroundError, GroundResult};

pub const CONFIG_FILE_NAME: &str = "uiground.toml";

/// Largest side of the dilation element; the morphology mask is bounded.
pub const MAX_DILATE_SIDE: u32 = 511;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

/// Tunables of the edge → dilation → contour pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Side of the square Gaussian kernel. Must be odd.
    #[serde(default = "default_blur_kernel")]
    pub blur_kernel: u32,
    /// Gaussian sigma; `0.0` derives it from the kernel size.
    #[serde(default)]
    pub blur_sigma: f32,
    #[serde(default = "default_canny_low")]
    pub canny_low: f32,
    #[serde(default = "default_canny_high")]
    pub canny_high: f32,
    /// Structuring element width (horizontal reach).
    #[serde(default = "default_dilate_width")]
    pub dilate_width: u32,
    #[serde(default = "default_dilate_height")]
    pub dilate_height: u32,
    /// Regions narrower or shorter than this (px) are noise.
    #[serde(default = "default_min_side")]
    pub min_side: u32,
    /// Regions covering more than this fraction of the image are background frames.
    #[serde(default = "default_max_area_ratio")]
    pub max_area_ratio: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_kernel: default_blur_kernel(),
            blur_sigma: 0.0,
            canny_low: default_canny_low(),
            canny_high: default_canny_high(),
            dilate_width: default_dilate_width(),
            dilate_height: default_dilate_height(),
            min_side: default_min_side(),
            max_area_ratio: default_max_area_ratio(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> GroundResult<()> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(GroundError::Config(format!(
                "blur_kernel must be odd and positive, got {}",
                self.blur_kernel
            )));
        }
        if self.blur_sigma < 0.0 {
            return Err(GroundError::Config("blur_sigma must be >= 0".into()));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(GroundError::Config(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            )));
        }
        if self.dilate_width == 0 || self.dilate_height == 0 {
            return Err(GroundError::Config("dilation element must be non-empty".into()));
        }
        if self.dilate_width > MAX_DILATE_SIDE || self.dilate_height > MAX_DILATE_SIDE {
            return Err(GroundError::Config(format!(
                "dilation element must be at most {MAX_DILATE_SIDE}px per side, got {}x{}",
                self.dilate_width, self.dilate_height
            )));
        }
        if !(self.max_area_ratio > 0.0 && self.max_area_ratio <= 1.0) {
            return Err(GroundError::Config(format!(
                "max_area_ratio must be in (0, 1], got {}",
                self.max_area_ratio
            )));
        }
        Ok(())
    }
}

fn default_blur_kernel() -> u32 {
    5
}

fn default_canny_low() -> f32 {
    50.0
}

fn default_canny_high() -> f32 {
    150.0
}

fn default_dilate_width() -> u32 {
    20
}

fn default_dilate_height() -> u32 {
    3
}

fn default_min_side() -> u32 {
    15
}

fn default_max_area_ratio() -> f64 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Any coordinate above this marks the tuple as pixel-scale.
    #[serde(default = "default_pixel_threshold")]
    pub pixel_threshold: f64,
    /// Decimal digits kept in the canonical output box.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pixel_threshold: default_pixel_threshold(),
            precision: default_precision(),
        }
    }
}

fn default_pixel_threshold() -> f64 {
    1.1
}

fn default_precision() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_box_colour")]
    pub box_colour: [u8; 3],
    #[serde(default = "default_label_colour")]
    pub label_colour: [u8; 3],
    #[serde(default = "default_box_thickness")]
    pub box_thickness: u32,
    /// Images wider than this get thicker boxes and 2× labels.
    #[serde(default = "default_hires_width")]
    pub hires_width: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            box_colour: default_box_colour(),
            label_colour: default_label_colour(),
            box_thickness: default_box_thickness(),
            hires_width: default_hires_width(),
        }
    }
}

fn default_box_colour() -> [u8; 3] {
    [0, 255, 0]
}

fn default_label_colour() -> [u8; 3] {
    [255, 0, 0]
}

fn default_box_thickness() -> u32 {
    2
}

fn default_hires_width() -> u32 {
    1600
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
        }
    }
}

fn default_grid_size() -> u32 {
    50
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Dataset file backing the mock predictor.
    #[serde(default)]
    pub dataset: Option<PathBuf>,
}

fn resolve_config_path() -> GroundResult<Option<PathBuf>> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(Some(candidate));
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(Some(candidate));
    }

    Ok(None)
}

/// Load the config from the default locations, falling back to built-in defaults.
pub fn load_config() -> GroundResult<AppConfig> {
    match resolve_config_path()? {
        Some(path) => load_config_from(&path),
        None => {
            tracing::info!("no {CONFIG_FILE_NAME} found; using defaults");
            Ok(AppConfig::default())
        }
    }
}

pub fn load_config_from(path: &Path) -> GroundResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.detector.validate()?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> GroundResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
