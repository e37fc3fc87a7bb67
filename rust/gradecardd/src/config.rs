use crate::grading::GradeScale;
use crate::report::{DEFAULT_SUBTITLE, DEFAULT_TITLE};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "GRADECARDD_CONFIG";
pub const LOG_ENV: &str = "GRADECARDD_LOG";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonConfig {
    pub scale: GradeScale,
    pub title: String,
    pub subtitle: String,
    pub export: ExportSettings,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            scale: GradeScale::default(),
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            export: ExportSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub out_dir: PathBuf,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Raster scale over CSS pixels (2.0 = retina capture).
    pub raster_scale: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            raster_scale: 2.0,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        let cfg: DaemonConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.to_string_lossy()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults unless `GRADECARDD_CONFIG` names a file.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Self::load(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let e = &self.export;
        if e.page_width_mm <= 2.0 * e.margin_mm || e.page_height_mm <= 2.0 * e.margin_mm {
            anyhow::bail!("export margin leaves no printable area");
        }
        if e.margin_mm < 0.0 {
            anyhow::bail!("export margin must not be negative");
        }
        if !(e.raster_scale > 0.0 && e.raster_scale <= 8.0) {
            anyhow::bail!("export rasterScale must be in (0, 8]");
        }
        Ok(())
    }
}
