// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Renderer configuration, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use vela_core::renderer::{BackendLimits, MAX_COMPUTE_BINDINGS, MAX_TEXTURE_UNITS};

/// Errors raised while loading or validating a [`RendererConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The RON text is malformed or does not match the schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The configuration could not be written out.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] ron::Error),

    /// A value is outside its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Capacities of the renderer's per-frame resources.
///
/// Missing fields take their default. Values above what the backend supports are
/// lowered when the renderer is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Number of views in the view table.
    pub max_views: u16,
    /// Size of the transient arena in bytes.
    pub transient_bytes: usize,
    /// Slots in the transform cache.
    pub matrix_cache_size: u32,
    /// Slots in the scissor cache.
    pub rect_cache_size: u32,
    /// Texture units a draw may bind.
    pub max_texture_units: u8,
    /// Compute stages a dispatch may bind.
    pub max_compute_bindings: u8,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_views: 256,
            transient_bytes: 8 << 20,
            matrix_cache_size: 65_536,
            rect_cache_size: 4_096,
            max_texture_units: MAX_TEXTURE_UNITS as u8,
            max_compute_bindings: MAX_COMPUTE_BINDINGS as u8,
        }
    }
}

impl RendererConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        log::debug!("Loaded renderer configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Checks that every capacity is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_views == 0 {
            return Err(ConfigError::Invalid("max_views must be at least 1".into()));
        }
        if self.matrix_cache_size == 0 || self.rect_cache_size == 0 {
            return Err(ConfigError::Invalid(
                "cache sizes must be at least 1".into(),
            ));
        }
        if usize::from(self.max_texture_units) > MAX_TEXTURE_UNITS {
            return Err(ConfigError::Invalid(format!(
                "max_texture_units {} exceeds {}",
                self.max_texture_units, MAX_TEXTURE_UNITS
            )));
        }
        if usize::from(self.max_compute_bindings) > MAX_COMPUTE_BINDINGS {
            return Err(ConfigError::Invalid(format!(
                "max_compute_bindings {} exceeds {}",
                self.max_compute_bindings, MAX_COMPUTE_BINDINGS
            )));
        }
        Ok(())
    }

    /// Lowers every capacity to what `limits` allows.
    #[must_use]
    pub fn clamped_to(&self, limits: &BackendLimits) -> Self {
        let clamped = Self {
            max_views: self.max_views.min(limits.max_views),
            transient_bytes: self.transient_bytes.min(limits.transient_bytes),
            matrix_cache_size: self.matrix_cache_size.min(limits.max_matrix_cache),
            rect_cache_size: self.rect_cache_size.min(limits.max_rect_cache),
            max_texture_units: self.max_texture_units.min(limits.max_texture_units),
            max_compute_bindings: self.max_compute_bindings.min(limits.max_compute_bindings),
        };
        if clamped != *self {
            log::warn!("Renderer configuration clamped to backend limits: {clamped:?}");
        }
        clamped
    }
}
