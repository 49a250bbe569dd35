//! Audio source enumeration

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio source information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSource {
    /// Identifier accepted by `AudioCaptureHandle::start`
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether this is the host's default input
    pub is_default: bool,
}

/// Audio source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to enumerate devices: {0}")]
    EnumerationError(String),
}

/// List available input sources, default first
pub fn list_sources() -> Result<Vec<AudioSource>, SourceError> {
    let host = cpal::default_host();

    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let mut sources = Vec::new();
    if let Some(name) = &default_name {
        sources.push(AudioSource {
            id: "default".to_string(),
            name: format!("Default Input ({})", name),
            is_default: true,
        });
    }

    let devices = host
        .input_devices()
        .map_err(|e| SourceError::EnumerationError(e.to_string()))?;
    for device in devices {
        match device.name() {
            Ok(name) => sources.push(AudioSource {
                id: format!("input:{}", name),
                name: format!("Input: {}", name),
                is_default: false,
            }),
            Err(e) => log::warn!("Skipping input device with unreadable name: {}", e),
        }
    }

    Ok(sources)
}
