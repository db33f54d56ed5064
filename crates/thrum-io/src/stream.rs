//! Audio device enumeration (§6 "Driver interface", §13 `devices` command).
//!
//! Device discovery is kept separate from stream construction
//! ([`crate::cpal_backend`]): listing devices needs no open stream, and the
//! CLI's `devices` command only ever calls into this module.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Host-reported device name.
    pub name: String,
    /// Whether the device supports capture.
    pub is_input: bool,
    /// Whether the device supports playback.
    pub is_output: bool,
    /// The device's default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Stream configuration for the simple cases `thrum-cli` drives directly
/// (as opposed to [`crate::backend::BackendStreamConfig`], which the
/// pluggable-backend trait uses).
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Requested buffer size in frames.
    pub buffer_size: u32,
    /// Device name filter for input, or `None` for the system default.
    pub input_device: Option<String>,
    /// Device name filter for output, or `None` for the system default.
    pub output_device: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            input_device: None,
            output_device: None,
        }
    }
}

/// A cpal device's name, wrapped in this crate's [`Result`].
pub(crate) fn device_name(device: &Device) -> Result<String> {
    device.name().map_err(|e| Error::Stream(e.to_string()))
}

/// List all available audio devices, both input and output.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device.name() {
                let sample_rate = device
                    .default_input_config()
                    .map(|c| c.sample_rate().0)
                    .unwrap_or(48000);
                let is_output = device.default_output_config().is_ok();

                devices.push(AudioDevice {
                    name,
                    is_input: true,
                    is_output,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device.name() {
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }
                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate().0)
                    .unwrap_or(48000);

                devices.push(AudioDevice {
                    name,
                    is_input: false,
                    is_output: true,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    Ok(devices)
}

/// The system default input and output device, if any.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();

    let input = host.default_input_device().and_then(|d| {
        d.name().ok().map(|name| AudioDevice {
            name,
            is_input: true,
            is_output: false,
            default_sample_rate: d
                .default_input_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(48000),
        })
    });

    let output = host.default_output_device().and_then(|d| {
        d.name().ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d
                .default_output_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(48000),
        })
    });

    Ok((input, output))
}

/// Find an output (or input) device by its position in [`list_devices`]'s
/// ordering, matching what the `devices list` command prints.
pub fn find_device_by_index(index: usize, output: bool) -> Result<AudioDevice> {
    let devices = list_devices()?;
    devices
        .into_iter()
        .filter(|d| if output { d.is_output } else { d.is_input })
        .nth(index)
        .ok_or_else(|| Error::DeviceNotFound(format!("index {index}")))
}

/// Find a device whose name contains `query` (case-insensitive).
pub fn find_device_fuzzy(query: &str, output: bool) -> Result<AudioDevice> {
    let query_lower = query.to_lowercase();
    let devices = list_devices()?;
    devices
        .into_iter()
        .find(|d| {
            (if output { d.is_output } else { d.is_input })
                && d.name.to_lowercase().contains(&query_lower)
        })
        .ok_or_else(|| Error::DeviceNotFound(query.to_string()))
}

pub(crate) fn find_input_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            host.input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .find(|d| {
                    device_name(d)
                        .map(|n| n.to_lowercase().contains(&search_lower))
                        .unwrap_or(false)
                })
                .ok_or_else(|| Error::DeviceNotFound(search.to_string()))
        }
        None => host.default_input_device().ok_or(Error::NoDevice),
    }
}

pub(crate) fn find_output_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            host.output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .find(|d| {
                    device_name(d)
                        .map(|n| n.to_lowercase().contains(&search_lower))
                        .unwrap_or(false)
                })
                .ok_or_else(|| Error::DeviceNotFound(search.to_string()))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}
