//! cpal-backed microphone input.
//!
//! Opens the configured input device at its native format, converts samples
//! to `f32` and down-mixes every frame to mono before it reaches the tap.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};

use super::{stderr, CaptureError, InputBackend, OpenStream, SampleTap};

/// Opens input streams on the system audio host.
#[derive(Debug, Clone)]
pub struct CpalBackend {
    /// "default", a numeric index from `micpulse list-devices`, or a device name
    device_spec: String,
}

impl CpalBackend {
    pub fn new(device_spec: impl Into<String>) -> Self {
        Self {
            device_spec: device_spec.into(),
        }
    }
}

impl InputBackend for CpalBackend {
    fn open(&mut self, tap: SampleTap) -> Result<OpenStream, CaptureError> {
        let device = stderr::silenced(|| {
            let host = cpal::default_host();
            find_input_device(&host, &self.device_spec)
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let device_config = device
            .default_input_config()
            .map_err(|e| classify("Failed to query input configuration", e))?;
        let sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels() as usize;
        let sample_format = device_config.sample_format();

        tracing::debug!(
            "Input configuration for '{}': {}Hz, {} channels, {:?}",
            device_name,
            sample_rate,
            channels,
            sample_format
        );

        let stream_config: cpal::StreamConfig = device_config.into();
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, channels, tap)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, channels, tap)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, channels, tap)?,
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "Unsupported sample format {other:?} on '{device_name}'"
                )))
            }
        };

        if let Err(e) = stream.play() {
            drop(stream);
            return Err(classify("Failed to start input stream", e));
        }

        Ok(OpenStream {
            device_name,
            sample_rate,
            guard: Box::new(stream),
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    tap: SampleTap,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                tap.push_interleaved(data, channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| classify("Failed to build input stream", e))
}

/// Maps a backend error to a capture error kind.
///
/// cpal has no dedicated permission error, so platform messages about denied
/// access are recognised by their text.
fn classify(context: &str, err: impl std::fmt::Display) -> CaptureError {
    let message = format!("{context}: {err}");
    let lowered = message.to_lowercase();
    let denied = ["permission", "denied", "not authorized", "not permitted", "access"]
        .iter()
        .any(|needle| lowered.contains(needle));

    if denied {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::DeviceUnavailable(message)
    }
}

/// Resolves "default", a numeric index, or an exact device name.
fn find_input_device(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, CaptureError> {
    if device_spec == "default" {
        return host.default_input_device().ok_or_else(|| {
            CaptureError::DeviceUnavailable("No audio input device available".to_string())
        });
    }

    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| classify("Failed to enumerate devices", e))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            CaptureError::DeviceUnavailable(format!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().map(|n| n == device_spec).unwrap_or(false))
        .ok_or_else(|| {
            CaptureError::DeviceUnavailable(format!(
                "Audio input device '{device_spec}' not found. Use 'micpulse list-devices' to see available devices."
            ))
        })
}

/// One row of `micpulse list-devices`.
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    /// `(sample_rate, channels)`, absent when the device cannot be queried
    pub config: Option<(u32, u16)>,
}

/// Enumerates input devices on the default host.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn list_input_devices() -> anyhow::Result<Vec<InputDeviceInfo>> {
    stderr::silenced(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices: Vec<InputDeviceInfo> = host
            .input_devices()
            .map_err(|e| anyhow::anyhow!("Failed to enumerate audio devices: {e}"))?
            .enumerate()
            .filter_map(|(index, device)| {
                // Indices match find_input_device, so unnamed devices keep their slot.
                let name = device.name().ok()?;
                Some(InputDeviceInfo {
                    index,
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    config: device
                        .default_input_config()
                        .ok()
                        .map(|c| (c.sample_rate().0, c.channels())),
                    name,
                })
            })
            .collect();

        Ok(devices)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_messages() {
        let err = classify("Failed to build input stream", "Access denied by the system");
        assert!(matches!(err, CaptureError::PermissionDenied(_)));
    }

    #[test]
    fn test_classify_device_messages() {
        let err = classify("Failed to build input stream", "The requested device is no longer available");
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
        assert!(err.to_string().contains("no longer available"));
    }
}
