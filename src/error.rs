//! Error types for plume.
//!
//! Setup failures are the only errors an effect ever reports: `start()`
//! returns `Err` and the host treats the effect as disabled (its `render()`
//! stays a no-op). Numerical degeneracy in the hot path is clamped, never
//! propagated, and there is no retry logic anywhere; a bad frame is drawn
//! and the next frame corrects itself.

use std::fmt;

/// Errors an effect can report from `start()`.
#[derive(Debug)]
pub enum EffectError {
    /// A setting value is unusable (zero capacity, negative lifetime, ...).
    InvalidSetting {
        /// The offending settings key.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// GPU initialization failed (preview host only).
    Gpu(GpuError),
}

impl EffectError {
    /// Shorthand for an invalid-setting error.
    pub fn invalid_setting(key: &'static str, reason: impl Into<String>) -> Self {
        EffectError::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::InvalidSetting { key, reason } => {
                write!(f, "Invalid setting '{}': {}", key, reason)
            }
            EffectError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for EffectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EffectError::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuError> for EffectError {
    fn from(e: GpuError) -> Self {
        EffectError::Gpu(e)
    }
}

/// Errors that can occur while bringing up the preview host's GPU state.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_display() {
        let e = EffectError::invalid_setting("particle_count", "must be at least 1");
        let msg = e.to_string();
        assert!(msg.contains("particle_count"));
        assert!(msg.contains("must be at least 1"));
    }
}
