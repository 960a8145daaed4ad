//! Minimal GPU device/queue helper.

use std::sync::OnceLock;

use wgpu::{Device, Instance, Queue};

use crate::error::EngineError;

/// Minimal GPU context shared by the engine and its tests.
pub struct GpuContext {
    /// Instance used to create adapters
    pub instance: Instance,
    /// Logical device
    pub device: Device,
    /// Submission queue
    pub queue: Queue,
}

impl GpuContext {
    /// Create a new GPU context using a default instance and a
    /// high-performance adapter. Missing adapters and device-request
    /// failures are fatal at startup.
    pub async fn new() -> Result<Self, EngineError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(EngineError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vivaria-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;
        Ok(Self { instance, device, queue })
    }
}

/// Global persistent GPU context to avoid per-test device creation overhead.
static GPU_CTX: OnceLock<Option<GpuContext>> = OnceLock::new();

/// Get a reference to a persistent `GpuContext`, creating it on first use.
/// Returns `None` when no adapter is available so GPU tests can skip.
pub fn persistent() -> Option<&'static GpuContext> {
    GPU_CTX
        .get_or_init(|| pollster::block_on(GpuContext::new()).ok())
        .as_ref()
}
