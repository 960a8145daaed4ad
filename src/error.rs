//! Engine error types.
//!
//! Allocation, kernel-load and binding errors are fatal at startup: the
//! engine refuses to come up partially constructed. Dispatch errors are
//! fatal only for the affected tick's commit; the previously settled state
//! is preserved and a retry on the next tick is safe.

use thiserror::Error;

/// Errors surfaced by engine construction and the per-frame path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No compatible GPU adapter was found on this system.
    #[error("no suitable GPU adapter")]
    NoAdapter,
    /// The adapter refused to create a logical device.
    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    /// Field or display buffer creation was rejected by the device.
    #[error("allocation of {label} rejected: {reason}")]
    Allocation {
        /// Which allocation was rejected.
        label: String,
        /// Device-reported reason.
        reason: String,
    },
    /// A named kernel artifact failed to compile or validate at startup.
    #[error("kernel `{name}` failed to load: {reason}")]
    KernelLoad {
        /// Stable kernel role name.
        name: String,
        /// Compiler/validator message.
        reason: String,
    },
    /// A stage declared an inconsistent binding set.
    #[error("stage `{stage}` has invalid bindings: {reason}")]
    InvalidBindings {
        /// Stable kernel role name.
        stage: String,
        /// What the validator rejected.
        reason: String,
    },
    /// A submission was rejected by the device.
    #[error("dispatch failed at tick {tick}: {reason}")]
    Dispatch {
        /// Tick whose commit was dropped.
        tick: u64,
        /// Device-reported reason.
        reason: String,
    },
}
