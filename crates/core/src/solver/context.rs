//! Compute device acquisition
//!
//! Opening a device has two distinct failure modes: no adapter at all
//! (normal on headless CI machines) and an adapter that refuses to create a
//! device (usually a driver problem). They are kept apart so the solver
//! factory can fall back quietly for the first and loudly for the second,
//! or abort when the GPU was explicitly requested.

/// Outcome of opening a compute device
#[derive(Debug)]
pub enum GpuInitResult {
    /// Device and queue are ready
    #[cfg(feature = "gpu")]
    Success(GpuContext),
    /// No GPU adapter found
    NoGpuFound,
    /// GPU found but initialization failed
    InitFailed {
        /// Name of the adapter that failed
        adapter_name: String,
        /// Error message
        error: String,
    },
}

// Device code only exists with the `gpu` feature
#[cfg(feature = "gpu")]
mod gpu_impl {
    use super::GpuInitResult;
    use tracing::{debug, info};

    /// Open device, its queue and the adapter it came from
    #[derive(Debug)]
    pub struct GpuContext {
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_info: wgpu::AdapterInfo,
    }

    impl GpuContext {
        /// Open the highest-performance adapter with its full limits
        ///
        /// Never panics; every failure is reported through the returned variant.
        #[allow(clippy::new_ret_no_self)]
        pub fn new() -> GpuInitResult {
            info!("Opening compute device");

            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = if let Some(a) =
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })) {
                debug!("Found GPU adapter: {}", a.get_info().name);
                a
            } else {
                debug!("No GPU adapter found");
                return GpuInitResult::NoGpuFound;
            };

            let adapter_info = adapter.get_info();
            let adapter_name = adapter_info.name.clone();

            // Ask for the adapter's own limits so large grids fit in one binding
            match pollster::block_on(adapter.request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WaveSim GPU"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )) {
                Ok((device, queue)) => {
                    info!(
                        "Compute device ready: {} ({:?}, {:?})",
                        adapter_name, adapter_info.backend, adapter_info.device_type
                    );
                    GpuInitResult::Success(Self {
                        device,
                        queue,
                        adapter_info,
                    })
                }
                Err(e) => {
                    debug!("Adapter {} refused device creation: {}", adapter_name, e);
                    GpuInitResult::InitFailed {
                        adapter_name,
                        error: e.to_string(),
                    }
                }
            }
        }

        /// Adapter name for logs and run reports
        #[must_use]
        pub fn adapter_name(&self) -> &str {
            &self.adapter_info.name
        }

        /// Check whether a `width × height` grid fits the device limits
        ///
        /// Every field must fit in a single buffer and a single storage
        /// binding, and the dispatch must not exceed the workgroup count limit.
        #[must_use]
        pub fn can_allocate(&self, width: u32, height: u32, workgroup_size: u32) -> bool {
            let cells = u64::from(width) * u64::from(height);
            let field_bytes = cells.saturating_mul(std::mem::size_of::<f32>() as u64);

            let limits = self.device.limits();
            let max_workgroups = limits.max_compute_workgroups_per_dimension;

            field_bytes <= u64::from(limits.max_storage_buffer_binding_size)
                && field_bytes <= limits.max_buffer_size
                && width.div_ceil(workgroup_size) <= max_workgroups
                && height.div_ceil(workgroup_size) <= max_workgroups
        }

        /// Hand the device and queue to a solver
        #[must_use]
        pub fn into_parts(self) -> (wgpu::Device, wgpu::Queue, wgpu::AdapterInfo) {
            (self.device, self.queue, self.adapter_info)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_open_reports_a_reason() {
            // Which variant comes back depends on the machine
            match GpuContext::new() {
                GpuInitResult::Success(ctx) => {
                    let (device, _queue, _info) = ctx.into_parts();
                    assert!(device.limits().max_storage_buffer_binding_size > 0);
                }
                GpuInitResult::NoGpuFound => {}
                GpuInitResult::InitFailed {
                    adapter_name,
                    error,
                } => {
                    assert!(!adapter_name.is_empty() || !error.is_empty());
                }
            }
        }

        #[test]
        fn test_can_allocate() {
            if let GpuInitResult::Success(ctx) = GpuContext::new() {
                assert!(ctx.can_allocate(512, 512, 16));
                // Far beyond any single storage binding
                assert!(!ctx.can_allocate(u32::MAX, u32::MAX, 16));
            }
        }
    }
}

#[cfg(feature = "gpu")]
pub use gpu_impl::GpuContext;
