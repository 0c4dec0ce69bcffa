//! GPU-based wave solver implementation
//!
//! This module provides a GPU implementation of the `WaveSolver` trait using
//! a wgpu compute pipeline and storage buffers. This backend is only available
//! when the `gpu` feature is enabled.
//!
//! # Buffers
//!
//! Three wave-height buffers live in fixed slots for the whole run. Because
//! the role rotation has period 3, one bind group per phase is built up front
//! and a step only selects the matching one. Nothing is copied between
//! slots; the host reads a slot back through a staging buffer on request.
//!
//! # Errors
//!
//! Shader compilation, pipeline creation and buffer allocation run inside
//! wgpu error scopes, so a broken kernel or an oversized grid surfaces as a
//! `SimError` instead of the device's uncaptured-error panic.

use super::context::GpuContext;
use super::kernel::{KERNEL_ENTRY_POINT, WORKGROUP_SIZE};
use super::rotation::{RoleRing, Roles};
use super::WaveSolver;
use crate::error::{Result, SimError};
use crate::grid::GridState;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;

/// Update kernel parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct WaveParams {
    width: u32,
    height: u32,
    dt_dx2: f32,
    _padding: f32,
}

/// GPU-based wave solver using wgpu compute shaders
pub struct GpuWaveSolver {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,

    width: u32,
    height: u32,

    // Wave-height slots; slot 0 starts as current, 1 as previous, 2 as next
    slots: [wgpu::Buffer; 3],
    // Kept alive for the bind groups
    _elevation: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    params_dt_dx2: Option<f32>,

    pipeline: wgpu::ComputePipeline,
    // One bind group per rotation phase
    bind_groups: [wgpu::BindGroup; 3],
}

impl GpuWaveSolver {
    /// Create a new GPU wave solver
    ///
    /// # Arguments
    ///
    /// * `context` - Initialized GPU context (consumed)
    /// * `state` - Initial elevation and wave fields
    /// * `kernel` - WGSL source of the update kernel
    ///
    /// # Errors
    ///
    /// - `SimError::Allocation` if the grid exceeds device limits or buffer
    ///   creation fails
    /// - `SimError::KernelBuild` if the kernel does not compile or does not
    ///   match the expected bindings
    pub fn new(context: GpuContext, state: &GridState, kernel: &str) -> Result<Self> {
        let (width, height) = state.dimensions();
        let width = u32::try_from(width).map_err(|_| SimError::invalid("grid width exceeds u32"))?;
        let height =
            u32::try_from(height).map_err(|_| SimError::invalid("grid height exceeds u32"))?;

        if !context.can_allocate(width, height, WORKGROUP_SIZE) {
            return Err(SimError::Allocation {
                what: "wave buffers",
                message: format!(
                    "{width}x{height} grid exceeds the limits of {}",
                    context.adapter_name()
                ),
            });
        }

        let (device, queue, adapter_info) = context.into_parts();
        let buffer_size = u64::from(width) * u64::from(height) * std::mem::size_of::<f32>() as u64;
        debug!(
            "Allocating GPU buffers: {}x{} cells, {} bytes per field",
            width, height, buffer_size
        );

        let slot_usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC;

        // Create storage buffers
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let slot_0 = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Slot 0"),
            contents: bytemuck::cast_slice(state.current.as_slice()),
            usage: slot_usage,
        });
        let slot_1 = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Slot 1"),
            contents: bytemuck::cast_slice(state.previous.as_slice()),
            usage: slot_usage,
        });
        let slot_2 = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Slot 2"),
            contents: bytemuck::cast_slice(state.next.as_slice()),
            usage: slot_usage,
        });
        let elevation = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Elevation"),
            contents: bytemuck::cast_slice(state.elevation.as_slice()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wave Params"),
            contents: bytemuck::bytes_of(&WaveParams {
                width,
                height,
                dt_dx2: 0.0,
                _padding: 0.0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(SimError::Allocation {
                what: "wave buffers",
                message: e.to_string(),
            });
        }

        // Compile the kernel and build the pipeline
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wave Update Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(kernel)),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Wave Bind Group Layout"),
            entries: &[
                // current (binding 0)
                storage_entry(0, true),
                // previous (binding 1)
                storage_entry(1, true),
                // next (binding 2)
                storage_entry(2, false),
                // elevation (binding 3)
                storage_entry(3, true),
                // params (binding 4)
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Wave Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Wave Update Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: KERNEL_ENTRY_POINT,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(SimError::KernelBuild(e.to_string()));
        }

        let slots = [slot_0, slot_1, slot_2];
        let bind_groups = [0, 1, 2].map(|phase| {
            let roles = RoleRing::roles_for_phase(phase);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Wave Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: slots[roles.current].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: slots[roles.previous].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: slots[roles.next].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: elevation.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        info!(
            "GPU wave solver ready on {} ({}x{} cells)",
            adapter_info.name, width, height
        );

        Ok(Self {
            device,
            queue,
            adapter_name: adapter_info.name,
            width,
            height,
            slots,
            _elevation: elevation,
            params_buffer,
            params_dt_dx2: None,
            pipeline,
            bind_groups,
        })
    }

    /// Calculate workgroup count for dispatch
    fn workgroup_count(&self) -> (u32, u32) {
        (
            self.width.div_ceil(WORKGROUP_SIZE),
            self.height.div_ceil(WORKGROUP_SIZE),
        )
    }

    fn buffer_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * std::mem::size_of::<f32>() as u64
    }
}

impl WaveSolver for GpuWaveSolver {
    fn dispatch(&mut self, step: usize, roles: Roles, dt_dx2: f32) -> Result<()> {
        if roles != RoleRing::roles_for_phase(roles.phase()) {
            return Err(SimError::Dispatch {
                step,
                message: format!("role assignment {roles:?} is not a ring phase"),
            });
        }

        // The coefficient is fixed for a run; only upload it when it changes
        if self.params_dt_dx2 != Some(dt_dx2) {
            let params = WaveParams {
                width: self.width,
                height: self.height,
                dt_dx2,
                _padding: 0.0,
            };
            self.queue
                .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
            self.params_dt_dx2 = Some(dt_dx2);
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Wave Update Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Wave Update Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_groups[roles.phase()], &[]);

            let (wg_x, wg_y) = self.workgroup_count();
            compute_pass.dispatch_workgroups(wg_x, wg_y, 1);
        }

        // Submissions on one queue execute in order, which is the step barrier
        self.queue.submit(std::iter::once(encoder.finish()));

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(SimError::Dispatch {
                step,
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn synchronize(&self) -> Result<()> {
        // wgpu 22 reports no poll errors; failures surface at dispatch or readback
        if !self.device.poll(wgpu::Maintain::Wait).is_queue_empty() {
            warn!("{}: queue not empty after blocking poll", self.adapter_name);
        }
        Ok(())
    }

    fn read_slot(&self, slot: usize) -> Result<Cow<'_, [f32]>> {
        let src_buffer = self
            .slots
            .get(slot)
            .ok_or_else(|| SimError::Readback(format!("no buffer slot {slot}")))?;
        let buffer_size = self.buffer_size();

        // Per-read staging buffer keeps `&self` reads independent
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wave Readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Wave Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(src_buffer, 0, &staging_buffer, 0, buffer_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        // Map and read
        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

        let _ = self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| SimError::Readback(e.to_string()))?
            .map_err(|e| SimError::Readback(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging_buffer.unmap();

        Ok(Cow::Owned(result))
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    fn backend_name(&self) -> &str {
        &self.adapter_name
    }

    fn is_gpu_accelerated(&self) -> bool {
        true
    }
}
