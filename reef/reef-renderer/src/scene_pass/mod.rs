//! Scene pass: one forward pass over every draw of the extracted frame with the shared program.
//!
//! Bind groups: 0 = per-frame globals (view, proj, fog), 1 = per-draw uniforms at a dynamic
//! offset (model, diffuseColor, fishColor, useTexture), 2 = objectTexture + sampler.

use std::num::NonZeroU64;

use render_api::{DrawItem, ExtractedFrame};
use wgpu::CommandEncoder;

use crate::shader::{ShaderError, ShaderProgram};
use crate::texture::{GpuTexture, TextureLoader};
use crate::upload::{attribute_bindings, VertexArray};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view: [f32; 16],
    pub proj: [f32; 16],
    pub fog_color: [f32; 4],
    /// x = start, y = end.
    pub fog_range: [f32; 4],
}

impl GlobalsUniform {
    pub fn from_frame(frame: &ExtractedFrame) -> Self {
        let [r, g, b] = frame.fog.color;
        Self {
            view: frame.view,
            proj: frame.proj,
            fog_color: [r, g, b, 1.0],
            fog_range: [frame.fog.start, frame.fog.end, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [f32; 16],
    pub diffuse_color: [f32; 4],
    pub fish_color: [f32; 4],
    pub use_texture: u32,
    pub _pad: [u32; 3],
}

impl DrawUniform {
    /// `textured` is whether a texture actually resolved for this draw.
    pub fn new(item: &DrawItem, textured: bool) -> Self {
        let [dr, dg, db] = item.diffuse_color;
        let [fr, fg, fb] = item.fish_color;
        Self {
            model: item.model,
            diffuse_color: [dr, dg, db, 1.0],
            fish_color: [fr, fg, fb, 1.0],
            use_texture: textured as u32,
            _pad: [0; 3],
        }
    }
}

const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;
const GLOBALS_SIZE: u64 = std::mem::size_of::<GlobalsUniform>() as u64;

/// Per-draw stride in the dynamic uniform buffer.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// One resolved draw: the item plus the device objects its handles refer to.
pub struct SceneDraw<'a> {
    pub item: &'a DrawItem,
    pub vertex_array: &'a VertexArray,
    pub texture: Option<&'a GpuTexture>,
}

pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    globals_buf: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buf: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: u64,
    draw_stride: u64,
}

impl ScenePass {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        textures: &TextureLoader,
    ) -> Result<Self, ShaderError> {
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reef_globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(GLOBALS_SIZE),
                },
                count: None,
            }],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reef_draw_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DRAW_UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reef_scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout, textures.layout()],
            push_constant_ranges: &[],
        });

        let bindings = attribute_bindings(&program.interface);
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = bindings
            .iter()
            .map(|b| {
                [wgpu::VertexAttribute {
                    format: b.attribute.format(),
                    offset: 0,
                    shader_location: b.location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout> = bindings
            .iter()
            .zip(&attributes)
            .map(|(b, attrs)| wgpu::VertexBufferLayout {
                array_stride: b.attribute.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{}_pipeline", program.name)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(program.vertex_entry.as_str()),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(program.fragment_entry.as_str()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Pipeline {
                program: program.name.clone(),
                message: err.to_string(),
            });
        }

        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reef_globals"),
            size: GLOBALS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reef_globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let draw_stride = aligned_stride(
            DRAW_UNIFORM_SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let draw_capacity = 64;
        let (draw_buf, draw_bind_group) = Self::create_draw_buffer(device, &draw_layout, draw_stride, draw_capacity);

        Ok(Self {
            pipeline,
            globals_buf,
            globals_bind_group,
            draw_layout,
            draw_buf,
            draw_bind_group,
            draw_capacity,
            draw_stride,
        })
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reef_draw_uniforms"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reef_draw_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DRAW_UNIFORM_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Clears colour and depth, then draws every drawable entry in order.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        &mut self,
        encoder: &mut CommandEncoder,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        frame: &ExtractedFrame,
        draws: &[SceneDraw<'_>],
        textures: &TextureLoader,
    ) -> Result<(), String> {
        queue.write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&GlobalsUniform::from_frame(frame)));

        let visible: Vec<&SceneDraw<'_>> = draws
            .iter()
            .filter(|d| d.vertex_array.is_drawable() && d.item.vertex_count > 0)
            .collect();
        let needed = visible.len() as u64;
        if needed > self.draw_capacity {
            let capacity = needed.next_power_of_two();
            let (buf, bind_group) = Self::create_draw_buffer(device, &self.draw_layout, self.draw_stride, capacity);
            self.draw_buf = buf;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
            log::debug!("draw uniform buffer grown to {} entries", capacity);
        }
        if !visible.is_empty() {
            let mut staging = vec![0u8; (self.draw_stride * needed) as usize];
            for (i, draw) in visible.iter().enumerate() {
                let uniform = DrawUniform::new(draw.item, draw.texture.is_some());
                let start = i * self.draw_stride as usize;
                staging[start..start + DRAW_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniform));
            }
            queue.write_buffer(&self.draw_buf, 0, &staging);
        }

        let [r, g, b, a] = frame.clear_color;
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("reef_scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_pipeline(&self.pipeline);
        let (w, h) = frame.viewport_size;
        rp.set_viewport(0.0, 0.0, w.max(1) as f32, h.max(1) as f32, 0.0, 1.0);
        rp.set_bind_group(0, &self.globals_bind_group, &[]);
        for (i, draw) in visible.iter().enumerate() {
            let offset = (i as u64 * self.draw_stride) as u32;
            rp.set_bind_group(1, &self.draw_bind_group, &[offset]);
            let texture = draw.texture.unwrap_or(textures.white());
            rp.set_bind_group(2, &texture.bind_group, &[]);
            for binding in draw.vertex_array.bindings() {
                let buffer = draw
                    .vertex_array
                    .buffer(binding.attribute)
                    .ok_or_else(|| format!("{}: missing {:?} buffer", draw.vertex_array.label(), binding.attribute))?;
                rp.set_vertex_buffer(binding.slot, buffer.slice(..));
            }
            let count = draw.item.vertex_count.min(draw.vertex_array.vertex_count());
            rp.draw(0..count, 0..1);
        }
        drop(rp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_api::{DrawSource, Fog, MeshHandle, TextureHandle, IDENTITY_MATRIX};

    #[test]
    fn uniform_layouts_match_the_wgsl_structs() {
        assert_eq!(GLOBALS_SIZE, 160);
        assert_eq!(DRAW_UNIFORM_SIZE, 112);
    }

    #[test]
    fn stride_respects_device_alignment() {
        assert_eq!(aligned_stride(112, 256), 256);
        assert_eq!(aligned_stride(112, 16), 112);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(112, 0), 112);
    }

    #[test]
    fn draw_uniform_from_item() {
        let item = DrawItem {
            source: DrawSource::FishBody(3),
            mesh: MeshHandle(1),
            texture: Some(TextureHandle(2)),
            model: IDENTITY_MATRIX,
            diffuse_color: [0.1, 0.2, 0.3],
            fish_color: [0.5, 0.6, 0.7],
            vertex_count: 12,
        };
        let resolved = DrawUniform::new(&item, true);
        assert_eq!(resolved.diffuse_color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(resolved.fish_color, [0.5, 0.6, 0.7, 1.0]);
        assert_eq!(resolved.use_texture, 1);
        // handle present but texture failed to resolve
        assert_eq!(DrawUniform::new(&item, false).use_texture, 0);
    }

    #[test]
    fn globals_carry_fog() {
        let frame = ExtractedFrame {
            fog: Fog { color: [0.0, 0.2, 0.3], start: 5.0, end: 50.0 },
            ..ExtractedFrame::default()
        };
        let globals = GlobalsUniform::from_frame(&frame);
        assert_eq!(globals.fog_color, [0.0, 0.2, 0.3, 1.0]);
        assert_eq!(globals.fog_range[..2], [5.0, 50.0]);
        assert_eq!(globals.view, IDENTITY_MATRIX);
    }
}
