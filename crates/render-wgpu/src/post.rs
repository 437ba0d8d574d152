//! Post-processing: glow, lens distortion and vignette.
//!
//! Pipeline: emissive target → horizontal blur into a half-resolution
//! texture → vertical blur → composite (lens-distorted scene + glow,
//! vignette, gamma) into the swapchain view.

use crate::shaders;
use bytemuck::{Pod, Zeroable};
use wavefield_config::{PostOptions, VignetteOptions};
use wgpu::util::DeviceExt;

/// Format of the offscreen color, emissive and glow targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BlurParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
    radius: i32,
    _pad: [i32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CompositeParams {
    vignette1: [f32; 4],
    vignette2: [f32; 4],
    lens: [f32; 4],
    misc: [f32; 4],
}

/// Vignette shader constants derived from options and the viewport aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteSettings {
    /// Scale x, scale y, centre offset x, centre offset y.
    pub settings1: [f32; 4],
    /// Color rgb, falloff power.
    pub settings2: [f32; 4],
}

impl VignetteSettings {
    pub fn compute(options: &VignetteOptions, aspect: f32) -> Self {
        fn mix(a: f32, b: f32, t: f32) -> f32 {
            a + (b - a) * t
        }
        let scale_y = (options.camera_fov * 0.5).tan();
        let scale_x = scale_y * aspect;
        let mean = (scale_x * scale_y).sqrt();
        let sx = mix(scale_x, mean, options.stretch);
        let sy = mix(scale_y, mean, options.stretch);
        Self {
            settings1: [sx, sy, 0.0, 0.0],
            settings2: [
                options.color[0],
                options.color[1],
                options.color[2],
                -2.0 * options.weight,
            ],
        }
    }

    /// CPU mirror of the shader's multiplier at a viewport point in `[-1, 1]²`.
    pub fn multiplier(&self, x: f32, y: f32) -> [f32; 3] {
        let vx = x * self.settings1[0] + self.settings1[2];
        let vy = y * self.settings1[1] + self.settings1[3];
        let falloff = (vx * vx + vy * vy + 1.0).powf(self.settings2[3]);
        [0, 1, 2].map(|i| self.settings2[i] + (1.0 - self.settings2[i]) * falloff)
    }
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn screen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    source: &str,
    fs_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_screen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// Owns the offscreen scene targets and the glow/composite passes.
pub struct PostProcessStack {
    scene_view: wgpu::TextureView,
    emissive_view: wgpu::TextureView,
    glow_a: wgpu::TextureView,
    glow_b: wgpu::TextureView,

    sampler: wgpu::Sampler,

    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    blur_h_buffer: wgpu::Buffer,
    blur_v_buffer: wgpu::Buffer,
    blur_h_group: wgpu::BindGroup,
    blur_v_group: wgpu::BindGroup,

    composite_pipeline: wgpu::RenderPipeline,
    composite_layout: wgpu::BindGroupLayout,
    composite_buffer: wgpu::Buffer,
    composite_group: wgpu::BindGroup,

    options: PostOptions,
    /// 1.0 for sRGB surfaces (hardware encodes), 1/2.2 otherwise.
    gamma: f32,
    width: u32,
    height: u32,
}

impl PostProcessStack {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        options: &PostOptions,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blur_bind_group_layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bind_group_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
            ],
        });

        let blur_pipeline = screen_pipeline(
            device,
            "blur_pipeline",
            &blur_layout,
            &shaders::blur_shader(),
            "fs_blur",
            HDR_FORMAT,
        );
        let composite_pipeline = screen_pipeline(
            device,
            "composite_pipeline",
            &composite_layout,
            &shaders::composite_shader(),
            "fs_composite",
            surface_format,
        );

        let blur_h_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blur_h_params"),
            contents: bytemuck::bytes_of(&BlurParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let blur_v_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blur_v_params"),
            contents: bytemuck::bytes_of(&BlurParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let composite_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("composite_params"),
            contents: bytemuck::bytes_of(&CompositeParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let targets = Targets::new(device, width, height);
        let groups = BindGroups::new(
            device,
            &targets,
            &sampler,
            &blur_layout,
            &composite_layout,
            [&blur_h_buffer, &blur_v_buffer, &composite_buffer],
        );

        Self {
            scene_view: targets.scene,
            emissive_view: targets.emissive,
            glow_a: targets.glow_a,
            glow_b: targets.glow_b,
            sampler,
            blur_pipeline,
            blur_layout,
            blur_h_buffer,
            blur_v_buffer,
            blur_h_group: groups.blur_h,
            blur_v_group: groups.blur_v,
            composite_pipeline,
            composite_layout,
            composite_buffer,
            composite_group: groups.composite,
            options: options.clone(),
            gamma: if surface_format.is_srgb() { 1.0 } else { 1.0 / 2.2 },
            width,
            height,
        }
    }

    /// Lit scene color target.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene_view
    }

    /// Emissive target that feeds the glow.
    pub fn emissive_view(&self) -> &wgpu::TextureView {
        &self.emissive_view
    }

    pub fn options(&self) -> &PostOptions {
        &self.options
    }

    /// Recreate every resolution-dependent target and rebind.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        let targets = Targets::new(device, self.width, self.height);
        let groups = BindGroups::new(
            device,
            &targets,
            &self.sampler,
            &self.blur_layout,
            &self.composite_layout,
            [&self.blur_h_buffer, &self.blur_v_buffer, &self.composite_buffer],
        );
        self.scene_view = targets.scene;
        self.emissive_view = targets.emissive;
        self.glow_a = targets.glow_a;
        self.glow_b = targets.glow_b;
        self.blur_h_group = groups.blur_h;
        self.blur_v_group = groups.blur_v;
        self.composite_group = groups.composite;
    }

    /// Replace the effect options; takes effect on the next `flush`.
    pub fn set_options(&mut self, options: &PostOptions) {
        self.options = options.clone();
    }

    /// Push the current options and viewport size to the GPU.
    pub fn flush(&self, queue: &wgpu::Queue) {
        let [blur_h, blur_v] =
            blur_params(self.width, self.height, self.options.glow.blur_radius);
        queue.write_buffer(&self.blur_h_buffer, 0, bytemuck::bytes_of(&blur_h));
        queue.write_buffer(&self.blur_v_buffer, 0, bytemuck::bytes_of(&blur_v));

        let aspect = self.width as f32 / self.height as f32;
        let vignette = VignetteSettings::compute(&self.options.vignette, aspect);
        let glow = if self.options.glow.enabled {
            self.options.glow.intensity
        } else {
            0.0
        };
        let params = CompositeParams {
            vignette1: vignette.settings1,
            vignette2: vignette.settings2,
            lens: [
                self.options.lens.distortion,
                self.options.lens.chromatic_aberration,
                1.0 / self.width as f32,
                1.0 / self.height as f32,
            ],
            misc: [
                glow,
                self.gamma,
                if self.options.vignette.enabled { 1.0 } else { 0.0 },
                0.0,
            ],
        };
        queue.write_buffer(&self.composite_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Encode glow blur and composite, writing the final image to `final_view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, final_view: &wgpu::TextureView) {
        if self.options.glow.enabled {
            self.screen_pass(
                encoder,
                "glow_blur_h",
                &self.glow_a,
                &self.blur_pipeline,
                &self.blur_h_group,
            );
            self.screen_pass(
                encoder,
                "glow_blur_v",
                &self.glow_b,
                &self.blur_pipeline,
                &self.blur_v_group,
            );
        }
        self.screen_pass(
            encoder,
            "composite",
            final_view,
            &self.composite_pipeline,
            &self.composite_group,
        );
    }

    fn screen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, group, &[]);
        pass.draw(0..3, 0..1);
    }
}

/// Glow targets run at half resolution.
fn glow_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Horizontal then vertical blur parameters. Both passes step in
/// glow-resolution texels so the kernel is isotropic.
fn blur_params(width: u32, height: u32, radius: u32) -> [BlurParams; 2] {
    let (glow_w, glow_h) = glow_size(width, height);
    let texel_size = [1.0 / glow_w as f32, 1.0 / glow_h as f32];
    let radius = radius as i32;
    [
        BlurParams {
            texel_size,
            direction: [1.0, 0.0],
            radius,
            _pad: [0; 3],
        },
        BlurParams {
            texel_size,
            direction: [0.0, 1.0],
            radius,
            _pad: [0; 3],
        },
    ]
}

struct Targets {
    scene: wgpu::TextureView,
    emissive: wgpu::TextureView,
    glow_a: wgpu::TextureView,
    glow_b: wgpu::TextureView,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (gw, gh) = glow_size(width, height);
        Self {
            scene: create_target(device, "scene_color", width, height),
            emissive: create_target(device, "scene_emissive", width, height),
            glow_a: create_target(device, "glow_a", gw, gh),
            glow_b: create_target(device, "glow_b", gw, gh),
        }
    }
}

struct BindGroups {
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

impl BindGroups {
    fn new(
        device: &wgpu::Device,
        targets: &Targets,
        sampler: &wgpu::Sampler,
        blur_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        [blur_h, blur_v, composite]: [&wgpu::Buffer; 3],
    ) -> Self {
        let blur_group = |label: &str, source: &wgpu::TextureView, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: blur_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params.as_entire_binding(),
                    },
                ],
            })
        };

        Self {
            blur_h: blur_group("blur_h_bind_group", &targets.emissive, blur_h),
            blur_v: blur_group("blur_v_bind_group", &targets.glow_a, blur_v),
            composite: device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("composite_bind_group"),
                layout: composite_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&targets.scene),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&targets.glow_b),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: composite.as_entire_binding(),
                    },
                ],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_passes_share_glow_texel_size() {
        let [h, v] = blur_params(1280, 720, 8);
        assert_eq!(h.texel_size, v.texel_size);
        assert_eq!(h.texel_size, [1.0 / 640.0, 1.0 / 360.0]);
        assert_eq!(h.direction, [1.0, 0.0]);
        assert_eq!(v.direction, [0.0, 1.0]);
        assert_eq!((h.radius, v.radius), (8, 8));
    }

    #[test]
    fn blur_params_survive_tiny_viewport() {
        let [h, _] = blur_params(1, 1, 4);
        assert_eq!(h.texel_size, [1.0, 1.0]);
    }

    #[test]
    fn vignette_power_is_negative_double_weight() {
        let s = VignetteSettings::compute(&VignetteOptions::default(), 16.0 / 9.0);
        assert!((s.settings2[3] + 1.4).abs() < 1e-6);
        assert_eq!(&s.settings2[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_stretch_keeps_aspect_scaling() {
        let opts = VignetteOptions {
            stretch: 0.0,
            ..VignetteOptions::default()
        };
        let s = VignetteSettings::compute(&opts, 2.0);
        let sy = (0.25_f32).tan();
        assert!((s.settings1[1] - sy).abs() < 1e-6);
        assert!((s.settings1[0] - 2.0 * sy).abs() < 1e-6);
    }

    #[test]
    fn full_stretch_is_circular() {
        let opts = VignetteOptions {
            stretch: 1.0,
            ..VignetteOptions::default()
        };
        let s = VignetteSettings::compute(&opts, 1.7);
        assert!((s.settings1[0] - s.settings1[1]).abs() < 1e-6);
    }

    #[test]
    fn vignette_darkens_edges_not_center() {
        let s = VignetteSettings::compute(&VignetteOptions::default(), 16.0 / 9.0);
        let center = s.multiplier(0.0, 0.0);
        let corner = s.multiplier(1.0, 1.0);
        assert!((center[0] - 1.0).abs() < 1e-6);
        assert!(corner[0] < center[0]);
    }

    #[test]
    fn glow_targets_are_half_size() {
        assert_eq!(glow_size(1280, 720), (640, 360));
        assert_eq!(glow_size(1, 1), (1, 1));
    }

    #[test]
    fn uniform_structs_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<BlurParams>() % 16, 0);
        assert_eq!(std::mem::size_of::<CompositeParams>() % 16, 0);
    }
}
