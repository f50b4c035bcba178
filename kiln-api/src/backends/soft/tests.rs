use crate::soft::{KilnDeviceSoft, SoftCommand, SoftContext};
use crate::*;
use std::sync::Arc;

const SHADER: &str = r#"
struct Globals {
    tint: vec2<f32>,
    light_dir: vec3<f32>,
    intensity: f32,
}

@group(0) @binding(2) var<uniform> globals: Globals;
@group(0) @binding(0) var albedo: texture_2d<f32>;
@group(0) @binding(1) var albedo_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = vec4<f32>(input.position * globals.intensity, 1.0);
    output.uv = input.uv;
    return output;
}

@fragment
fn ps_main(input: VertexOutput) -> @location(0) vec4<f32> {
#ifdef USE_LIGHT
    let light = globals.light_dir;
#else
    let light = vec3<f32>(1.0, 1.0, 1.0);
#endif
    let color = textureSample(albedo, albedo_sampler, input.uv);
    return vec4<f32>(globals.tint * color.xy, light.x, 1.0);
}
"#;

fn create_api() -> KilnApi {
    let _ = env_logger::builder().is_test(true).try_init();
    KilnApi::new(&KilnApiDef {
        validation_mode: KilnValidationMode::Enabled,
    })
    .unwrap()
}

fn context(device: &KilnDevice) -> SoftContext {
    device.soft_device().unwrap().context().clone()
}

fn create_program(
    device: &KilnDevice,
    defines: &[&str],
) -> KilnRenderProgram {
    let vertex_shader = device
        .create_shader(&KilnShaderDef {
            defines,
            ..KilnShaderDef::wgsl(KilnShaderStage::Vertex, SHADER, "vs_main")
        })
        .unwrap();
    let pixel_shader = device
        .create_shader(&KilnShaderDef {
            defines,
            ..KilnShaderDef::wgsl(KilnShaderStage::Pixel, SHADER, "ps_main")
        })
        .unwrap();

    device
        .create_render_program(&vertex_shader, &pixel_shader, None)
        .unwrap()
}

fn globals_def() -> KilnConstantBufferViewDef {
    KilnConstantBufferViewDef {
        block_name: "Globals".to_string(),
        constants: vec![
            KilnConstantDef::new("tint", 8, 4),
            KilnConstantDef::new("light_dir", 12, 4),
            KilnConstantDef::new("intensity", 4, 4),
        ],
    }
}

fn create_constant_buffer(device: &KilnDevice) -> KilnBuffer {
    device
        .create_constant_buffer(&KilnBufferDef {
            size: 32,
            usage: KilnBufferUsage::Dynamic,
            access: KilnCpuAccess::WRITE,
            initial_data: None,
        })
        .unwrap()
}

fn begin(device: &KilnDevice) -> KilnCommandInterface {
    let mut command_interface = device.create_command_interface().unwrap();
    command_interface.begin(device).unwrap();
    context(device).clear_commands();
    command_interface
}

fn is_blend(command: &SoftCommand) -> bool {
    matches!(command, SoftCommand::OmSetBlendState { .. })
}

#[test]
fn redundant_blend_states_are_skipped() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let a = device
        .create_blend_state(&KilnBlendStateDef::default_alpha_enabled())
        .unwrap();
    let b = device
        .create_blend_state(&KilnBlendStateDef::default_alpha_disabled())
        .unwrap();

    let mut command_interface = begin(&device);
    command_interface.set_blend_state(Some(&a));
    command_interface.set_blend_state(Some(&a));
    assert_eq!(context.count_commands(is_blend), 1);

    context.clear_commands();
    command_interface.set_blend_state(Some(&b));
    command_interface.set_blend_state(Some(&a));
    command_interface.set_blend_state(None);
    command_interface.set_blend_state(None);
    assert_eq!(context.count_commands(is_blend), 3);
    assert_eq!(
        context.last_command(),
        Some(SoftCommand::OmSetBlendState { state: None })
    );

    // begin forgets what was bound
    command_interface.set_blend_state(Some(&a));
    command_interface.end().unwrap();
    command_interface.begin(&device).unwrap();
    context.clear_commands();
    command_interface.set_blend_state(Some(&a));
    assert_eq!(context.count_commands(is_blend), 1);
}

#[test]
fn other_states_are_cached_too() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let rasterizer = device
        .create_rasterizer_state(&KilnRasterizerStateDef::default())
        .unwrap();
    let depth_stencil = device
        .create_depth_stencil_state(&KilnDepthStencilStateDef::default())
        .unwrap();
    let program = create_program(&device, &[]);

    let mut command_interface = begin(&device);
    for _ in 0..2 {
        command_interface.set_rasterizer_state(Some(&rasterizer));
        command_interface.set_depth_stencil_state(Some(&depth_stencil));
        command_interface.set_render_program(Some(&program));
    }

    assert_eq!(
        context.count_commands(|x| matches!(x, SoftCommand::RsSetState { .. })),
        1
    );
    assert_eq!(
        context.count_commands(|x| matches!(x, SoftCommand::OmSetDepthStencilState { .. })),
        1
    );
    // No geometry shader, and the geometry stage was already unbound
    assert_eq!(
        context.count_commands(|x| matches!(x, SoftCommand::SetShader { .. })),
        2
    );

    context.clear_commands();
    command_interface.set_render_program(None);
    assert_eq!(
        context.commands(),
        vec![
            SoftCommand::SetShader {
                stage: KilnShaderStage::Vertex,
                shader: None
            },
            SoftCommand::SetShader {
                stage: KilnShaderStage::Pixel,
                shader: None
            },
        ]
    );
}

#[test]
fn vertex_streams_bind_on_change() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);
    let program = create_program(&device, &[]);

    let layout = device
        .create_vertex_layout(
            &program,
            &[
                KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32B32_FLOAT, 0, 0),
                KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R32G32_FLOAT, 0, 12),
            ],
        )
        .unwrap();

    let vertices = [0.0f32; 15];
    let vertex_buffer = device
        .create_vertex_buffer(&KilnBufferDef::for_data(
            bytemuck::cast_slice(&vertices),
            KilnBufferUsage::Static,
            KilnCpuAccess::NONE,
        ))
        .unwrap();
    let indices = [0u16, 1, 2];
    let index_buffer = device
        .create_index_buffer(&KilnBufferDef::for_data(
            bytemuck::cast_slice(&indices),
            KilnBufferUsage::Static,
            KilnCpuAccess::NONE,
        ))
        .unwrap();

    let stream = device
        .create_vertex_stream(&KilnVertexStreamDef {
            vertex_layout: &layout,
            vertex_buffers: &[KilnVertexBufferBinding {
                buffer: &vertex_buffer,
                stride: 20,
                offset: 0,
            }],
            index_buffer: Some(KilnIndexBufferBinding {
                buffer: &index_buffer,
                format: KilnFormat::R16_UINT,
                offset: 0,
            }),
            topology: KilnPrimitiveTopology::TriangleList,
        })
        .unwrap();
    assert!(stream.has_index_buffer());

    let mut command_interface = begin(&device);
    command_interface.set_vertex_stream(Some(&stream));
    command_interface.set_vertex_stream(Some(&stream));
    assert_eq!(context.commands().len(), 4);
    assert_eq!(
        context.commands()[3],
        SoftCommand::IaSetPrimitiveTopology {
            topology: KilnPrimitiveTopology::TriangleList
        }
    );

    command_interface.set_render_program(Some(&program));
    context.clear_commands();
    command_interface.draw_indexed(3, 0, 0);
    assert_eq!(
        context.commands(),
        vec![SoftCommand::DrawIndexed {
            index_count: 3,
            start_index: 0,
            base_vertex: 0
        }]
    );
}

#[test]
fn vertex_streams_validate_buffer_types() {
    let api = create_api();
    let device = api.device();
    let program = create_program(&device, &[]);
    let layout = device
        .create_vertex_layout(
            &program,
            &[
                KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32B32_FLOAT, 0, 0),
                KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R32G32_FLOAT, 0, 12),
            ],
        )
        .unwrap();
    let constant_buffer = create_constant_buffer(&device);

    let result = device.create_vertex_stream(&KilnVertexStreamDef {
        vertex_layout: &layout,
        vertex_buffers: &[KilnVertexBufferBinding {
            buffer: &constant_buffer,
            stride: 20,
            offset: 0,
        }],
        index_buffer: None,
        topology: KilnPrimitiveTopology::TriangleList,
    });
    assert!(result.is_err());
}

#[test]
fn vertex_layouts_must_match_the_shader() {
    let api = create_api();
    let device = api.device();
    let program = create_program(&device, &[]);

    let missing_uv = device.create_vertex_layout(
        &program,
        &[KilnVertexLayoutAttribute::per_vertex(
            0,
            KilnFormat::R32G32B32_FLOAT,
            0,
            0,
        )],
    );
    assert!(missing_uv.is_err());

    let integer_uv = device.create_vertex_layout(
        &program,
        &[
            KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32B32_FLOAT, 0, 0),
            KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R32G32_UINT, 0, 12),
        ],
    );
    assert!(integer_uv.is_err());
}

#[test]
fn write_discard_requires_dynamic_usage() {
    let api = create_api();
    let device = api.device();
    let command_interface = device.create_command_interface().unwrap();

    let copy_buffer = device
        .create_vertex_buffer(&KilnBufferDef {
            size: 64,
            usage: KilnBufferUsage::Copy,
            access: KilnCpuAccess::READ | KilnCpuAccess::WRITE,
            initial_data: None,
        })
        .unwrap();
    assert!(command_interface
        .map(&copy_buffer, 0, KilnMapPolicy::WriteDiscard)
        .is_err());
    assert!(command_interface
        .map(&copy_buffer, 0, KilnMapPolicy::ReadWrite)
        .is_ok());

    let dynamic_buffer = create_constant_buffer(&device);
    assert!(command_interface
        .map(&dynamic_buffer, 0, KilnMapPolicy::WriteDiscard)
        .is_ok());
}

#[test]
fn second_map_of_a_subresource_fails() {
    let api = create_api();
    let device = api.device();
    let command_interface = device.create_command_interface().unwrap();
    let buffer = create_constant_buffer(&device);

    let first = command_interface
        .map(&buffer, 0, KilnMapPolicy::WriteDiscard)
        .unwrap();
    match command_interface.map(&buffer, 0, KilnMapPolicy::WriteDiscard) {
        Err(KilnError::StringError(message)) => assert!(message.contains("already mapped")),
        other => panic!("expected an already mapped error, got {:?}", other.map(|_| ())),
    }

    command_interface.unmap(first);
    assert!(command_interface
        .map(&buffer, 0, KilnMapPolicy::WriteDiscard)
        .is_ok());
}

#[test]
fn update_subresource_round_trips_through_row_pitch() {
    let api = create_api();
    let device = api.device();
    let command_interface = device.create_command_interface().unwrap();

    let texture = device
        .create_texture_buffer(&KilnTextureBufferDef {
            usage: KilnBufferUsage::Copy,
            access: KilnCpuAccess::READ | KilnCpuAccess::WRITE,
            ..KilnTextureBufferDef::texture_2d(5, 3, KilnFormat::R8G8B8A8_UNORM)
        })
        .unwrap();

    let data: Vec<u8> = (0..60u8).collect();
    command_interface
        .update_subresource(&texture, 0, &data)
        .unwrap();
    assert!(command_interface
        .update_subresource(&texture, 0, &data[..59])
        .is_err());

    let mapped = command_interface
        .map(&texture, 0, KilnMapPolicy::ReadOnly)
        .unwrap();
    assert!(mapped.row_pitch() > mapped.row_byte_width());
    for row in 0..3 {
        let start = row as usize * 20;
        assert_eq!(mapped.row(0, row).unwrap(), &data[start..start + 20]);
    }
}

#[test]
fn update_subresource_walks_depth_slices() {
    let api = create_api();
    let device = api.device();
    let command_interface = device.create_command_interface().unwrap();

    let volume = device
        .create_texture_buffer(&KilnTextureBufferDef {
            buffer_type: KilnBufferType::Texture3D,
            depth: 2,
            usage: KilnBufferUsage::Copy,
            access: KilnCpuAccess::READ | KilnCpuAccess::WRITE,
            ..KilnTextureBufferDef::texture_2d(4, 4, KilnFormat::R8_UNORM)
        })
        .unwrap();

    let data: Vec<u8> = (0..32u8).collect();
    command_interface
        .update_subresource(&volume, 0, &data)
        .unwrap();

    let mapped = command_interface
        .map(&volume, 0, KilnMapPolicy::ReadOnly)
        .unwrap();
    assert_eq!(mapped.depth_count(), 2);
    assert_eq!(mapped.depth_pitch(), mapped.row_pitch() * 4);
    assert_eq!(mapped.row(1, 3).unwrap(), &data[28..32]);
}

#[test]
fn update_buffer_is_bounds_checked() {
    let api = create_api();
    let device = api.device();
    let command_interface = device.create_command_interface().unwrap();
    let buffer = device
        .create_vertex_buffer(&KilnBufferDef {
            size: 16,
            usage: KilnBufferUsage::Copy,
            access: KilnCpuAccess::READ | KilnCpuAccess::WRITE,
            initial_data: None,
        })
        .unwrap();

    command_interface
        .update_buffer(&buffer, &[1, 2, 3, 4], 12, false)
        .unwrap();
    assert!(command_interface
        .update_buffer(&buffer, &[1, 2, 3, 4], 13, false)
        .is_err());
    // Copy buffers can't be discarded
    assert!(command_interface
        .update_buffer(&buffer, &[1], 0, true)
        .is_err());

    let contents = buffer.soft_buffer().unwrap().read_subresource(0).unwrap();
    assert_eq!(&contents[12..16], &[1, 2, 3, 4]);
    assert_eq!(&contents[0..12], &[0u8; 12]);
}

#[test]
fn constant_buffer_view_scatters_constants() {
    let api = create_api();
    let device = api.device();
    let program = create_program(&device, &["USE_LIGHT"]);
    let buffer = create_constant_buffer(&device);

    let view = device
        .create_constant_buffer_view(&buffer, &program, &globals_def())
        .unwrap();
    assert_eq!(view.slots().slot(KilnShaderStage::Vertex), Some(2));
    assert_eq!(view.slots().slot(KilnShaderStage::Pixel), Some(2));
    assert_eq!(view.slots().slot(KilnShaderStage::Geometry), None);

    let entries = view.placement_map().entries().unwrap();
    assert_eq!(
        entries
            .iter()
            .filter(|x| x.source_offset != x.destination_offset)
            .count(),
        1
    );

    let constants = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let source: &[u8] = bytemuck::cast_slice(&constants);
    let command_interface = device.create_command_interface().unwrap();
    command_interface
        .update_constant_buffer(&view, source)
        .unwrap();

    let contents = buffer.soft_buffer().unwrap().read_subresource(0).unwrap();
    assert_eq!(&contents[0..8], &source[0..8]);
    assert_eq!(&contents[8..16], &[0u8; 8]);
    assert_eq!(&contents[16..32], &source[8..24]);

    assert!(command_interface
        .update_constant_buffer(&view, &source[..20])
        .is_err());
}

#[test]
fn constant_buffer_views_reject_bad_definitions() {
    let api = create_api();
    let device = api.device();
    let program = create_program(&device, &[]);
    let buffer = create_constant_buffer(&device);

    let mut unknown = globals_def();
    unknown.constants.push(KilnConstantDef::new("exposure", 4, 4));
    assert!(device
        .create_constant_buffer_view(&buffer, &program, &unknown)
        .is_err());

    let mut wrong_size = globals_def();
    wrong_size.constants[1].size = 16;
    assert!(device
        .create_constant_buffer_view(&buffer, &program, &wrong_size)
        .is_err());

    let small_buffer = device
        .create_constant_buffer(&KilnBufferDef {
            size: 16,
            usage: KilnBufferUsage::Dynamic,
            access: KilnCpuAccess::WRITE,
            initial_data: None,
        })
        .unwrap();
    assert!(device
        .create_constant_buffer_view(&small_buffer, &program, &globals_def())
        .is_err());
}

#[test]
fn constant_buffers_bind_per_stage_slots() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);
    let program = create_program(&device, &[]);
    let buffer = create_constant_buffer(&device);
    let view = device
        .create_constant_buffer_view(&buffer, &program, &globals_def())
        .unwrap();
    let handle = buffer.soft_buffer().unwrap().handle();

    let mut command_interface = begin(&device);
    command_interface.set_constant_buffers(Some(&[&view][..]));

    let commands = context.commands();
    assert_eq!(commands.len(), 3);
    for command in commands {
        match command {
            SoftCommand::SetConstantBuffers { stage, buffers } => {
                assert_eq!(buffers.len(), MAX_CONSTANT_BUFFER_SLOTS);
                let expected = if stage == KilnShaderStage::Geometry {
                    None
                } else {
                    Some(handle)
                };
                assert_eq!(buffers[2], expected);
                assert_eq!(buffers.iter().filter(|x| x.is_some()).count(), expected.iter().count());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    context.clear_commands();
    command_interface.set_constant_buffers(None);
    assert_eq!(
        context.count_commands(|x| match x {
            SoftCommand::SetConstantBuffers { buffers, .. } => buffers.iter().all(|x| x.is_none()),
            _ => false,
        }),
        3
    );
}

#[test]
fn texture_and_sampler_binds() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let texture = device
        .create_texture_buffer(&KilnTextureBufferDef::texture_2d(
            4,
            4,
            KilnFormat::R8G8B8A8_UNORM,
        ))
        .unwrap();
    let texture_view = device
        .create_texture_view(&texture, &KilnTextureViewDef::default())
        .unwrap();
    let sampler = device.create_sampler(&KilnSamplerDef::default()).unwrap();

    let mut command_interface = begin(&device);
    command_interface.set_ps_textures(127, &[&texture_view, &texture_view]);
    assert!(context.commands().is_empty());

    command_interface.set_ps_textures(126, &[&texture_view, &texture_view]);
    assert_eq!(
        context.count_commands(|x| matches!(
            x,
            SoftCommand::SetShaderResources {
                stage: KilnShaderStage::Pixel,
                start_slot: 126,
                ..
            }
        )),
        1
    );

    context.clear_commands();
    command_interface.set_ps_samplers(Some(&[None, Some(&sampler)][..]));
    match context.last_command() {
        Some(SoftCommand::SetSamplers { stage, samplers }) => {
            assert_eq!(stage, KilnShaderStage::Pixel);
            assert_eq!(samplers.len(), MAX_SAMPLER_SLOTS);
            assert_eq!(samplers[0], None);
            assert_eq!(samplers[1], Some(sampler.soft_sampler().unwrap().handle()));
            assert!(samplers[2..].iter().all(|x| x.is_none()));
        }
        other => panic!("expected SetSamplers, got {:?}", other),
    }

    command_interface.set_vs_samplers(None);
    match context.last_command() {
        Some(SoftCommand::SetSamplers { stage, samplers }) => {
            assert_eq!(stage, KilnShaderStage::Vertex);
            assert_eq!(samplers, vec![None; MAX_SAMPLER_SLOTS]);
        }
        other => panic!("expected SetSamplers, got {:?}", other),
    }
}

#[test]
fn render_targets_are_limited() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let texture = device
        .create_texture_buffer(&KilnTextureBufferDef {
            bind_flags: KilnTextureBindFlags::RENDER_TARGET,
            ..KilnTextureBufferDef::texture_2d(4, 4, KilnFormat::R8G8B8A8_UNORM)
        })
        .unwrap();
    let view = device
        .create_render_target_view(&texture, &KilnRenderTargetViewDef::default())
        .unwrap();

    let mut command_interface = begin(&device);
    let too_many = vec![&view; MAX_RENDER_TARGETS + 1];
    command_interface.set_render_targets(&too_many, None);
    assert!(context.commands().is_empty());

    command_interface.set_render_targets(&too_many[..2], None);
    assert_eq!(context.commands().len(), 1);
}

#[test]
fn clears_write_texels() {
    let api = create_api();
    let device = api.device();

    let color_texture = device
        .create_texture_buffer(&KilnTextureBufferDef {
            bind_flags: KilnTextureBindFlags::RENDER_TARGET,
            ..KilnTextureBufferDef::texture_2d(3, 2, KilnFormat::R8G8B8A8_UNORM)
        })
        .unwrap();
    let render_target = device
        .create_render_target_view(&color_texture, &KilnRenderTargetViewDef::default())
        .unwrap();

    let depth_texture = device
        .create_texture_buffer(&KilnTextureBufferDef {
            bind_flags: KilnTextureBindFlags::DEPTH_STENCIL,
            ..KilnTextureBufferDef::texture_2d(2, 2, KilnFormat::D24_UNORM_S8_UINT)
        })
        .unwrap();
    let depth_stencil = device
        .create_depth_stencil_view(&depth_texture, &KilnDepthStencilViewDef::default())
        .unwrap();

    let mut command_interface = begin(&device);
    command_interface.clear_render_target(&render_target, [1.0, 0.0, 0.0, 1.0].into());
    command_interface.clear_depth(&depth_stencil, 1.0);
    command_interface.clear_stencil(&depth_stencil, 0x7F);

    let colors = color_texture
        .soft_buffer()
        .unwrap()
        .read_subresource(0)
        .unwrap();
    assert_eq!(colors, [255u8, 0, 0, 255].repeat(6));

    let depth = depth_texture
        .soft_buffer()
        .unwrap()
        .read_subresource(0)
        .unwrap();
    assert_eq!(&depth[0..4], &0x7FFF_FFFFu32.to_le_bytes());

    let context = context(&device);
    assert_eq!(
        context.count_commands(|x| match x {
            SoftCommand::ClearDepthStencilView { flags, .. } => *flags == KilnClearFlags::STENCIL,
            _ => false,
        }),
        1
    );
}

#[test]
fn views_validate_their_buffers() {
    let api = create_api();
    let device = api.device();

    let shader_only = device
        .create_texture_buffer(&KilnTextureBufferDef {
            mip_levels: 0,
            ..KilnTextureBufferDef::texture_2d(8, 8, KilnFormat::R8G8B8A8_UNORM)
        })
        .unwrap();
    assert!(device
        .create_render_target_view(&shader_only, &Default::default())
        .is_err());
    assert!(device
        .create_depth_stencil_view(&shader_only, &Default::default())
        .is_err());

    let all_mips = device
        .create_texture_view(&shader_only, &Default::default())
        .unwrap();
    assert_eq!(all_mips.mip_levels(), 4);

    let tail = device
        .create_texture_view(
            &shader_only,
            &KilnTextureViewDef {
                most_detailed_mip: 2,
                mip_levels: 0,
            },
        )
        .unwrap();
    assert_eq!(tail.mip_levels(), 2);
    assert!(device
        .create_texture_view(
            &shader_only,
            &KilnTextureViewDef {
                most_detailed_mip: 2,
                mip_levels: 3,
            },
        )
        .is_err());

    let constant_buffer = create_constant_buffer(&device);
    assert!(device
        .create_texture_view(&constant_buffer, &Default::default())
        .is_err());

    // The view keeps its texture alive
    drop(shader_only);
    assert_eq!(tail.buffer().texture_info().unwrap().mip_levels, 4);
}

#[test]
fn shaders_check_language_and_stage() {
    let api = create_api();
    let device = api.device();

    let hlsl = device.create_shader(&KilnShaderDef {
        language: KilnShaderLanguage::Hlsl50,
        ..KilnShaderDef::wgsl(KilnShaderStage::Vertex, SHADER, "vs_main")
    });
    assert!(hlsl.is_err());

    match device.create_shader(&KilnShaderDef::wgsl(
        KilnShaderStage::Vertex,
        "fn broken( {",
        "vs_main",
    )) {
        Err(KilnError::ShaderCompileError(_)) => {}
        other => panic!("expected a compile error, got {:?}", other.map(|_| ())),
    }

    let vertex_shader = device
        .create_shader(&KilnShaderDef::wgsl(KilnShaderStage::Vertex, SHADER, "vs_main"))
        .unwrap();
    assert_eq!(vertex_shader.soft_shader().unwrap().target_profile(), "vs_5_0");
    assert_eq!(
        vertex_shader.soft_shader().unwrap().optimization(),
        KilnShaderOptimization::High
    );
    assert_eq!(vertex_shader.reflection().vertex_inputs.len(), 2);

    let pixel_shader = device
        .create_shader(&KilnShaderDef::wgsl(KilnShaderStage::Pixel, SHADER, "ps_main"))
        .unwrap();
    assert!(device
        .create_render_program(&pixel_shader, &pixel_shader, None)
        .is_err());
    assert!(device
        .create_render_program(&vertex_shader, &pixel_shader, Some(&vertex_shader))
        .is_err());
    assert!(device
        .create_render_program(&vertex_shader, &pixel_shader, None)
        .is_ok());
}

#[test]
fn swap_chain_validity_follows_the_window() {
    let api = create_api();
    let device = api.device();

    let window = Arc::new(KilnHeadlessWindow::new(64, 32));
    let dyn_window: Arc<dyn KilnWindow> = window.clone();
    let mut swap_chain = device
        .create_swap_chain(&dyn_window, &KilnSwapChainDef::default())
        .unwrap();
    assert!(swap_chain.valid());
    assert_eq!(
        swap_chain.extents(),
        KilnExtents2D {
            width: 64,
            height: 32
        }
    );

    window.set_client_extents(80, 40);
    assert!(!swap_chain.valid());

    swap_chain.resize().unwrap();
    assert!(swap_chain.valid());
    assert_eq!(
        swap_chain.extents(),
        KilnExtents2D {
            width: 80,
            height: 40
        }
    );

    drop(window);
    drop(dyn_window);
    assert!(!swap_chain.valid());
    assert!(swap_chain.resize().is_err());
}

#[test]
fn empty_windows_are_rejected() {
    let api = create_api();
    let device = api.device();
    let window: Arc<dyn KilnWindow> = Arc::new(KilnHeadlessWindow::new(0, 32));
    assert!(device
        .create_swap_chain(&window, &KilnSwapChainDef::default())
        .is_err());
}

#[test]
fn present_copies_the_back_buffer() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let window: Arc<dyn KilnWindow> = Arc::new(KilnHeadlessWindow::new(4, 4));
    let mut swap_chain = device
        .create_swap_chain(&window, &KilnSwapChainDef::default())
        .unwrap();
    let render_target = swap_chain.acquire_render_target_view();

    let mut command_interface = begin(&device);
    command_interface.set_render_targets(&[&render_target], None);
    command_interface.clear_render_target(&render_target, [0.0, 0.0, 1.0, 1.0].into());
    command_interface.end().unwrap();

    swap_chain
        .present(&render_target, KilnPresentMode::Vsync)
        .unwrap();
    swap_chain
        .present(&render_target, KilnPresentMode::Immediate)
        .unwrap();

    let soft_swap_chain = swap_chain.soft_swap_chain().unwrap();
    assert_eq!(soft_swap_chain.present_count(), 2);
    let front = soft_swap_chain.front_buffer().read_subresource(0).unwrap();
    assert_eq!(&front[0..4], &[0, 0, 255, 255]);

    let sync_intervals: Vec<u32> = context
        .commands()
        .into_iter()
        .filter_map(|x| match x {
            SoftCommand::Present { sync_interval, .. } => Some(sync_interval),
            _ => None,
        })
        .collect();
    assert_eq!(sync_intervals, vec![1, 0]);

    swap_chain.set_fullscreen(true).unwrap();
    assert!(swap_chain.is_fullscreen());

    // Views from before a resize belong to the old buffers
    swap_chain.resize().unwrap();
    assert!(swap_chain
        .present(&render_target, KilnPresentMode::Vsync)
        .is_err());
}

#[test]
fn command_interface_state_machine() {
    let api = create_api();
    let device = api.device();
    let context = context(&device);

    let mut command_interface = device.create_command_interface().unwrap();
    assert!(command_interface.end().is_err());

    context.clear_commands();
    command_interface.draw(3, 0);
    command_interface.flush();
    assert!(context.commands().is_empty());

    command_interface.begin(&device).unwrap();
    assert!(command_interface.is_recording());
    assert_eq!(context.last_command(), Some(SoftCommand::ClearState));
    assert!(command_interface.begin(&device).is_err());

    command_interface.flush();
    command_interface.draw(3, 0);
    assert_eq!(
        context.last_command(),
        Some(SoftCommand::Draw {
            vertex_count: 3,
            start_vertex: 0
        })
    );

    command_interface.end().unwrap();
    assert!(!command_interface.is_recording());
}

#[test]
fn device_queries() {
    let api = create_api();
    let device = api.device();

    assert_eq!(device.get_max_multisample_quality(3), 0);
    assert_eq!(device.get_max_multisample_quality(1), 0);
    assert_eq!(device.get_max_multisample_quality(4), 3);
    assert_eq!(device.get_max_multisample_quality(16), 0);
    assert_eq!(device.device_info().max_render_targets, MAX_RENDER_TARGETS as u32);

    match device.create_command_list() {
        Err(KilnError::Unimplemented(_)) => {}
        other => panic!("expected Unimplemented, got {:?}", other),
    }
}

#[test]
fn oversized_textures_fail_to_create() {
    let api = create_api();
    let device = api.device();

    // Within the extent limits, but a single mip overflows a 32 bit depth pitch
    let huge_2d = KilnTextureBufferDef::texture_2d(16384, 16384, KilnFormat::R32G32B32A32_FLOAT);
    assert!(device.create_texture_buffer(&huge_2d).is_err());

    let wide_1d = KilnTextureBufferDef {
        buffer_type: KilnBufferType::Texture1D,
        ..KilnTextureBufferDef::texture_2d(1 << 28, 1, KilnFormat::R32G32B32A32_FLOAT)
    };
    assert!(device.create_texture_buffer(&wide_1d).is_err());

    // Every pitch fits, the total doesn't
    let big_volume = KilnTextureBufferDef {
        buffer_type: KilnBufferType::Texture3D,
        depth: 2048,
        ..KilnTextureBufferDef::texture_2d(2048, 2048, KilnFormat::R32G32B32A32_FLOAT)
    };
    assert!(device.create_texture_buffer(&big_volume).is_err());

    let small_api = KilnApi::new_soft(
        &KilnApiDef::default(),
        &KilnApiDefSoft {
            max_texture_byte_size: 64 * 1024,
            ..Default::default()
        },
    )
    .unwrap();
    let small_device = small_api.device();
    // 128 rows padded to 512 bytes
    let fits = KilnTextureBufferDef::texture_2d(128, 128, KilnFormat::R8G8B8A8_UNORM);
    assert!(small_device.create_texture_buffer(&fits).is_ok());
    let too_big = KilnTextureBufferDef::texture_2d(129, 128, KilnFormat::R8G8B8A8_UNORM);
    assert!(small_device.create_texture_buffer(&too_big).is_err());
}

#[test]
fn soft_devices_verify_their_config() {
    let zero_alignment = KilnApiDefSoft {
        row_pitch_alignment: 0,
        ..Default::default()
    };
    assert!(KilnDeviceSoft::new(&KilnApiDef::default(), &zero_alignment).is_err());
    assert!(KilnApi::new_soft(&KilnApiDef::default(), &zero_alignment).is_err());

    let odd_alignment = KilnApiDefSoft {
        row_pitch_alignment: 48,
        ..Default::default()
    };
    assert!(KilnDeviceSoft::new(&KilnApiDef::default(), &odd_alignment).is_err());

    assert!(KilnDeviceSoft::new(&KilnApiDef::default(), &KilnApiDefSoft::default()).is_ok());
}
