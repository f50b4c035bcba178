use log::LevelFilter;
use std::sync::Arc;

use kiln_api::{
    KilnApi, KilnApiDef, KilnBufferDef, KilnBufferUsage, KilnConstantBufferViewDef,
    KilnConstantDef, KilnCpuAccess, KilnFormat, KilnHeadlessWindow, KilnPresentMode,
    KilnPrimitiveTopology, KilnShaderDef, KilnShaderStage, KilnSwapChainDef,
    KilnValidationMode, KilnVertexBufferBinding, KilnVertexLayoutAttribute, KilnVertexStreamDef,
    KilnViewport, KilnWindow,
};

const WINDOW_WIDTH: u32 = 900;
const WINDOW_HEIGHT: u32 = 600;

const FRAME_COUNT: usize = 4;

#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct PositionColorVertex {
    position: [f32; 2],
    color: [f32; 3],
}

// Tightly packed, the shader sees brightness at 16 and scale at 28
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct Globals {
    tint: [f32; 2],
    brightness: [f32; 3],
    scale: f32,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .init();

    let window = Arc::new(KilnHeadlessWindow::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    let dyn_window: Arc<dyn KilnWindow> = window.clone();

    //
    // Create the device
    //
    let api = KilnApi::new(&KilnApiDef {
        validation_mode: KilnValidationMode::Enabled,
    })
    .unwrap();
    let device = api.device();

    let mut swap_chain = device
        .create_swap_chain(&dyn_window, &KilnSwapChainDef::default())
        .unwrap();

    //
    // Compile the shaders. The soft backend takes WGSL and runs it through the preprocessor
    // first, so defines can switch code paths.
    //
    let shader_source = include_str!("shaders.wgsl");
    let defines = ["USE_TINT"];
    let vertex_shader = device
        .create_shader(&KilnShaderDef {
            defines: &defines,
            ..KilnShaderDef::wgsl(KilnShaderStage::Vertex, shader_source, "main_vs")
        })
        .unwrap();
    let pixel_shader = device
        .create_shader(&KilnShaderDef {
            defines: &defines,
            ..KilnShaderDef::wgsl(KilnShaderStage::Pixel, shader_source, "main_ps")
        })
        .unwrap();
    let program = device
        .create_render_program(&vertex_shader, &pixel_shader, None)
        .unwrap();

    //
    // Geometry
    //
    #[rustfmt::skip]
    let vertices = [
        PositionColorVertex { position: [0.0, 0.5], color: [1.0, 0.0, 0.0] },
        PositionColorVertex { position: [0.5, -0.5], color: [0.0, 1.0, 0.0] },
        PositionColorVertex { position: [-0.5, -0.5], color: [0.0, 0.0, 1.0] },
    ];
    let vertex_buffer = device
        .create_vertex_buffer(&KilnBufferDef::for_data(
            bytemuck::cast_slice(&vertices),
            KilnBufferUsage::Static,
            KilnCpuAccess::NONE,
        ))
        .unwrap();

    let vertex_layout = device
        .create_vertex_layout(
            &program,
            &[
                KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32_FLOAT, 0, 0),
                KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R32G32B32_FLOAT, 0, 8),
            ],
        )
        .unwrap();
    let vertex_stream = device
        .create_vertex_stream(&KilnVertexStreamDef {
            vertex_layout: &vertex_layout,
            vertex_buffers: &[KilnVertexBufferBinding {
                buffer: &vertex_buffer,
                stride: std::mem::size_of::<PositionColorVertex>() as u32,
                offset: 0,
            }],
            index_buffer: None,
            topology: KilnPrimitiveTopology::TriangleList,
        })
        .unwrap();

    //
    // Constants. The view works out where each CPU constant lands in the shader's block.
    //
    let constant_buffer = device
        .create_constant_buffer(&KilnBufferDef {
            size: 32,
            usage: KilnBufferUsage::Dynamic,
            access: KilnCpuAccess::WRITE,
            initial_data: None,
        })
        .unwrap();
    let globals_view = device
        .create_constant_buffer_view(
            &constant_buffer,
            &program,
            &KilnConstantBufferViewDef {
                block_name: "Globals".to_string(),
                constants: vec![
                    KilnConstantDef::new("tint", 8, 4),
                    KilnConstantDef::new("brightness", 12, 4),
                    KilnConstantDef::new("scale", 4, 4),
                ],
            },
        )
        .unwrap();

    let mut command_interface = device.create_command_interface().unwrap();

    for frame_index in 0..FRAME_COUNT {
        // Pretend the user dragged the window border halfway through
        if frame_index == FRAME_COUNT / 2 {
            window.set_client_extents(WINDOW_WIDTH / 2, WINDOW_HEIGHT / 2);
        }

        if !swap_chain.valid() {
            log::info!("Window changed size, resizing the swap chain");
            swap_chain.resize().unwrap();
        }

        let t = frame_index as f32 / FRAME_COUNT as f32;
        let globals = Globals {
            tint: [1.0, t],
            brightness: [1.0, 1.0, 1.0],
            scale: 1.0 - 0.5 * t,
        };

        let render_target = swap_chain.acquire_render_target_view();

        command_interface.begin(&device).unwrap();
        command_interface
            .update_constant_buffer(&globals_view, bytemuck::bytes_of(&globals))
            .unwrap();

        command_interface.set_render_targets(&[&render_target], None);
        command_interface.clear_render_target(&render_target, [0.0, 0.0, t, 1.0].into());
        command_interface.set_viewport(&KilnViewport::from_extents(swap_chain.extents()));
        command_interface.set_render_program(Some(&program));
        command_interface.set_vertex_stream(Some(&vertex_stream));
        command_interface.set_constant_buffers(Some(&[&globals_view][..]));
        command_interface.draw(3, 0);
        command_interface.end().unwrap();

        swap_chain
            .present(&render_target, KilnPresentMode::Vsync)
            .unwrap();
    }

    if let Some(soft_device) = api.soft_device() {
        log::info!(
            "Recorded {} commands over {} frames",
            soft_device.context().total_recorded(),
            FRAME_COUNT
        );
    }
}
