use crate::{
    KilnComponentKind, KilnConstantBufferReflection, KilnConstantVariableReflection, KilnError,
    KilnResult, KilnShaderReflection, KilnShaderResourceReflection, KilnShaderResourceType,
    KilnShaderStage, KilnVertexInputReflection,
};
use naga::valid::{Capabilities, FunctionInfo, ModuleInfo, ValidationFlags, Validator};

/// Parses and validates WGSL. Errors carry the compiler's formatted diagnostic.
pub fn compile_wgsl(source: &str) -> KilnResult<(naga::Module, ModuleInfo)> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| KilnError::ShaderCompileError(e.emit_to_string(source)))?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| KilnError::ShaderCompileError(e.emit_to_string(source)))?;

    Ok((module, info))
}

fn naga_stage(stage: KilnShaderStage) -> Option<naga::ShaderStage> {
    match stage {
        KilnShaderStage::Vertex => Some(naga::ShaderStage::Vertex),
        KilnShaderStage::Pixel => Some(naga::ShaderStage::Fragment),
        // WGSL has no geometry stage, geometry shaders are plain functions
        KilnShaderStage::Geometry => None,
    }
}

fn find_function<'a>(
    module: &'a naga::Module,
    info: &'a ModuleInfo,
    stage: KilnShaderStage,
    entry_point: &str,
) -> KilnResult<(&'a naga::Function, &'a FunctionInfo)> {
    match naga_stage(stage) {
        Some(expected_stage) => {
            let (index, found) = module
                .entry_points
                .iter()
                .enumerate()
                .find(|(_, x)| x.name == entry_point)
                .ok_or_else(|| {
                    KilnError::ShaderCompileError(format!(
                        "entry point {} not found",
                        entry_point
                    ))
                })?;

            if found.stage != expected_stage {
                return Err(KilnError::ShaderCompileError(format!(
                    "entry point {} is a {:?} shader, expected a {:?} shader",
                    entry_point, found.stage, stage
                )));
            }

            Ok((&found.function, info.get_entry_point(index)))
        }
        None => {
            let (handle, function) = module
                .functions
                .iter()
                .find(|(_, x)| x.name.as_deref() == Some(entry_point))
                .ok_or_else(|| {
                    KilnError::ShaderCompileError(format!(
                        "geometry function {} not found",
                        entry_point
                    ))
                })?;

            Ok((function, &info[handle]))
        }
    }
}

fn component_kind(inner: &naga::TypeInner) -> Option<KilnComponentKind> {
    match inner.scalar_kind()? {
        naga::ScalarKind::Float => Some(KilnComponentKind::Float),
        naga::ScalarKind::Uint => Some(KilnComponentKind::Uint),
        naga::ScalarKind::Sint => Some(KilnComponentKind::Sint),
        _ => None,
    }
}

fn collect_vertex_inputs(
    module: &naga::Module,
    name: Option<&String>,
    binding: Option<&naga::Binding>,
    ty: naga::Handle<naga::Type>,
    inputs: &mut Vec<KilnVertexInputReflection>,
) -> KilnResult<()> {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            let component_kind = component_kind(inner).ok_or_else(|| {
                KilnError::ShaderCompileError(format!(
                    "vertex input at location {} has an unsupported type",
                    location
                ))
            })?;

            inputs.push(KilnVertexInputReflection {
                name: name.cloned(),
                location: *location,
                component_kind,
            });
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_vertex_inputs(
                        module,
                        member.name.as_ref(),
                        member.binding.as_ref(),
                        member.ty,
                        inputs,
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// Lists the constant buffers, resources and vertex inputs used by one function of the module
pub fn reflect_shader(
    module: &naga::Module,
    info: &ModuleInfo,
    stage: KilnShaderStage,
    entry_point: &str,
) -> KilnResult<KilnShaderReflection> {
    let (function, function_info) = find_function(module, info, stage, entry_point)?;
    let gctx = module.to_ctx();

    let mut constant_buffers = Vec::default();
    let mut resources = Vec::default();

    for (handle, global) in module.global_variables.iter() {
        if function_info[handle].is_empty() {
            continue;
        }

        let binding = match &global.binding {
            Some(binding) => binding,
            None => continue,
        };

        // Slots are per stage and flat, there is no register space to put other groups in
        if binding.group != 0 {
            return Err(format!(
                "{} binds {} at @group({}), only @group(0) is supported",
                entry_point,
                global.name.as_deref().unwrap_or("an unnamed global"),
                binding.group
            ))?;
        }

        let ty = &module.types[global.ty];
        match global.space {
            naga::AddressSpace::Uniform => {
                let name = global.name.clone().unwrap_or_default();
                let variables = match &ty.inner {
                    naga::TypeInner::Struct { members, .. } => members
                        .iter()
                        .map(|member| KilnConstantVariableReflection {
                            name: member.name.clone().unwrap_or_default(),
                            offset: member.offset,
                            size: module.types[member.ty].inner.size(gctx),
                        })
                        .collect(),
                    other => vec![KilnConstantVariableReflection {
                        name: name.clone(),
                        offset: 0,
                        size: other.size(gctx),
                    }],
                };

                constant_buffers.push(KilnConstantBufferReflection {
                    name,
                    type_name: ty.name.clone(),
                    slot: binding.binding,
                    size: ty.inner.size(gctx),
                    variables,
                });
            }
            naga::AddressSpace::Handle => {
                let resource_type = match ty.inner {
                    naga::TypeInner::Image { .. } => KilnShaderResourceType::Texture,
                    naga::TypeInner::Sampler { .. } => KilnShaderResourceType::Sampler,
                    _ => continue,
                };

                resources.push(KilnShaderResourceReflection {
                    name: global.name.clone(),
                    resource_type,
                    slot: binding.binding,
                });
            }
            _ => {}
        }
    }

    let mut vertex_inputs = Vec::default();
    if stage == KilnShaderStage::Vertex {
        for argument in &function.arguments {
            collect_vertex_inputs(
                module,
                argument.name.as_ref(),
                argument.binding.as_ref(),
                argument.ty,
                &mut vertex_inputs,
            )?;
        }
        vertex_inputs.sort_by_key(|x: &KilnVertexInputReflection| x.location);
    }

    Ok(KilnShaderReflection {
        stage,
        entry_point: entry_point.to_string(),
        constant_buffers,
        vertex_inputs,
        resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = r#"
struct Globals {
    tint: vec2<f32>,
    light_dir: vec3<f32>,
    intensity: f32,
}

struct Skinning {
    bone_count: u32,
}

@group(0) @binding(3) var<uniform> globals: Globals;
@group(0) @binding(1) var<uniform> skinning: Skinning;
@group(0) @binding(0) var albedo: texture_2d<f32>;
@group(0) @binding(2) var albedo_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(2) bone: u32,
}

@vertex
fn vs_main(input: VertexInput, @location(1) uv: vec2<i32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(input.position * globals.intensity, f32(input.bone + skinning.bone_count));
}

@fragment
fn ps_main() -> @location(0) vec4<f32> {
    return textureSample(albedo, albedo_sampler, vec2<f32>(0.5, 0.5)) * vec4<f32>(globals.tint, 0.0, 1.0);
}

fn gs_main(light: vec3<f32>) -> vec3<f32> {
    return light * globals.light_dir;
}
"#;

    #[test]
    fn reflects_vertex_shader() {
        let (module, info) = compile_wgsl(SHADER).unwrap();
        let reflection = reflect_shader(&module, &info, KilnShaderStage::Vertex, "vs_main").unwrap();

        assert_eq!(reflection.constant_buffers.len(), 2);
        let globals = reflection.find_constant_buffer("Globals").unwrap();
        assert_eq!(globals.name, "globals");
        assert_eq!(globals.slot, 3);
        assert_eq!(globals.size, 32);
        assert_eq!(
            globals.variables,
            vec![
                KilnConstantVariableReflection {
                    name: "tint".to_string(),
                    offset: 0,
                    size: 8
                },
                KilnConstantVariableReflection {
                    name: "light_dir".to_string(),
                    offset: 16,
                    size: 12
                },
                KilnConstantVariableReflection {
                    name: "intensity".to_string(),
                    offset: 28,
                    size: 4
                },
            ]
        );
        assert!(reflection.find_constant_buffer("skinning").is_some());
        assert!(reflection.resources.is_empty());

        let locations: Vec<(u32, KilnComponentKind)> = reflection
            .vertex_inputs
            .iter()
            .map(|x| (x.location, x.component_kind))
            .collect();
        assert_eq!(
            locations,
            vec![
                (0, KilnComponentKind::Float),
                (1, KilnComponentKind::Sint),
                (2, KilnComponentKind::Uint)
            ]
        );
    }

    #[test]
    fn reflects_pixel_and_geometry_functions() {
        let (module, info) = compile_wgsl(SHADER).unwrap();

        let pixel = reflect_shader(&module, &info, KilnShaderStage::Pixel, "ps_main").unwrap();
        assert_eq!(pixel.constant_buffers.len(), 1);
        assert!(pixel.vertex_inputs.is_empty());
        assert_eq!(
            pixel.find_resource("albedo").map(|x| (x.resource_type, x.slot)),
            Some((KilnShaderResourceType::Texture, 0))
        );
        assert_eq!(
            pixel
                .find_resource("albedo_sampler")
                .map(|x| (x.resource_type, x.slot)),
            Some((KilnShaderResourceType::Sampler, 2))
        );

        let geometry =
            reflect_shader(&module, &info, KilnShaderStage::Geometry, "gs_main").unwrap();
        assert_eq!(geometry.constant_buffers.len(), 1);
        assert_eq!(geometry.constant_buffers[0].slot, 3);
    }

    #[test]
    fn stage_and_entry_point_mismatches_fail() {
        let (module, info) = compile_wgsl(SHADER).unwrap();
        assert!(reflect_shader(&module, &info, KilnShaderStage::Pixel, "vs_main").is_err());
        assert!(reflect_shader(&module, &info, KilnShaderStage::Vertex, "missing").is_err());
        assert!(reflect_shader(&module, &info, KilnShaderStage::Geometry, "missing").is_err());
    }

    #[test]
    fn nonzero_groups_fail() {
        let source = r#"
struct Globals {
    tint: vec4<f32>,
}

struct Material {
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> material: Material;

@fragment
fn ps_main() -> @location(0) vec4<f32> {
    return globals.tint * material.color;
}

@fragment
fn ps_globals_only() -> @location(0) vec4<f32> {
    return globals.tint;
}
"#;
        let (module, info) = compile_wgsl(source).unwrap();
        assert!(reflect_shader(&module, &info, KilnShaderStage::Pixel, "ps_main").is_err());

        // Globals the entry point never touches don't matter
        let globals_only =
            reflect_shader(&module, &info, KilnShaderStage::Pixel, "ps_globals_only").unwrap();
        assert_eq!(globals_only.constant_buffers.len(), 1);
    }

    #[test]
    fn compile_errors_are_reported() {
        match compile_wgsl("fn broken( {") {
            Err(KilnError::ShaderCompileError(message)) => assert!(!message.is_empty()),
            other => panic!("expected a compile error, got {:?}", other.map(|_| ())),
        }
    }
}
