use super::internal::preprocessor::preprocess;
use super::internal::reflection::{compile_wgsl, reflect_shader};
use crate::soft::{KilnDeviceSoft, SoftHandle};
use crate::{
    KilnResult, KilnShaderDef, KilnShaderLanguage, KilnShaderOptimization, KilnShaderReflection,
    KilnShaderStage,
};
use std::sync::Arc;

struct KilnShaderSoftInner {
    handle: SoftHandle,
    stage: KilnShaderStage,
    entry_point: String,
    target_profile: &'static str,
    optimization: KilnShaderOptimization,
    module: naga::Module,
    reflection: KilnShaderReflection,
}

/// A validated WGSL module and the reflection of the entry point compiled from it
#[derive(Clone)]
pub struct KilnShaderSoft {
    inner: Arc<KilnShaderSoftInner>,
}

impl std::fmt::Debug for KilnShaderSoft {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KilnShaderSoft")
            .field("handle", &self.inner.handle)
            .field("stage", &self.inner.stage)
            .field("entry_point", &self.inner.entry_point)
            .field("target_profile", &self.inner.target_profile)
            .finish()
    }
}

impl KilnShaderSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn stage(&self) -> KilnShaderStage {
        self.inner.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.inner.entry_point
    }

    pub fn target_profile(&self) -> &'static str {
        self.inner.target_profile
    }

    pub fn optimization(&self) -> KilnShaderOptimization {
        self.inner.optimization
    }

    /// The parsed module the shader was compiled from
    pub fn module(&self) -> &naga::Module {
        &self.inner.module
    }

    pub fn reflection(&self) -> &KilnShaderReflection {
        &self.inner.reflection
    }

    pub fn new(
        device: &KilnDeviceSoft,
        shader_def: &KilnShaderDef,
    ) -> KilnResult<Self> {
        if shader_def.language != KilnShaderLanguage::Wgsl {
            return Err(format!(
                "The soft backend only compiles WGSL, got {:?} source",
                shader_def.language
            ))?;
        }

        if shader_def.entry_point.is_empty() {
            return Err("Shaders need an entry point")?;
        }

        let target_profile = shader_def.stage.target_profile();
        let source = {
            profiling::scope!("preprocess shader");
            preprocess(shader_def.source, shader_def.defines)?
        };

        let (module, module_info) = {
            profiling::scope!("compile shader");
            compile_wgsl(&source)?
        };

        let reflection = reflect_shader(
            &module,
            &module_info,
            shader_def.stage,
            shader_def.entry_point,
        )?;

        let handle = device.allocate_handle();
        log::debug!(
            "Compiled shader {:?} {} for {} with {} constant buffers, {} resources, {} vertex inputs",
            handle,
            shader_def.entry_point,
            target_profile,
            reflection.constant_buffers.len(),
            reflection.resources.len(),
            reflection.vertex_inputs.len()
        );

        Ok(KilnShaderSoft {
            inner: Arc::new(KilnShaderSoftInner {
                handle,
                stage: shader_def.stage,
                entry_point: shader_def.entry_point.to_string(),
                target_profile,
                optimization: shader_def.optimization,
                module,
                reflection,
            }),
        })
    }
}
