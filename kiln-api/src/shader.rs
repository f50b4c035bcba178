use crate::soft::KilnShaderSoft;
use crate::*;

/// A compiled shader for one stage, with the reflection data of its entry point
#[derive(Clone, Debug)]
pub enum KilnShader {
    Soft(KilnShaderSoft),
}

impl KilnShader {
    pub fn stage(&self) -> KilnShaderStage {
        match self {
            KilnShader::Soft(inner) => inner.stage(),
        }
    }

    pub fn entry_point(&self) -> &str {
        match self {
            KilnShader::Soft(inner) => inner.entry_point(),
        }
    }

    pub fn reflection(&self) -> &KilnShaderReflection {
        match self {
            KilnShader::Soft(inner) => inner.reflection(),
        }
    }

    pub fn soft_shader(&self) -> Option<&KilnShaderSoft> {
        match self {
            KilnShader::Soft(inner) => Some(inner),
        }
    }
}

/// The shaders bound together for a draw. Vertex and pixel shaders are required.
#[derive(Clone, Debug)]
pub struct KilnRenderProgram {
    vertex_shader: KilnShader,
    pixel_shader: KilnShader,
    geometry_shader: Option<KilnShader>,
}

fn verify_stage(
    shader: &KilnShader,
    expected: KilnShaderStage,
) -> KilnResult<()> {
    if shader.stage() != expected {
        return Err(format!(
            "Render program expected a {:?} shader but {} was compiled as a {:?} shader",
            expected,
            shader.entry_point(),
            shader.stage()
        ))?;
    }

    Ok(())
}

impl KilnRenderProgram {
    pub(crate) fn new(
        vertex_shader: &KilnShader,
        pixel_shader: &KilnShader,
        geometry_shader: Option<&KilnShader>,
    ) -> KilnResult<Self> {
        verify_stage(vertex_shader, KilnShaderStage::Vertex)?;
        verify_stage(pixel_shader, KilnShaderStage::Pixel)?;
        if let Some(geometry_shader) = geometry_shader {
            verify_stage(geometry_shader, KilnShaderStage::Geometry)?;
        }

        Ok(KilnRenderProgram {
            vertex_shader: vertex_shader.clone(),
            pixel_shader: pixel_shader.clone(),
            geometry_shader: geometry_shader.cloned(),
        })
    }

    pub fn vertex_shader(&self) -> &KilnShader {
        &self.vertex_shader
    }

    pub fn pixel_shader(&self) -> &KilnShader {
        &self.pixel_shader
    }

    pub fn geometry_shader(&self) -> Option<&KilnShader> {
        self.geometry_shader.as_ref()
    }

    /// Vertex, pixel, then geometry if present
    pub fn shaders(&self) -> impl Iterator<Item = &KilnShader> {
        std::iter::once(&self.vertex_shader)
            .chain(std::iter::once(&self.pixel_shader))
            .chain(self.geometry_shader.iter())
    }

    /// The shader bound to `stage`, if any
    pub fn shader(
        &self,
        stage: KilnShaderStage,
    ) -> Option<&KilnShader> {
        match stage {
            KilnShaderStage::Vertex => Some(&self.vertex_shader),
            KilnShaderStage::Pixel => Some(&self.pixel_shader),
            KilnShaderStage::Geometry => self.geometry_shader.as_ref(),
        }
    }
}
