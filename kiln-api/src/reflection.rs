use crate::{KilnComponentKind, KilnShaderStage};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// A member of a constant buffer block, as laid out by the shader compiler
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnConstantVariableReflection {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnConstantBufferReflection {
    /// Name of the uniform variable
    pub name: String,
    /// Name of the variable's struct type, if it has one
    pub type_name: Option<String>,
    pub slot: u32,
    /// Byte size of the whole block including trailing padding
    pub size: u32,
    pub variables: Vec<KilnConstantVariableReflection>,
}

impl KilnConstantBufferReflection {
    /// Blocks can be referred to by their variable name or their struct type name
    pub fn matches_block_name(
        &self,
        block_name: &str,
    ) -> bool {
        self.name == block_name || self.type_name.as_deref() == Some(block_name)
    }

    pub fn find_variable(
        &self,
        name: &str,
    ) -> Option<&KilnConstantVariableReflection> {
        self.variables.iter().find(|x| x.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnVertexInputReflection {
    pub name: Option<String>,
    pub location: u32,
    pub component_kind: KilnComponentKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnShaderResourceType {
    Texture,
    Sampler,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnShaderResourceReflection {
    pub name: Option<String>,
    pub resource_type: KilnShaderResourceType,
    pub slot: u32,
}

/// Everything the compiler reports about one compiled shader. Only resources the entry point
/// actually uses are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnShaderReflection {
    pub stage: KilnShaderStage,
    pub entry_point: String,
    pub constant_buffers: Vec<KilnConstantBufferReflection>,
    /// Sorted by location. Empty for stages other than vertex.
    pub vertex_inputs: Vec<KilnVertexInputReflection>,
    pub resources: Vec<KilnShaderResourceReflection>,
}

impl KilnShaderReflection {
    pub fn find_constant_buffer(
        &self,
        block_name: &str,
    ) -> Option<&KilnConstantBufferReflection> {
        self.constant_buffers
            .iter()
            .find(|x| x.matches_block_name(block_name))
    }

    pub fn find_resource(
        &self,
        name: &str,
    ) -> Option<&KilnShaderResourceReflection> {
        self.resources
            .iter()
            .find(|x| x.name.as_deref() == Some(name))
    }
}
