use crate::soft::{KilnBufferSoft, KilnMappedSubresourceSoft};
use crate::{
    KilnBufferInfo, KilnMapPolicy, KilnResult, KilnSubresourceLayout, KilnTextureInfo,
};

/// A piece of memory the GPU can access: a vertex, index or constant buffer, or a texture.
///
/// Cloning is a reference count increment. Views of the buffer hold their own reference, so the
/// memory lives as long as the last view or handle.
#[derive(Clone, Debug)]
pub enum KilnBuffer {
    Soft(KilnBufferSoft),
}

impl KilnBuffer {
    pub fn buffer_info(&self) -> &KilnBufferInfo {
        match self {
            KilnBuffer::Soft(inner) => inner.buffer_info(),
        }
    }

    /// Set for texture buffers only
    pub fn texture_info(&self) -> Option<&KilnTextureInfo> {
        self.buffer_info().texture.as_ref()
    }

    pub fn subresource_layout(
        &self,
        subresource: u32,
    ) -> KilnResult<KilnSubresourceLayout> {
        self.buffer_info().subresource_layout(subresource)
    }

    /// True if both handles refer to the same buffer
    pub fn same_buffer(
        &self,
        other: &KilnBuffer,
    ) -> bool {
        match (self, other) {
            (KilnBuffer::Soft(a), KilnBuffer::Soft(b)) => a.handle() == b.handle(),
        }
    }

    pub fn soft_buffer(&self) -> Option<&KilnBufferSoft> {
        match self {
            KilnBuffer::Soft(inner) => Some(inner),
        }
    }
}

/// CPU access to one mapped subresource. Rows are `row_pitch` bytes apart but only
/// `row_byte_width` bytes of each row are reachable, so pitch padding can't be written.
///
/// Dropping the mapping unmaps the subresource.
#[derive(Debug)]
pub enum KilnMappedSubresource<'a> {
    Soft(KilnMappedSubresourceSoft<'a>),
}

impl<'a> KilnMappedSubresource<'a> {
    pub fn subresource(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.subresource(),
        }
    }

    pub fn policy(&self) -> KilnMapPolicy {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.policy(),
        }
    }

    pub fn row_pitch(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.row_pitch(),
        }
    }

    /// Distance between depth slices. Only meaningful for 3D textures.
    pub fn depth_pitch(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.depth_pitch(),
        }
    }

    pub fn row_count(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.row_count(),
        }
    }

    pub fn depth_count(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.depth_count(),
        }
    }

    pub fn row_byte_width(&self) -> u32 {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.row_byte_width(),
        }
    }

    /// Fails for write-only mappings and out of range rows
    pub fn row(
        &self,
        depth_slice: u32,
        row: u32,
    ) -> KilnResult<&[u8]> {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.row(depth_slice, row),
        }
    }

    /// Fails for read-only mappings and out of range rows
    pub fn row_mut(
        &mut self,
        depth_slice: u32,
        row: u32,
    ) -> KilnResult<&mut [u8]> {
        match self {
            KilnMappedSubresource::Soft(inner) => inner.row_mut(depth_slice, row),
        }
    }

    pub fn unmap(self) {
        drop(self);
    }
}
