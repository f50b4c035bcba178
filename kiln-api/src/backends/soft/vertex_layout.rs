use crate::soft::{KilnBufferSoft, KilnDeviceSoft, SoftHandle, SoftIndexBufferBinding, SoftVertexBufferBinding};
use crate::{
    KilnBuffer, KilnPrimitiveTopology, KilnResult, KilnVertexElement, KilnVertexLayout,
    KilnVertexStreamDef,
};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct KilnVertexLayoutSoft {
    handle: SoftHandle,
    elements: Arc<Vec<KilnVertexElement>>,
}

impl KilnVertexLayoutSoft {
    pub fn handle(&self) -> SoftHandle {
        self.handle
    }

    pub fn elements(&self) -> &[KilnVertexElement] {
        &self.elements
    }

    pub fn new(
        device: &KilnDeviceSoft,
        elements: Vec<KilnVertexElement>,
    ) -> KilnResult<Self> {
        let handle = device.allocate_handle();
        log::trace!(
            "Created vertex layout {:?} with {} elements",
            handle,
            elements.len()
        );

        Ok(KilnVertexLayoutSoft {
            handle,
            elements: Arc::new(elements),
        })
    }
}

fn soft_buffer(buffer: &KilnBuffer) -> &KilnBufferSoft {
    match buffer {
        KilnBuffer::Soft(inner) => inner,
    }
}

#[derive(Debug)]
struct KilnVertexStreamSoftInner {
    handle: SoftHandle,
    vertex_layout: KilnVertexLayoutSoft,
    // Retained so the bound memory outlives the client's handles
    _buffers: Vec<KilnBufferSoft>,
    vertex_buffer_bindings: Vec<SoftVertexBufferBinding>,
    index_buffer_binding: Option<SoftIndexBufferBinding>,
    topology: KilnPrimitiveTopology,
}

#[derive(Clone, Debug)]
pub struct KilnVertexStreamSoft {
    inner: Arc<KilnVertexStreamSoftInner>,
}

impl KilnVertexStreamSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn vertex_layout(&self) -> &KilnVertexLayoutSoft {
        &self.inner.vertex_layout
    }

    pub fn vertex_buffer_bindings(&self) -> &[SoftVertexBufferBinding] {
        &self.inner.vertex_buffer_bindings
    }

    pub fn vertex_buffer_count(&self) -> usize {
        self.inner.vertex_buffer_bindings.len()
    }

    pub fn index_buffer(&self) -> Option<SoftIndexBufferBinding> {
        self.inner.index_buffer_binding
    }

    pub fn topology(&self) -> KilnPrimitiveTopology {
        self.inner.topology
    }

    pub fn new(
        device: &KilnDeviceSoft,
        vertex_stream_def: &KilnVertexStreamDef,
    ) -> KilnResult<Self> {
        let vertex_layout = match vertex_stream_def.vertex_layout {
            KilnVertexLayout::Soft(inner) => inner.clone(),
        };

        let mut buffers = Vec::with_capacity(vertex_stream_def.vertex_buffers.len() + 1);
        let mut vertex_buffer_bindings = Vec::with_capacity(vertex_stream_def.vertex_buffers.len());
        for binding in vertex_stream_def.vertex_buffers {
            let buffer = soft_buffer(binding.buffer);
            vertex_buffer_bindings.push(SoftVertexBufferBinding {
                buffer: buffer.handle(),
                stride: binding.stride,
                offset: binding.offset,
            });
            buffers.push(buffer.clone());
        }

        let index_buffer_binding = vertex_stream_def.index_buffer.map(|binding| {
            let buffer = soft_buffer(binding.buffer);
            buffers.push(buffer.clone());
            SoftIndexBufferBinding {
                buffer: buffer.handle(),
                format: binding.format,
                offset: binding.offset,
            }
        });

        if device.validation_enabled() {
            for element in vertex_layout.elements() {
                if element.buffer_slot as usize >= vertex_buffer_bindings.len() {
                    log::warn!(
                        "Vertex location {} reads buffer slot {} but the stream only binds {} buffers",
                        element.location,
                        element.buffer_slot,
                        vertex_buffer_bindings.len()
                    );
                }
            }
        }

        let handle = device.allocate_handle();
        log::trace!(
            "Created vertex stream {:?}, {} vertex buffers, indexed {}, {:?}",
            handle,
            vertex_buffer_bindings.len(),
            index_buffer_binding.is_some(),
            vertex_stream_def.topology
        );

        Ok(KilnVertexStreamSoft {
            inner: Arc::new(KilnVertexStreamSoftInner {
                handle,
                vertex_layout,
                _buffers: buffers,
                vertex_buffer_bindings,
                index_buffer_binding,
                topology: vertex_stream_def.topology,
            }),
        })
    }
}
