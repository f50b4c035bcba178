use crate::soft::{KilnDeviceSoft, SoftCommand, SoftContext, SoftHandle};
use crate::*;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

// alignment must be a power of two
fn align_up(
    value: u32,
    alignment: u32,
) -> Option<u32> {
    let mask = alignment.checked_sub(1)?;
    Some(value.checked_add(mask)? & !mask)
}

struct SoftSubresource {
    layout: KilnSubresourceLayout,
    row_pitch: u32,
    depth_pitch: u32,
    // Locked for as long as the subresource is mapped
    memory: Mutex<Vec<u8>>,
}

impl SoftSubresource {
    fn new(
        layout: KilnSubresourceLayout,
        row_pitch: u32,
        depth_pitch: u32,
        packed_data: Option<&[u8]>,
    ) -> Self {
        let mut memory = vec![0u8; depth_pitch as usize * layout.depth_count as usize];
        if let Some(packed_data) = packed_data {
            write_packed_rows(&layout, row_pitch, depth_pitch, &mut memory, packed_data);
        }

        SoftSubresource {
            layout,
            row_pitch,
            depth_pitch,
            memory: Mutex::new(memory),
        }
    }

    fn row_offset(
        &self,
        depth_slice: u32,
        row: u32,
    ) -> usize {
        depth_slice as usize * self.depth_pitch as usize + row as usize * self.row_pitch as usize
    }
}

// packed_data must hold at least the packed size of the layout
fn write_packed_rows(
    layout: &KilnSubresourceLayout,
    row_pitch: u32,
    depth_pitch: u32,
    memory: &mut [u8],
    packed_data: &[u8],
) {
    let row_byte_width = layout.row_byte_width as usize;
    let mut rows = packed_data.chunks_exact(row_byte_width);
    for depth_slice in 0..layout.depth_count as usize {
        for row in 0..layout.row_count as usize {
            let source = match rows.next() {
                Some(source) => source,
                None => return,
            };
            let offset = depth_slice * depth_pitch as usize + row * row_pitch as usize;
            memory[offset..offset + row_byte_width].copy_from_slice(source);
        }
    }
}

fn read_packed_rows(
    layout: &KilnSubresourceLayout,
    row_pitch: u32,
    depth_pitch: u32,
    memory: &[u8],
) -> Vec<u8> {
    let row_byte_width = layout.row_byte_width as usize;
    let mut packed = Vec::with_capacity(layout.packed_byte_size() as usize);
    for depth_slice in 0..layout.depth_count as usize {
        for row in 0..layout.row_count as usize {
            let offset = depth_slice * depth_pitch as usize + row * row_pitch as usize;
            packed.extend_from_slice(&memory[offset..offset + row_byte_width]);
        }
    }
    packed
}

struct KilnBufferSoftInner {
    handle: SoftHandle,
    buffer_info: KilnBufferInfo,
    subresources: Vec<SoftSubresource>,
    context: SoftContext,
}

/// Host memory split into subresources. Texture rows are padded to the device's row pitch
/// alignment, other buffers are one tightly packed row.
#[derive(Clone)]
pub struct KilnBufferSoft {
    inner: Arc<KilnBufferSoftInner>,
}

impl std::fmt::Debug for KilnBufferSoft {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KilnBufferSoft")
            .field("handle", &self.inner.handle)
            .field("buffer_info", &self.inner.buffer_info)
            .finish()
    }
}

impl KilnBufferSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn buffer_info(&self) -> &KilnBufferInfo {
        &self.inner.buffer_info
    }

    pub fn texture_info(&self) -> Option<&KilnTextureInfo> {
        self.inner.buffer_info.texture.as_ref()
    }

    fn subresource(
        &self,
        subresource: u32,
    ) -> KilnResult<&SoftSubresource> {
        self.inner
            .subresources
            .get(subresource as usize)
            .ok_or_else(|| {
                KilnError::StringError(format!(
                    "Subresource {} is out of range, buffer has {}",
                    subresource,
                    self.inner.subresources.len()
                ))
            })
    }

    pub fn new(
        device: &KilnDeviceSoft,
        buffer_type: KilnBufferType,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<Self> {
        buffer_def.verify(buffer_type)?;

        let buffer_info = KilnBufferInfo::for_buffer(buffer_type, buffer_def);
        let layout = buffer_info.subresource_layout(0)?;
        let subresource = SoftSubresource::new(
            layout,
            layout.row_byte_width,
            layout.row_byte_width,
            buffer_def.initial_data,
        );

        let handle = device.allocate_handle();
        log::debug!(
            "Created soft {:?} buffer {:?}, {} bytes, {:?} usage",
            buffer_type,
            handle,
            buffer_def.size,
            buffer_def.usage
        );

        Ok(KilnBufferSoft {
            inner: Arc::new(KilnBufferSoftInner {
                handle,
                buffer_info,
                subresources: vec![subresource],
                context: device.context().clone(),
            }),
        })
    }

    fn resolve_samples_quality(
        device: &KilnDeviceSoft,
        texture_def: &KilnTextureBufferDef,
    ) -> KilnResult<u32> {
        let samples_count = texture_def.samples_count.max(1);
        let quality_levels = device.multisample_quality_levels(samples_count);
        if quality_levels == 0 {
            return Err(format!(
                "Sample count {} is not supported, max is {}",
                samples_count,
                device.device_info().max_sample_count
            ))?;
        }

        match texture_def.samples_quality {
            KilnSampleQuality::MaxAvailable => Ok(quality_levels - 1),
            KilnSampleQuality::Level(level) if level < quality_levels => Ok(level),
            KilnSampleQuality::Level(level) => Err(format!(
                "Sample quality {} is out of range, {} samples support {} levels",
                level, samples_count, quality_levels
            ))?,
        }
    }

    /// Row and depth pitch for a mip. 1D textures are a single row, so they aren't padded.
    fn texture_pitches(
        device: &KilnDeviceSoft,
        dimensions: KilnTextureDimensions,
        layout: &KilnSubresourceLayout,
    ) -> KilnResult<(u32, u32)> {
        match dimensions {
            KilnTextureDimensions::Dim1D => Ok((layout.row_byte_width, layout.row_byte_width)),
            KilnTextureDimensions::Dim2D | KilnTextureDimensions::Dim3D => {
                let row_pitch = align_up(layout.row_byte_width, device.row_pitch_alignment())
                    .ok_or_else(|| {
                        format!(
                            "Row of {} bytes can't be padded to a multiple of {}",
                            layout.row_byte_width,
                            device.row_pitch_alignment()
                        )
                    })?;
                let depth_pitch = row_pitch.checked_mul(layout.row_count).ok_or_else(|| {
                    format!(
                        "{} rows of {} bytes don't fit in a 32 bit depth pitch",
                        layout.row_count, row_pitch
                    )
                })?;
                Ok((row_pitch, depth_pitch))
            }
        }
    }

    pub fn new_texture(
        device: &KilnDeviceSoft,
        texture_def: &KilnTextureBufferDef,
    ) -> KilnResult<Self> {
        texture_def.verify()?;

        let dimensions = texture_def
            .buffer_type
            .texture_dimensions()
            .ok_or("Texture buffers need a texture buffer type")?;
        let samples_quality = Self::resolve_samples_quality(device, texture_def)?;
        let texture_info = KilnTextureInfo::from_def(texture_def, samples_quality);
        let buffer_info = KilnBufferInfo::for_texture(texture_def, texture_info);
        texture_def.verify_initial_data(buffer_info.byte_size)?;

        let handle = device.allocate_handle();
        let extents = texture_info.extents;
        match dimensions {
            KilnTextureDimensions::Dim1D => log::debug!(
                "Creating soft 1D texture {:?}, width {} x{} {:?}",
                handle,
                extents.width,
                texture_info.array_size,
                texture_info.format
            ),
            KilnTextureDimensions::Dim2D => log::debug!(
                "Creating soft 2D texture {:?}, {}x{} x{} {:?}, {} samples (quality {})",
                handle,
                extents.width,
                extents.height,
                texture_info.array_size,
                texture_info.format,
                texture_info.samples_count,
                texture_info.samples_quality
            ),
            KilnTextureDimensions::Dim3D => log::debug!(
                "Creating soft 3D texture {:?}, {}x{}x{} {:?}",
                handle,
                extents.width,
                extents.height,
                extents.depth,
                texture_info.format
            ),
        }

        // Every array slice has the same mip chain
        let mut mip_pitches = Vec::with_capacity(texture_info.mip_levels as usize);
        let mut slice_byte_size = 0u64;
        for mip_slice in 0..texture_info.mip_levels {
            let layout = texture_info.mip_layout(mip_slice);
            let (row_pitch, depth_pitch) = Self::texture_pitches(device, dimensions, &layout)?;
            slice_byte_size += depth_pitch as u64 * layout.depth_count as u64;
            mip_pitches.push((layout, row_pitch, depth_pitch));
        }

        let padded_byte_size = slice_byte_size * texture_info.array_size as u64;
        if padded_byte_size > device.max_texture_byte_size() {
            return Err(format!(
                "Texture needs {} bytes of host memory, the device allows {}",
                padded_byte_size,
                device.max_texture_byte_size()
            ))?;
        }

        // Initial data is every mip of array slice 0, then every mip of slice 1, etc. which is
        // also subresource index order
        let mut subresources = Vec::with_capacity(texture_info.subresource_count() as usize);
        let mut data_offset = 0usize;
        for _array_slice in 0..texture_info.array_size {
            for &(layout, row_pitch, depth_pitch) in &mip_pitches {
                let packed_data = texture_def.initial_data.map(|data| {
                    let start = data_offset;
                    data_offset += layout.packed_byte_size() as usize;
                    &data[start..data_offset]
                });

                subresources.push(SoftSubresource::new(
                    layout,
                    row_pitch,
                    depth_pitch,
                    packed_data,
                ));
            }
        }

        Ok(KilnBufferSoft {
            inner: Arc::new(KilnBufferSoftInner {
                handle,
                buffer_info,
                subresources,
                context: device.context().clone(),
            }),
        })
    }

    /// Map a subresource. Fails if the policy isn't allowed by the buffer's usage and CPU access,
    /// or if the subresource is already mapped.
    pub fn map(
        &self,
        subresource: u32,
        policy: KilnMapPolicy,
    ) -> KilnResult<KilnMappedSubresourceSoft<'_>> {
        let buffer_info = &self.inner.buffer_info;
        policy.verify(buffer_info.usage, buffer_info.access)?;

        let soft_subresource = self.subresource(subresource)?;
        let memory = match soft_subresource.memory.try_lock() {
            Ok(memory) => memory,
            Err(TryLockError::WouldBlock) => Err(format!(
                "Subresource {} of buffer {:?} is already mapped",
                subresource, self.inner.handle
            ))?,
            // A mapping dropped during a panic leaves valid bytes behind
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        self.inner.context.record(SoftCommand::Map {
            buffer: self.inner.handle,
            subresource,
            policy,
        });

        Ok(KilnMappedSubresourceSoft {
            buffer: self,
            subresource_index: subresource,
            subresource: soft_subresource,
            policy,
            memory,
        })
    }

    /// Calls `f` with the meaningful bytes of every row of a subresource. Used by clears, which
    /// don't go through a mapping.
    pub(crate) fn fill_rows<F: FnMut(&mut [u8])>(
        &self,
        subresource: u32,
        mut f: F,
    ) -> KilnResult<()> {
        let soft_subresource = self.subresource(subresource)?;
        let mut memory = match soft_subresource.memory.try_lock() {
            Ok(memory) => memory,
            Err(TryLockError::WouldBlock) => Err(format!(
                "Subresource {} of buffer {:?} is mapped and can't be cleared",
                subresource, self.inner.handle
            ))?,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        let layout = &soft_subresource.layout;
        let row_byte_width = layout.row_byte_width as usize;
        for depth_slice in 0..layout.depth_count {
            for row in 0..layout.row_count {
                let offset = soft_subresource.row_offset(depth_slice, row);
                f(&mut memory[offset..offset + row_byte_width]);
            }
        }

        Ok(())
    }

    /// Tightly packed copy of a subresource's contents
    pub fn read_subresource(
        &self,
        subresource: u32,
    ) -> KilnResult<Vec<u8>> {
        let soft_subresource = self.subresource(subresource)?;
        let memory = match soft_subresource.memory.try_lock() {
            Ok(memory) => memory,
            Err(TryLockError::WouldBlock) => Err(format!(
                "Subresource {} of buffer {:?} is mapped and can't be read",
                subresource, self.inner.handle
            ))?,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        Ok(read_packed_rows(
            &soft_subresource.layout,
            soft_subresource.row_pitch,
            soft_subresource.depth_pitch,
            &memory,
        ))
    }

    /// Copies one subresource of `source` into a subresource of this buffer with the same layout
    pub(crate) fn copy_subresource_from(
        &self,
        subresource: u32,
        source: &KilnBufferSoft,
        source_subresource: u32,
    ) -> KilnResult<()> {
        let destination = self.subresource(subresource)?;
        if source.subresource(source_subresource)?.layout != destination.layout {
            return Err("Subresource copies need matching layouts")?;
        }

        let packed = source.read_subresource(source_subresource)?;
        let mut memory = match destination.memory.try_lock() {
            Ok(memory) => memory,
            Err(TryLockError::WouldBlock) => Err(format!(
                "Subresource {} of buffer {:?} is mapped and can't be copied into",
                subresource, self.inner.handle
            ))?,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        write_packed_rows(
            &destination.layout,
            destination.row_pitch,
            destination.depth_pitch,
            &mut memory,
            &packed,
        );
        Ok(())
    }
}

/// A mapped subresource of a `KilnBufferSoft`. Unmaps on drop.
pub struct KilnMappedSubresourceSoft<'a> {
    buffer: &'a KilnBufferSoft,
    subresource_index: u32,
    subresource: &'a SoftSubresource,
    policy: KilnMapPolicy,
    memory: MutexGuard<'a, Vec<u8>>,
}

impl<'a> std::fmt::Debug for KilnMappedSubresourceSoft<'a> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KilnMappedSubresourceSoft")
            .field("buffer", &self.buffer.handle())
            .field("subresource", &self.subresource_index)
            .field("policy", &self.policy)
            .field("row_pitch", &self.subresource.row_pitch)
            .finish()
    }
}

impl<'a> KilnMappedSubresourceSoft<'a> {
    pub fn subresource(&self) -> u32 {
        self.subresource_index
    }

    pub fn policy(&self) -> KilnMapPolicy {
        self.policy
    }

    pub fn row_pitch(&self) -> u32 {
        self.subresource.row_pitch
    }

    pub fn depth_pitch(&self) -> u32 {
        self.subresource.depth_pitch
    }

    pub fn row_count(&self) -> u32 {
        self.subresource.layout.row_count
    }

    pub fn depth_count(&self) -> u32 {
        self.subresource.layout.depth_count
    }

    pub fn row_byte_width(&self) -> u32 {
        self.subresource.layout.row_byte_width
    }

    fn row_range(
        &self,
        depth_slice: u32,
        row: u32,
    ) -> KilnResult<std::ops::Range<usize>> {
        let layout = &self.subresource.layout;
        if depth_slice >= layout.depth_count || row >= layout.row_count {
            return Err(format!(
                "Row {} of depth slice {} is out of range, subresource has {} rows and {} depth slices",
                row, depth_slice, layout.row_count, layout.depth_count
            ))?;
        }

        let offset = self.subresource.row_offset(depth_slice, row);
        Ok(offset..offset + layout.row_byte_width as usize)
    }

    pub fn row(
        &self,
        depth_slice: u32,
        row: u32,
    ) -> KilnResult<&[u8]> {
        if !self.policy.is_readable() {
            return Err(format!(
                "Can't read from a subresource mapped {:?}",
                self.policy
            ))?;
        }

        let range = self.row_range(depth_slice, row)?;
        Ok(&self.memory[range])
    }

    pub fn row_mut(
        &mut self,
        depth_slice: u32,
        row: u32,
    ) -> KilnResult<&mut [u8]> {
        if !self.policy.is_writable() {
            return Err(format!(
                "Can't write to a subresource mapped {:?}",
                self.policy
            ))?;
        }

        let range = self.row_range(depth_slice, row)?;
        Ok(&mut self.memory[range])
    }
}

impl<'a> Drop for KilnMappedSubresourceSoft<'a> {
    fn drop(&mut self) {
        self.buffer.inner.context.record(SoftCommand::Unmap {
            buffer: self.buffer.inner.handle,
            subresource: self.subresource_index,
        });
    }
}
