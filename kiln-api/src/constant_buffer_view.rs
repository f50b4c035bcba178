use crate::{
    KilnBuffer, KilnConstantBufferViewDef, KilnRenderProgram, KilnResult, KilnShaderReflection,
    KilnShaderStage, KILN_CONSTANT_BUFFER_SLOT_UNUSED,
};
use fnv::FnvHashMap;

/// Copies `size` bytes from `source_offset` in CPU data to `destination_offset` in the GPU block
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KilnConstantPlacement {
    pub source_offset: u32,
    pub destination_offset: u32,
    pub size: u32,
}

/// Translates a CPU-side constant layout into the layout the shader compiler chose for the block.
///
/// When every constant already sits at its GPU offset there are no entries and updates are one
/// bulk copy. Otherwise each entry is a run of bytes contiguous on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KilnConstantPlacementMap {
    cpu_size: u32,
    gpu_size: u32,
    entries: Option<Vec<KilnConstantPlacement>>,
}

/// Bind slot of a constant buffer view for each stage. Stages that don't reference the block hold
/// `KILN_CONSTANT_BUFFER_SLOT_UNUSED`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KilnConstantBufferSlots {
    pub vertex: u32,
    pub pixel: u32,
    pub geometry: u32,
}

impl Default for KilnConstantBufferSlots {
    fn default() -> Self {
        KilnConstantBufferSlots {
            vertex: KILN_CONSTANT_BUFFER_SLOT_UNUSED,
            pixel: KILN_CONSTANT_BUFFER_SLOT_UNUSED,
            geometry: KILN_CONSTANT_BUFFER_SLOT_UNUSED,
        }
    }
}

impl KilnConstantBufferSlots {
    pub fn slot(
        &self,
        stage: KilnShaderStage,
    ) -> Option<u32> {
        let slot = match stage {
            KilnShaderStage::Vertex => self.vertex,
            KilnShaderStage::Pixel => self.pixel,
            KilnShaderStage::Geometry => self.geometry,
        };

        if slot == KILN_CONSTANT_BUFFER_SLOT_UNUSED {
            None
        } else {
            Some(slot)
        }
    }

    fn set_slot(
        &mut self,
        stage: KilnShaderStage,
        slot: u32,
    ) {
        match stage {
            KilnShaderStage::Vertex => self.vertex = slot,
            KilnShaderStage::Pixel => self.pixel = slot,
            KilnShaderStage::Geometry => self.geometry = slot,
        }
    }

    pub fn is_unused(&self) -> bool {
        KilnShaderStage::ALL.iter().all(|x| self.slot(*x).is_none())
    }
}

fn align_up(
    offset: u32,
    alignment: u32,
) -> u32 {
    if alignment <= 1 {
        offset
    } else {
        (offset + alignment - 1) & !(alignment - 1)
    }
}

impl KilnConstantPlacementMap {
    /// Reflects `def` against the stages of a program. `reflections` are searched in order, which
    /// callers keep as vertex, pixel, geometry.
    pub fn from_reflection(
        reflections: &[&KilnShaderReflection],
        def: &KilnConstantBufferViewDef,
    ) -> KilnResult<(KilnConstantPlacementMap, KilnConstantBufferSlots)> {
        def.verify()?;

        let mut slots = KilnConstantBufferSlots::default();
        let mut gpu_size = 0;
        // name -> (offset, size), merged across every stage that uses the block
        let mut gpu_variables = FnvHashMap::<&str, (u32, u32)>::default();

        for reflection in reflections {
            let constant_buffer = match reflection.find_constant_buffer(&def.block_name) {
                Some(constant_buffer) => constant_buffer,
                None => continue,
            };

            if constant_buffer.slot >= KILN_CONSTANT_BUFFER_SLOT_UNUSED {
                return Err(format!(
                    "Constant buffer {} is bound to slot {} in the {:?} stage, max is {}",
                    def.block_name,
                    constant_buffer.slot,
                    reflection.stage,
                    KILN_CONSTANT_BUFFER_SLOT_UNUSED - 1
                ))?;
            }

            slots.set_slot(reflection.stage, constant_buffer.slot);
            gpu_size = gpu_size.max(constant_buffer.size);

            for variable in &constant_buffer.variables {
                let old =
                    gpu_variables.insert(variable.name.as_str(), (variable.offset, variable.size));
                if let Some((offset, size)) = old {
                    if offset != variable.offset || size != variable.size {
                        return Err(format!(
                            "Constant {} in block {} has offset {} size {} in one stage and offset {} size {} in another",
                            variable.name, def.block_name, offset, size, variable.offset, variable.size
                        ))?;
                    }
                }
            }
        }

        if slots.is_unused() {
            return Err(format!(
                "No stage of the render program references constant buffer {}",
                def.block_name
            ))?;
        }

        let mut entries = Vec::<KilnConstantPlacement>::with_capacity(def.constants.len());
        let mut offsets_match = true;
        let mut cpu_offset = 0;

        for constant in &def.constants {
            let source_offset = align_up(cpu_offset, constant.alignment);
            let (destination_offset, gpu_constant_size) = *gpu_variables
                .get(constant.name.as_str())
                .ok_or_else(|| {
                    format!(
                        "Could not find constant {} in block {} in any shader stage",
                        constant.name, def.block_name
                    )
                })?;

            if gpu_constant_size != constant.size {
                return Err(format!(
                    "Constant {} in block {} is {} bytes but the shader declares {} bytes",
                    constant.name, def.block_name, constant.size, gpu_constant_size
                ))?;
            }

            if source_offset != destination_offset {
                offsets_match = false;
            }

            let placement = KilnConstantPlacement {
                source_offset,
                destination_offset,
                size: constant.size,
            };

            match entries.last_mut() {
                Some(last)
                    if last.source_offset + last.size == placement.source_offset
                        && last.destination_offset + last.size == placement.destination_offset =>
                {
                    last.size += placement.size;
                }
                _ => entries.push(placement),
            }

            cpu_offset = source_offset + constant.size;
        }

        let placement_map = KilnConstantPlacementMap {
            cpu_size: cpu_offset,
            gpu_size,
            entries: if offsets_match { None } else { Some(entries) },
        };

        Ok((placement_map, slots))
    }

    /// Bytes the CPU-side data must provide
    pub fn cpu_size(&self) -> u32 {
        self.cpu_size
    }

    /// Byte size of the reflected GPU block
    pub fn gpu_size(&self) -> u32 {
        self.gpu_size
    }

    /// `None` when the layouts agree and updates are a single copy
    pub fn entries(&self) -> Option<&[KilnConstantPlacement]> {
        self.entries.as_deref()
    }

    /// Writes `src` (CPU layout) into `dst` (GPU layout). Nothing is written on failure.
    pub fn update_constants(
        &self,
        src: &[u8],
        dst: &mut [u8],
    ) -> KilnResult<()> {
        if src.len() < self.cpu_size as usize {
            return Err(format!(
                "Constant data is {} bytes, the CPU layout needs {}",
                src.len(),
                self.cpu_size
            ))?;
        }

        if dst.len() < self.gpu_size as usize {
            return Err(format!(
                "Destination is {} bytes, the GPU block needs {}",
                dst.len(),
                self.gpu_size
            ))?;
        }

        match &self.entries {
            None => {
                let size = self.cpu_size as usize;
                dst[..size].copy_from_slice(&src[..size]);
            }
            Some(entries) => {
                for entry in entries {
                    let source = entry.source_offset as usize..(entry.source_offset + entry.size) as usize;
                    let destination = entry.destination_offset as usize
                        ..(entry.destination_offset + entry.size) as usize;
                    dst[destination].copy_from_slice(&src[source]);
                }
            }
        }

        Ok(())
    }
}

/// A constant buffer bound for a specific block of a render program. Keeps its buffer alive.
#[derive(Clone, Debug)]
pub struct KilnConstantBufferView {
    buffer: KilnBuffer,
    block_name: String,
    placement_map: KilnConstantPlacementMap,
    slots: KilnConstantBufferSlots,
}

impl KilnConstantBufferView {
    pub(crate) fn new(
        buffer: &KilnBuffer,
        program: &KilnRenderProgram,
        def: &KilnConstantBufferViewDef,
    ) -> KilnResult<Self> {
        let reflections: Vec<&KilnShaderReflection> =
            program.shaders().map(|x| x.reflection()).collect();
        let (placement_map, slots) = KilnConstantPlacementMap::from_reflection(&reflections, def)?;

        let buffer_size = buffer.buffer_info().byte_size;
        if buffer_size < placement_map.gpu_size() as u64 {
            return Err(format!(
                "Constant buffer is {} bytes but block {} needs {}",
                buffer_size,
                def.block_name,
                placement_map.gpu_size()
            ))?;
        }

        log::debug!(
            "Constant buffer view for {} slots {:?}, {} placement entries",
            def.block_name,
            slots,
            placement_map.entries().map(|x| x.len()).unwrap_or(0)
        );

        Ok(KilnConstantBufferView {
            buffer: buffer.clone(),
            block_name: def.block_name.clone(),
            placement_map,
            slots,
        })
    }

    pub fn buffer(&self) -> &KilnBuffer {
        &self.buffer
    }

    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    pub fn placement_map(&self) -> &KilnConstantPlacementMap {
        &self.placement_map
    }

    pub fn slots(&self) -> &KilnConstantBufferSlots {
        &self.slots
    }
}
