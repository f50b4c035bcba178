use crate::soft::{KilnVertexLayoutSoft, KilnVertexStreamSoft};
use crate::*;
use fnv::FnvHashMap;

/// One input element of a vertex layout, after multi-element attributes have been expanded
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KilnVertexElement {
    pub location: u32,
    pub format: KilnFormat,
    pub buffer_slot: u32,
    pub byte_offset: u32,
    pub per_instance: bool,
    pub instance_step_rate: u32,
}

/// Attributes spanning several elements become one element per location, each placed one element
/// width after the previous
pub(crate) fn expand_vertex_attributes(
    attributes: &[KilnVertexLayoutAttribute]
) -> KilnResult<Vec<KilnVertexElement>> {
    let mut elements = Vec::with_capacity(attributes.len());
    let mut used_locations = FnvHashMap::<u32, u32>::default();

    for attribute in attributes {
        attribute.verify()?;
        let element_byte_width = attribute.format.element_byte_width();

        for element_index in 0..attribute.element_count {
            let location = attribute.location + element_index;
            if let Some(previous) = used_locations.insert(location, attribute.location) {
                return Err(format!(
                    "Vertex location {} is provided by the attribute at location {} and the attribute at location {}",
                    location, previous, attribute.location
                ))?;
            }

            let byte_offset = attribute
                .byte_offset
                .checked_add(element_index * element_byte_width)
                .ok_or_else(|| {
                    format!(
                        "Vertex location {} starts past the end of a 32 bit byte offset",
                        location
                    )
                })?;

            elements.push(KilnVertexElement {
                location,
                format: attribute.format,
                buffer_slot: attribute.buffer_slot,
                byte_offset,
                per_instance: attribute.per_instance,
                instance_step_rate: if attribute.per_instance {
                    attribute.instance_step_rate
                } else {
                    0
                },
            });
        }
    }

    Ok(elements)
}

pub(crate) fn verify_vertex_inputs(
    reflection: &KilnShaderReflection,
    elements: &[KilnVertexElement],
) -> KilnResult<()> {
    for input in &reflection.vertex_inputs {
        let element = elements
            .iter()
            .find(|x| x.location == input.location)
            .ok_or_else(|| {
                KilnError::StringError(format!(
                    "Vertex shader {} reads location {} ({}) but the layout doesn't provide it",
                    reflection.entry_point,
                    input.location,
                    input.name.as_deref().unwrap_or("unnamed")
                ))
            })?;

        if element.format.component_kind() != Some(input.component_kind) {
            return Err(format!(
                "Vertex shader {} reads location {} as {:?} but the layout provides {:?}",
                reflection.entry_point, input.location, input.component_kind, element.format
            ))?;
        }
    }

    Ok(())
}

/// Describes how vertex buffer memory feeds the inputs of a vertex shader
#[derive(Clone, Debug)]
pub enum KilnVertexLayout {
    Soft(KilnVertexLayoutSoft),
}

impl KilnVertexLayout {
    pub fn elements(&self) -> &[KilnVertexElement] {
        match self {
            KilnVertexLayout::Soft(inner) => inner.elements(),
        }
    }

    pub fn soft_vertex_layout(&self) -> Option<&KilnVertexLayoutSoft> {
        match self {
            KilnVertexLayout::Soft(inner) => Some(inner),
        }
    }
}

/// Vertex buffers, an optional index buffer, a layout and a topology bound together as one unit
#[derive(Clone, Debug)]
pub enum KilnVertexStream {
    Soft(KilnVertexStreamSoft),
}

impl KilnVertexStream {
    pub fn topology(&self) -> KilnPrimitiveTopology {
        match self {
            KilnVertexStream::Soft(inner) => inner.topology(),
        }
    }

    pub fn vertex_buffer_count(&self) -> usize {
        match self {
            KilnVertexStream::Soft(inner) => inner.vertex_buffer_count(),
        }
    }

    pub fn has_index_buffer(&self) -> bool {
        match self {
            KilnVertexStream::Soft(inner) => inner.index_buffer().is_some(),
        }
    }

    pub fn soft_vertex_stream(&self) -> Option<&KilnVertexStreamSoft> {
        match self {
            KilnVertexStream::Soft(inner) => Some(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflection(inputs: &[(u32, KilnComponentKind)]) -> KilnShaderReflection {
        KilnShaderReflection {
            stage: KilnShaderStage::Vertex,
            entry_point: "vs_main".to_string(),
            constant_buffers: vec![],
            vertex_inputs: inputs
                .iter()
                .map(|(location, component_kind)| KilnVertexInputReflection {
                    name: None,
                    location: *location,
                    component_kind: *component_kind,
                })
                .collect(),
            resources: vec![],
        }
    }

    #[test]
    fn matrix_attribute_expands_per_row() {
        let attributes = [
            KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32B32_FLOAT, 0, 0),
            KilnVertexLayoutAttribute {
                location: 1,
                format: KilnFormat::R32G32B32A32_FLOAT,
                buffer_slot: 1,
                byte_offset: 8,
                element_count: 4,
                per_instance: true,
                instance_step_rate: 1,
            },
        ];

        let elements = expand_vertex_attributes(&attributes).unwrap();
        assert_eq!(elements.len(), 5);

        let rows: Vec<(u32, u32)> = elements[1..]
            .iter()
            .map(|x| (x.location, x.byte_offset))
            .collect();
        assert_eq!(rows, vec![(1, 8), (2, 24), (3, 40), (4, 56)]);
        assert!(elements[1..].iter().all(|x| x.per_instance && x.buffer_slot == 1));
    }

    #[test]
    fn overlapping_locations_fail() {
        let attributes = [
            KilnVertexLayoutAttribute {
                element_count: 2,
                ..KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32_FLOAT, 0, 0)
            },
            KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R32_FLOAT, 0, 16),
        ];
        assert!(expand_vertex_attributes(&attributes).is_err());
    }

    #[test]
    fn locations_and_offsets_are_bounded() {
        let last_location =
            KilnVertexLayoutAttribute::per_vertex(31, KilnFormat::R32_FLOAT, 0, 0);
        assert!(expand_vertex_attributes(&[last_location]).is_ok());

        let wrapping_location = KilnVertexLayoutAttribute {
            element_count: 4,
            ..KilnVertexLayoutAttribute::per_vertex(u32::MAX - 1, KilnFormat::R32_FLOAT, 0, 0)
        };
        assert!(expand_vertex_attributes(&[wrapping_location]).is_err());

        let too_many_elements = KilnVertexLayoutAttribute {
            element_count: u32::MAX,
            ..KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32_FLOAT, 0, 0)
        };
        assert!(expand_vertex_attributes(&[too_many_elements]).is_err());

        let wrapping_offset = KilnVertexLayoutAttribute {
            element_count: 2,
            ..KilnVertexLayoutAttribute::per_vertex(
                0,
                KilnFormat::R32G32B32A32_FLOAT,
                0,
                u32::MAX - 8,
            )
        };
        assert!(expand_vertex_attributes(&[wrapping_offset]).is_err());
    }

    #[test]
    fn shader_inputs_must_be_provided() {
        let elements = expand_vertex_attributes(&[
            KilnVertexLayoutAttribute::per_vertex(0, KilnFormat::R32G32B32_FLOAT, 0, 0),
            KilnVertexLayoutAttribute::per_vertex(1, KilnFormat::R8G8B8A8_UINT, 0, 12),
        ])
        .unwrap();

        let ok = reflection(&[(0, KilnComponentKind::Float), (1, KilnComponentKind::Uint)]);
        assert!(verify_vertex_inputs(&ok, &elements).is_ok());

        // Extra elements the shader doesn't read are allowed
        let subset = reflection(&[(0, KilnComponentKind::Float)]);
        assert!(verify_vertex_inputs(&subset, &elements).is_ok());

        let missing = reflection(&[(2, KilnComponentKind::Float)]);
        assert!(verify_vertex_inputs(&missing, &elements).is_err());

        let wrong_kind = reflection(&[(1, KilnComponentKind::Sint)]);
        assert!(verify_vertex_inputs(&wrong_kind, &elements).is_err());
    }
}
