use crate::{KilnClearFlags, KilnFormat};

/// How the soft device stores the texels of a format. This is the native format enum of the
/// backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SoftTexelEncoding {
    Undefined,
    Float { channels: u32, bits: u32 },
    Unorm { channels: u32, bits: u32 },
    Snorm { channels: u32, bits: u32 },
    Uint { channels: u32, bits: u32 },
    Sint { channels: u32, bits: u32 },
    /// Depth in the low 24 bits, stencil in the high 8
    D24UnormS8Uint,
    Bc1,
    Bc3,
}

impl From<KilnFormat> for SoftTexelEncoding {
    fn from(format: KilnFormat) -> Self {
        use KilnFormat::*;
        let info = format.info();
        let channels = info.channel_count;
        let bits = info.channel_byte_width * 8;
        match format {
            UNKNOWN => SoftTexelEncoding::Undefined,
            D24_UNORM_S8_UINT => SoftTexelEncoding::D24UnormS8Uint,
            BC1_UNORM => SoftTexelEncoding::Bc1,
            BC3_UNORM => SoftTexelEncoding::Bc3,

            R32G32B32A32_FLOAT | R32G32B32_FLOAT | R32G32_FLOAT | R32_FLOAT
            | R16G16B16A16_FLOAT | R16G16_FLOAT | R16_FLOAT => {
                SoftTexelEncoding::Float { channels, bits }
            }

            R16G16B16A16_UNORM | R16G16_UNORM | R16_UNORM | R8G8B8A8_UNORM | R8G8_UNORM
            | R8_UNORM => SoftTexelEncoding::Unorm { channels, bits },

            R16G16B16A16_SNORM | R16G16_SNORM | R16_SNORM | R8G8B8A8_SNORM | R8G8_SNORM
            | R8_SNORM => SoftTexelEncoding::Snorm { channels, bits },

            R32G32B32A32_UINT | R32G32B32_UINT | R32G32_UINT | R32_UINT | R16G16B16A16_UINT
            | R16G16_UINT | R16_UINT | R8G8B8A8_UINT | R8G8_UINT | R8_UINT => {
                SoftTexelEncoding::Uint { channels, bits }
            }

            R32G32B32A32_SINT | R32G32B32_SINT | R32G32_SINT | R32_SINT | R16G16B16A16_SINT
            | R16G16_SINT | R16_SINT | R8G8B8A8_SINT | R8G8_SINT | R8_SINT => {
                SoftTexelEncoding::Sint { channels, bits }
            }
        }
    }
}

pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x007F_FFFF;

    if exponent == 0xFF {
        let nan_bit = if mantissa != 0 { 0x0200 } else { 0 };
        return sign | 0x7C00 | nan_bit;
    }

    let half_exponent = exponent - 127 + 15;
    if half_exponent >= 0x1F {
        return sign | 0x7C00;
    }

    if half_exponent <= 0 {
        if half_exponent < -10 {
            return sign;
        }

        let full_mantissa = mantissa | 0x0080_0000;
        return sign | (full_mantissa >> (14 - half_exponent)) as u16;
    }

    // Rounding may carry into the exponent, which is the correct result
    let rounded = ((half_exponent as u32) << 10) + ((mantissa + 0x1000) >> 13);
    if rounded >= 0x7C00 {
        sign | 0x7C00
    } else {
        sign | rounded as u16
    }
}

fn encode_channel(
    encoding: SoftTexelEncoding,
    value: f32,
    out: &mut Vec<u8>,
) {
    match encoding {
        SoftTexelEncoding::Float { bits: 32, .. } => out.extend_from_slice(bytemuck::bytes_of(&value)),
        SoftTexelEncoding::Float { .. } => out.extend_from_slice(&f32_to_f16(value).to_le_bytes()),
        SoftTexelEncoding::Unorm { bits: 8, .. } => {
            out.push((value.max(0.0).min(1.0) * 255.0).round() as u8)
        }
        SoftTexelEncoding::Unorm { .. } => out.extend_from_slice(
            &((value.max(0.0).min(1.0) * 65535.0).round() as u16).to_le_bytes(),
        ),
        SoftTexelEncoding::Snorm { bits: 8, .. } => {
            out.push(((value.max(-1.0).min(1.0) * 127.0).round() as i8) as u8)
        }
        SoftTexelEncoding::Snorm { .. } => out.extend_from_slice(
            &((value.max(-1.0).min(1.0) * 32767.0).round() as i16).to_le_bytes(),
        ),
        // Float to int casts saturate
        SoftTexelEncoding::Uint { bits: 8, .. } => out.push(value as u8),
        SoftTexelEncoding::Uint { bits: 16, .. } => out.extend_from_slice(&(value as u16).to_le_bytes()),
        SoftTexelEncoding::Uint { .. } => out.extend_from_slice(&(value as u32).to_le_bytes()),
        SoftTexelEncoding::Sint { bits: 8, .. } => out.push((value as i8) as u8),
        SoftTexelEncoding::Sint { bits: 16, .. } => out.extend_from_slice(&(value as i16).to_le_bytes()),
        SoftTexelEncoding::Sint { .. } => out.extend_from_slice(&(value as i32).to_le_bytes()),
        SoftTexelEncoding::Undefined
        | SoftTexelEncoding::D24UnormS8Uint
        | SoftTexelEncoding::Bc1
        | SoftTexelEncoding::Bc3 => {}
    }
}

/// Bytes of one texel cleared to `color`. `None` for formats that can't be cleared as color.
pub fn encode_clear_color(
    format: KilnFormat,
    color: [f32; 4],
) -> Option<Vec<u8>> {
    let encoding = SoftTexelEncoding::from(format);
    let channels = match encoding {
        SoftTexelEncoding::Float { channels, .. }
        | SoftTexelEncoding::Unorm { channels, .. }
        | SoftTexelEncoding::Snorm { channels, .. }
        | SoftTexelEncoding::Uint { channels, .. }
        | SoftTexelEncoding::Sint { channels, .. } => channels,
        _ => return None,
    };

    let mut texel = Vec::with_capacity(format.info().block_byte_width as usize);
    for value in color.iter().take(channels as usize) {
        encode_channel(encoding, *value, &mut texel);
    }
    Some(texel)
}

/// Overwrites the aspects selected by `flags` in one D24S8 texel
pub fn clear_depth_stencil_texel(
    texel: &mut [u8],
    flags: KilnClearFlags,
    depth: f32,
    stencil: u8,
) {
    if texel.len() < 4 {
        return;
    }

    let mut value = u32::from_le_bytes([texel[0], texel[1], texel[2], texel[3]]);
    if flags.contains(KilnClearFlags::DEPTH) {
        let depth_bits = (depth.max(0.0).min(1.0) * 0x00FF_FFFF as f32).round() as u32;
        value = (value & 0xFF00_0000) | (depth_bits & 0x00FF_FFFF);
    }
    if flags.contains(KilnClearFlags::STENCIL) {
        value = (value & 0x00FF_FFFF) | ((stencil as u32) << 24);
    }
    texel[..4].copy_from_slice(&value.to_le_bytes());
}
