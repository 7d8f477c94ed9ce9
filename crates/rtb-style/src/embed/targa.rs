//! Fixed-size TGA header decoding.

/// Size of a TGA file header in bytes.
pub const HEADER_LEN: usize = 18;

/// Image type for uncompressed true-colour data.
const TRUE_COLOR: u8 = 2;

/// A decoded TGA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargaHeader {
    pub id_length: u8,
    pub colormap_type: u8,
    pub image_type: u8,
    pub colormap_offset: u16,
    pub colormap_length: u16,
    pub colormap_bpp: u8,
    pub origin_x: u16,
    pub origin_y: u16,
    pub width: u16,
    pub height: u16,
    pub bpp: u8,
    /// Screen origin bits of the descriptor byte.
    pub origin: u8,
    /// Alpha channel depth from the descriptor byte.
    pub alpha_bits: u8,
}

impl TargaHeader {
    /// Decode the little-endian header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let Some(header) = bytes.first_chunk::<HEADER_LEN>() else {
            return Err(format!(
                "file is {} bytes, shorter than a TGA header",
                bytes.len()
            ));
        };

        let u16_at = |i: usize| u16::from_le_bytes([header[i], header[i + 1]]);

        Ok(Self {
            id_length: header[0],
            colormap_type: header[1],
            image_type: header[2],
            colormap_offset: u16_at(3),
            colormap_length: u16_at(5),
            colormap_bpp: header[7],
            origin_x: u16_at(8),
            origin_y: u16_at(10),
            width: u16_at(12),
            height: u16_at(14),
            bpp: header[16],
            origin: header[17] & 0x30,
            alpha_bits: header[17] & 0x0F,
        })
    }

    /// Decode and require an uncompressed true-colour image without an id
    /// field or colour map.
    pub fn parse_simple(bytes: &[u8]) -> Result<Self, String> {
        let header = Self::parse(bytes)?;
        if header.id_length != 0 || header.colormap_type != 0 || header.image_type != TRUE_COLOR {
            return Err("unsupported TGA image type".to_string());
        }
        Ok(header)
    }
}

#[cfg(test)]
pub(crate) fn encode_simple(width: u16, height: u16, bpp: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[2] = TRUE_COLOR;
    bytes[12..14].copy_from_slice(&width.to_le_bytes());
    bytes[14..16].copy_from_slice(&height.to_le_bytes());
    bytes[16] = bpp;
    bytes[17] = 0x28;
    bytes
}
