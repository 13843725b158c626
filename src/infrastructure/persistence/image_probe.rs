use crc32fast::Hasher;

/// PNG signature bytes
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_COLOR_TYPE_INDEXED: u8 = 3;
const IHDR_DATA_LEN: usize = 13;

const BMP_FILE_HEADER_LEN: usize = 14;
const BMP_CORE_HEADER_LEN: u32 = 12;

/// How a source image stores its pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Palette of colors plus per-pixel indices
    Indexed,
    TrueColor,
}

/// Classify a source image from its header bytes.
///
/// Unrecognized or truncated headers classify as true-color; the decoder has
/// the final word on whether the bytes are an image at all.
pub fn probe_pixel_layout(bytes: &[u8]) -> PixelLayout {
    if bytes.starts_with(&PNG_SIGNATURE) {
        return png_layout(bytes);
    }

    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return PixelLayout::Indexed;
    }

    if bytes.starts_with(b"BM") {
        return bmp_layout(bytes);
    }

    PixelLayout::TrueColor
}

fn png_layout(bytes: &[u8]) -> PixelLayout {
    // IHDR is always the first chunk: length, name, data, crc
    let chunk = &bytes[PNG_SIGNATURE.len()..];
    if chunk.len() < 8 + IHDR_DATA_LEN + 4 || &chunk[4..8] != b"IHDR" {
        return PixelLayout::TrueColor;
    }

    let data_len = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
    if data_len != IHDR_DATA_LEN {
        return PixelLayout::TrueColor;
    }

    let name_and_data = &chunk[4..8 + IHDR_DATA_LEN];
    let stored_crc = u32::from_be_bytes([
        chunk[8 + IHDR_DATA_LEN],
        chunk[9 + IHDR_DATA_LEN],
        chunk[10 + IHDR_DATA_LEN],
        chunk[11 + IHDR_DATA_LEN],
    ]);

    let mut hasher = Hasher::new();
    hasher.update(name_and_data);
    if hasher.finalize() != stored_crc {
        tracing::debug!("PNG IHDR checksum mismatch, treating image as true-color");
        return PixelLayout::TrueColor;
    }

    // width(4) height(4) bit depth(1) color type(1)
    if name_and_data[4 + 9] == PNG_COLOR_TYPE_INDEXED {
        PixelLayout::Indexed
    } else {
        PixelLayout::TrueColor
    }
}

fn bmp_layout(bytes: &[u8]) -> PixelLayout {
    let Some(dib) = bytes.get(BMP_FILE_HEADER_LEN..) else {
        return PixelLayout::TrueColor;
    };
    if dib.len() < 4 {
        return PixelLayout::TrueColor;
    }

    let header_len = u32::from_le_bytes([dib[0], dib[1], dib[2], dib[3]]);
    let bits_offset = if header_len == BMP_CORE_HEADER_LEN { 10 } else { 14 };

    match dib.get(bits_offset..bits_offset + 2) {
        Some(bits) if u16::from_le_bytes([bits[0], bits[1]]) <= 8 => PixelLayout::Indexed,
        _ => PixelLayout::TrueColor,
    }
}
