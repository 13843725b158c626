use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::domain::errors::ConversionError;
use crate::domain::models::avatar::{
    AvatarReference, ConversionResult, WEBP_EXTENSION, file_extension, replace_extension,
};
use crate::infrastructure::persistence::image_probe::{PixelLayout, probe_pixel_layout};

/// Where clean avatar paths are resolved on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionContext {
    /// Prepended to every clean path, e.g. the forum root or `../`
    pub base_path_prefix: PathBuf,
}

impl ConversionContext {
    pub fn new(base_path_prefix: impl Into<PathBuf>) -> Self {
        Self {
            base_path_prefix: base_path_prefix.into(),
        }
    }

    /// `base_path_prefix` followed by `clean_path`.
    ///
    /// A leading separator on `clean_path` stays under the prefix instead of
    /// replacing it, so `/uploads/a.png` never resolves outside the forum root.
    pub fn resolve(&self, clean_path: &str) -> PathBuf {
        if self.base_path_prefix.as_os_str().is_empty() {
            return PathBuf::from(clean_path);
        }

        self.base_path_prefix
            .join(clean_path.trim_start_matches(['/', '\\']))
    }
}

/// Re-encodes stored avatars to WebP and computes their new references
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarWebpConverter;

impl AvatarWebpConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert one avatar and delete the original file.
    pub fn convert(
        &self,
        reference: &AvatarReference,
        context: &ConversionContext,
    ) -> Result<ConversionResult, ConversionError> {
        let result = self.write_webp(reference, context)?;
        self.remove_original(&result)?;
        Ok(result)
    }

    /// Write the WebP sibling of an avatar without touching the original.
    ///
    /// Empty references, references that already end in `webp` (exact case)
    /// and references whose file is missing come back unchanged.
    pub fn write_webp(
        &self,
        reference: &AvatarReference,
        context: &ConversionContext,
    ) -> Result<ConversionResult, ConversionError> {
        if reference.is_empty() {
            return Ok(ConversionResult::unchanged(reference.clone()));
        }

        let clean_path = reference.clean_path();
        let extension = file_extension(clean_path);
        if extension == WEBP_EXTENSION {
            return Ok(ConversionResult::unchanged(reference.clone()));
        }

        let disk_path = context.resolve(clean_path);
        if !disk_path.exists() {
            tracing::debug!("Avatar file missing, skipping: {:?}", disk_path);
            return Ok(ConversionResult::unchanged(reference.clone()));
        }

        let source_bytes =
            fs::read(&disk_path).map_err(|error| ConversionError::io(&disk_path, error))?;
        let webp_bytes = encode_webp(&source_bytes, &disk_path)?;

        let new_clean_path = replace_extension(clean_path, WEBP_EXTENSION);
        let webp_disk_path = context.resolve(&new_clean_path);
        write_file(&webp_disk_path, &webp_bytes)?;

        let cache_token = chrono::Utc::now().timestamp().to_string();
        tracing::info!(
            "Converted avatar {:?} to {:?}",
            disk_path,
            webp_disk_path
        );

        Ok(ConversionResult {
            changed: true,
            new_reference: AvatarReference::new(new_clean_path, Some(cache_token)),
            removed_path: Some(disk_path),
        })
    }

    /// Delete the original file of a changed result.
    pub fn remove_original(&self, result: &ConversionResult) -> Result<(), ConversionError> {
        let Some(path) = result.removed_path.as_deref() else {
            return Ok(());
        };

        fs::remove_file(path).map_err(|error| ConversionError::io(path, error))?;
        tracing::debug!("Removed original avatar: {:?}", path);
        Ok(())
    }

    /// Lazily convert a sequence of avatars, yielding one result per entry in order.
    ///
    /// A failed entry does not stop the sequence.
    pub fn batch_convert<'a, K, I>(
        &'a self,
        entries: I,
        context: &'a ConversionContext,
    ) -> impl Iterator<Item = (K, Result<ConversionResult, ConversionError>)> + 'a
    where
        I: IntoIterator<Item = (K, AvatarReference)>,
        I::IntoIter: 'a,
        K: 'a,
    {
        entries.into_iter().map(move |(id, reference)| {
            if reference.is_webp() {
                return (id, Ok(ConversionResult::unchanged(reference)));
            }

            let result = self.convert(&reference, context);
            (id, result)
        })
    }
}

/// Decode an image in its native format and encode it as WebP.
///
/// Palette images are drawn onto a true-color canvas first.
pub fn encode_webp(source_bytes: &[u8], source_path: &Path) -> Result<Vec<u8>, ConversionError> {
    let layout = probe_pixel_layout(source_bytes);

    let decoded = image::load_from_memory(source_bytes).map_err(|source| ConversionError::Decode {
        path: source_path.to_path_buf(),
        source,
    })?;

    let true_color = match layout {
        PixelLayout::Indexed => flatten_to_true_color(&decoded),
        PixelLayout::TrueColor => into_eight_bit(decoded),
    };

    let mut encoded = Vec::new();
    true_color
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::WebP)
        .map_err(|source| ConversionError::Encode {
            path: source_path.to_path_buf(),
            source,
        })?;

    Ok(encoded)
}

fn flatten_to_true_color(image: &DynamicImage) -> DynamicImage {
    let mut canvas = RgbaImage::new(image.width(), image.height());
    imageops::replace(&mut canvas, &image.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas)
}

// The WebP encoder only takes 8-bit RGB(A) samples.
fn into_eight_bit(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ConversionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| ConversionError::io(parent, error))?;
    }

    let temp_path = path.with_extension("webp.tmp");
    fs::write(&temp_path, bytes).map_err(|error| ConversionError::io(&temp_path, error))?;

    fs::rename(&temp_path, path).map_err(|error| {
        let _ = fs::remove_file(&temp_path);
        ConversionError::io(path, error)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc32fast::Hasher;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use image::{Rgb, RgbImage};
    use rand::random;
    use std::io::Write;

    fn unique_temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("webpp-converter-{}", random::<u64>()));
        fs::create_dir_all(root.join("avatars")).expect("create avatars dir");
        root
    }

    fn build_rgb_png() -> Vec<u8> {
        let image = RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 60) as u8, (y * 80) as u8, 200]));
        let mut output = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .expect("should build png image");
        output
    }

    fn push_chunk(output: &mut Vec<u8>, name: &[u8; 4], data: &[u8]) {
        output.extend_from_slice(&(data.len() as u32).to_be_bytes());
        output.extend_from_slice(name);
        output.extend_from_slice(data);
        let mut hasher = Hasher::new();
        hasher.update(name);
        hasher.update(data);
        output.extend_from_slice(&hasher.finalize().to_be_bytes());
    }

    /// 3x2 PNG with colour type 3 and a four-entry palette
    fn build_palette_png() -> Vec<u8> {
        let (width, height) = (3u32, 2u32);
        let palette: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [250, 250, 10]];
        let rows: [[u8; 3]; 2] = [[0, 1, 2], [3, 2, 1]];

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 3, 0, 0, 0]);

        let mut scanlines = Vec::new();
        for row in rows {
            scanlines.push(0);
            scanlines.extend_from_slice(&row);
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&scanlines).expect("compress scanlines");
        let idat = encoder.finish().expect("finish zlib stream");

        let mut output = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        push_chunk(&mut output, b"IHDR", &ihdr);
        push_chunk(&mut output, b"PLTE", palette.as_flattened());
        push_chunk(&mut output, b"IDAT", &idat);
        push_chunk(&mut output, b"IEND", &[]);
        output
    }

    #[test]
    fn empty_reference_is_unchanged() {
        let converter = AvatarWebpConverter::new();
        let reference = AvatarReference::default();

        let result = converter
            .convert(&reference, &ConversionContext::default())
            .expect("empty reference");

        assert!(!result.changed);
        assert_eq!(result.new_reference, reference);
        assert_eq!(result.removed_path, None);
    }

    #[test]
    fn webp_reference_is_unchanged() {
        let converter = AvatarWebpConverter::new();
        let reference = AvatarReference::parse("avatars/7.webp?dateline=1700000000");

        let result = converter
            .convert(&reference, &ConversionContext::new(unique_temp_root()))
            .expect("webp reference");

        assert!(!result.changed);
        assert_eq!(result.new_reference, reference);
    }

    #[test]
    fn missing_file_is_unchanged() {
        let root = unique_temp_root();
        let converter = AvatarWebpConverter::new();
        let reference = AvatarReference::parse("avatars/8.png?dateline=1700000000");

        let result = converter
            .convert(&reference, &ConversionContext::new(&root))
            .expect("missing file");

        assert!(!result.changed);
        assert_eq!(result.new_reference, reference);
        assert!(!root.join("avatars/8.webp").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn true_color_png_is_replaced_by_webp() {
        let root = unique_temp_root();
        let source = build_rgb_png();
        fs::write(root.join("avatars/1.png"), &source).expect("write avatar");

        let before = chrono::Utc::now().timestamp();
        let result = AvatarWebpConverter::new()
            .convert(
                &AvatarReference::new("avatars/1.png", None),
                &ConversionContext::new(&root),
            )
            .expect("convert avatar");

        assert!(result.changed);
        assert_eq!(result.new_reference.path, "avatars/1.webp");
        assert_eq!(result.removed_path, Some(root.join("avatars/1.png")));
        let token: i64 = result
            .new_reference
            .cache_token
            .as_deref()
            .expect("cache token")
            .parse()
            .expect("numeric token");
        assert!(token >= before);

        assert!(!root.join("avatars/1.png").exists());
        let written = fs::read(root.join("avatars/1.webp")).expect("webp file should exist");
        assert_eq!(
            image::guess_format(&written).expect("known format"),
            ImageFormat::WebP
        );
        let decoded = image::load_from_memory(&written).expect("decode webp");
        let original = image::load_from_memory(&source).expect("decode png");
        assert_eq!(decoded.to_rgba8(), original.to_rgba8());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn palette_png_matches_flattened_source() {
        let root = unique_temp_root();
        let source = build_palette_png();
        assert_eq!(probe_pixel_layout(&source), PixelLayout::Indexed);
        fs::write(root.join("avatars/2.png"), &source).expect("write avatar");

        let result = AvatarWebpConverter::new()
            .convert(
                &AvatarReference::parse("avatars/2.png?dateline=1600000000"),
                &ConversionContext::new(&root),
            )
            .expect("convert palette avatar");

        assert!(result.changed);
        assert_eq!(result.new_reference.path, "avatars/2.webp");

        let written = fs::read(root.join("avatars/2.webp")).expect("webp file should exist");
        let decoded = image::load_from_memory(&written).expect("decode webp");
        let flattened = flatten_to_true_color(&image::load_from_memory(&source).expect("decode png"));
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(decoded.to_rgba8(), flattened.to_rgba8());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn embedded_token_is_stripped_from_disk_path() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/3.png"), build_rgb_png()).expect("write avatar");

        let reference = AvatarReference::new("avatars/3.png?dateline=1500000000", None);
        let result = AvatarWebpConverter::new()
            .convert(&reference, &ConversionContext::new(&root))
            .expect("convert avatar");

        assert!(result.changed);
        assert_eq!(result.new_reference.path, "avatars/3.webp");
        assert!(root.join("avatars/3.webp").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn write_webp_keeps_original_until_removed() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/4.png"), build_rgb_png()).expect("write avatar");
        let converter = AvatarWebpConverter::new();

        let result = converter
            .write_webp(
                &AvatarReference::new("avatars/4.png", None),
                &ConversionContext::new(&root),
            )
            .expect("write webp");

        assert!(root.join("avatars/4.png").exists());
        assert!(root.join("avatars/4.webp").exists());

        converter.remove_original(&result).expect("remove original");
        assert!(!root.join("avatars/4.png").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn resolve_prepends_prefix_to_every_path() {
        let context = ConversionContext::new("/srv/forum");

        assert_eq!(
            context.resolve("./uploads/avatars/a.png"),
            PathBuf::from("/srv/forum/./uploads/avatars/a.png")
        );
        assert_eq!(
            context.resolve("/uploads/avatars/a.png"),
            PathBuf::from("/srv/forum/uploads/avatars/a.png")
        );
        assert_eq!(
            ConversionContext::default().resolve("./uploads/a.png"),
            PathBuf::from("./uploads/a.png")
        );
    }

    #[test]
    fn absolute_reference_stays_under_prefix() {
        let root = unique_temp_root();
        let outside = unique_temp_root();
        fs::write(outside.join("avatars/6.png"), build_rgb_png()).expect("write outside avatar");
        let absolute = outside.join("avatars/6.png").to_string_lossy().into_owned();

        let result = AvatarWebpConverter::new()
            .convert(
                &AvatarReference::new(absolute, None),
                &ConversionContext::new(&root),
            )
            .expect("convert absolute reference");

        assert!(!result.changed);
        assert_eq!(result.removed_path, None);
        assert!(outside.join("avatars/6.png").exists());
        assert!(!outside.join("avatars/6.webp").exists());

        let _ = fs::remove_dir_all(&root);
        let _ = fs::remove_dir_all(&outside);
    }

    #[test]
    fn upper_case_webp_extension_is_reconverted() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/9.WEBP"), build_rgb_png()).expect("write avatar");

        let result = AvatarWebpConverter::new()
            .convert(
                &AvatarReference::parse("avatars/9.WEBP?dateline=1"),
                &ConversionContext::new(&root),
            )
            .expect("convert upper-case avatar");

        assert!(result.changed);
        assert_eq!(result.new_reference.path, "avatars/9.webp");
        let written = fs::read(root.join("avatars/9.webp")).expect("webp file should exist");
        assert_eq!(
            image::guess_format(&written).expect("known format"),
            ImageFormat::WebP
        );
        assert_eq!(result.removed_path, Some(root.join("avatars/9.WEBP")));
        assert!(!root.join("avatars/9.WEBP").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn undecodable_file_is_a_decode_error() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/5.jpg"), b"definitely not an image").expect("write avatar");

        let error = AvatarWebpConverter::new()
            .convert(
                &AvatarReference::new("avatars/5.jpg", None),
                &ConversionContext::new(&root),
            )
            .expect_err("garbage should not decode");

        assert!(matches!(error, ConversionError::Decode { .. }));
        assert!(root.join("avatars/5.jpg").exists());
        assert!(!root.join("avatars/5.webp").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn batch_reports_each_entry_in_order() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/12.png"), build_rgb_png()).expect("write avatar");
        let converter = AvatarWebpConverter::new();
        let context = ConversionContext::new(&root);

        let entries = vec![
            (10, AvatarReference::parse("avatars/10.png?dateline=1")),
            (11, AvatarReference::parse("avatars/11.webp?dateline=1")),
            (12, AvatarReference::parse("avatars/12.png?dateline=1")),
        ];

        let results: Vec<_> = converter
            .batch_convert(entries, &context)
            .map(|(id, result)| (id, result.expect("no errors expected")))
            .collect();

        let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
        let changed: Vec<_> = results.iter().map(|(_, result)| result.changed).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(changed, vec![false, false, true]);

        let rerun: Vec<_> = converter
            .batch_convert(
                results
                    .into_iter()
                    .map(|(id, result)| (id, result.new_reference)),
                &context,
            )
            .map(|(_, result)| result.expect("rerun").changed)
            .collect();
        assert_eq!(rerun, vec![false, false, false]);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn batch_continues_after_a_failed_entry() {
        let root = unique_temp_root();
        fs::write(root.join("avatars/20.gif"), b"GIF89a broken").expect("write avatar");
        fs::write(root.join("avatars/21.png"), build_rgb_png()).expect("write avatar");
        let converter = AvatarWebpConverter::new();
        let context = ConversionContext::new(&root);

        let outcomes: Vec<_> = converter
            .batch_convert(
                vec![
                    (20, AvatarReference::new("avatars/20.gif", None)),
                    (21, AvatarReference::new("avatars/21.png", None)),
                ],
                &context,
            )
            .collect();

        assert!(outcomes[0].1.is_err());
        assert!(outcomes[1].1.as_ref().expect("second entry").changed);

        let _ = fs::remove_dir_all(&root);
    }
}
