use std::path::Path;

use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use image::RgbaImage;

use super::RenderCtx;

/// Sampling and upload options for a 2D texture.
///
/// The defaults mirror a common tutorial setup: mirrored repeat on both axes,
/// trilinear minification, linear magnification, full mip chain.
#[derive(Debug, Clone)]
pub struct TextureOptions {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
    pub generate_mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            generate_mipmaps: true,
        }
    }
}

/// A sampled RGBA8 2D texture with its view and sampler.
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    /// Decodes the image at `path` and uploads it.
    ///
    /// Decode errors are returned; callers usually log them and fall back to
    /// [`Texture::placeholder`].
    pub fn from_path(ctx: &RenderCtx<'_>, path: impl AsRef<Path>, options: &TextureOptions) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();

        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "texture".to_string());

        Self::from_rgba(ctx, &label, &image, options)
            .with_context(|| format!("failed to upload texture {}", path.display()))
    }

    /// Uploads an already decoded image.
    ///
    /// Fails if the image is empty or exceeds the device's 2D texture limit.
    pub fn from_rgba(ctx: &RenderCtx<'_>, label: &str, image: &RgbaImage, options: &TextureOptions) -> Result<Self> {
        let (width, height) = image.dimensions();
        check_dimensions(width, height, ctx.device.limits().max_texture_dimension_2d)?;

        Ok(Self::upload(ctx, label, image, options))
    }

    fn upload(ctx: &RenderCtx<'_>, label: &str, image: &RgbaImage, options: &TextureOptions) -> Self {
        let (width, height) = image.dimensions();
        let levels = if options.generate_mipmaps {
            mip_level_count(width, height)
        } else {
            1
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Texels pass through unconverted, like a GL_RGB upload.
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_level(ctx, &texture, 0, image);
        for (level, mip) in mip_chain(image, levels).iter().enumerate() {
            write_level(ctx, &texture, level as u32 + 1, mip);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: options.address_mode_u,
            address_mode_v: options.address_mode_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: options.mag_filter,
            min_filter: options.min_filter,
            mipmap_filter: options.mipmap_filter,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 opaque white texture, used where no real texture is bound.
    pub fn placeholder(ctx: &RenderCtx<'_>) -> Self {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::upload(
            ctx,
            "lumen placeholder texture",
            &image,
            &TextureOptions {
                generate_mipmaps: false,
                ..TextureOptions::default()
            },
        )
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// Number of levels in a full mip chain for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn check_dimensions(width: u32, height: u32, max: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("image is empty ({width}x{height})");
    }
    if width > max || height > max {
        bail!("image is {width}x{height}, the device allows at most {max}x{max}");
    }
    Ok(())
}

/// Levels 1.. of the mip chain, each half the previous size (minimum 1).
fn mip_chain(base: &RgbaImage, levels: u32) -> Vec<RgbaImage> {
    let mut chain: Vec<RgbaImage> = Vec::with_capacity(levels.saturating_sub(1) as usize);

    for _ in 1..levels {
        let prev = chain.last().unwrap_or(base);
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }

    chain
}

fn write_level(ctx: &RenderCtx<'_>, texture: &wgpu::Texture, mip_level: u32, image: &RgbaImage) {
    let (width, height) = image.dimensions();
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::TestGpu;

    #[test]
    fn mip_count_follows_largest_dimension() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(500, 300), 9);
        assert_eq!(mip_level_count(1, 1024), 11);
    }

    #[test]
    fn zero_sized_image_still_has_one_level() {
        assert_eq!(mip_level_count(0, 0), 1);
    }

    // ── limits ────────────────────────────────────────────────────────────

    #[test]
    fn dimensions_within_limit_are_accepted() {
        assert!(check_dimensions(1, 1, 8192).is_ok());
        assert!(check_dimensions(8192, 8192, 8192).is_ok());
    }

    #[test]
    fn oversized_or_empty_images_are_rejected() {
        let err = check_dimensions(9000, 1, 8192).unwrap_err();
        assert!(err.to_string().contains("9000x1"), "{err}");
        assert!(check_dimensions(1, 8193, 8192).is_err());
        assert!(check_dimensions(0, 16, 8192).is_err());
    }

    #[test]
    fn oversized_image_is_an_error_not_a_crash() {
        let gpu = TestGpu::new();
        let ctx = gpu.ctx();
        let max = gpu.device.limits().max_texture_dimension_2d;

        let result = Texture::from_rgba(&ctx, "too wide", &RgbaImage::new(max + 1, 1), &TextureOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn uploads_full_mip_chain() {
        let gpu = TestGpu::new();
        let ctx = gpu.ctx();

        let texture = Texture::from_rgba(&ctx, "checker", &RgbaImage::new(64, 16), &TextureOptions::default()).unwrap();
        assert_eq!((texture.width(), texture.height()), (64, 16));
        assert_eq!(texture.mip_level_count(), 7);

        let placeholder = Texture::placeholder(&ctx);
        assert_eq!(placeholder.mip_level_count(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let gpu = TestGpu::new();
        let err = Texture::from_path(&gpu.ctx(), "/no/such/texture.png", &TextureOptions::default())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("/no/such/texture.png"));
    }

    // ── mip chain ─────────────────────────────────────────────────────────

    #[test]
    fn mip_chain_halves_down_to_one() {
        let base = RgbaImage::new(8, 2);
        let chain = mip_chain(&base, mip_level_count(8, 2));
        let sizes: Vec<_> = chain.iter().map(|i| i.dimensions()).collect();
        assert_eq!(sizes, vec![(4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_chain_averages_texels() {
        let mut base = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        base.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        base.put_pixel(1, 1, image::Rgba([255, 255, 255, 255]));

        let chain = mip_chain(&base, 2);
        let px = chain[0].get_pixel(0, 0);
        assert!((100..=155).contains(&px[0]), "got {px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn default_options_mirror_and_filter_linearly() {
        let o = TextureOptions::default();
        assert_eq!(o.address_mode_u, wgpu::AddressMode::MirrorRepeat);
        assert_eq!(o.address_mode_v, wgpu::AddressMode::MirrorRepeat);
        assert_eq!(o.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(o.mipmap_filter, wgpu::MipmapFilterMode::Linear);
        assert!(o.generate_mipmaps);
    }
}
