//! Surface configuration helpers.
//!
//! Kept free of live GPU objects where possible so resize and format policy
//! can be tested without an adapter.

use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;
use crate::render::Viewport;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    pick_format(&caps.formats, prefer_srgb)
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let first = *formats.first()?;

    let wanted = formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb);

    Some(wanted.unwrap_or(first))
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Records a new drawable size and updates `config` to match.
///
/// Returns the viewport subsequent passes must use, or `None` when the new
/// size has a zero dimension (minimized window). In that case only `size` is
/// updated: wgpu rejects 0x0 surfaces, so reconfiguration waits for the next
/// non-zero resize.
pub fn apply_resize(
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) -> Option<Viewport> {
    *size = new_size;

    if new_size.width == 0 || new_size.height == 0 {
        return None;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    Some(Viewport::from_size(new_size))
}

pub(crate) fn map_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8Unorm,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_viewport_matches_new_size_exactly() {
        for (w, h) in [(1, 1), (800, 600), (1920, 1080), (3, 4097), (7681, 2)] {
            let mut cfg = config(800, 600);
            let mut size = PhysicalSize::new(800, 600);

            let vp = apply_resize(&mut cfg, &mut size, PhysicalSize::new(w, h))
                .expect("positive size yields a viewport");

            assert_eq!((vp.x, vp.y), (0, 0));
            assert_eq!((vp.width, vp.height), (w, h));
            assert_eq!((cfg.width, cfg.height), (w, h));
            assert_eq!(size, PhysicalSize::new(w, h));
        }
    }

    #[test]
    fn zero_resize_defers_configuration() {
        let mut cfg = config(800, 600);
        let mut size = PhysicalSize::new(800, 600);

        assert!(apply_resize(&mut cfg, &mut size, PhysicalSize::new(0, 600)).is_none());
        assert_eq!(size, PhysicalSize::new(0, 600));
        assert_eq!((cfg.width, cfg.height), (800, 600));
    }

    // ── formats ───────────────────────────────────────────────────────────

    #[test]
    fn picks_linear_format_when_srgb_not_preferred() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(pick_format(&formats, false), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(pick_format(&formats, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, false), Some(wgpu::TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_format(&[], false), None);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn surface_error_actions() {
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
