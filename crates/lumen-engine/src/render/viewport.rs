use winit::dpi::PhysicalSize;

/// Framebuffer viewport in physical pixels, origin at (x, y).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering the whole drawable.
    #[inline]
    pub const fn from_size(size: PhysicalSize<u32>) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Issues the viewport to `pass` with the full depth range.
    pub fn apply(self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_size_starts_at_origin() {
        let vp = Viewport::from_size(PhysicalSize::new(800, 600));
        assert_eq!(vp, Viewport::new(0, 0, 800, 600));
    }
}
