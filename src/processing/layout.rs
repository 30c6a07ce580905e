/// Placement of a scaled image inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportFit {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportFit {
    /// Largest aspect-preserving rectangle that fits inside the viewport,
    /// centred. Returns `None` if any dimension is zero.
    ///
    /// An image relatively wider than the viewport spans its width, otherwise
    /// its height; the other side is floored, so the image never exceeds
    /// either viewport dimension.
    #[must_use]
    pub fn contain(src_w: u32, src_h: u32, viewport_w: u32, viewport_h: u32) -> Option<Self> {
        if src_w == 0 || src_h == 0 || viewport_w == 0 || viewport_h == 0 {
            return None;
        }
        // src_w / src_h > viewport_w / viewport_h, cross-multiplied to stay exact.
        let (sw, sh) = (u64::from(src_w), u64::from(src_h));
        let (vw, vh) = (u64::from(viewport_w), u64::from(viewport_h));
        let (width, height) = if sw * vh > vw * sh {
            let h = (vw * sh / sw).clamp(1, vh);
            (viewport_w, h as u32)
        } else {
            let w = (vh * sw / sh).clamp(1, vw);
            (w as u32, viewport_h)
        };
        let (x, y) = center_offset(width, height, viewport_w, viewport_h);
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}
