use crate::foundation::math::mul_div255_u8;
use crate::foundation::raster::Raster;

/// Scale `content` by the brightness of `mask`, placed at `(x, y)` inside `content`.
///
/// The weight of each pixel is the mean of the mask's premultiplied colour channels, so white
/// keeps the content, black or transparent removes it. Content pixels outside the mask's
/// footprint are left untouched.
pub fn apply_brightness_mask(content: &mut Raster, mask: &Raster, x: i64, y: i64) {
    super::blend::for_each_overlap_row(content, mask, x, y, |d, m| {
        for (d, m) in d.chunks_exact_mut(4).zip(m.chunks_exact(4)) {
            let sum = u16::from(m[0]) + u16::from(m[1]) + u16::from(m[2]);
            let w = (sum + 1) / 3;
            scale_px(d, w);
        }
    });
}

/// Confine `target` to the alpha footprint of `base`, placed at `(x, y)` inside `target`.
///
/// Pixels covered by `base` are scaled by its alpha; every other pixel becomes transparent.
pub fn apply_alpha_stencil(target: &mut Raster, base: &Raster, x: i64, y: i64) {
    let width = i64::from(target.width);
    for (i, px) in target.data.chunks_exact_mut(4).enumerate() {
        let tx = (i as i64) % width;
        let ty = (i as i64) / width;
        let w = base_alpha(base, tx - x, ty - y);
        scale_px(px, u16::from(w));
    }
}

fn base_alpha(base: &Raster, bx: i64, by: i64) -> u8 {
    if bx < 0 || by < 0 {
        return 0;
    }
    match (u32::try_from(bx), u32::try_from(by)) {
        (Ok(bx), Ok(by)) => base.pixel(bx, by).map_or(0, |p| p.a),
        _ => 0,
    }
}

fn scale_px(px: &mut [u8], w: u16) {
    if w >= 255 {
        return;
    }
    for c in px.iter_mut() {
        *c = mul_div255_u8(u16::from(*c), w);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask.rs"]
mod tests;
