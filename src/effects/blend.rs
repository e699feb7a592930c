use crate::foundation::error::{LaminateError, LaminateResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::foundation::raster::Raster;
use crate::scene::model::BlendMode;

/// Composite `src` onto `dst` with its top-left corner at `(x, y)`.
///
/// `opacity` is in `0..=1` and scales the source before blending. Only the overlap of the two
/// rasters is touched, so `src` may hang off any edge of `dst`.
pub fn composite_at(
    dst: &mut Raster,
    src: &Raster,
    x: i64,
    y: i64,
    opacity: f32,
    mode: BlendMode,
) -> LaminateResult<()> {
    check_len(dst, "destination")?;
    check_len(src, "source")?;

    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    // Blend mode dispatch happens once per call; each arm monomorphizes its own row kernel.
    match mode {
        BlendMode::Normal => {
            let op = u16::from(unit_to_u8(f64::from(opacity)));
            for_each_overlap_row(dst, src, x, y, |d, s| over_row(d, s, op));
        }
        BlendMode::Multiply => blend_rows(dst, src, x, y, opacity, |s, d| s * d),
        BlendMode::Add => blend_rows(dst, src, x, y, opacity, |s, d| (s + d).min(1.0)),
        BlendMode::Screen => blend_rows(dst, src, x, y, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => blend_rows(dst, src, x, y, opacity, |s, d| {
            if d <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }),
        BlendMode::Darken => blend_rows(dst, src, x, y, opacity, |s, d| s.min(d)),
        BlendMode::Lighten => blend_rows(dst, src, x, y, opacity, |s, d| s.max(d)),
        BlendMode::Hardlight => blend_rows(dst, src, x, y, opacity, |s, d| {
            if s <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }),
        BlendMode::Difference => blend_rows(dst, src, x, y, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => blend_rows(dst, src, x, y, opacity, |s, d| d + s - 2.0 * d * s),
    }
    Ok(())
}

fn check_len(r: &Raster, what: &str) -> LaminateResult<()> {
    let expected = (r.width as usize)
        .saturating_mul(r.height as usize)
        .saturating_mul(4);
    if r.data.len() != expected {
        return Err(LaminateError::composite(format!(
            "{what} raster {}x{} has {} bytes, expected {expected}",
            r.width,
            r.height,
            r.data.len()
        )));
    }
    Ok(())
}

/// Call `f` with matching destination and source row slices for every row where `src`, placed
/// at `(x, y)`, overlaps `dst`.
pub(crate) fn for_each_overlap_row<F>(dst: &mut Raster, src: &Raster, x: i64, y: i64, mut f: F)
where
    F: FnMut(&mut [u8], &[u8]),
{
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src.width)).min(i64::from(dst.width));
    let y1 = (y + i64::from(src.height)).min(i64::from(dst.height));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let span = ((x1 - x0) as usize) * 4;
    let dst_stride = (dst.width as usize) * 4;
    let src_stride = (src.width as usize) * 4;
    let sx = ((x0 - x) as usize) * 4;

    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let d_start = (dy as usize) * dst_stride + (x0 as usize) * 4;
        let s_start = sy * src_stride + sx;
        f(
            &mut dst.data[d_start..d_start + span],
            &src.data[s_start..s_start + span],
        );
    }
}

fn over_row(dst: &mut [u8], src: &[u8], op: u16) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = sc.saturating_add(dc);
        }
    }
}

#[inline(always)]
fn blend_rows<F>(dst: &mut Raster, src: &Raster, x: i64, y: i64, opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    for_each_overlap_row(dst, src, x, y, |d, s| blend_row(d, s, opacity, &blend_fn));
}

#[inline(always)]
fn blend_row<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: &F)
where
    F: Fn(f32, f32) -> f32,
{
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        // Source-over with the blend applied to unpremultiplied colour:
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        if sa <= 0.0 {
            continue;
        }
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = (f32::from(s[c]) / 255.0) * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, out_a);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
