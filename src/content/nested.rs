use crate::assets::fetch::CompositionRef;
use crate::foundation::error::{LaminateError, LaminateResult};
use crate::foundation::raster::Raster;
use crate::render::engine::{RenderContext, render_composition};

/// Fetch the composition named by `reference` and render it at its own size.
///
/// `stack` holds the references currently being rendered, outermost first. Re-entering one of
/// them, or nesting deeper than [`crate::RenderOpts::max_nesting_depth`], fails with
/// [`LaminateError::ReferenceCycle`].
#[tracing::instrument(skip(ctx, stack), fields(depth = stack.len()))]
pub(crate) async fn resolve_nested(
    ctx: &RenderContext,
    reference: &str,
    stack: &[String],
) -> LaminateResult<Raster> {
    let parsed = CompositionRef::parse(reference)?;
    let key = parsed.to_string();

    if stack.contains(&key) {
        return Err(LaminateError::reference_cycle(format!(
            "{} -> {key}",
            stack.join(" -> ")
        )));
    }
    if stack.len() >= ctx.opts().max_nesting_depth {
        return Err(LaminateError::reference_cycle(format!(
            "'{key}' exceeds the maximum nesting depth of {}",
            ctx.opts().max_nesting_depth
        )));
    }

    let composition = ctx.fetcher().fetch_composition(&parsed).await?;

    let mut inner = stack.to_vec();
    inner.push(key);
    render_composition(ctx, &composition, inner).await
}
