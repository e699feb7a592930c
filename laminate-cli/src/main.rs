use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "laminate", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a composition to an image file.
    Render(RenderArgs),
    /// Check a composition document and report every problem.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input composition JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Base directory for relative image paths (defaults to the input's directory).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory holding `compositions/{name}/{tag}.json` for nested compositions.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Composition registry base URL.
    #[cfg(feature = "http")]
    #[arg(long)]
    registry: Option<String>,

    /// Parameter override, `LAYER.PROPERTY=VALUE`. Repeatable.
    #[arg(long = "param")]
    params: Vec<String>,

    /// Output format (png, jpeg, tiff, bmp). Defaults to the output extension, then the
    /// document's `format`.
    #[arg(long)]
    format: Option<String>,

    /// Resolve layers concurrently.
    #[arg(long, default_value_t = false)]
    concurrent: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input composition JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let comp = laminate::Composition::from_path(&args.in_path)?;
    comp.validate()?;
    eprintln!(
        "{} is valid ({} layers)",
        args.in_path.display(),
        comp.layers.len()
    );
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut comp = laminate::Composition::from_path(&args.in_path)?;
    for raw in &args.params {
        comp.parameters
            .push(laminate::Parameter::from_assignment(raw)?);
    }
    let comp = laminate::apply_parameters(&comp)?;

    let format = output_format(&args, &comp)?;
    let root = args.root.clone().or_else(|| {
        args.in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    });

    let ctx = laminate::RenderContext::new(fetcher(&args, root)?).with_opts(laminate::RenderOpts {
        concurrent_layers: args.concurrent,
        ..laminate::RenderOpts::default()
    });
    let raster = laminate::process_composition(&ctx, &comp).await?;
    let bytes = laminate::encode_raster(&raster, format)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn output_format(
    args: &RenderArgs,
    comp: &laminate::Composition,
) -> anyhow::Result<laminate::OutputFormat> {
    if let Some(raw) = &args.format {
        return Ok(laminate::OutputFormat::parse(raw)?);
    }
    let from_ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| laminate::OutputFormat::parse(e).ok());
    Ok(from_ext.unwrap_or(comp.format))
}

#[cfg(not(feature = "http"))]
fn fetcher(
    args: &RenderArgs,
    root: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn laminate::AssetFetcher>> {
    Ok(Arc::new(laminate::FsFetcher::new(laminate::FsFetcherOpts {
        root,
        cache_dir: args.cache_dir.clone(),
    })))
}

#[cfg(feature = "http")]
fn fetcher(
    args: &RenderArgs,
    root: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn laminate::AssetFetcher>> {
    let Some(registry) = &args.registry else {
        return Ok(Arc::new(laminate::FsFetcher::new(laminate::FsFetcherOpts {
            root,
            cache_dir: args.cache_dir.clone(),
        })));
    };
    let mut opts = laminate::HttpFetcherOpts::new(registry.clone());
    opts.root = root;
    opts.cache_dir = args.cache_dir.clone();
    Ok(Arc::new(laminate::HttpFetcher::new(opts)?))
}
