use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gpraster::{
    Affine, Backend, BlendMode, ColorValue, CompositingMode, CurvePrimitive, GradientPaint,
    GradientStop, HostDevice, HostDeviceOpts, Point, Rect, RendererOpts, RendererRegistry,
    ResamplingAlgorithm, SpreadMode, Texture, Vec2, WindingRule,
};

#[derive(Parser, Debug)]
#[command(name = "gpraster", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a star and a curved lens with a drop shadow.
    Fill(FillArgs),
    /// Paint a gradient over the whole canvas.
    Gradient(GradientArgs),
    /// Resample a PNG through a scale and rotation.
    Image(ImageArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Device to render on.
    #[arg(long, value_enum, default_value_t = DeviceChoice::Host)]
    device: DeviceChoice,

    /// Host worker threads (defaults to one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Renderer options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FillArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Samples per pixel edge.
    #[arg(long, default_value_t = 4)]
    antialias: u32,

    /// Winding rule for the star.
    #[arg(long, value_enum, default_value_t = RuleChoice::NonZero)]
    rule: RuleChoice,

    /// Shadow blur radius in pixels.
    #[arg(long, default_value_t = 6.0)]
    blur: f64,
}

#[derive(Args, Debug)]
struct GradientArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Gradient geometry.
    #[arg(long, value_enum, default_value_t = GradientChoice::Linear)]
    kind: GradientChoice,

    /// Spread applied on both ends.
    #[arg(long, value_enum, default_value_t = SpreadChoice::Pad)]
    spread: SpreadChoice,
}

#[derive(Args, Debug)]
struct ImageArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Uniform scale factor.
    #[arg(long, default_value_t = 2.0)]
    scale: f64,

    /// Rotation about the image center, in degrees.
    #[arg(long, default_value_t = 0.0)]
    rotate: f64,

    /// Resampling kernel.
    #[arg(long, value_enum, default_value_t = AlgorithmChoice::Linear)]
    algorithm: AlgorithmChoice,

    /// Samples per pixel edge.
    #[arg(long, default_value_t = 1)]
    antialias: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeviceChoice {
    Host,
    #[cfg(feature = "gpu")]
    Gpu,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleChoice {
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GradientChoice {
    Linear,
    Radial,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpreadChoice {
    None,
    Pad,
    Reflect,
    Repeat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgorithmChoice {
    None,
    Linear,
    Cosine,
    Cubic,
    Hermite,
    Mitchell,
    Lanczos,
}

impl From<RuleChoice> for WindingRule {
    fn from(c: RuleChoice) -> Self {
        match c {
            RuleChoice::NonZero => WindingRule::NonZero,
            RuleChoice::EvenOdd => WindingRule::EvenOdd,
        }
    }
}

impl From<SpreadChoice> for SpreadMode {
    fn from(c: SpreadChoice) -> Self {
        match c {
            SpreadChoice::None => SpreadMode::None,
            SpreadChoice::Pad => SpreadMode::Pad,
            SpreadChoice::Reflect => SpreadMode::Reflect,
            SpreadChoice::Repeat => SpreadMode::Repeat,
        }
    }
}

impl From<AlgorithmChoice> for ResamplingAlgorithm {
    fn from(c: AlgorithmChoice) -> Self {
        match c {
            AlgorithmChoice::None => ResamplingAlgorithm::None,
            AlgorithmChoice::Linear => ResamplingAlgorithm::Linear,
            AlgorithmChoice::Cosine => ResamplingAlgorithm::Cosine,
            AlgorithmChoice::Cubic => ResamplingAlgorithm::Cubic,
            AlgorithmChoice::Hermite => ResamplingAlgorithm::Hermite {
                tension: 0.0,
                bias: 0.0,
            },
            AlgorithmChoice::Mitchell => ResamplingAlgorithm::Mitchell {
                b: 1.0 / 3.0,
                c: 1.0 / 3.0,
            },
            AlgorithmChoice::Lanczos => ResamplingAlgorithm::Lanczos { a: 3 },
        }
    }
}

/// Everything a scene needs once arguments and inputs are resolved.
enum Scene {
    Fill {
        width: u32,
        height: u32,
        antialias: u32,
        rule: WindingRule,
        blur: f64,
    },
    Gradient {
        width: u32,
        height: u32,
        kind: GradientChoice,
        spread: SpreadMode,
    },
    Image {
        texture: Texture,
        width: u32,
        height: u32,
        transform: Affine,
        antialias: u32,
    },
}

impl Scene {
    fn size(&self) -> (u32, u32) {
        match *self {
            Scene::Fill { width, height, .. }
            | Scene::Gradient { width, height, .. }
            | Scene::Image { width, height, .. } => (width, height),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (common, scene) = match cli.cmd {
        Command::Fill(args) => (
            args.common,
            Scene::Fill {
                width: args.width,
                height: args.height,
                antialias: args.antialias,
                rule: args.rule.into(),
                blur: args.blur,
            },
        ),
        Command::Gradient(args) => (
            args.common,
            Scene::Gradient {
                width: args.width,
                height: args.height,
                kind: args.kind,
                spread: args.spread.into(),
            },
        ),
        Command::Image(args) => {
            let scene = image_scene(&args)?;
            (args.common, scene)
        }
    };

    let opts = read_opts(common.opts.as_deref())?;
    let pixels = match common.device {
        DeviceChoice::Host => {
            let device = HostDevice::new(HostDeviceOpts {
                threads: common.threads,
            })?;
            render(Arc::new(device), opts, &scene)?
        }
        #[cfg(feature = "gpu")]
        DeviceChoice::Gpu => {
            let device = gpraster::gpu::WgpuDevice::new(gpraster::gpu::WgpuDeviceOpts::default())?;
            eprintln!("adapter: {}", device.adapter_name());
            render(Arc::new(device), opts, &scene)?
        }
    };

    let (width, height) = scene.size();
    write_png(&common.out, &pixels, width, height)?;
    eprintln!("wrote {}", common.out.display());
    Ok(())
}

fn read_opts(path: Option<&Path>) -> anyhow::Result<RendererOpts> {
    let Some(path) = path else {
        return Ok(RendererOpts::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read renderer options '{}'", path.display()))?;
    RendererOpts::from_json_str(&s)
        .with_context(|| format!("parse renderer options '{}'", path.display()))
}

fn image_scene(args: &ImageArgs) -> anyhow::Result<Scene> {
    anyhow::ensure!(
        args.scale.is_finite() && args.scale > 0.0,
        "--scale must be a positive number"
    );
    let img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?
        .to_rgba32f();
    let (w, h) = img.dimensions();
    let texture = Texture::new(w, h, 4, img.into_raw())?.with_algorithm(args.algorithm.into());

    let width = (f64::from(w) * args.scale).ceil().max(1.0) as u32;
    let height = (f64::from(h) * args.scale).ceil().max(1.0) as u32;
    let transform = Affine::translate((f64::from(width) / 2.0, f64::from(height) / 2.0))
        * Affine::rotate(args.rotate.to_radians())
        * Affine::scale(args.scale)
        * Affine::translate((-f64::from(w) / 2.0, -f64::from(h) / 2.0));

    Ok(Scene::Image {
        texture,
        width,
        height,
        transform,
        antialias: args.antialias,
    })
}

fn render<B: Backend>(
    backend: Arc<B>,
    opts: RendererOpts,
    scene: &Scene,
) -> anyhow::Result<Vec<f32>> {
    let registry = RendererRegistry::new(backend, opts)?;
    let renderer = registry.renderer(4)?;
    let (width, height) = scene.size();
    let mut enc = renderer.encoder(width, height)?;
    let canvas = enc.alloc_texture()?;

    match scene {
        Scene::Fill {
            antialias,
            rule,
            blur,
            ..
        } => {
            let (w, h) = (f64::from(width), f64::from(height));
            enc.draw_shape(
                &canvas,
                &CurvePrimitive::rect(Rect::new(0.0, 0.0, w, h)),
                ColorValue::rgba(0.07, 0.08, 0.11, 1.0),
                WindingRule::NonZero,
                1,
                None,
            )?;

            let shape = enc.alloc_texture()?;
            let fit = Affine::scale_non_uniform(w, h);
            let star: Vec<_> = star(Point::new(0.5, 0.45), 0.38)
                .iter()
                .map(|p| p.transformed(fit))
                .collect();
            enc.draw_shape(
                &shape,
                &star,
                ColorValue::rgba(0.95, 0.75, 0.2, 1.0),
                *rule,
                *antialias,
                None,
            )?;
            let lens = [
                CurvePrimitive::Quadratic {
                    p0: Point::new(0.2, 0.85),
                    p1: Point::new(0.5, 1.05),
                    p2: Point::new(0.8, 0.85),
                },
                CurvePrimitive::Quadratic {
                    p0: Point::new(0.8, 0.85),
                    p1: Point::new(0.5, 0.65),
                    p2: Point::new(0.2, 0.85),
                },
            ];
            let lens: Vec<_> = lens.iter().map(|p| p.transformed(fit)).collect();
            enc.draw_shape(
                &shape,
                &lens,
                ColorValue::rgba(0.3, 0.6, 0.95, 1.0),
                WindingRule::NonZero,
                *antialias,
                None,
            )?;

            let shadow = enc.alloc_texture()?;
            enc.shadow(
                &shape,
                &shadow,
                ColorValue::rgba(0.0, 0.0, 0.0, 0.6),
                Vec2::new(4.0, 6.0),
                *blur,
            )?;
            enc.blend(
                &shadow,
                &canvas,
                None,
                CompositingMode::SourceOver,
                BlendMode::Normal,
            )?;
            enc.blend(
                &shape,
                &canvas,
                None,
                CompositingMode::SourceOver,
                BlendMode::Normal,
            )?;
        }
        Scene::Gradient { kind, spread, .. } => {
            let (w, h) = (f64::from(width), f64::from(height));
            let paint = GradientPaint::new(vec![
                GradientStop::new(0.0, ColorValue::rgba(0.9, 0.2, 0.2, 1.0)),
                GradientStop::new(0.5, ColorValue::rgba(0.95, 0.85, 0.3, 1.0)),
                GradientStop::new(1.0, ColorValue::rgba(0.2, 0.3, 0.9, 1.0)),
            ])
            .with_spread(*spread, *spread);
            match kind {
                GradientChoice::Linear => enc.linear_gradient(
                    &canvas,
                    &paint,
                    Point::new(w * 0.25, h * 0.5),
                    Point::new(w * 0.75, h * 0.5),
                )?,
                GradientChoice::Radial => {
                    let center = Point::new(w * 0.5, h * 0.5);
                    enc.radial_gradient(&canvas, &paint, center, 0.0, center, w.min(h) * 0.25)?
                }
            }
        }
        Scene::Image {
            texture,
            transform,
            antialias,
            ..
        } => enc.draw_texture(texture, &canvas, *transform, *antialias)?,
    }

    enc.commit(true)?;
    let stats = enc.stats();
    eprintln!(
        "{} requests in {} command buffers, {} programs compiled",
        stats.batch.requests,
        stats.batch.submissions,
        renderer.cache_stats().compiles
    );
    Ok(renderer.read_pixels(&canvas)?)
}

/// Pentagram in traversal order, as a triangle fan from its first point.
fn star(center: Point, radius: f64) -> Vec<CurvePrimitive> {
    let points: Vec<Point> = (0..5)
        .map(|i| {
            let angle = -std::f64::consts::FRAC_PI_2 + f64::from(i * 2) * std::f64::consts::TAU / 5.0;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    (1..4)
        .map(|i| CurvePrimitive::Triangle {
            p0: points[0],
            p1: points[i],
            p2: points[i + 1],
        })
        .collect()
}

fn write_png(path: &Path, pixels: &[f32], width: u32, height: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let bytes: Vec<u8> = pixels
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    image::save_buffer_with_format(
        path,
        &bytes,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
