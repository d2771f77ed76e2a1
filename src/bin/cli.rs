//! CLI that replays recorded face landmarks through the overlay pipeline.
//!
//! Usage:
//!   face-overlay <landmarks.json>                         # Human-readable summary
//!   face-overlay <landmarks.json> --json                  # JSON output
//!   face-overlay <landmarks.json> -o report.json --json   # Save to file
//!   face-overlay <landmarks.json> --backend canvas --frames-dir out/

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use face_overlay::{
    AnyTarget, CanvasOrigin, Color, FramePipeline, FrameReport, MappingPolicy, MissPolicy,
    OverlayConfig, Recording, RenderBackend, ReplayDetector, RunStats,
};
use log::{info, LevelFilter};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "face-overlay")]
#[command(author, version, about = "Replay face landmarks through the overlay pipeline", long_about = None)]
struct Args {
    /// Recorded landmarks (JSON: width, height, frames)
    #[arg(required = true)]
    landmarks: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Coordinate mapping
    #[arg(long, value_enum)]
    mapping: Option<MappingArg>,

    /// Horizontal extent for --mapping normalize-center
    #[arg(long, default_value = "2.0")]
    scale_x: f32,

    /// Vertical extent for --mapping normalize-center
    #[arg(long, default_value = "2.0")]
    scale_y: f32,

    /// Row origin of the canvas raster (default: derived from --mapping)
    #[arg(long, value_enum)]
    canvas_origin: Option<OriginArg>,

    /// What to show on frames without a face
    #[arg(long, value_enum)]
    miss_policy: Option<MissArg>,

    /// Overlay colour (#rrggbb)
    #[arg(long)]
    color: Option<Color>,

    /// Overlay opacity (0-1)
    #[arg(long)]
    opacity: Option<f32>,

    /// Write each rendered frame as PNG here (canvas backend only)
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Canvas,
    Mesh,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MappingArg {
    MirrorFlip,
    NormalizeCenter,
    Identity,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OriginArg {
    TopLeft,
    BottomLeft,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MissArg {
    KeepStale,
    Hide,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    landmarks: String,
    width: f32,
    height: f32,
    config: OverlayConfig,
    stats: RunStats,
    frames: Vec<FrameReport>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_config(args: &Args) -> face_overlay::Result<OverlayConfig> {
    let mut config = match &args.config {
        Some(path) => OverlayConfig::load(path)?,
        None => OverlayConfig::default(),
    };

    if let Some(backend) = args.backend {
        config.backend = match backend {
            BackendArg::Canvas => RenderBackend::Canvas,
            BackendArg::Mesh => RenderBackend::Mesh,
        };
    }
    if let Some(mapping) = args.mapping {
        config.mapping = match mapping {
            MappingArg::MirrorFlip => MappingPolicy::MirrorFlip,
            MappingArg::NormalizeCenter => MappingPolicy::NormalizeCenter {
                scale_x: args.scale_x,
                scale_y: args.scale_y,
            },
            MappingArg::Identity => MappingPolicy::Identity,
        };
    }
    if let Some(origin) = args.canvas_origin {
        config.canvas_origin = Some(match origin {
            OriginArg::TopLeft => CanvasOrigin::TopLeft,
            OriginArg::BottomLeft => CanvasOrigin::BottomLeft,
        });
    }
    if let Some(policy) = args.miss_policy {
        config.miss_policy = match policy {
            MissArg::KeepStale => MissPolicy::KeepStale,
            MissArg::Hide => MissPolicy::Hide,
        };
    }
    if let Some(color) = args.color {
        config.color = color;
    }
    if let Some(opacity) = args.opacity {
        config.opacity = opacity;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    let builder = config.build_overlay()?;
    info!(
        "contour of {} landmarks, {:?} mapping, {:?} backend",
        builder.contour().len(),
        config.mapping,
        config.backend
    );

    let recording = Recording::load(&args.landmarks)?;
    let frame_size = recording.frame_size();
    info!(
        "replaying {} frames at {}x{}",
        recording.frames.len(),
        frame_size.width,
        frame_size.height
    );

    if args.frames_dir.is_some() && config.backend != RenderBackend::Canvas {
        return Err("--frames-dir requires the canvas backend".into());
    }
    if let Some(ref dir) = args.frames_dir {
        std::fs::create_dir_all(dir)?;
    }

    let detector = ReplayDetector::new(recording);
    let frames: Vec<_> = detector.frames().collect();
    let target = AnyTarget::for_backend(
        config.backend,
        frame_size,
        config.effective_canvas_origin(),
    );
    let mut pipeline =
        FramePipeline::new(detector, target, builder).with_miss_policy(config.miss_policy);

    let style = config.style();
    let mut reports = Vec::with_capacity(frames.len());
    let stats = pipeline.run_with(
        frames,
        |_| style,
        |report, target| {
            if let (Some(dir), Some(canvas)) = (&args.frames_dir, target.as_canvas()) {
                canvas.save(dir.join(format!("frame_{:05}.png", report.index)))?;
            }
            reports.push(report.clone());
            Ok(())
        },
    )?;

    let output = Output {
        landmarks: args.landmarks.display().to_string(),
        width: frame_size.width,
        height: frame_size.height,
        config,
        stats,
        frames: reports,
    };

    // Generate output
    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    // Write output
    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!("output written to {}", path.display());
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Landmarks: {} ({}x{})\n",
        output.landmarks, output.width, output.height
    ));
    s.push_str(&format!(
        "Backend: {:?}, mapping: {:?}, on miss: {:?}\n",
        output.config.backend, output.config.mapping, output.config.miss_policy
    ));
    s.push_str(&format!(
        "Style: {} at {:.0}% opacity\n",
        output.config.color,
        output.config.opacity * 100.0
    ));

    if output.frames.is_empty() {
        s.push_str("\nNo frames recorded.\n");
        return s;
    }

    s.push_str("\nFrames:\n");
    for frame in &output.frames {
        s.push_str(&format!(
            "  {:>5}  {:<8} {:>3} triangles  area {:.1}\n",
            frame.index,
            format!("{:?}", frame.outcome),
            frame.triangles,
            frame.area
        ));
    }

    s.push_str(&format!(
        "\nTotal: {} frames ({} updated, {} stale, {} hidden)\n",
        output.stats.frames, output.stats.updated, output.stats.stale, output.stats.hidden
    ));

    s
}
