use std::path::PathBuf;

use clap::{Parser, Subcommand};
use synapse_common::{SceneConfig, Tier};
use synapse_render::{DebugTextRenderer, RenderView, Renderer};
use synapse_runtime::{SceneMount, Tick};
use synapse_scene::{AnimationParams, SceneGraph};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synapse-cli", about = "Headless tools for the synapse scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Probe GPU capability and print the resolved tier
    Probe,
    /// Build a scene and print a text rendering of it
    Build {
        /// Quality tier to build at
        #[arg(short, long, default_value = "high", value_parser = parse_tier)]
        tier: Tier,
        /// Node count override (tier default when omitted)
        #[arg(short, long)]
        nodes: Option<usize>,
        /// Seed for a reproducible build
        #[arg(short, long)]
        seed: Option<u64>,
        /// Per-node connection limit (exclusive)
        #[arg(short, long, default_value = "4")]
        connection_limit: usize,
    },
    /// Drive the quality loop against a synthetic frame clock
    Simulate {
        /// Total frames to run
        #[arg(short, long, default_value = "600")]
        frames: u32,
        /// Synthetic frame rate
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Switch to --slow-fps after this many frames
        #[arg(long)]
        slow_after: Option<u32>,
        /// Degraded frame rate used after --slow-after
        #[arg(long, default_value = "20")]
        slow_fps: f64,
        /// Initial tier (skips probing)
        #[arg(short, long, default_value = "high", value_parser = parse_tier)]
        tier: Tier,
        /// Scene configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(Tier::Low),
        "medium" => Ok(Tier::Medium),
        "high" => Ok(Tier::High),
        other => Err(format!("unknown tier '{other}', expected low|medium|high")),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    let config: SceneConfig = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("synapse-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("capability: {}", synapse_capability::crate_info());
            println!("quality: {}", synapse_quality::crate_info());
            println!("scene: {}", synapse_scene::crate_info());
            println!("render: {}", synapse_render::crate_info());
            println!("runtime: {}", synapse_runtime::crate_info());
        }
        Commands::Probe => {
            let tier = synapse_capability::probe();
            println!("tier: {tier}");
            println!("default node count: {}", tier.default_node_count());
            println!("glow: {}", tier.glow_enabled());
            println!("resolution scale: {}", tier.resolution_scale());
        }
        Commands::Build {
            tier,
            nodes,
            seed,
            connection_limit,
        } => {
            let count = nodes.unwrap_or_else(|| tier.default_node_count());
            let started = std::time::Instant::now();
            let scene = match seed {
                Some(seed) => SceneGraph::build_seeded(tier, count, connection_limit, seed),
                None => SceneGraph::build(tier, count, connection_limit),
            };
            let elapsed = started.elapsed();

            let mut renderer = DebugTextRenderer::new();
            print!(
                "{}",
                renderer.render(&scene, &RenderView::default(), &AnimationParams::default())
            );
            let max_degree = scene
                .nodes()
                .iter()
                .map(|n| n.connections.len())
                .max()
                .unwrap_or(0);
            println!(
                "Built in {:.2}ms (max connections per node: {max_degree})",
                elapsed.as_secs_f64() * 1000.0
            );
        }
        Commands::Simulate {
            frames,
            fps,
            slow_after,
            slow_fps,
            tier,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let mut mount = SceneMount::with_tier(config, tier)?;
            // The synthetic feed stands in for a visible embedder, so open
            // the gate up front even for lazy-load configurations.
            let _ = mount.set_visible(true);
            mount.on_performance_report(|report| println!("  {report}"));

            println!(
                "Simulating {frames} frames at {fps} fps{} from tier {tier}",
                slow_after
                    .map(|n| format!(" ({slow_fps} fps after frame {n})"))
                    .unwrap_or_default()
            );

            let mut now_ms = 0.0;
            let mut transitions = 0u32;
            for frame in 0..frames {
                let rate = match slow_after {
                    Some(n) if frame >= n => slow_fps,
                    _ => fps,
                };
                if let Tick::Frame { rebuilt: Some(change), .. } = mount.tick(now_ms) {
                    println!("  tier change: {} -> {}", change.from, change.to);
                    transitions += 1;
                }
                now_ms += 1000.0 / rate;
            }

            println!(
                "Done: tier={} nodes={} transitions={transitions}",
                mount.tier(),
                mount.scene().map_or(0, |s| s.node_count()),
            );
        }
    }

    Ok(())
}
