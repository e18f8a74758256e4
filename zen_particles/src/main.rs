//! zen_particles: interactive entry point.

use std::io::{self, Write};

use clap::Parser;
use particle_field::{Rgb, ShapeKind};
use tracing::error;
use tracing_subscriber::EnvFilter;

use zen_particles::app::run;
use zen_particles::cli::Args;
use zen_particles::config::AppConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Zen Particles — gesture-driven point cloud          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  LeapMotion support: built in  (--source leap)");
    #[cfg(not(feature = "leap"))]
    println!("  LeapMotion support: off  (use --features leap for hardware)");
    println!();

    let mut cfg = match AppConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    cfg.apply_args(&args);

    if args.quick {
        println!("  Quick-start: {} particles, {} in {}\n",
            cfg.particle_count, cfg.initial_shape, cfg.initial_color);
    } else {
        configure_interactively(&mut cfg, &args);
    }

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Ask for whatever the command line left open.  Enter keeps the current
/// value.
fn configure_interactively(cfg: &mut AppConfig, args: &Args) {
    if args.shape.is_none() {
        println!("  Starting model:");
        println!("    1.Heart  2.Flower  3.Saturn  4.Buddha  5.Firework");
        let answer = read_line(&format!("    Choice (1–5, default {}): ", cfg.initial_shape));
        let picked = match answer.trim() {
            "1" => Some(ShapeKind::Heart),
            "2" => Some(ShapeKind::Flower),
            "3" => Some(ShapeKind::Saturn),
            "4" => Some(ShapeKind::Buddha),
            "5" => Some(ShapeKind::Firework),
            ""  => None,
            other => Some(ShapeKind::from_name(other)),
        };
        if let Some(shape) = picked {
            cfg.initial_shape = shape.name().to_string();
        }
    }

    if args.color.is_none() {
        println!("  Tint colour, e.g. #00ffff:");
        loop {
            let answer = read_line(&format!("    Hex (default {}): ", cfg.initial_color));
            let answer = answer.trim();
            if answer.is_empty() { break; }
            match Rgb::from_hex(answer) {
                Some(c) => { cfg.initial_color = c.to_hex(); break; }
                None    => println!("    ⚠  #rrggbb or #rgb only."),
            }
        }
    }

    if args.count.is_none() {
        let answer = read_line(&format!("  Particles (default {}): ", cfg.particle_count));
        if let Ok(n) = answer.trim().parse::<usize>() {
            // Out-of-range counts are rejected by `AppConfig::validate`.
            cfg.particle_count = n;
        }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
