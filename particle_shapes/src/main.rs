//! Print bounding boxes and radial spread for every shape.
//!
//! Usage: `shape_stats [COUNT]` (default 8000).

use particle_shapes::{generate, ShapeKind};

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|a| a.trim().parse().ok())
        .unwrap_or(8000);

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            Particle Shape Statistics                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  {} particles per shape", count);
    println!();
    println!("  {:<12} {:>22} {:>22} {:>8}", "shape", "min (x,y,z)", "max (x,y,z)", "r̄");

    let shapes = ShapeKind::SELECTABLE.iter().copied().chain([ShapeKind::Sphere]);
    for shape in shapes {
        let buf = generate(shape, count);
        if buf.is_empty() {
            println!("  {:<12} (empty)", shape.name());
            continue;
        }
        let pts = buf.points();
        let min = pts.iter().copied().reduce(|a, b| a.min(b)).unwrap_or_default();
        let max = pts.iter().copied().reduce(|a, b| a.max(b)).unwrap_or_default();
        let mean_r = pts.iter().map(|p| p.length()).sum::<f32>() / pts.len() as f32;
        println!(
            "  {:<12} ({:>6.2},{:>6.2},{:>6.2}) ({:>6.2},{:>6.2},{:>6.2}) {:>8.3}",
            shape.name(), min.x, min.y, min.z, max.x, max.y, max.z, mean_r,
        );
    }
    println!();
}
