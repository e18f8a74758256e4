use clap::Parser;

use crate::config::SourceKind;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "zen_particles.toml")]
    pub config: String,

    /// Starting model: heart, flower, saturn, buddha or firework (overrides config)
    #[arg(long)]
    pub shape: Option<String>,

    /// Starting tint as #rrggbb (overrides config)
    #[arg(long)]
    pub color: Option<String>,

    /// Number of particles (overrides config)
    #[arg(long)]
    pub count: Option<usize>,

    /// Gesture source (overrides config)
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Skip the interactive prompts and start straight away
    #[arg(long, default_value_t = false)]
    pub quick: bool,
}
