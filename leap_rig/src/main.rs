//! leap_rig — interactive entry point.

use leap_rig::app::{run, RigConfig};

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Rig — Hand Gesture Playground Controller         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();
    println!("  Opening monitor window…");
    println!();

    if let Err(e) = run(RigConfig::default()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
