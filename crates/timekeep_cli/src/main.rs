//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `timekeep_core` linkage.
//! - Keep output deterministic enough for quick local sanity checks.

use timekeep_core::{CoreConfig, CoreSession, InProcessTransport};

fn main() {
    println!("timekeep_core version={}", timekeep_core::core_version());

    // An in-process hub stands in for the platform broadcast primitive so
    // the probe exercises real session wiring.
    let transport = InProcessTransport::new();
    match CoreSession::start(&transport, &CoreConfig::default()) {
        Ok(session) => {
            println!(
                "sync available={} instance={}",
                session.coordinator().is_available(),
                session.coordinator().instance_id()
            );
            session.shutdown();
        }
        Err(err) => {
            eprintln!("session start failed: {err}");
            std::process::exit(1);
        }
    }
}
