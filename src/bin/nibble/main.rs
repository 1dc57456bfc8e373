//! nibble - terminal bench for the Bitfield quantizer
//!
//! Run with: cargo run --bin nibble
//!
//! A slow sweep drives a Bitfield; bit 0 plays through the default output
//! device while the TUI shows every bit and the spectrum of bit 0.

mod app;
mod ui;

use app::Bench;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    Bench::new().sweep_hz(55.0).run()
}
