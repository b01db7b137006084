//! Renders one SVG icon in every mode and state and writes the results as PNG.
//!
//! Run with: cargo run -p horizon-lattice-svgicon --example render_modes -- icon.svg [size] [out_dir]

use std::path::PathBuf;

use horizon_lattice_svgicon::{IconMode, IconState, PixelSize, SvgIconEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: render_modes <icon.svg> [size] [out_dir]");
        std::process::exit(2);
    };
    let size: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(48);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_owned()));

    let mut engine = SvgIconEngine::new();
    engine.add_file(&input, IconMode::Normal, IconState::Off);
    if engine.is_null() {
        eprintln!("{input}: not a loadable icon");
        std::process::exit(1);
    }

    std::fs::create_dir_all(&out_dir)?;
    for mode in IconMode::ALL {
        for state in IconState::ALL {
            let image = engine.pixmap(PixelSize::new(size, size), mode, state);
            if image.is_null() {
                continue;
            }
            let path = out_dir.join(format!("{mode:?}-{state:?}.png").to_lowercase());
            std::fs::write(&path, image.to_png()?)?;
            println!("{} {}", image.size(), path.display());
        }
    }

    Ok(())
}
