mod app;
mod canvas;
mod cli;
mod components;
mod io;
pub mod logger;
mod ops;

use std::process::ExitCode;

use app::LassoFadeApp;
use eframe::egui;

fn main() -> ExitCode {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        return cli::run(args);
    }

    // -- GUI mode --------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("LassoFade"),
        ..Default::default()
    };

    match eframe::run_native(
        "LassoFade",
        options,
        Box::new(|cc| Box::new(LassoFadeApp::new(cc))),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            crate::log_err!("failed to start window: {}", e);
            eprintln!("error: failed to start LassoFade: {}", e);
            ExitCode::FAILURE
        }
    }
}
