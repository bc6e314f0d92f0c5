use clap::Parser;
use skillnotes::{
    app::{App, AppStore},
    cli::{self, Cli},
    config, events,
    error::AppError,
    logging,
    storage::{FileStore, MemoryStore},
    tui, ui,
    workspace::Workspace,
};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = config::load_config()?;
    let data_dir = config.resolve_data_dir();

    if let Err(e) = logging::init(&data_dir, config.log_level()) {
        eprintln!("Logging disabled: {}", e);
    }
    info!(data_dir = %data_dir.display(), "skillnotes {} starting", env!("CARGO_PKG_VERSION"));

    let mut workspace = Workspace::open(open_store(&data_dir));

    match cli.command {
        Some(command) => cli::run(command, &mut workspace, &data_dir),
        None => run_tui(App::new(workspace).with_xp_grant(config.xp_grant)),
    }
}

/// File store under `data_dir`, or an in-memory one when the directory is unusable
fn open_store(data_dir: &Path) -> AppStore {
    match fs::create_dir_all(data_dir) {
        Ok(()) => Box::new(FileStore::new(data_dir)),
        Err(e) => {
            warn!(error = %e, "data directory unusable, changes will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn run_tui(mut app: App) -> Result<(), AppError> {
    let mut tui = tui::init()?;
    let result = run_loop(&mut tui, &mut app);
    tui::restore()?;

    if let Err(e) = &result {
        error!(error = %e, "terminal loop failed");
    }
    result
}

fn run_loop(tui: &mut tui::Tui, app: &mut App) -> Result<(), AppError> {
    while !app.should_quit {
        tui.draw(|frame| ui::render(app, frame))?;
        events::handle_events(app)?;
    }
    Ok(())
}
