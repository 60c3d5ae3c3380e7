use std::fs;

use anyhow::Context as _;
use buttonctl_storage::Storage;
use buttonctl_ui::Ui;
use directories::ProjectDirs;

mod logger;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "buttonctl", "buttonctl").context("resolve project dirs")?;

    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("create config dir {}", config_dir.display()))?;
    let data_dir = project_dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;

    let _log_guard = logger::init(data_dir, std::env::var(logger::LOG_ENV).ok())?;

    let db_path = config_dir.join("buttonctl.db");
    let storage = Storage::open(&db_path)?;
    let settings = storage.load_settings()?;
    tracing::info!(
        "loaded {} dialog policies from {}",
        settings.dialogs.len(),
        db_path.display()
    );

    let mut ui = Ui::new(settings);
    let outcome = ui.run()?;
    storage.save_settings(&outcome.settings)?;

    Ok(())
}
