use sparse_recon::config::{self, data_save_path};
use sparse_recon::image::io::load_pixel_image;
use sparse_recon::sweep::{append_manifest, run_sweep};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args().next().unwrap_or_else(|| "sweep_run".to_string());
    let config_path = env::args()
        .nth(1)
        .ok_or_else(|| format!("Usage: {program} <sweep-config.json>"))?;
    let cfg = config::load_config(Path::new(&config_path))?;
    let resolved = cfg.validate().map_err(|e| format!("Invalid config: {e}"))?;

    let img = load_pixel_image(&cfg.image, cfg.mode)?;
    println!(
        "Sweeping {} ({}x{}, {} channel(s)): {} combinations",
        cfg.image.display(),
        img.w,
        img.h,
        img.channels(),
        resolved.grid.combination_count()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .build()
        .map_err(|e| format!("Failed to build worker pool: {e}"))?;
    let outcome = run_sweep(&pool, &img, &resolved.reconstructor, &resolved.grid);
    drop(pool);

    let image_name = cfg.image_name();
    let method = cfg.method.name();
    let observation = cfg.observation.name();
    let table_stem = format!("{}_param", cfg.mode_name());
    let csv_path = data_save_path(
        &cfg.output_dir,
        &image_name,
        method,
        observation,
        &format!("{table_stem}.csv"),
    );
    outcome.table.save(&csv_path)?;
    let manifest_path = data_save_path(
        &cfg.output_dir,
        &image_name,
        method,
        observation,
        &format!("{}_hyperparam.txt", cfg.mode_name()),
    );
    append_manifest(&manifest_path, &table_stem, &resolved.grid)?;

    println!(
        "Done: {} rows written to {} ({} of {} trials skipped)",
        outcome.table.row_count(),
        csv_path.display(),
        outcome.failed,
        outcome.attempted
    );
    Ok(())
}
