use serde::Serialize;
use sparse_recon::basis::BasisSpec;
use sparse_recon::config::MethodName;
use sparse_recon::image::io::{load_pixel_image, save_image_png, write_json_file};
use sparse_recon::image::ColorMode;
use sparse_recon::{
    reconstruction_error, NumCells, ObservationKind, Reconstructor, TrialParams, Wavelet,
};
use std::env;
use std::path::PathBuf;

/// One-shot reconstruction of an image file, reporting the error and
/// optionally saving the reconstruction and a JSON report.
///
/// Usage:
///   reconstruct_demo <image> <method> <observation> <mode> <alpha> <num_cells>
///                    [--dwt-type W --level L] [--cell-size N --sparse-freq F]
///                    [--out reconst.png] [--report report.json]
struct Args {
    image: PathBuf,
    method: MethodName,
    observation: ObservationKind,
    mode: ColorMode,
    alpha: f64,
    num_cells: NumCells,
    dwt_type: Option<Wavelet>,
    level: Option<usize>,
    cell_size: Option<usize>,
    sparse_freq: Option<f64>,
    out: Option<PathBuf>,
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    image: String,
    method: String,
    observation: String,
    alpha: f64,
    num_cells: String,
    error: f64,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let img = load_pixel_image(&args.image, args.mode)?;

    let basis = match args.method {
        MethodName::Dct => {
            if args.dwt_type.is_some() || args.level.is_some() {
                return Err("dct method does not use --dwt-type or --level".into());
            }
            BasisSpec::Dct
        }
        MethodName::Dwt => BasisSpec::Dwt {
            wavelet: args
                .dwt_type
                .ok_or("dwt method requires --dwt-type and --level")?,
        },
    };
    if args.observation.uses_v1_params() && (args.cell_size.is_none() || args.sparse_freq.is_none())
    {
        return Err("v1 observation requires --cell-size and --sparse-freq".into());
    }

    let rec = Reconstructor::new(args.observation, basis);
    let params = TrialParams {
        rep: 0,
        alpha: args.alpha,
        num_cells: args.num_cells,
        level: args.level,
        cell_size: args.cell_size,
        sparse_freq: args.sparse_freq,
    };
    let out = rec.reconstruct(&img, &params).map_err(|e| e.to_string())?;
    let error = reconstruction_error(&img, &out);
    println!(
        "Reconstructed {} ({}x{}): error={:.6}",
        args.image.display(),
        img.w,
        img.h,
        error
    );

    if let Some(path) = &args.out {
        save_image_png(&out, path)?;
        println!("Reconstruction written to {}", path.display());
    }
    if let Some(path) = &args.report {
        let report = Report {
            image: args.image.display().to_string(),
            method: args.method.to_string(),
            observation: args.observation.to_string(),
            alpha: args.alpha,
            num_cells: args.num_cells.to_string(),
            error,
        };
        write_json_file(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn parse_args() -> Result<Args, String> {
    let mut argv = env::args().skip(1);
    let usage = "Usage: reconstruct_demo <image> <method> <observation> <mode> <alpha> <num_cells> \
                 [--dwt-type W --level L] [--cell-size N --sparse-freq F] \
                 [--out reconst.png] [--report report.json]";

    let mut positional = Vec::new();
    let mut dwt_type = None;
    let mut level = None;
    let mut cell_size = None;
    let mut sparse_freq = None;
    let mut out = None;
    let mut report = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--dwt-type" => dwt_type = Some(next_value(&mut argv, "--dwt-type")?.parse()?),
            "--level" => level = Some(parse_num::<usize>(&mut argv, "--level")?),
            "--cell-size" => cell_size = Some(parse_num::<usize>(&mut argv, "--cell-size")?),
            "--sparse-freq" => sparse_freq = Some(parse_num::<f64>(&mut argv, "--sparse-freq")?),
            "--out" => out = Some(PathBuf::from(next_value(&mut argv, "--out")?)),
            "--report" => report = Some(PathBuf::from(next_value(&mut argv, "--report")?)),
            _ => positional.push(arg),
        }
    }
    if positional.len() != 6 {
        return Err(usage.to_string());
    }

    let mode = match positional[3].to_ascii_lowercase().as_str() {
        "black" => ColorMode::Black,
        "color" => ColorMode::Color,
        other => return Err(format!("unknown mode '{other}' (supported: black, color)")),
    };
    let alpha: f64 = positional[4]
        .parse()
        .map_err(|e| format!("invalid alpha '{}': {e}", positional[4]))?;
    let num_cells: f64 = positional[5]
        .parse()
        .map_err(|e| format!("invalid num_cells '{}': {e}", positional[5]))?;

    Ok(Args {
        image: PathBuf::from(&positional[0]),
        method: positional[1].parse()?,
        observation: positional[2].parse()?,
        mode,
        alpha,
        num_cells: NumCells::from_value(num_cells),
        dwt_type,
        level,
        cell_size,
        sparse_freq,
        out,
        report,
    })
}

fn next_value(argv: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    argv.next().ok_or_else(|| format!("{flag} needs a value"))
}

fn parse_num<T: std::str::FromStr>(
    argv: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    let raw = next_value(argv, flag)?;
    raw.parse()
        .map_err(|e| format!("invalid value for {flag} '{raw}': {e}"))
}
