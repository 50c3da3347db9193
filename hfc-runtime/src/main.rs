use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use hfc_packing::{
    bin_packing::{parse_solution, solve_bin_packing, BinPackingModel, BinUtilization, CommandSolver},
    manifest::{generate_manifest, load_manifest, write_csv_manifest, ManifestTrack},
    space_utilization,
};
use hfc_structs::{config::RunConfig, core::Container};
use hfc_utils::{compress_obj, jsonify, load_json_arg, read_json_arg, seed_from_str};
use log::info;
use std::{fs, io, path::PathBuf, time::Instant};

fn cli() -> Command {
    Command::new("hfc-runtime")
        .about("Estimates container space utilization and exports bin packing models")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("estimate")
                .about("Estimates space utilization of a manifest loaded in order")
                .arg(
                    arg!(<MANIFEST> "Path to a cargo manifest (csv, or json array)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--config [CONFIG] "Config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--container [CONTAINER] "Container dimensions as L,W,H")
                        .value_parser(clap::value_parser!(Container)),
                )
                .arg(
                    arg!(--details "Print one line per container")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("build_model")
                .about("Prints the bin packing model as LP text")
                .arg(
                    arg!(<MANIFEST> "Path to a cargo manifest (csv, or json array)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--config [CONFIG] "Config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the QUBO is saved to this file path as json")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress "If output file is set, the QUBO is compressed as zlib")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("solve")
                .about("Solves the bin packing model with an external QUBO solver")
                .arg(
                    arg!(<MANIFEST> "Path to a cargo manifest (csv, or json array)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--config [CONFIG] "Config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<PROGRAM> "Solver program, reads the QUBO json on stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!([ARGS] ... "Arguments passed to the solver program")
                        .value_parser(clap::value_parser!(String))
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Evaluates a bin packing solution vector")
                .arg(
                    arg!(<MANIFEST> "Path to a cargo manifest (csv, or json array)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--config [CONFIG] "Config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates a synthetic csv manifest")
                .arg(arg!(<SEED> "A string used in seed generation").value_parser(clap::value_parser!(String)))
                .arg(arg!(<NUM_BOXES> "Number of boxes").value_parser(clap::value_parser!(usize)))
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the manifest is written to this file path instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    env_logger::init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("estimate", sub_m)) => estimate(
            sub_m.get_one::<PathBuf>("MANIFEST").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
            sub_m.get_one::<Container>("container").cloned(),
            sub_m.get_flag("details"),
        ),
        Some(("build_model", sub_m)) => build_model(
            sub_m.get_one::<PathBuf>("MANIFEST").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            sub_m.get_flag("compress"),
        ),
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<PathBuf>("MANIFEST").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
            sub_m.get_one::<String>("PROGRAM").unwrap().clone(),
            sub_m
                .get_many::<String>("ARGS")
                .map(|args| args.cloned().collect())
                .unwrap_or_default(),
        ),
        Some(("evaluate", sub_m)) => evaluate(
            sub_m.get_one::<PathBuf>("MANIFEST").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
            sub_m.get_one::<String>("config").cloned(),
        ),
        Some(("generate", sub_m)) => generate(
            sub_m.get_one::<String>("SEED").unwrap().clone(),
            *sub_m.get_one::<usize>("NUM_BOXES").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

pub fn estimate(
    manifest_path: PathBuf,
    config: Option<String>,
    container: Option<Container>,
    details: bool,
) -> Result<()> {
    let mut config = load_config(config.as_deref())?;
    if let Some(container) = container {
        config.container = container;
    }
    let boxes = load_manifest(&manifest_path)?;

    let start = Instant::now();
    let estimate = space_utilization::estimate_containers(&config.container, &boxes)?;
    let running_time = start.elapsed().as_secs_f64();

    if details {
        for (i, load) in estimate.containers.iter().enumerate() {
            println!(
                "Container {}: {} boxes loaded, {} discarded, utilization {:.3}",
                i,
                load.loaded.len(),
                load.discarded.len(),
                load.utilization
            );
        }
    }
    println!("Space utilization: {:.3}", estimate.total_utilization());
    println!("Running time: {:.10} seconds", running_time);
    Ok(())
}

pub fn build_model(
    manifest_path: PathBuf,
    config: Option<String>,
    output_file: Option<PathBuf>,
    compress: bool,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let boxes = load_manifest(&manifest_path)?;
    let model = BinPackingModel::build(&boxes, &config.bin_packing)?;
    print!("{}", model.export_as_lp_string());

    if let Some(path) = output_file {
        let qubo = model.to_qubo()?;
        if compress {
            fs::write(&path, compress_obj(&qubo)?)?;
        } else {
            fs::write(&path, jsonify(&qubo)?)?;
        }
        info!(
            "qubo with {} variables written to {}",
            qubo.num_vars(),
            path.display()
        );
    }
    Ok(())
}

pub fn solve(
    manifest_path: PathBuf,
    config: Option<String>,
    program: String,
    args: Vec<String>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let boxes = load_manifest(&manifest_path)?;
    let model = BinPackingModel::build(&boxes, &config.bin_packing)?;
    let solver = CommandSolver::new(program, args);
    let utilization = solve_bin_packing(&model, &solver)?;
    print_bin_utilization(&utilization);
    Ok(())
}

pub fn evaluate(manifest_path: PathBuf, solution: String, config: Option<String>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let boxes = load_manifest(&manifest_path)?;
    let model = BinPackingModel::build(&boxes, &config.bin_packing)?;
    let x = parse_solution(&read_json_arg(&solution)?)?;
    let utilization = model.evaluate_full_solution(&x)?;
    print_bin_utilization(&utilization);
    Ok(())
}

pub fn generate(seed: String, num_boxes: usize, output_file: Option<PathBuf>) -> Result<()> {
    let track = ManifestTrack {
        num_boxes,
        ..ManifestTrack::default()
    };
    let boxes = generate_manifest(&seed_from_str(&seed), &track)?;
    match output_file {
        Some(path) => write_csv_manifest(fs::File::create(&path)?, &boxes)?,
        None => write_csv_manifest(io::stdout().lock(), &boxes)?,
    }
    Ok(())
}

fn load_config(config: Option<&str>) -> Result<RunConfig> {
    match config {
        Some(config) => load_json_arg::<RunConfig>(config),
        None => Ok(RunConfig::default()),
    }
}

fn print_bin_utilization(utilization: &BinUtilization) {
    for bin in &utilization.bins {
        println!(
            "Bin {}: used={} boxes={:?} base area utilization {:.3}, volume utilization {:.3}",
            bin.bin, bin.used, bin.items, bin.base_area_ratio, bin.volume_ratio
        );
    }
    println!("Bins used: {}", utilization.num_bins_used);
}
