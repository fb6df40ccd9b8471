//! pv-design entry point: CLI wiring and config-driven engine runs.

use std::path::Path;
use std::process;

use pv_design::catalog::store::CatalogStore;
use pv_design::config::DesignRequirements;
use pv_design::engine::designer::Designer;
use pv_design::io::export::export_cashflow_csv;
use pv_design::report;

/// Parsed CLI arguments.
struct CliArgs {
    requirements_path: Option<String>,
    preset: Option<String>,
    catalog_dir: Option<String>,
    target_power_override: Option<f64>,
    json: bool,
    cashflow_out: Option<String>,
}

fn print_help() {
    eprintln!("pv-design — solar-PV equipment selection and compliance engine");
    eprintln!();
    eprintln!("Usage: pv-design [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --requirements <path>    Load design requirements from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, premium, budget)");
    eprintln!("  --catalog-dir <dir>      Load panels.csv and inverters.csv from a directory");
    eprintln!("  --target-power <w>       Override the target DC power (W)");
    eprintln!("  --json                   Print the outcome as JSON instead of a report");
    eprintln!("  --cashflow-out <path>    Export the cash-flow schedule to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --requirements or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        requirements_path: None,
        preset: None,
        catalog_dir: None,
        target_power_override: None,
        json: false,
        cashflow_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--requirements" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --requirements requires a path argument");
                    process::exit(1);
                }
                cli.requirements_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--catalog-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --catalog-dir requires a directory argument");
                    process::exit(1);
                }
                cli.catalog_dir = Some(args[i].clone());
            }
            "--target-power" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --target-power requires a wattage argument");
                    process::exit(1);
                }
                if let Ok(w) = args[i].parse::<f64>() {
                    cli.target_power_override = Some(w);
                } else {
                    eprintln!(
                        "error: --target-power value \"{}\" is not a valid number",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--json" => {
                cli.json = true;
            }
            "--cashflow-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --cashflow-out requires a path argument");
                    process::exit(1);
                }
                cli.cashflow_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load requirements: --requirements takes priority, then --preset,
    // then the baseline default.
    let mut requirements = if let Some(ref path) = cli.requirements_path {
        match DesignRequirements::from_toml_file(Path::new(path)) {
            Ok(req) => req,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match DesignRequirements::from_preset(name) {
            Ok(req) => req,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        DesignRequirements::baseline()
    };

    // Apply target override
    if let Some(target) = cli.target_power_override {
        requirements.design.target_power_w = target;
    }

    // Validate
    let errors = requirements.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Load catalog: directory if given, otherwise the built-in demo set
    let store = if let Some(ref dir) = cli.catalog_dir {
        let mut store = CatalogStore::new();
        if let Err(e) = store.load_dir(Path::new(dir)) {
            eprintln!("{e}");
            process::exit(1);
        }
        store
    } else {
        CatalogStore::demo()
    };

    // Run the design
    let designer = Designer::new(&store);
    let outcome = match designer.run(&requirements) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Print the outcome
    if cli.json {
        match report::to_json(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize outcome: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("{outcome}");
    }

    // Export cash-flow schedule if requested
    if let Some(ref path) = cli.cashflow_out {
        if let Err(e) = export_cashflow_csv(&outcome.financial, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Cash-flow schedule written to {path}");
    }
}
