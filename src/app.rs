//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - runs the selection through the recipe registry
//! - prints the report

use clap::Parser;

use crate::cli::{Command, SelectArgs};
use crate::domain::DetectorGeometry;
use crate::error::AppError;
use crate::recipe::{RecipeContext, RecipeRegistry, RecipeValue, RecipeValues, select};

pub mod pipeline;

/// Entry point for the `emir-slitlets` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Select(args) => handle_select(args),
        Command::Recipes => handle_recipes(),
    }
}

/// `RUST_LOG` (environment or `.env`) overrides the default `info` level.
fn init_logging() {
    dotenvy::dotenv().ok();
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn registry() -> Result<RecipeRegistry, AppError> {
    let geometry = DetectorGeometry::from_env()?;
    Ok(RecipeRegistry::with_builtin(RecipeContext { geometry }))
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    if args.echo {
        log::info!("Executing: {}", std::env::args().collect::<Vec<_>>().join(" "));
    }

    let inputs = select_inputs_from_args(&args);
    let outputs = registry()?.run(select::CAPABILITY, &inputs)?;

    if let Some(RecipeValue::Text(report)) = outputs.get("report") {
        print!("{report}");
    }
    Ok(())
}

fn handle_recipes() -> Result<(), AppError> {
    let registry = registry()?;
    for capability in registry.capabilities() {
        let recipe = registry.create(capability)?;
        println!("{capability}: {}", recipe.description());
        for spec in recipe.input_schema() {
            println!(
                "  {:<20} {:<8} {:<9} {}",
                spec.name,
                format!("{:?}", spec.kind).to_lowercase(),
                if spec.required { "required" } else { "optional" },
                spec.description
            );
        }
    }
    Ok(())
}

pub fn select_inputs_from_args(args: &SelectArgs) -> RecipeValues {
    let mut inputs = RecipeValues::new();
    inputs.insert("frame".into(), RecipeValue::Path(args.frame.clone()));
    inputs.insert(
        "fitted_bound_param".into(),
        RecipeValue::Path(args.fitted_bound_param.clone()),
    );
    inputs.insert("slitlets".into(), RecipeValue::Text(args.slitlets.clone()));
    if let Some(path) = &args.outfile {
        inputs.insert("outfile".into(), RecipeValue::Path(path.clone()));
    }
    inputs.insert("maskonly".into(), RecipeValue::Flag(args.maskonly));
    inputs.insert("debugplot".into(), RecipeValue::Integer(args.debugplot as i64));
    inputs
}
