//! Recipe wrapper around the slitlet selection pipeline.

use std::path::PathBuf;

use crate::app::pipeline::run_selection;
use crate::domain::{DebugLevel, DetectorGeometry, RegionMode, SelectConfig};
use crate::error::AppError;
use crate::recipe::{InputKind, InputSpec, Recipe, RecipeContext, RecipeValue, RecipeValues};
use crate::report::{format_params, format_run_summary, format_slitlets};

pub const CAPABILITY: &str = "select_unrectified_slitlets";

const SCHEMA: &[InputSpec] = &[
    InputSpec {
        name: "frame",
        kind: InputKind::Path,
        required: true,
        description: "raw detector frame (JSON)",
    },
    InputSpec {
        name: "fitted_bound_param",
        kind: InputKind::Path,
        required: true,
        description: "fitted boundary parameters of the multislit model (JSON)",
    },
    InputSpec {
        name: "slitlets",
        kind: InputKind::Text,
        required: true,
        description: "slitlet selection as n1[,n2[,step]] tuples",
    },
    InputSpec {
        name: "outfile",
        kind: InputKind::Path,
        required: false,
        description: "output frame (must not exist)",
    },
    InputSpec {
        name: "maskonly",
        kind: InputKind::Flag,
        required: false,
        description: "write a 0/1 mask instead of extracted pixels",
    },
    InputSpec {
        name: "debugplot",
        kind: InputKind::Integer,
        required: false,
        description: "report verbosity code",
    },
];

/// Mask or extract the region of each selected slitlet of a raw frame.
///
/// Outputs: `output` (path), `nslitlets`, `pixels`, `overlapping_pixels`
/// (integers) and `report` (text, depends on `debugplot`).
pub struct SelectSlitletsRecipe {
    geometry: DetectorGeometry,
}

impl SelectSlitletsRecipe {
    pub fn new(ctx: &RecipeContext) -> Self {
        Self { geometry: ctx.geometry }
    }

    fn config(&self, inputs: &RecipeValues) -> Result<SelectConfig, AppError> {
        let mut config = SelectConfig::new(
            path_input(inputs, "frame")?,
            path_input(inputs, "fitted_bound_param")?,
            text_input(inputs, "slitlets")?,
        );
        if let Some(RecipeValue::Path(p)) = inputs.get("outfile") {
            config.outfile = Some(p.clone());
        }
        if let Some(RecipeValue::Flag(mask_only)) = inputs.get("maskonly") {
            config.mode = RegionMode::from_mask_only(*mask_only);
        }
        if let Some(RecipeValue::Integer(code)) = inputs.get("debugplot") {
            let code = i32::try_from(*code).map_err(|_| AppError::usage(format!("Invalid debugplot code {code}.")))?;
            config.debug = DebugLevel::new(code)?;
        }
        config.geometry = self.geometry;
        Ok(config)
    }
}

impl Recipe for SelectSlitletsRecipe {
    fn capability(&self) -> &'static str {
        CAPABILITY
    }

    fn description(&self) -> &'static str {
        "Mask or extract unrectified slitlet regions of a raw EMIR frame."
    }

    fn input_schema(&self) -> &'static [InputSpec] {
        SCHEMA
    }

    fn run(&self, inputs: &RecipeValues) -> Result<RecipeValues, AppError> {
        let config = self.config(inputs)?;
        let run = run_selection(&config)?;

        let mut report = String::new();
        if config.debug.show_params() {
            report.push_str(&format_params(&run.model));
            report.push('\n');
        }
        if config.debug.show_slitlets() {
            report.push_str(&format_slitlets(&run.regions, &run.stats, run.frame_info.naxis1));
            report.push('\n');
        }
        report.push_str(&format_run_summary(&run, &config));

        let pixels: usize = run.stats.iter().map(|s| s.pixels).sum();
        let mut out = RecipeValues::new();
        out.insert("output".into(), RecipeValue::Path(run.output_path.clone()));
        out.insert("nslitlets".into(), RecipeValue::Integer(run.slitlets.len() as i64));
        out.insert("pixels".into(), RecipeValue::Integer(pixels as i64));
        out.insert(
            "overlapping_pixels".into(),
            RecipeValue::Integer(run.overlapping_pixels as i64),
        );
        out.insert("report".into(), RecipeValue::Text(report));
        Ok(out)
    }
}

fn path_input(inputs: &RecipeValues, name: &str) -> Result<PathBuf, AppError> {
    match inputs.get(name) {
        Some(RecipeValue::Path(p)) => Ok(p.clone()),
        _ => Err(AppError::usage(format!("Missing path input '{name}'."))),
    }
}

fn text_input(inputs: &RecipeValues, name: &str) -> Result<String, AppError> {
    match inputs.get(name) {
        Some(RecipeValue::Text(t)) => Ok(t.clone()),
        _ => Err(AppError::usage(format!("Missing text input '{name}'."))),
    }
}
