//! Shared selection pipeline used by the CLI and the recipe registry.
//!
//! frame + header checks -> parameter model -> slitlet selection -> bar centers
//! -> frontiers -> materialized image -> output frame
//!
//! Everything that can fail on bad input runs before the image is built, and
//! the output is written once at the very end.

use std::path::PathBuf;

use crate::domain::SelectConfig;
use crate::error::AppError;
use crate::fit::{ExpanderOptions, expected_frontiers};
use crate::instrument::CsuConfiguration;
use crate::io::{Frame, FrameInfo, ensure_new_file, load_bound_params, read_frame, validate_frame, write_frame};
use crate::models::BoundaryParameterModel;
use crate::region::{SlitletRegion, SlitletStats, materialize};
use crate::slitlets::parse_slitlets;

/// All computed outputs of a single selection run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub output_path: PathBuf,
    pub frame_info: FrameInfo,
    pub model: BoundaryParameterModel,
    pub slitlets: Vec<usize>,
    pub regions: Vec<SlitletRegion>,
    pub stats: Vec<SlitletStats>,
    pub overlapping_pixels: usize,
}

/// Resolve the per-exposure frontiers of every selected slitlet.
///
/// Fails on the first slitlet outside the model bounds or without a CSU bar,
/// before any column is scanned.
pub fn build_regions(
    model: &BoundaryParameterModel,
    csu: &CsuConfiguration,
    slitlets: &[usize],
    opts: &ExpanderOptions,
) -> Result<Vec<SlitletRegion>, AppError> {
    slitlets
        .iter()
        .map(|&islitlet| {
            let csu_bar_slit_center = csu.csu_bar_slit_center(islitlet)?;
            let frontiers = expected_frontiers(islitlet, csu_bar_slit_center, model, opts)?;
            Ok(SlitletRegion {
                islitlet,
                csu_bar_slit_center,
                frontiers,
            })
        })
        .collect()
}

/// Execute the full selection and write the output frame.
pub fn run_selection(config: &SelectConfig) -> Result<RunOutput, AppError> {
    let output_path = config.output_path();
    ensure_new_file(&output_path)?;

    let frame = read_frame(&config.frame_path)?;
    let frame_info = validate_frame(&frame, &config.geometry)?;
    log::info!(
        "frame {}: {}x{} grism={} filter={} rotang={:.3}",
        config.frame_path.display(),
        frame_info.naxis1,
        frame_info.naxis2,
        frame_info.grism,
        frame_info.filter,
        frame_info.rotang
    );

    let model = load_bound_params(&config.bound_param_path)?;
    check_configuration_tags(&model, &frame_info);

    let slitlets = parse_slitlets(&config.slitlets, model.islitlet_min(), model.islitlet_max())?;
    if slitlets.is_empty() {
        log::warn!("slitlet specification '{}' selects no slitlets; output will be all zeros", config.slitlets);
    } else {
        log::info!("selected {} slitlets: {:?}", slitlets.len(), slitlets);
    }

    let csu = CsuConfiguration::from_header(&frame.header)?;
    let opts = ExpanderOptions {
        naxis1: frame_info.naxis1,
        sample_count: config.sample_count,
        degree: config.fit_degree,
    };
    let regions = build_regions(&model, &csu, &slitlets, &opts)?;

    let materialized = materialize(&frame.data, &regions, config.mode, config.resize);
    log::info!(
        "{} image built from {} slitlets",
        config.mode.display_name(),
        regions.len()
    );

    let output = Frame {
        header: frame.header,
        data: materialized.image,
    };
    write_frame(&output_path, &output)?;
    log::info!("wrote {}", output_path.display());

    Ok(RunOutput {
        output_path,
        frame_info,
        model,
        slitlets,
        regions,
        stats: materialized.stats,
        overlapping_pixels: materialized.overlapping_pixels,
    })
}

/// The parameter file is fitted for one grism/filter pair; a mismatch is
/// suspicious but not fatal.
fn check_configuration_tags(model: &BoundaryParameterModel, info: &FrameInfo) {
    if let Some(grism) = model.grism() {
        if grism != info.grism {
            log::warn!("boundary parameters fitted for grism {grism}, frame uses {}", info.grism);
        }
    }
    if let Some(filter) = model.filter() {
        if filter != info.filter {
            log::warn!("boundary parameters fitted for filter {filter}, frame uses {}", info.filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::instrument::csu::tests::insert_bars;
    use crate::io::FrameHeader;
    use crate::models::bound_params::tests::flat_model;

    fn csu() -> CsuConfiguration {
        let mut header = FrameHeader::default();
        insert_bars(&mut header);
        CsuConfiguration::from_header(&header).unwrap()
    }

    #[test]
    fn regions_follow_selection_order_and_bar_centers() {
        let model = flat_model(2, 54);
        let regions = build_regions(&model, &csu(), &[4, 9], &ExpanderOptions::default()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].islitlet, 4);
        assert!((regions[1].csu_bar_slit_center - 109.0).abs() < 1e-9);
    }

    #[test]
    fn slitlet_outside_model_fails_before_scanning() {
        let model = flat_model(2, 54);
        let err = build_regions(&model, &csu(), &[4, 55], &ExpanderOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }
}
