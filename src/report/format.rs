//! Formatted terminal output.
//!
//! We keep formatting code in one place so the geometry code stays free of
//! presentation concerns.

use crate::app::pipeline::RunOutput;
use crate::domain::SelectConfig;
use crate::models::BoundaryParameterModel;
use crate::region::{SlitletRegion, SlitletStats};

/// Parameter model table: one row per parameter, one column per `aks`.
pub fn format_params(model: &BoundaryParameterModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Boundary model: {} | degree {} | slitlets [{}, {}]\n",
        model.parmodel(),
        model.degree(),
        model.islitlet_min(),
        model.islitlet_max()
    ));
    if model.grism().is_some() || model.filter().is_some() {
        out.push_str(&format!(
            "Fitted for grism={} filter={}\n",
            model.grism().unwrap_or("-"),
            model.filter().unwrap_or("-")
        ));
    }

    out.push_str(&format!("{:<14}", "parameter"));
    for k in 0..=model.degree() {
        out.push_str(&format!(" {:>16}", format!("a{k}s")));
    }
    out.push('\n');

    for (name, poly) in model.params().entries() {
        out.push_str(&format!("{name:<14}"));
        for k in 0..=model.degree() {
            match poly.coeffs().get(k) {
                Some(v) => out.push_str(&format!(" {v:>16.8e}")),
                None => out.push_str(&format!(" {:>16}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

/// Per-slitlet table: bar center, frontier rows at the first/middle/last
/// column and what was written.
pub fn format_slitlets(regions: &[SlitletRegion], stats: &[SlitletStats], naxis1: usize) -> String {
    let columns = [1.0, ((naxis1 + 1) / 2) as f64, naxis1 as f64];

    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:>10} {:>19} {:>19} {:>19} {:>7} {:>9} {:>11}\n",
        "slit",
        "csu_center",
        format!("x={:.0} (lo/up)", columns[0]),
        format!("x={:.0} (lo/up)", columns[1]),
        format!("x={:.0} (lo/up)", columns[2]),
        "columns",
        "pixels",
        "rows"
    ));

    for (region, st) in regions.iter().zip(stats) {
        out.push_str(&format!("{:>4} {:>10.3}", region.islitlet, region.csu_bar_slit_center));
        for &x in &columns {
            let (lo, up) = region.frontiers.eval(x);
            out.push_str(&format!(" {:>19}", format!("{lo:.2}/{up:.2}")));
        }
        let rows = match (st.n1_min, st.n2_max) {
            (Some(a), Some(b)) => format!("{a}..{b}"),
            _ => "-".to_string(),
        };
        out.push_str(&format!(" {:>7} {:>9} {:>11}\n", st.columns, st.pixels, rows));
    }
    out
}

/// One-paragraph summary of a completed run.
pub fn format_run_summary(run: &RunOutput, config: &SelectConfig) -> String {
    let mut out = String::new();
    out.push_str("=== EMIR unrectified slitlet selection ===\n");
    out.push_str(&format!("Frame: {}\n", config.frame_path.display()));
    out.push_str(&format!(
        "Detector: {} x {} | grism={} filter={} rotang={:.3}\n",
        run.frame_info.naxis1, run.frame_info.naxis2, run.frame_info.grism, run.frame_info.filter, run.frame_info.rotang
    ));
    out.push_str(&format!("Slitlets: \"{}\" -> {:?}\n", config.slitlets, run.slitlets));
    out.push_str(&format!("Mode: {}\n", config.mode.display_name()));

    let pixels: usize = run.stats.iter().map(|s| s.pixels).sum();
    out.push_str(&format!("Pixels written: {pixels}"));
    if run.overlapping_pixels > 0 {
        out.push_str(&format!(" ({} overlapping)", run.overlapping_pixels));
    }
    out.push('\n');
    out.push_str(&format!("Output: {}\n", run.output_path.display()));
    out
}
