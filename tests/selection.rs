use std::path::{Path, PathBuf};

use emir_slitlets::app::pipeline::run_selection;
use emir_slitlets::domain::{DetectorGeometry, RegionMode, SelectConfig};
use emir_slitlets::error::ErrorKind;
use emir_slitlets::io::read_frame;
use emir_slitlets::recipe::{RecipeContext, RecipeRegistry, RecipeValue, RecipeValues, select};
use serde_json::{Map, Value, json};

const NAXIS1: usize = 16;
const NAXIS2: usize = 256;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn geometry() -> DetectorGeometry {
    DetectorGeometry {
        naxis1: NAXIS1,
        naxis2: NAXIS2,
    }
}

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("emir-slitlets-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn pixel(row: usize, col: usize) -> f64 {
    (row * 100 + col) as f64 + 0.5
}

/// Distortion-free parameters: slitlet `i` with bar center `csu` spans rows
/// `[100·(1 + 1e-4·csu) + 40·(i-1) - 2, ... + 40]`.
fn write_params(dir: &Path) -> PathBuf {
    let value = json!({
        "meta-info": { "parmodel": "multislit" },
        "tags": { "grism": "J", "filter": "J", "islitlet_min": 2, "islitlet_max": 54 },
        "contents": {
            "c2":            { "a0s": 0.0, "a1s": 0.0 },
            "c4":            { "a0s": 0.0, "a1s": 0.0 },
            "ff":            { "a0s": 1.0, "a1s": 0.0 },
            "slit_gap":      { "a0s": 4.0, "a1s": 0.0 },
            "slit_height":   { "a0s": 3.6, "a1s": 0.0 },
            "theta0_origin": { "a0s": 0.0, "a1s": 0.0 },
            "theta0_slope":  { "a0s": 0.0, "a1s": 0.0 },
            "x0":            { "a0s": 1.0, "a1s": 0.0 },
            "y0":            { "a0s": 1.0, "a1s": 0.0 },
            "y_baseline":    { "a0s": 1.0, "a1s": 1.0e-4 }
        }
    });
    let path = dir.join("params.json");
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

/// Slit `i` is centred at `100 + i` mm.
fn write_frame(dir: &Path) -> PathBuf {
    let mut header = Map::new();
    header.insert("NAXIS1".into(), json!(NAXIS1));
    header.insert("NAXIS2".into(), json!(NAXIS2));
    header.insert("INSTRUME".into(), json!("EMIR"));
    header.insert("GRISM".into(), json!("J"));
    header.insert("FILTER".into(), json!("J"));
    header.insert("ROTANG".into(), json!(90.0));
    for ibar in 1..=55usize {
        let center = 100.0 + ibar as f64;
        header.insert(format!("CSUP{ibar}"), json!(center - 1.0));
        header.insert(format!("CSUP{}", ibar + 55), json!(341.5 - (center + 1.0)));
    }
    let data: Vec<Vec<f64>> = (0..NAXIS2)
        .map(|r| (0..NAXIS1).map(|c| pixel(r, c)).collect())
        .collect();

    let path = dir.join("raw.json");
    std::fs::write(&path, json!({ "header": Value::Object(header), "data": data }).to_string()).unwrap();
    path
}

fn config(dir: &Path, slitlets: &str) -> SelectConfig {
    let mut config = SelectConfig::new(write_frame(dir), write_params(dir), slitlets);
    config.geometry = geometry();
    config
}

#[test]
fn extracts_single_slitlet_rows() {
    init_logging();
    let dir = workdir("extract");
    let config = config(&dir, "2");

    let run = run_selection(&config).unwrap();
    assert_eq!(run.output_path, dir.join("raw_slitlets.json"));
    assert_eq!(run.slitlets, vec![2]);
    assert_eq!(run.overlapping_pixels, 0);

    // Frontiers at 139.02 and 179.02 round outward to rows 139..=180.
    let stats = &run.stats[0];
    assert_eq!(stats.columns, NAXIS1);
    assert_eq!((stats.n1_min, stats.n2_max), (Some(139), Some(180)));
    assert_eq!(stats.pixels, 42 * NAXIS1);

    let out = read_frame(&run.output_path).unwrap();
    assert_eq!(out.data.shape(), (NAXIS2, NAXIS1));
    for r in 0..NAXIS2 {
        for c in 0..NAXIS1 {
            let expected = if (138..=179).contains(&r) { pixel(r, c) } else { 0.0 };
            assert_eq!(out.data[(r, c)], expected, "row {r} col {c}");
        }
    }
}

#[test]
fn mask_is_binary_and_clamped_to_detector() {
    init_logging();
    let dir = workdir("mask");
    let mut config = config(&dir, "2,4");
    config.mode = RegionMode::Mask;

    let run = run_selection(&config).unwrap();
    assert_eq!(run.slitlets, vec![2, 3, 4]);
    // Neighbouring slitlets share two border rows after outward rounding.
    assert_eq!(run.overlapping_pixels, 2 * 2 * NAXIS1);
    assert_eq!(run.stats[2].n2_max, Some(NAXIS2));

    let out = read_frame(&run.output_path).unwrap();
    assert!(out.data.iter().all(|&v| v == 0.0 || v == 1.0));
    let ones = out.data.iter().filter(|&&v| v == 1.0).count();
    assert_eq!(ones, (NAXIS2 - 139 + 1) * NAXIS1);
}

#[test]
fn descending_range_writes_zero_frame() {
    init_logging();
    let dir = workdir("empty");
    let config = config(&dir, "5,3");

    let run = run_selection(&config).unwrap();
    assert!(run.slitlets.is_empty());
    assert!(run.stats.is_empty());
    assert_eq!(run.overlapping_pixels, 0);

    let out = read_frame(&run.output_path).unwrap();
    assert_eq!(out.data.shape(), (NAXIS2, NAXIS1));
    assert!(out.data.iter().all(|&v| v == 0.0));
}

#[test]
fn out_of_range_slitlet_writes_nothing() {
    init_logging();
    let dir = workdir("range");
    let config = config(&dir, "1,3");

    let err = run_selection(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(!config.output_path().exists());
}

#[test]
fn existing_output_is_not_overwritten() {
    init_logging();
    let dir = workdir("exists");
    let config = config(&dir, "3");
    std::fs::write(config.output_path(), "keep").unwrap();

    let err = run_selection(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(std::fs::read_to_string(config.output_path()).unwrap(), "keep");
}

#[test]
fn repeated_runs_are_identical() {
    init_logging();
    let dir = workdir("determinism");
    let mut first = config(&dir, "2,6 4");
    first.outfile = Some(dir.join("a.json"));
    let mut second = first.clone();
    second.outfile = Some(dir.join("b.json"));

    let a = run_selection(&first).unwrap();
    let b = run_selection(&second).unwrap();
    assert_eq!(a.stats, b.stats);
    assert_eq!(read_frame(&a.output_path).unwrap(), read_frame(&b.output_path).unwrap());
}

#[test]
fn recipe_registry_runs_selection() {
    init_logging();
    let dir = workdir("recipe");
    let frame = write_frame(&dir);
    let params = write_params(&dir);

    let mut inputs = RecipeValues::new();
    inputs.insert("frame".into(), RecipeValue::Path(frame));
    inputs.insert("fitted_bound_param".into(), RecipeValue::Path(params));
    inputs.insert("slitlets".into(), RecipeValue::Text("3".into()));
    inputs.insert("maskonly".into(), RecipeValue::Flag(true));
    inputs.insert("debugplot".into(), RecipeValue::Integer(11));

    let registry = RecipeRegistry::with_builtin(RecipeContext { geometry: geometry() });
    let outputs = registry.run(select::CAPABILITY, &inputs).unwrap();

    assert_eq!(outputs.get("nslitlets"), Some(&RecipeValue::Integer(1)));
    assert_eq!(outputs.get("overlapping_pixels"), Some(&RecipeValue::Integer(0)));
    let Some(RecipeValue::Text(report)) = outputs.get("report") else {
        panic!("missing report");
    };
    assert!(!report.is_empty());
    assert!(dir.join("raw_slitlets.json").exists());
}
