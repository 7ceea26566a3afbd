// JSON-configured operation pipelines.
//
// A pipeline names an input graymap, an ordered list of steps, and an output
// path. Steps run in order on one working image; counters accumulate across
// the whole run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use graymap::{
    blend, box_blur_counted, brighten, crop, mirror, negative, paste, pgm, rotate,
    search::locate_subimage_counted, threshold, Counters, Image, Rect,
};
use log::{debug, info};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub steps: Vec<Step>,
    pub output: PathBuf,
}

/// One pipeline operation, tagged by `"op"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Blur {
        dx: i32,
        dy: i32,
    },
    Negative,
    Threshold {
        level: u8,
    },
    Brighten {
        factor: f64,
    },
    Rotate,
    Mirror,
    Crop {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    },
    Paste {
        image: PathBuf,
        x: i32,
        y: i32,
    },
    Blend {
        image: PathBuf,
        x: i32,
        y: i32,
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    /// Search for a subimage and log where it was found; the working image
    /// is unchanged.
    Locate {
        image: PathBuf,
    },
}

fn default_alpha() -> f64 {
    0.5
}

/// List all available step names.
pub fn available_ops() -> &'static [&'static str] {
    &[
        "blur", "negative", "threshold", "brighten", "rotate", "mirror", "crop", "paste", "blend",
        "locate",
    ]
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub width: u32,
    pub height: u32,
    pub steps: usize,
    /// Positions found by `locate` steps, in order.
    pub located: Vec<Option<(i32, i32)>>,
    pub counters: Counters,
}

pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Apply one step to `img`, returning the new working image.
pub fn apply_step(
    img: Image,
    step: &Step,
    counters: &mut Counters,
    located: &mut Vec<Option<(i32, i32)>>,
) -> Result<Image> {
    debug!("applying {:?} to {}x{}", step, img.width(), img.height());
    let mut img = img;
    match step {
        Step::Blur { dx, dy } => box_blur_counted(&mut img, *dx, *dy, counters)?,
        Step::Negative => negative(&mut img),
        Step::Threshold { level } => threshold(&mut img, *level),
        Step::Brighten { factor } => brighten(&mut img, *factor)?,
        Step::Rotate => img = rotate(&img)?,
        Step::Mirror => img = mirror(&img)?,
        Step::Crop { x, y, w, h } => img = crop(&img, Rect::new(*x, *y, *w, *h))?,
        Step::Paste { image, x, y } => {
            let other = pgm::load_pgm_counted(image, counters)?;
            paste(&mut img, *x, *y, &other)?;
        }
        Step::Blend { image, x, y, alpha } => {
            let other = pgm::load_pgm_counted(image, counters)?;
            blend(&mut img, *x, *y, &other, *alpha)?;
        }
        Step::Locate { image } => {
            let needle = pgm::load_pgm_counted(image, counters)?;
            let found = locate_subimage_counted(&img, &needle, counters);
            match found {
                Some((x, y)) => info!("{} found at ({}, {})", image.display(), x, y),
                None => info!("{} not found", image.display()),
            }
            located.push(found);
        }
    }
    Ok(img)
}

/// Load the input, run every step, and save the result.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let mut counters = Counters::new();
    let mut located = Vec::new();
    let mut img = pgm::load_pgm_counted(&config.input, &mut counters)?;

    for (i, step) in config.steps.iter().enumerate() {
        img = apply_step(img, step, &mut counters, &mut located)
            .with_context(|| format!("step {} ({:?}) failed", i + 1, step))?;
    }

    pgm::save_pgm_counted(&config.output, &img, &mut counters)?;
    Ok(PipelineReport {
        width: img.width(),
        height: img.height(),
        steps: config.steps.len(),
        located,
        counters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("graymap-tool-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_steps() {
        let json = r#"{
            "input": "in.pgm",
            "output": "out.pgm",
            "steps": [
                { "op": "blur", "dx": 2, "dy": 1 },
                { "op": "negative" },
                { "op": "crop", "x": 1, "y": 2, "w": 3, "h": 4 },
                { "op": "blend", "image": "b.pgm", "x": 0, "y": 0 }
            ]
        }"#;
        let cfg: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.input, PathBuf::from("in.pgm"));
        assert_eq!(
            cfg.steps,
            vec![
                Step::Blur { dx: 2, dy: 1 },
                Step::Negative,
                Step::Crop { x: 1, y: 2, w: 3, h: 4 },
                Step::Blend {
                    image: PathBuf::from("b.pgm"),
                    x: 0,
                    y: 0,
                    alpha: 0.5
                },
            ]
        );
    }

    #[test]
    fn test_steps_default_to_empty() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{ "input": "a.pgm", "output": "b.pgm" }"#).unwrap();
        assert!(cfg.steps.is_empty());
    }

    #[test]
    fn test_unknown_op_rejected() {
        let json = r#"{ "input": "a", "output": "b", "steps": [{ "op": "sharpen" }] }"#;
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    }

    #[test]
    fn test_apply_in_memory_steps() {
        let img = Image::from_raw(3, 2, 255, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut c = Counters::new();
        let mut located = Vec::new();
        let img = apply_step(img, &Step::Mirror, &mut c, &mut located).unwrap();
        assert_eq!(img.as_slice(), &[3, 2, 1, 6, 5, 4]);
        let img = apply_step(img, &Step::Rotate, &mut c, &mut located).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
        let img = apply_step(img, &Step::Blur { dx: 0, dy: 0 }, &mut c, &mut located).unwrap();
        assert_eq!(c.divisions, 6);
        assert!(apply_step(img, &Step::Blur { dx: -1, dy: 0 }, &mut c, &mut located).is_err());
    }

    #[test]
    fn test_paste_step_keeps_output_loadable() {
        let dir = scratch_dir("paste");
        let input = dir.join("in.pgm");
        let patch = dir.join("patch.pgm");
        let output = dir.join("out.pgm");
        pgm::save_pgm(&input, &Image::new(2, 1, 100).unwrap()).unwrap();
        pgm::save_pgm(&patch, &Image::from_raw(1, 1, 255, vec![200]).unwrap()).unwrap();

        let cfg = PipelineConfig {
            input: input.clone(),
            output: output.clone(),
            steps: vec![Step::Paste {
                image: patch.clone(),
                x: 0,
                y: 0,
            }],
        };
        let err = run_pipeline(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("maxval"), "{err:#}");
        assert!(!output.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_pipeline_end_to_end() {
        let dir = scratch_dir("pipeline");
        let input = dir.join("in.pgm");
        let needle = dir.join("needle.pgm");
        let output = dir.join("out.pgm");

        let src = Image::from_raw(4, 4, 255, (0..16).map(|i| i * 10).collect()).unwrap();
        pgm::save_pgm(&input, &src).unwrap();
        pgm::save_pgm(&needle, &crop(&src, Rect::new(2, 1, 2, 2)).unwrap()).unwrap();

        let cfg = PipelineConfig {
            input: input.clone(),
            output: output.clone(),
            steps: vec![
                Step::Locate {
                    image: needle.clone(),
                },
                Step::Crop { x: 0, y: 0, w: 2, h: 2 },
                Step::Negative,
            ],
        };
        let report = run_pipeline(&cfg).unwrap();
        assert_eq!(report.located, vec![Some((2, 1))]);
        assert_eq!((report.width, report.height), (2, 2));
        assert_eq!(report.steps, 3);
        assert!(report.counters.comparisons > 0);

        let out = pgm::load_pgm(&output).unwrap();
        assert_eq!(out.as_slice(), &[255, 245, 215, 205]);
        fs::remove_dir_all(&dir).ok();
    }
}
