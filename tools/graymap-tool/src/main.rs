// Command-line driver for the graymap library.
//
// Usage:
//   graymap-tool info <in.pgm>
//   graymap-tool blur <in.pgm> <out.pgm> <dx> <dy>
//   graymap-tool compare <a.pgm> <b.pgm> [-d <diff.pgm>] [-s <sidebyside.pgm>]
//   graymap-tool run <pipeline.json>
//   graymap-tool list

use std::path::Path;
use std::process;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use graymap::pgm::{load_pgm, load_pgm_counted, save_pgm, save_pgm_counted};
use graymap::{box_blur_counted, Counters};
use graymap_tool::pipeline::{available_ops, load_config, run_pipeline};
use graymap_tool::{compare_images, generate_diff_image, generate_sidebyside};

fn main() {
    env_logger::init();
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(1);
    }

    match args[1].as_str() {
        "info" => cmd_info(&args[2..]),
        "blur" => cmd_blur(&args[2..]),
        "compare" => cmd_compare(&args[2..]),
        "run" => cmd_run(&args[2..]),
        "list" => cmd_list(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            Ok(1)
        }
    }
}

fn print_usage() {
    eprintln!("graymap-tool - 8-bit graymap utilities");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <in.pgm>");
    eprintln!("      Print dimensions, maxval and level range.");
    eprintln!();
    eprintln!("  blur <in.pgm> <out.pgm> <dx> <dy>");
    eprintln!("      Box-blur with a (2dx+1)x(2dy+1) window and report work counts.");
    eprintln!();
    eprintln!("  compare <a.pgm> <b.pgm> [-d <diff.pgm>] [-s <sidebyside.pgm>]");
    eprintln!("      Compare two images pixel-by-pixel.");
    eprintln!();
    eprintln!("  run <pipeline.json>");
    eprintln!("      Apply a JSON-configured sequence of operations.");
    eprintln!();
    eprintln!("  list");
    eprintln!("      List available pipeline operations.");
}

fn cmd_list() -> Result<i32> {
    println!("Available operations:");
    for name in available_ops() {
        println!("  {}", name);
    }
    Ok(0)
}

fn cmd_info(args: &[String]) -> Result<i32> {
    let [path] = args else {
        bail!("Usage: graymap-tool info <in.pgm>");
    };
    let img = load_pgm(path)?;
    let (min, max) = img.stats();
    println!(
        "{}: {}x{} maxval={} levels={}..={}",
        path,
        img.width(),
        img.height(),
        img.maxval(),
        min,
        max
    );
    Ok(0)
}

fn cmd_blur(args: &[String]) -> Result<i32> {
    let [input, output, dx, dy] = args else {
        bail!("Usage: graymap-tool blur <in.pgm> <out.pgm> <dx> <dy>");
    };
    let dx: i32 = dx.parse().with_context(|| format!("Invalid dx: {dx}"))?;
    let dy: i32 = dy.parse().with_context(|| format!("Invalid dy: {dy}"))?;

    let mut counters = Counters::new();
    let mut img = load_pgm_counted(input, &mut counters)?;

    let start = Instant::now();
    let mut blur_counters = Counters::new();
    box_blur_counted(&mut img, dx, dy, &mut blur_counters)?;
    let elapsed = start.elapsed();
    counters += blur_counters;

    save_pgm_counted(output, &img, &mut counters)?;
    println!(
        "Blurred {}x{} (dx={}, dy={}) in {:.3} ms",
        img.width(),
        img.height(),
        dx,
        dy,
        elapsed.as_secs_f64() * 1000.0
    );
    println!("  blur:  {}", blur_counters);
    println!("  total: {}", counters);
    println!("Saved: {}", output);
    Ok(0)
}

fn cmd_compare(args: &[String]) -> Result<i32> {
    if args.len() < 2 {
        bail!("Usage: graymap-tool compare <a.pgm> <b.pgm> [-d <diff.pgm>] [-s <sidebyside.pgm>]");
    }

    let path_a = &args[0];
    let path_b = &args[1];
    let mut diff_path: Option<&str> = None;
    let mut sbs_path: Option<&str> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-d" if i + 1 < args.len() => {
                diff_path = Some(args[i + 1].as_str());
                i += 2;
            }
            "-s" if i + 1 < args.len() => {
                sbs_path = Some(args[i + 1].as_str());
                i += 2;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                i += 1;
            }
        }
    }

    let a = load_pgm(path_a).context("Failed to load file A")?;
    let b = load_pgm(path_b).context("Failed to load file B")?;

    let result = compare_images(&a, &b)?;
    println!("{}", result);

    if let Some(dp) = diff_path {
        save_pgm(Path::new(dp), &generate_diff_image(&a, &b)?)?;
        println!("Diff saved: {}", dp);
    }

    if let Some(sp) = sbs_path {
        save_pgm(Path::new(sp), &generate_sidebyside(&a, &b)?)?;
        println!("Side-by-side saved: {}", sp);
    }

    if !result.identical {
        println!("\nDifference histogram:");
        for (diff_val, &count) in result.diff_histogram.iter().enumerate() {
            if count > 0 {
                println!("  diff={}: {} pixels", diff_val, count);
            }
        }
        return Ok(1);
    }
    Ok(0)
}

fn cmd_run(args: &[String]) -> Result<i32> {
    let [config_path] = args else {
        bail!("Usage: graymap-tool run <pipeline.json>");
    };
    let config = load_config(Path::new(config_path))?;
    let start = Instant::now();
    let report = run_pipeline(&config)?;
    println!(
        "Ran {} step(s) in {:.3} ms -> {}x{}",
        report.steps,
        start.elapsed().as_secs_f64() * 1000.0,
        report.width,
        report.height
    );
    for found in &report.located {
        match found {
            Some((x, y)) => println!("  located at ({}, {})", x, y),
            None => println!("  not located"),
        }
    }
    println!("  {}", report.counters);
    println!("Saved: {}", config.output.display());
    Ok(0)
}
