//! Command implementations

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::toml_config::{ConfigLoader, ConfigOverrides};
use crate::adapters::track_file::{load_tracks, write_tracks};
use crate::aligner::{TrackAligner, TrackOutcome};
use crate::cli::args::{AlignArgs, AnalyzeArgs, OptimizeArgs, SnapArgs};
use crate::domain::errors::AlignmentFailure;
use crate::domain::model::{AlignmentResult, Track, TrackId};
use crate::planner::{
    AlignmentReport, CutDecision, CutPointOptimizer, GopAnalysis, KeyframeAnalyzer,
    KeyframeSnapper, SnapPreference, SnapStats, Strictness,
};
use crate::utils::time::{frames_to_time, time_to_frames, TimeParser};

/// Per-track line of the align report
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum TrackReport<'a> {
    /// The reference track
    Main,
    /// Within the alignment threshold already
    Aligned,
    Corrected { result: &'a AlignmentResult },
    Failed { reason: &'a AlignmentFailure },
}

#[derive(Debug, Serialize)]
struct AlignReport<'a> {
    main: &'a str,
    tracks: BTreeMap<&'a str, TrackReport<'a>>,
}

/// Execute the align command
pub fn align(args: AlignArgs) -> Result<()> {
    info!("Starting align operation");
    info!("Tracks: {}", args.tracks.display());

    let mut loader = ConfigLoader::new().with_process_env().with_overrides(ConfigOverrides {
        alignment_threshold: args.threshold,
        max_stretch_ratio: args.max_stretch,
        prefer_audio_intact: args.prefer_audio_intact,
        maintain_sync_points: args.maintain_sync_points,
        optimize_scene_cuts: args.optimize_scene_cuts,
        min_segment_duration: args.min_segment,
        ..Default::default()
    });
    loader = match args.config {
        Some(ref path) => loader.with_file(path),
        None => loader.with_default_search(),
    };
    let config = loader.load().context("Failed to load configuration")?;

    let tracks = load_tracks(&args.tracks).context("Failed to load track list")?;

    let aligner = TrackAligner::new(config)?;
    let outcomes = aligner.align(&tracks).context("Alignment batch rejected")?;

    let main_id = tracks
        .values()
        .find(|t| t.is_main)
        .map(|t| t.id.as_str())
        .unwrap_or_default();

    let report = AlignReport {
        main: main_id,
        tracks: tracks
            .keys()
            .map(|id| {
                let entry = if id == main_id {
                    TrackReport::Main
                } else {
                    match outcomes.get(id) {
                        None => TrackReport::Aligned,
                        Some(Ok(result)) => TrackReport::Corrected { result },
                        Some(Err(reason)) => TrackReport::Failed { reason },
                    }
                };
                (id.as_str(), entry)
            })
            .collect(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize alignment report to JSON")?;
        println!("{}", json);
    } else {
        display_align_report(&report, &tracks);
    }

    if let Some(ref output) = args.output {
        let aligned = aligned_tracks(&tracks, &outcomes);
        write_tracks(output, aligned.values())
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    let failed = outcomes.values().filter(|o| o.is_err()).count();
    if failed > 0 {
        warn!("{} tracks could not be aligned", failed);
    }

    info!("Align operation completed successfully");
    Ok(())
}

/// Tracks after applying every successful correction; failed tracks stay as loaded
fn aligned_tracks(
    tracks: &BTreeMap<TrackId, Track>,
    outcomes: &BTreeMap<TrackId, TrackOutcome>,
) -> BTreeMap<TrackId, Track> {
    tracks
        .iter()
        .map(|(id, track)| {
            let aligned = match outcomes.get(id) {
                Some(Ok(result)) => result.apply_to(track),
                _ => track.clone(),
            };
            (id.clone(), aligned)
        })
        .collect()
}

fn display_align_report(report: &AlignReport<'_>, tracks: &BTreeMap<TrackId, Track>) {
    let parser = TimeParser::new();
    println!("Alignment against '{}':", report.main);

    for (id, entry) in &report.tracks {
        let duration = tracks.get(*id).map(|t| t.duration).unwrap_or_default();
        match entry {
            TrackReport::Main => println!("  {:<16} main      {}", id, parser.format_time(duration)),
            TrackReport::Aligned => {
                println!("  {:<16} aligned   {}", id, parser.format_time(duration))
            }
            TrackReport::Corrected { result } => {
                println!(
                    "  {:<16} {:<9} {} -> {}{}",
                    id,
                    result.strategy.to_string(),
                    parser.format_time(result.original_duration),
                    parser.format_time(result.duration),
                    describe_correction(result)
                );
            }
            TrackReport::Failed { reason } => println!("  {:<16} FAILED    {}", id, reason),
        }
    }
}

fn describe_correction(result: &AlignmentResult) -> String {
    let mut parts = Vec::new();
    if let Some(ratio) = result.stretch_ratio {
        parts.push(format!("ratio {:.6}", ratio));
    }
    if let Some(shift) = result.time_shift {
        parts.push(format!("shift {:+.3}s", shift));
    }
    if let Some(rate) = result.rate_adjust {
        parts.push(format!("rate {:.6}", rate));
    }
    if let Some(crop) = result.crop_info {
        parts.push(format!("trim {:.3}s/{:.3}s", crop.start_trim, crop.end_trim));
    }
    if let Some(pad) = result.pad_info {
        parts.push(format!("pad {:.3}s/{:.3}s", pad.start_pad, pad.end_pad));
    }
    if let Some(ref carrier) = result.carrier {
        parts.push(format!("via '{}'", carrier));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

#[derive(Debug, Serialize)]
struct OptimizeReport {
    min_segment_duration: f64,
    cuts: Vec<CutDecision>,
    off_keyframe: usize,
}

/// Execute the optimize command
pub fn optimize(args: OptimizeArgs) -> Result<()> {
    info!("Starting optimize operation");

    let parser = TimeParser::new();
    let cuts = parser.parse_list(&args.cuts).context("Invalid --cuts")?;
    let keyframes = parser
        .parse_list(&args.keyframes)
        .context("Invalid --keyframes")?;
    let strictness: Strictness = args.strictness.parse()?;

    // clap guarantees --fps when --frames is set
    let fps = args.fps.filter(|_| args.frames);
    let to_seconds = |values: Vec<f64>| -> Vec<f64> {
        match fps {
            Some(fps) => values
                .into_iter()
                .map(|v| frames_to_time(v.round() as i64, fps))
                .collect(),
            None => values,
        }
    };

    let min_segment = match (args.min_segment, fps) {
        (Some(frames), Some(fps)) => frames / fps,
        (Some(seconds), None) => seconds,
        (None, _) => strictness.min_segment_duration(),
    };

    let optimizer = CutPointOptimizer::new(&to_seconds(keyframes), min_segment);
    let mut decisions = optimizer.plan(&to_seconds(cuts));

    if let Some(fps) = fps {
        for decision in &mut decisions {
            decision.original = time_to_frames(decision.original, fps) as f64;
            decision.adjusted = time_to_frames(decision.adjusted, fps) as f64;
        }
    }

    let report = OptimizeReport {
        min_segment_duration: optimizer.min_segment_duration(),
        off_keyframe: decisions.iter().filter(|d| !d.source.is_keyframe()).count(),
        cuts: decisions,
    };

    if report.off_keyframe > 0 {
        warn!("{} cuts could not be placed on a keyframe", report.off_keyframe);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize optimize report to JSON")?;
        println!("{}", json);
    } else {
        let unit = if fps.is_some() { "frames" } else { "s" };
        println!(
            "Optimized {} cuts (min segment {:.3}s):",
            report.cuts.len(),
            report.min_segment_duration
        );
        for decision in &report.cuts {
            println!(
                "  {:>12.3} {} -> {:>12.3} {} ({:?})",
                decision.original, unit, decision.adjusted, unit, decision.source
            );
        }
    }

    info!("Optimize operation completed successfully");
    Ok(())
}

#[derive(Debug, Serialize)]
struct SnapReport {
    threshold: f64,
    preference: SnapPreference,
    values: Vec<f64>,
    snapped: Vec<f64>,
    stats: SnapStats,
}

/// Execute the snap command
pub fn snap(args: SnapArgs) -> Result<()> {
    info!("Starting snap operation");

    let parser = TimeParser::new();
    let values = parser.parse_list(&args.value).context("Invalid --value")?;
    let keyframes = parser
        .parse_list(&args.keyframes)
        .context("Invalid --keyframes")?;
    let preference: SnapPreference = args.prefer.parse()?;

    let threshold = match args.threshold {
        Some(ref threshold) => parser.parse_time(threshold).context("Invalid --threshold")?,
        None => {
            let strictness: Strictness = args.strictness.parse()?;
            strictness.snap_threshold(args.fps)
        }
    };

    let snapper = KeyframeSnapper::new(&keyframes, threshold);
    let (snapped, stats) = snapper.snap_all(&values, preference);

    let report = SnapReport {
        threshold: snapper.threshold(),
        preference,
        values,
        snapped,
        stats,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize snap report to JSON")?;
        println!("{}", json);
    } else {
        for (value, snapped) in report.values.iter().zip(&report.snapped) {
            println!("{} -> {}", parser.format_time(*value), parser.format_time(*snapped));
        }
        println!(
            "{} aligned, {} moved, {} skipped (threshold {:.3}s, {})",
            report.stats.already_aligned,
            report.stats.moved,
            report.stats.skipped,
            report.threshold,
            report.preference
        );
    }

    info!("Snap operation completed successfully");
    Ok(())
}

#[derive(Debug, Serialize)]
struct AnalyzeReport {
    gop: GopAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<AlignmentReport>,
}

/// Execute the analyze command
pub fn analyze(args: AnalyzeArgs) -> Result<()> {
    info!("Starting analyze operation");

    let parser = TimeParser::new();
    let analyzer = KeyframeAnalyzer::new().with_alignment_tolerance(args.tolerance);

    let mut keyframes = parser
        .parse_list(&args.keyframes)
        .context("Invalid --keyframes")?;
    if let Some(min_distance) = args.min_distance {
        keyframes = analyzer.thin_keyframes(&keyframes, min_distance);
    }

    let gop = analyzer
        .analyze_gop(&keyframes, args.fps)
        .context("GOP analysis failed")?;

    let alignment = match args.cuts {
        Some(ref cuts) => {
            let cuts = parser.parse_list(cuts).context("Invalid --cuts")?;
            Some(analyzer.analyze_alignment(&cuts, &keyframes))
        }
        None => None,
    };

    if args.json {
        let report = AnalyzeReport { gop, alignment };
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize analysis to JSON")?;
        println!("{}", json);
    } else {
        print!("{}", analyzer.generate_summary(&gop));
        if let Some(report) = alignment {
            display_alignment_report(&report);
        }
    }

    info!("Analyze operation completed successfully");
    Ok(())
}

fn display_alignment_report(report: &AlignmentReport) {
    let parser = TimeParser::new();
    println!("Cut Alignment:");
    println!(
        "  Aligned: {}/{} ({:.1}%) within {:.3}s",
        report.aligned_cuts,
        report.total_cut_points,
        report.alignment_rate * 100.0,
        report.tolerance
    );
    if report.non_aligned_cuts > 0 {
        println!("  Average Misalignment: {:.3}s", report.avg_misalignment);
        for cut in &report.misaligned_cuts {
            println!(
                "    {} (nearest keyframe {}, off by {:.3}s)",
                parser.format_time(cut.cut_point),
                parser.format_time(cut.nearest_keyframe),
                cut.distance
            );
        }
    }
}
