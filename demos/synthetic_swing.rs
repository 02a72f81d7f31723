//! Analyze a synthetic swing and print the report.
//!
//! Usage: cargo run --example synthetic_swing [--features json]
//!
//! A scripted pose source stands in for a real detector: it "sees" a golfer
//! in every frame except a few where the body is lost. Set `RUST_LOG=debug`
//! to watch the pipeline's tracing events.

use std::f64::consts::FRAC_PI_2;
use std::process;

use swingsight::frame::FrameExtractor;
use swingsight::overlay;
use swingsight::{
    AnalysisConfig, AnalysisError, Analyzer, ClubMetrics, Detection, Landmark, PhaseLayout,
    PoseSource, Position, SwingAnalysisResult, VideoMetadata,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const FPS: f64 = 30.0;
const FRAMES: u32 = 48;
const TOP: u32 = 28;
const IMPACT: u32 = 37;
/// Frames in which the scripted detector finds nobody.
const LOST: [u32; 3] = [5, 6, 44];

// ---------------------------------------------------------------------------
// Scripted detector
// ---------------------------------------------------------------------------

/// "Images" are frame numbers; detection is computed from a swing curve.
struct ScriptedGolfer;

impl ScriptedGolfer {
    /// Trailing wrist height: slow climb to the top, fast drop to impact,
    /// gentle rise through the finish.
    fn wrist_y(i: u32) -> f64 {
        let i = f64::from(i);
        let (top, impact, last) = (f64::from(TOP), f64::from(IMPACT), f64::from(FRAMES - 1));
        if i <= top {
            0.75 - 0.5 * (FRAC_PI_2 * i / top).sin().powi(2)
        } else if i <= impact {
            0.25 + 0.5 * ((i - top) / (impact - top)).powi(2)
        } else {
            0.75 - 0.35 * (i - impact) / (last - impact)
        }
    }
}

impl PoseSource for ScriptedGolfer {
    type Image = u32;

    fn detect(&mut self, frame: &u32) -> Option<Detection> {
        if LOST.contains(frame) {
            return None;
        }
        let y = Self::wrist_y(*frame);
        let x = 0.5 + 0.2 * (0.75 - y);
        // Slight hip slide through the downswing.
        let slide = if *frame > TOP { 0.002 * f64::from(*frame - TOP) } else { 0.0 };
        let p = |x: f64, y: f64| Position::new(x, y, 0.0, 0.95);
        Some(
            Detection::new()
                .with(Landmark::Nose, p(0.5, 0.2))
                .with(Landmark::LeftShoulder, p(0.56, 0.35))
                .with(Landmark::RightShoulder, p(0.44, 0.36))
                .with(Landmark::LeftElbow, p((0.56 + x) / 2.0 + 0.02, (0.35 + y) / 2.0))
                .with(Landmark::RightElbow, p((0.44 + x) / 2.0 + 0.04, (0.36 + y) / 2.0))
                .with(Landmark::LeftWrist, p(x + 0.02, y + 0.01))
                .with(Landmark::RightWrist, p(x, y))
                .with(Landmark::LeftHip, p(0.54 + slide, 0.6))
                .with(Landmark::RightHip, p(0.46 + slide, 0.6))
                .with(Landmark::LeftKnee, p(0.55, 0.75))
                .with(Landmark::RightKnee, p(0.45, 0.76))
                .with(Landmark::LeftAnkle, p(0.56, 0.9))
                .with(Landmark::RightAnkle, p(0.44, 0.9)),
        )
    }
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn opt(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}{unit}"))
}

fn print_report(r: &SwingAnalysisResult) {
    let m = &r.overall_metrics;
    println!("\n=== Swing report ===");
    println!(
        "  Segmentation: {:?}  top={} impact={}",
        r.segmentation.method, r.segmentation.top_index, r.segmentation.impact_index
    );
    for p in r.phases() {
        let pm = &r.per_phase_metrics[&p.name];
        println!(
            "    {:<15} frames {:>2}..={:<2}  {:.3}s",
            p.name.to_string(),
            p.start_frame,
            p.end_frame,
            pm.duration
        );
    }
    println!(
        "  Tempo: {}  (backswing {}, downswing {})",
        opt(m.tempo_ratio, ":1"),
        opt(m.backswing_duration, "s"),
        opt(m.downswing_duration, "s"),
    );
    for (name, s) in &m.angles {
        println!(
            "  {:<12} min {:>6.1}°  max {:>6.1}°  mean {:>6.1}°  range {:>5.1}°",
            name.label(),
            s.min,
            s.max,
            s.mean,
            s.range
        );
    }
    println!(
        "  Hips moved: {}  Shoulder turn: {}  Wrist speed max: {}",
        opt(m.hip_stability.map(|h| h.total_movement), ""),
        opt(m.shoulder_rotation_range, "°"),
        opt(m.wrist_speed.map(|w| w.max), "/s"),
    );
    println!(
        "  Tracking quality: {:.0}%  Detection rate: {}",
        r.pose_tracking_quality * 100.0,
        opt(m.detection_rate.map(|d| d * 100.0), "%"),
    );
    let b = r.score_breakdown;
    println!(
        "  Score: {} (base {} tempo {:+} consistency {:+} stability {:+})",
        r.overall_score, b.base, b.tempo, b.consistency, b.stability
    );
    println!("  Key frames:");
    for k in &r.key_frames {
        println!("    {:<8} video frame {:>2} at {:.3}s", k.kind.to_string(), k.frame_index, k.timestamp);
    }
    println!("  Recommendations:");
    for (i, rec) in r.recommendations.iter().enumerate() {
        println!("    {}. {rec}", i + 1);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), AnalysisError> {
    // 1. Detect
    let mut extractor = FrameExtractor::new(ScriptedGolfer, FPS);
    let frame_numbers: Vec<u32> = (0..FRAMES).collect();
    let observations = extractor.observe_all(&frame_numbers);
    println!("Observed {} frames.", extractor.frames_seen());

    // 2. Configure
    let config = AnalysisConfig {
        layout: PhaseLayout::Detailed,
        ..Default::default()
    };
    let mut analyzer = Analyzer::new(config)?;
    analyzer.set_club_metrics(ClubMetrics {
        club_path_deg: Some(1.5),
        attack_angle_deg: Some(-7.2),
    });
    analyzer.set_on_dropped(|i| println!("  frame {i}: no golfer detected"));
    analyzer.set_on_frame(|f| {
        if f.frame_index % 12 == 0 {
            let o = overlay::overlay(f, 1280, 720);
            let labels: Vec<&str> = o.labels.iter().map(|l| l.text.as_str()).collect();
            println!("  frame {:>2}: {}", f.frame_index, labels.join(", "));
        }
    });

    // 3. Analyze
    let result = analyzer.analyze(&observations, &VideoMetadata::new(FPS, FRAMES, 1280, 720))?;
    print_report(&result);

    #[cfg(feature = "json")]
    println!("\n{}", result.to_json()?);

    Ok(())
}
