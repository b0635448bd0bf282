use std::path::Path;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// A scene that got slower or wider than its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Regression {
    /// Mean encode or decode time rose past the threshold.
    Timing {
        scene: String,
        phase: &'static str,
        pct_change: f64,
    },
    /// The record width changed, which breaks wire compatibility.
    Width { scene: String, before: u32, after: u32 },
}

/// Load a baseline from a JSON file. Returns None if the file doesn't exist.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

fn pct_change(current: f64, base: f64) -> f64 {
    if base <= 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

/// Compare current results against a baseline. Scenes missing from the
/// baseline are ignored.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    let mut regressions = Vec::new();

    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };

        if base.bits[0] != result.bits[0] {
            regressions.push(Regression::Width {
                scene: result.scene_name.clone(),
                before: base.bits[0],
                after: result.bits[0],
            });
        }

        let phases = [
            ("encode", result.encode.mean_ms, base.encode.mean_ms),
            ("decode", result.decode.mean_ms, base.decode.mean_ms),
        ];
        for (phase, now, before) in phases {
            let pct = pct_change(now, before);
            if pct > threshold_pct {
                regressions.push(Regression::Timing {
                    scene: result.scene_name.clone(),
                    phase,
                    pct_change: pct,
                });
            }
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Preset | Transforms | Bits (L0/L1/L2/L3) | Pos err | Rot err (deg) | Scale err | Encode mean (ms) | Encode p95 (ms) | Decode mean (ms) | Decode p95 (ms) |\n");
    out.push_str("|-------|--------|------------|--------------------|---------|---------------|-----------|------------------|-----------------|------------------|-----------------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {}/{}/{}/{} | {:.4} | {:.3} | {:.4} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            r.scene_name,
            r.preset,
            r.transform_count,
            r.bits[0],
            r.bits[1],
            r.bits[2],
            r.bits[3],
            r.errors.position,
            r.errors.rotation_deg,
            r.errors.scale,
            r.encode.mean_ms,
            r.encode.p95_ms,
            r.decode.mean_ms,
            r.decode.p95_ms,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!(
            "All scenes within {:.0}% threshold. No regressions detected.\n",
            threshold_pct
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "REGRESSIONS DETECTED (>{:.0}% threshold):\n",
        threshold_pct
    ));
    for regression in regressions {
        match regression {
            Regression::Timing {
                scene,
                phase,
                pct_change,
            } => out.push_str(&format!("  - {} {}: +{:.1}%\n", scene, phase, pct_change)),
            Regression::Width {
                scene,
                before,
                after,
            } => out.push_str(&format!(
                "  - {}: record width {} -> {} bits\n",
                scene, before, after
            )),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{compute_timings, ErrorSummary};

    fn result(name: &str, encode_ms: f64, decode_ms: f64, bits: u32) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: name.to_string(),
            preset: "compact".to_string(),
            transform_count: 100,
            sample_count: 1,
            bits: [bits, bits - 4, bits - 8, bits - 12],
            errors: ErrorSummary::default(),
            encode: compute_timings(&[encode_ms]),
            decode: compute_timings(&[decode_ms]),
        }
    }

    #[test]
    fn test_no_regression_within_threshold() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 1.0, 1.0, 64)],
        };
        let current = vec![result("a", 1.05, 0.9, 64)];
        assert!(compare(&current, &baseline, 10.0).is_empty());
        assert!(format_comparison(&[], 10.0).contains("No regressions"));
    }

    #[test]
    fn test_timing_regression_detected() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 1.0, 2.0, 64), result("b", 1.0, 1.0, 64)],
        };
        let current = vec![result("a", 1.0, 3.0, 64), result("c", 9.0, 9.0, 64)];
        let regressions = compare(&current, &baseline, 10.0);
        assert_eq!(regressions.len(), 1);
        assert!(matches!(
            &regressions[0],
            Regression::Timing { scene, phase: "decode", pct_change } if scene == "a" && (*pct_change - 50.0).abs() < 1e-9
        ));
        assert!(format_comparison(&regressions, 10.0).contains("a decode: +50.0%"));
    }

    #[test]
    fn test_width_change_reported() {
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 1.0, 1.0, 64)],
        };
        let regressions = compare(&[result("a", 1.0, 1.0, 74)], &baseline, 10.0);
        assert_eq!(
            regressions,
            vec![Regression::Width {
                scene: "a".into(),
                before: 64,
                after: 74
            }]
        );
    }

    #[test]
    fn test_markdown_has_row_per_scene() {
        let md = format_markdown(&[result("a", 1.0, 1.0, 64), result("b", 1.0, 1.0, 74)]);
        assert_eq!(md.lines().count(), 4);
        assert!(md.contains("| a | compact | 100 | 64/60/56/52 |"));
    }

    #[test]
    fn test_baseline_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("trspack-bench-{}", std::process::id()));
        let path = dir.join("baseline.json");
        let baseline = Baseline {
            timestamp: "t".into(),
            results: vec![result("a", 1.0, 1.0, 64)],
        };
        save_baseline(&path, &baseline).unwrap();
        let loaded = load_baseline(&path).unwrap();
        assert_eq!(loaded.results[0].bits, [64, 60, 56, 52]);
        assert!(load_baseline(&dir.join("missing.json")).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
