use std::time::Instant;

use glam::Vec3;
use trspack_bits::words_for_bits;
use trspack_codec::{
    BitCullingLevel, CodecError, SimpleTransform, Space, TransformCodec, TransformTarget,
    ALL_CULLING_LEVELS,
};
use trspack_config::{build_codec, ConfigError, PresetTable};

use crate::scenes::{generate_transforms, SceneConfig};

/// Timing data for a single benchmark phase.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Largest per-transform reconstruction error seen in a scene.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ErrorSummary {
    pub position: f32,
    /// Angle between source and reconstructed rotation, degrees.
    pub rotation_deg: f32,
    pub scale: f32,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub preset: String,
    pub transform_count: u32,
    pub sample_count: u32,
    /// Record width at each culling level.
    pub bits: [u32; 4],
    pub errors: ErrorSummary,
    pub encode: TimingSeries,
    pub decode: TimingSeries,
}

/// Runs codec throughput and accuracy benchmarks.
pub struct BenchmarkRunner {
    presets: PresetTable,
    sample_count: u32,
}

impl BenchmarkRunner {
    pub fn new(presets: PresetTable, sample_count: u32) -> Self {
        Self {
            presets,
            sample_count: sample_count.max(1),
        }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, config: &SceneConfig) -> Result<BenchmarkResult, ConfigError> {
        log::info!(
            "Running scene '{}' ({} transforms, preset '{}')...",
            config.name,
            config.transform_count,
            config.preset
        );

        let codec = build_codec(&self.presets, config.preset)?;
        let sources = generate_transforms(config);
        let level = BitCullingLevel::NoCulling;
        let record_bits = codec.tally_bits(level) as usize;
        let mut buffer = vec![0u64; words_for_bits(record_bits * sources.len(), 64).max(1)];
        let mut mirrors = vec![SimpleTransform::default(); sources.len()];

        let mut encode_times = Vec::with_capacity(self.sample_count as usize);
        let mut decode_times = Vec::with_capacity(self.sample_count as usize);

        for _ in 0..self.sample_count {
            let start = Instant::now();
            encode_all(&codec, &sources, &mut buffer[..], level)?;
            encode_times.push(start.elapsed().as_secs_f64() * 1000.0);

            let start = Instant::now();
            decode_all(&codec, &buffer[..], &mut mirrors, level)?;
            decode_times.push(start.elapsed().as_secs_f64() * 1000.0);
        }

        let errors = measure_errors(&codec, &sources, &mirrors);
        log::info!(
            "  {} bits/record, max error: position {:.4}, rotation {:.3} deg, scale {:.4}",
            record_bits,
            errors.position,
            errors.rotation_deg,
            errors.scale
        );

        Ok(BenchmarkResult {
            scene_name: config.name.to_string(),
            preset: config.preset.to_string(),
            transform_count: config.transform_count,
            sample_count: self.sample_count,
            bits: ALL_CULLING_LEVELS.map(|level| codec.tally_bits(level)),
            errors,
            encode: compute_timings(&encode_times),
            decode: compute_timings(&decode_times),
        })
    }
}

fn encode_all(
    codec: &TransformCodec,
    sources: &[SimpleTransform],
    buffer: &mut [u64],
    level: BitCullingLevel,
) -> Result<(), CodecError> {
    let mut pos = 0;
    for source in sources {
        codec.encode(source, buffer, &mut pos, level)?;
    }
    Ok(())
}

fn decode_all(
    codec: &TransformCodec,
    buffer: &[u64],
    mirrors: &mut [SimpleTransform],
    level: BitCullingLevel,
) -> Result<(), CodecError> {
    let mut pos = 0;
    for mirror in mirrors {
        let record = codec.read(buffer, &mut pos, level)?;
        codec.apply(mirror, &record)?;
    }
    Ok(())
}

/// Compare each mirror against its source. Elements the codec does not send
/// are skipped.
fn measure_errors(
    codec: &TransformCodec,
    sources: &[SimpleTransform],
    mirrors: &[SimpleTransform],
) -> ErrorSummary {
    let mut errors = ErrorSummary::default();
    for (source, mirror) in sources.iter().zip(mirrors) {
        if codec.position().enabled() {
            let delta = source.position(Space::Local) - mirror.position(Space::Local);
            errors.position = errors.position.max(delta.abs().max_element());
        }
        if codec.rotation().enabled() {
            let dot = source.rotation.dot(mirror.rotation).abs().min(1.0);
            errors.rotation_deg = errors.rotation_deg.max((2.0 * dot.acos()).to_degrees());
        }
        if codec.scale().enabled() {
            let delta: Vec3 = source.scale - mirror.scale;
            errors.scale = errors.scale.max(delta.abs().max_element());
        }
    }
    errors
}

pub(crate) fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
