// Batch mode: many independent inputs -> codestreams, encoded in parallel

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::codec::NativeCodec;
use crate::encoder::Encoder;
use crate::error::JxlWrapperError;
use crate::format::PixelFormat;
use crate::input::{RawImage, load_image, load_raw};

/// One input file and where to write its codestream.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: PixelFormat,
    /// Set for headerless pixel dumps; `None` decodes the file as an image.
    pub raw_dimensions: Option<(u32, u32)>,
}

/// Outcome of a successful job.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub encoded_len: usize,
    pub icc_len: usize,
}

/// Build one job per input, writing `<output_dir>/<file stem>.jxl`.
///
/// Fails before anything is encoded if two inputs map to the same output
/// file (`a/img.png` and `b/img.png`, or `img.png` and `img.jpg`).
pub fn plan_jobs(
    output_dir: &Path,
    inputs: &[PathBuf],
    format: PixelFormat,
    raw_dimensions: Option<(u32, u32)>,
) -> crate::error::Result<Vec<BatchJob>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());

    for input in inputs {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let output_path = output_dir.join(format!("{stem}.jxl"));

        if let Some(first) = claimed.insert(output_path.clone(), input) {
            return Err(JxlWrapperError::invalid_argument(format!(
                "{} and {} would both be written to {}",
                first.display(),
                input.display(),
                output_path.display()
            )));
        }

        jobs.push(BatchJob {
            input_path: input.clone(),
            output_path,
            format,
            raw_dimensions,
        });
    }

    Ok(jobs)
}

/// Load, encode and write a single job.
pub fn run_job<C: NativeCodec>(
    job: &BatchJob,
    encoder: &Encoder<C>,
) -> crate::error::Result<BatchResult> {
    let raw: RawImage = match job.raw_dimensions {
        Some((w, h)) => load_raw(&job.input_path, w, h, job.format)?,
        None => load_image(&job.input_path, job.format)?,
    };

    let image = encoder.encode_with_format(&raw.pixels, raw.width, raw.height, raw.format)?;
    std::fs::write(&job.output_path, &image.encoded_bytes)?;

    Ok(BatchResult {
        input_path: job.input_path.clone(),
        output_path: job.output_path.clone(),
        width: image.width,
        height: image.height,
        encoded_len: image.encoded_bytes.len(),
        icc_len: image.icc_profile.len(),
    })
}

/// Run every job, collecting results in input order.
/// One job failure does NOT prevent other jobs from running.
///
/// A job whose output path was already taken by an earlier job fails with
/// `InvalidArgument` without running, so the earlier codestream survives.
///
/// `workers == 0` uses rayon's global pool. The encoder is shared across
/// threads, so its codec must be reentrant or wrapped in
/// [`Serialized`](crate::codec::Serialized).
pub fn run_all<C: NativeCodec>(
    jobs: &[BatchJob],
    encoder: &Encoder<C>,
    workers: usize,
) -> Vec<crate::error::Result<BatchResult>> {
    let mut first_owner: HashMap<&Path, usize> = HashMap::new();
    let owners: Vec<usize> = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| *first_owner.entry(job.output_path.as_path()).or_insert(i))
        .collect();

    let run = || -> Vec<crate::error::Result<BatchResult>> {
        jobs.par_iter()
            .enumerate()
            .map(|(i, job)| {
                let result = match owners[i] {
                    owner if owner == i => run_job(job, encoder),
                    owner => Err(JxlWrapperError::invalid_argument(format!(
                        "{} is already the output of {}",
                        job.output_path.display(),
                        jobs[owner].input_path.display()
                    ))),
                };
                if let Err(e) = &result {
                    tracing::warn!(input = %job.input_path.display(), error = %e, "job failed");
                }
                result
            })
            .collect()
    };

    if workers == 0 {
        return run();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!(workers, error = %e, "failed to build worker pool, using global pool");
            run()
        }
    }
}
