// Batch pipeline: independent jobs encoded in parallel

use jxl_wrapper::codec::Serialized;
use jxl_wrapper::codec::mock::ScriptedCodec;
use jxl_wrapper::encoder::Encoder;
use jxl_wrapper::format::PixelFormat;
use jxl_wrapper::pipeline::batch::{BatchJob, plan_jobs, run_all, run_job};

fn raw_job(dir: &std::path::Path, name: &str, len: usize) -> BatchJob {
    let input_path = dir.join(format!("{name}.raw"));
    std::fs::write(&input_path, vec![0u8; len]).unwrap();
    BatchJob {
        input_path,
        output_path: dir.join(format!("{name}.jxl")),
        format: PixelFormat::Gray,
        raw_dimensions: Some((4, 4)),
    }
}

#[test]
fn test_run_job_writes_codestream() {
    let dir = tempfile::tempdir().unwrap();
    let job = raw_job(dir.path(), "one", 16);
    let encoder = Encoder::new(ScriptedCodec::ok(4, 4, 9, 3).with_output_byte(0xFF));

    let result = run_job(&job, &encoder).unwrap();
    assert_eq!(result.encoded_len, 9);
    assert_eq!(result.icc_len, 3);
    assert_eq!((result.width, result.height), (4, 4));
    assert_eq!(std::fs::read(&job.output_path).unwrap(), vec![0xFF; 9]);
}

#[test]
fn test_run_all_keeps_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = vec![
        raw_job(dir.path(), "a", 16),
        // Wrong size for 4x4 gray: fails while loading.
        raw_job(dir.path(), "b", 15),
        raw_job(dir.path(), "c", 16),
    ];
    let encoder = Encoder::new(ScriptedCodec::ok(4, 4, 5, 1));

    let results = run_all(&jobs, &encoder, 2);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(
        results[2].as_ref().unwrap().input_path,
        dir.path().join("c.raw")
    );
    assert!(!jobs[1].output_path.exists());
    assert_eq!(encoder.codec().measure_calls(), 2);
}

#[test]
fn test_run_all_with_serialized_codec() {
    let dir = tempfile::tempdir().unwrap();
    let jobs: Vec<BatchJob> = (0..8)
        .map(|i| raw_job(dir.path(), &format!("img{i}"), 16))
        .collect();
    let encoder = Encoder::new(Serialized::new(ScriptedCodec::ok(4, 4, 4, 0)));

    let results = run_all(&jobs, &encoder, 0);
    assert!(results.iter().all(|r| r.is_ok()));
    for job in &jobs {
        assert_eq!(std::fs::read(&job.output_path).unwrap().len(), 4);
    }
}

#[test]
fn test_run_all_codec_failure_is_reported_per_job() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = vec![raw_job(dir.path(), "x", 16), raw_job(dir.path(), "y", 16)];
    let encoder = Encoder::new(ScriptedCodec::new([-1, 0, 0, 0, 0, 0], 0));

    let results = run_all(&jobs, &encoder, 1);
    assert!(results.iter().all(|r| matches!(
        r,
        Err(jxl_wrapper::JxlWrapperError::EncodingFailed { .. })
    )));
    assert_eq!(encoder.codec().produce_calls(), 0);
}

fn paths(names: &[&str]) -> Vec<std::path::PathBuf> {
    names.iter().map(std::path::PathBuf::from).collect()
}

#[test]
fn test_plan_jobs_names_outputs_after_stems() {
    let out = std::path::Path::new("out");
    let inputs = paths(&["a/one.png", "b/two.jpg"]);
    let jobs = plan_jobs(out, &inputs, PixelFormat::Rgba8888, None).unwrap();
    assert_eq!(jobs[0].output_path, out.join("one.jxl"));
    assert_eq!(jobs[1].output_path, out.join("two.jxl"));
    assert!(jobs.iter().all(|j| j.format == PixelFormat::Rgba8888));
}

#[test]
fn test_plan_jobs_rejects_shared_stems() {
    let out = std::path::Path::new("out");
    for inputs in [
        paths(&["a/img.png", "b/img.png"]),
        paths(&["img.png", "img.jpg"]),
    ] {
        let err = plan_jobs(out, &inputs, PixelFormat::Gray, None).unwrap_err();
        assert!(
            matches!(&err, jxl_wrapper::JxlWrapperError::InvalidArgument(msg) if msg.contains("img.jxl")),
            "got {err}"
        );
    }
}

#[test]
fn test_run_all_refuses_second_writer_of_an_output() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let mut jobs = Vec::new();
    for (sub, byte) in [("a", 0x11u8), ("b", 0x22)] {
        let src = dir.path().join(sub);
        std::fs::create_dir(&src).unwrap();
        let input_path = src.join("img.raw");
        std::fs::write(&input_path, vec![byte; 16]).unwrap();
        jobs.push(BatchJob {
            input_path,
            output_path: out_dir.join("img.jxl"),
            format: PixelFormat::Gray,
            raw_dimensions: Some((4, 4)),
        });
    }
    let encoder = Encoder::new(ScriptedCodec::ok(4, 4, 3, 0).with_output_byte(0xAB));

    let results = run_all(&jobs, &encoder, 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(jxl_wrapper::JxlWrapperError::InvalidArgument(_))
    ));
    assert_eq!(encoder.codec().measure_calls(), 1);
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 1);
}
