use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jxl_wrapper::codec::NativeCodec;
use jxl_wrapper::config::settings::Settings;
use jxl_wrapper::config::{self};
use jxl_wrapper::encoder::Encoder;
use jxl_wrapper::format::PixelFormat;
use jxl_wrapper::input::parse_dimensions;
use jxl_wrapper::pipeline::batch::{BatchJob, plan_jobs, run_all, run_job};
use tracing_subscriber::EnvFilter;

const SELFTEST_DIM: u32 = 1024;

const USAGE: &str = "\
Usage: jxl_wrapper <command> [options]

Commands:
  encode <input> <output>          Encode one image to a JPEG XL codestream
  batch <output-dir> <input>...    Encode many images in parallel
  selftest                         Encode a 1024x1024 gray image and check the result

Options:
  --rgba            Encode as 8-bit RGBA instead of the configured format
  --raw WxH         Treat inputs as headerless pixel dumps of the given size
  --settings FILE   Read settings from FILE instead of ./jxl_wrapper.yaml
  -h, --help        Show this help
  -V, --version     Show version";

/// Parsed command-line options shared by all commands.
struct Options {
    positional: Vec<String>,
    rgba: bool,
    raw_dimensions: Option<(u32, u32)>,
    settings_path: Option<PathBuf>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        positional: Vec::new(),
        rgba: false,
        raw_dimensions: None,
        settings_path: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rgba" => options.rgba = true,
            "--raw" => {
                let value = iter.next().ok_or("--raw requires a WxH value")?;
                options.raw_dimensions = Some(parse_dimensions(value).map_err(|e| e.to_string())?);
            }
            "--settings" => {
                let value = iter.next().ok_or("--settings requires a file path")?;
                options.settings_path = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {flag}")),
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("jxl_wrapper {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let command = args[0].as_str();
    if !matches!(command, "encode" | "batch" | "selftest") {
        eprintln!("ERROR: Unknown command '{command}'");
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let options = match parse_options(&args[1..]) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match &options.settings_path {
        Some(path) => Settings::from_file(path),
        None => config::load_settings(Path::new(".")),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings);

    let format = if options.rgba {
        PixelFormat::Rgba8888
    } else {
        settings.pixel_format
    };

    let codec = match native_codec(&settings) {
        Some(c) => c,
        None => {
            eprintln!(
                "ERROR: jxl_wrapper was built without a native codec (rebuild with --features libjxl)"
            );
            return ExitCode::FAILURE;
        }
    };
    let encoder = Encoder::with_default_format(codec, format);

    match command {
        "encode" => run_encode(&encoder, &options, format),
        "batch" => run_batch(&encoder, &options, format, settings.parallel_workers),
        _ => run_selftest(&encoder),
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "libjxl")]
fn native_codec(settings: &Settings) -> Option<Box<dyn NativeCodec>> {
    let codec = jxl_wrapper::ffi::libjxl::LibJxlCodec::new();
    if settings.serialize_codec_calls {
        Some(Box::new(jxl_wrapper::codec::Serialized::new(codec)))
    } else {
        Some(Box::new(codec))
    }
}

#[cfg(not(feature = "libjxl"))]
fn native_codec(_settings: &Settings) -> Option<Box<dyn NativeCodec>> {
    None
}

fn run_encode(
    encoder: &Encoder<Box<dyn NativeCodec>>,
    options: &Options,
    format: PixelFormat,
) -> ExitCode {
    let [input, output] = options.positional.as_slice() else {
        eprintln!("ERROR: encode takes exactly <input> <output>");
        return ExitCode::FAILURE;
    };

    let job = BatchJob {
        input_path: PathBuf::from(input),
        output_path: PathBuf::from(output),
        format,
        raw_dimensions: options.raw_dimensions,
    };

    match run_job(&job, encoder) {
        Ok(result) => {
            eprintln!(
                "OK: {} -> {} ({}x{}, {} bytes, ICC {} bytes)",
                result.input_path.display(),
                result.output_path.display(),
                result.width,
                result.height,
                result.encoded_len,
                result.icc_len
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {input} -> {output}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(
    encoder: &Encoder<Box<dyn NativeCodec>>,
    options: &Options,
    format: PixelFormat,
    workers: usize,
) -> ExitCode {
    let Some((output_dir, inputs)) = options.positional.split_first() else {
        eprintln!("ERROR: batch takes <output-dir> <input>...");
        return ExitCode::FAILURE;
    };
    if inputs.is_empty() {
        eprintln!("ERROR: batch needs at least one input");
        return ExitCode::FAILURE;
    }

    let output_dir = Path::new(output_dir);
    let inputs: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();
    let jobs = match plan_jobs(output_dir, &inputs, format, options.raw_dimensions) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("ERROR: Failed to create {}: {e}", output_dir.display());
        return ExitCode::FAILURE;
    }

    let results = run_all(&jobs, encoder, workers);

    let mut has_error = false;
    for (job, result) in jobs.iter().zip(&results) {
        match result {
            Ok(r) => eprintln!(
                "OK: {} -> {} ({} bytes)",
                r.input_path.display(),
                r.output_path.display(),
                r.encoded_len
            ),
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job.input_path.display(),
                    job.output_path.display()
                );
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_selftest(encoder: &Encoder<Box<dyn NativeCodec>>) -> ExitCode {
    let pixels = vec![0u8; (SELFTEST_DIM * SELFTEST_DIM) as usize];
    let image = match encoder.encode_with_format(
        &pixels,
        SELFTEST_DIM,
        SELFTEST_DIM,
        PixelFormat::Gray,
    ) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("ERROR: selftest encode failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if image.width != SELFTEST_DIM || image.height != SELFTEST_DIM {
        eprintln!(
            "ERROR: selftest got {}x{}, expected {SELFTEST_DIM}x{SELFTEST_DIM}",
            image.width, image.height
        );
        return ExitCode::FAILURE;
    }

    // The exact ICC size depends on the libjxl version; only sanity-check it.
    let icc_len = image.icc_profile.len();
    if !(300..=1000).contains(&icc_len) {
        eprintln!("ERROR: selftest got unexpected ICC profile size {icc_len}");
        return ExitCode::FAILURE;
    }

    eprintln!(
        "OK: selftest ({} byte codestream, ICC {icc_len} bytes)",
        image.encoded_bytes.len()
    );
    ExitCode::SUCCESS
}
