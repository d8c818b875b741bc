use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use k2d_api::{convert_script_xml, transform_script_xml};
use k2d_core::Key2DynError;
use tracing::info;
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(name = "key2dyn")]
#[command(about = "Keynote to Gomez/Dynatrace monitoring script converter")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Convert Keynote script XML into GSL transaction XML.
    Convert(ConvertArgs),
    /// Dump the intermediate Script Model as JSON.
    Dump(DumpArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// A .krs file, or a directory converted recursively.
    #[arg(long = "input")]
    input: String,
    /// Output file for single-file conversion; stdout when omitted.
    #[arg(long = "output")]
    output: Option<String>,
    /// Output directory for directory conversion; defaults to the input
    /// directory.
    #[arg(long = "out-dir")]
    out_dir: Option<String>,
}

#[derive(Debug, Args)]
struct DumpArgs {
    #[arg(long = "input")]
    input: String,
    #[arg(long = "output")]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, Key2DynError> {
    match cli.command {
        Mode::Convert(args) => run_convert(args),
        Mode::Dump(args) => run_dump(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<i32, Key2DynError> {
    let input = PathBuf::from(&args.input);

    if input.is_dir() {
        let out_dir = args
            .out_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| input.clone());
        return convert_directory(&input, &out_dir);
    }

    let gsl = transform_script_xml(&read_input(&input)?)?;
    match args.output {
        Some(path) => {
            write_output(Path::new(&path), &gsl)?;
            info!(input = %input.display(), output = %path, "converted script");
        }
        None => println!("{}", gsl),
    }

    Ok(0)
}

fn convert_directory(input: &Path, out_dir: &Path) -> Result<i32, Key2DynError> {
    fs::create_dir_all(out_dir).map_err(|error| map_output_write(out_dir, error))?;

    for entry in WalkDir::new(input).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("krs") {
            continue;
        }

        let gsl = transform_script_xml(&read_input(path)?)?;
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("script");
        let target = out_dir.join(format!("{}.gsl.xml", stem));
        write_output(&target, &gsl)?;
        info!(input = %path.display(), output = %target.display(), "converted script");
    }

    Ok(0)
}

fn run_dump(args: DumpArgs) -> Result<i32, Key2DynError> {
    let script = convert_script_xml(&read_input(Path::new(&args.input))?)?;
    let json = serde_json::to_string_pretty(&script)
        .map_err(|error| Key2DynError::new("CLI_JSON_WRITE", error.to_string()))?;

    match args.output {
        Some(path) => write_output(Path::new(&path), &json)?,
        None => println!("{}", json),
    }

    Ok(0)
}

fn emit_error(error: Key2DynError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

fn read_input(path: &Path) -> Result<String, Key2DynError> {
    fs::read_to_string(path).map_err(|error| {
        Key2DynError::new("CLI_INPUT_READ", format!("{}: {}", path.display(), error))
    })
}

fn write_output(path: &Path, contents: &str) -> Result<(), Key2DynError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| map_output_write(parent, error))?;
        }
    }

    fs::write(path, contents).map_err(|error| map_output_write(path, error))
}

fn map_output_write(path: &Path, error: std::io::Error) -> Key2DynError {
    Key2DynError::new("CLI_OUTPUT_WRITE", format!("{}: {}", path.display(), error))
}
