//! `sortsheet`: sort a workbook's rows by column E and save a formatted copy.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sortsheet_io_xlsx::{C_FILE_IN_DEFAULT, SortSheetError, derive_output_path, run_file};

const EXIT_SUCCESS: u8 = 0;
const EXIT_INPUT_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "sortsheet",
    version,
    about = "Sort spreadsheet rows ascending by column E and write a formatted .xlsx copy."
)]
struct Args {
    /// Input workbook (.xlsx, .xlsm or .xls).
    #[arg(short, long, default_value = C_FILE_IN_DEFAULT)]
    input: PathBuf,

    /// Output workbook; defaults to `<input stem>_sapxep_cotE.xlsx` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log pipeline steps at debug level.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn path_output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.input))
    }
}

fn derive_exit_code(err: &SortSheetError) -> u8 {
    match err {
        SortSheetError::Write { .. } => EXIT_IO_ERROR,
        SortSheetError::Format(_) | SortSheetError::Schema { .. } | SortSheetError::Table(_) => {
            EXIT_INPUT_ERROR
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level_default = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level_default))
        .init();

    let path_output = args.path_output();
    log::debug!(
        "Sorting {} into {}",
        args.input.display(),
        path_output.display()
    );

    match run_file(&args.input, &path_output) {
        // run_file logs the summary and any warnings
        Ok(_) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, SortSheetError::Format(_)) && !args.input.exists() {
                eprintln!("hint:  pass --input <FILE> or place {C_FILE_IN_DEFAULT} in the working directory");
            }
            ExitCode::from(derive_exit_code(&err))
        }
    }
}
