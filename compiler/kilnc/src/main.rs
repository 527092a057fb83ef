//! The `kiln` command.

use std::process::ExitCode;

use kilnc::commands::{
    build_file, calc_file, check_file, explain_error, format_file, run_demo_command, run_file, CliError,
    CommandArgs,
};

fn main() -> ExitCode {
    kilnc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let Some(command) = args.get(1) else {
        print_usage();
        return ExitCode::SUCCESS;
    };
    let rest = args.get(2..).unwrap_or_default();

    let outcome = match command.as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(0)
        }
        "version" | "--version" | "-V" => {
            println!("kiln {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        "explain" | "--explain" => match rest.first() {
            Some(code) => explain_error(code).map(|()| 0),
            None => Err(CliError::Usage("usage: kiln explain <CODE>".to_string())),
        },
        "demo" => run_demo_command().map(|()| 0),
        _ => CommandArgs::parse(rest).and_then(|parsed| dispatch(command, &parsed)),
    };

    match outcome {
        Ok(status) => exit_code(status),
        Err(CliError::Reported) => ExitCode::FAILURE,
        Err(CliError::Usage(message)) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("Run `kiln help` for usage.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: &str, args: &CommandArgs) -> Result<i32, CliError> {
    match command {
        "build" => {
            let written = build_file(args)?;
            println!("wrote {}", written.display());
            Ok(0)
        }
        "check" => check_file(args).map(|()| 0),
        "run" => run_file(args),
        "calc" => calc_file(args).map(|_| 0),
        "fmt" => format_file(args).map(|formatted| i32::from(!formatted)),
        other => Err(CliError::Usage(format!("unknown command `{other}`"))),
    }
}

/// Exit statuses outside 0..=255 are truncated the way the platform would.
fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(status.to_le_bytes()[0])
}

fn print_usage() {
    println!("kiln: compile, load and run Kiln units");
    println!();
    println!("Usage: kiln <command> [options]");
    println!();
    println!("Commands:");
    println!("  demo                          Build the calculator as a tree, compile, load and call it");
    println!("  check <file>                  Compile without writing a unit");
    println!("  build <file>                  Compile to <file>.kunit");
    println!("  run <file|unit>               Run an executable unit's Main");
    println!("  calc <file|unit> <Type> <a> <b>");
    println!("                                Instantiate <Type> as a calculator and print Add(a, b)");
    println!("  fmt <file>                    Print the file in normalized form");
    println!("  explain <code>                Explain an error code (e.g., E2001)");
    println!("  help                          Show this help message");
    println!("  version                       Show version information");
    println!();
    println!("Options:");
    println!("  -o, --output <path>           Output path for `build`");
    println!("  --exe                         Build an executable (needs a static Main)");
    println!("  -r, --reference <unit>        Compile and load against a library unit (repeatable)");
    println!("  --warnaserror[=CODES]         Treat all warnings, or the listed codes, as errors");
    println!("  --check                       With `fmt`: exit 1 if the file is not formatted");
    println!("  --json                        Report diagnostics as JSON");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=kiln_eval=debug      Enable logging");
    println!("  KILN_LOG_TREE=1               Log as an indented span tree");
}
