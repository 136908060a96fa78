use std::{
    fs::{self, read_to_string},
    io::{self, Read},
    path::PathBuf,
    process,
    time::Instant,
};

use clap::Parser;
use log::LevelFilter;
use minipascal::{compile_source, display_error};
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(
    name = "minipascal",
    version,
    about = "Compiles a Pascal-like program to stack VM assembly"
)]
struct Cli {
    /// Source file path. Reads standard input when omitted
    input: Option<PathBuf>,

    /// Where the VM assembly is written
    #[arg(short, long, default_value = "build/output.vm")]
    output: PathBuf,

    /// Print the syntax tree after type checking
    #[arg(long)]
    dump_ast: bool,

    /// Log each pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("error: failed to initialise logger: {err}");
    }

    let (file_name, content) = match read_input(cli.input.as_ref()) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    let start = Instant::now();

    let compilation = match compile_source(&content) {
        Ok(compilation) => compilation,
        Err(err) => {
            display_error(&err, &file_name, &content);
            process::exit(1);
        }
    };

    log::debug!("front end finished in {:?}", start.elapsed());

    if cli.dump_ast {
        println!("{:#?}", compilation.ast);
    }

    let report = compilation.diagnostics.report();
    if !report.is_empty() {
        eprint!("{report}");
    }

    let Some(code) = compilation.code else {
        process::exit(1);
    };

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("error [{}]: {err}", parent.display());
                process::exit(1);
            }
        }
    }

    if let Err(err) = fs::write(&cli.output, code) {
        eprintln!("error [{}]: {err}", cli.output.display());
        process::exit(1);
    }

    log::info!(
        "compiled {} -> {} in {:?}",
        file_name,
        cli.output.display(),
        start.elapsed()
    );
}

fn read_input(path: Option<&PathBuf>) -> io::Result<(String, String)> {
    match path {
        Some(path) => {
            let content = read_to_string(path)?;
            Ok((path.display().to_string(), content))
        }
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok((String::from("<stdin>"), content))
        }
    }
}
