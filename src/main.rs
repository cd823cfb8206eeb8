use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use regasm::error::Result;
use regasm::interpreter::{Interpreter, Value, DEFAULT_STEP_LIMIT};
use regasm::parser::parse_program;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    file: String,

    /// Maximum number of instructions to execute before giving up
    #[arg(long, default_value_t = DEFAULT_STEP_LIMIT)]
    max_steps: usize,

    /// Run without a step limit
    #[arg(long, conflicts_with = "max_steps")]
    no_step_limit: bool,

    /// Print the final register values
    #[arg(short, long)]
    registers: bool,

    /// Print every emitted message instead of only the last one
    #[arg(short, long)]
    all_messages: bool,

    /// Increase log verbosity, can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn unwrap_or_error<T>(result: Result<T>, file: &str, source: &str) -> T {
    match result {
        Ok(x) => x,
        Err(e) => {
            if e.print(file, source).is_err() {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let source = unwrap_or_error(
        std::fs::read_to_string(&args.file).map_err(Into::into),
        &args.file,
        "",
    );

    let program = unwrap_or_error(parse_program(&source), &args.file, &source);
    info!("Running '{}' ({} lines)", args.file, program.len());

    let step_limit = if args.no_step_limit {
        None
    } else {
        Some(args.max_steps)
    };
    let outcome = unwrap_or_error(
        Interpreter::new(&program).with_step_limit(step_limit).run(),
        &args.file,
        &source,
    );
    info!("Executed {} instructions", outcome.steps);

    if args.all_messages {
        for message in &outcome.output {
            println!("{}", message);
        }
    } else {
        println!("{}", outcome.value);
    }

    if args.registers {
        for (name, value) in outcome.registers.iter() {
            println!("{} = {}", name, value);
        }
    }

    if outcome.value == Value::OutOfBounds {
        std::process::exit(2);
    }
}
