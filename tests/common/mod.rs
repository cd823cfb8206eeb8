use regasm::{
    error::Result,
    interpreter::{Interpreter, Outcome},
    parser::parse_program,
};
use std::path::PathBuf;

pub const TEST_STEP_LIMIT: usize = 100_000;

#[allow(dead_code)]
pub fn run_passing_test(file: &str) -> Result<()> {
    let source = std::fs::read_to_string(file).unwrap();
    let expected = std::fs::read_to_string(PathBuf::from(file).with_extension("txt")).unwrap();

    let outcome = run_test(file, &source)?;
    assert_eq!(outcome.value.to_string().trim(), expected.trim());

    Ok(())
}

#[allow(dead_code)]
pub fn run_failing_test(file: &str) {
    let source = std::fs::read_to_string(file).unwrap();

    let expected = source
        .lines()
        .find(|x| x.starts_with("; Expected: "))
        .map(|x| x.replace("; Expected: ", ""));

    let result = run_test(file, &source);
    assert!(result.is_err(), "'{}' should fail", file);

    if let Some(expected) = expected {
        assert_eq!(result.unwrap_err().message.trim(), expected.trim());
    }
}

fn run_test(file: &str, source: &str) -> Result<Outcome> {
    println!("RUNNING '{}'...", file);

    let program = parse_program(source)?;

    Interpreter::new(&program)
        .with_step_limit(Some(TEST_STEP_LIMIT))
        .run()
}
