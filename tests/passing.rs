use common::run_passing_test;
use test_generator::test_resources;

mod common;

#[test_resources("tests/data/*.asm")]
fn test_passing(path: &str) {
    run_passing_test(path).unwrap();
}
