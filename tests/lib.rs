use regasm::{
    error::{ErrorType, Result},
    instruction::{Instruction, JumpKind, Operand, Program, RegisterOp},
    interpret,
    interpreter::{self, Value},
    parser::parse_program,
};

#[test]
fn interpret_message_program() -> Result<()> {
    let value = interpret("mov a, 5\nmov b, a\nmsg '(5+1)/2 = ', a\nend")?;
    assert_eq!(value, Value::Text("(5+1)/2 = 5".to_string()));
    Ok(())
}

#[test]
fn interpret_factorial_returns_120() -> Result<()> {
    let program = parse_program(
        "mov a, 1\nmov n, 5\ncall fact\nend\nfact:\nmul a, n\ndec n\ncmp n, 0\njne fact\nret",
    )?;

    let outcome = interpreter::run(&program)?;
    assert_eq!(outcome.registers.get("a"), Some(120));
    assert_eq!(outcome.registers.get("n"), Some(0));
    Ok(())
}

#[test]
fn run_hand_built_program() -> Result<()> {
    let register = |name: &str| Operand::Register(name.to_string());
    let program = Program::new(
        vec![
            Instruction::RegisterOp {
                op: RegisterOp::Mov(Operand::Literal(3)),
                target: "i".to_string(),
            },
            Instruction::RegisterOp {
                op: RegisterOp::Mov(Operand::Literal(0)),
                target: "sum".to_string(),
            },
            Instruction::Label {
                name: "again".to_string(),
            },
            Instruction::RegisterOp {
                op: RegisterOp::Add(register("i")),
                target: "sum".to_string(),
            },
            Instruction::RegisterOp {
                op: RegisterOp::Dec,
                target: "i".to_string(),
            },
            Instruction::Compare {
                left: register("i"),
                right: Operand::Literal(0),
            },
            Instruction::Jump {
                kind: JumpKind::Jg,
                target: "again".to_string(),
            },
            Instruction::Message {
                template: "'sum=', sum".to_string(),
            },
            Instruction::End,
        ],
        vec![],
    )?;

    let outcome = interpreter::run(&program)?;
    assert_eq!(outcome.value, Value::Text("sum=6".to_string()));
    Ok(())
}

#[test]
fn errors_are_distinct() {
    let cases = [
        ("foo a\nend", ErrorType::Parse),
        ("jmp nowhere\nend", ErrorType::UnknownLabel),
        ("mov a, b\nend", ErrorType::UninitializedRegister),
        ("ret\nend", ErrorType::EmptyCallStack),
        ("mov a, 1\ndiv a, 0\nend", ErrorType::DivisionByZero),
    ];

    for (source, error_type) in cases {
        let error = interpret(source).unwrap_err();
        assert_eq!(error.error_type, error_type, "{:?}", source);
        assert!(error.range.is_some());
    }
}

#[test]
fn programs_are_reusable() -> Result<()> {
    let program = parse_program("mov a, 2\nmul a, a\nmsg a\nend")?;

    let first = interpreter::run(&program)?;
    let second = interpreter::run(&program)?;
    assert_eq!(first, second);
    assert_eq!(first.value.to_string(), "4");
    Ok(())
}
