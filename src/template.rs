use crate::error::{Error, ErrorType, Result};
use crate::registers::Registers;
use logos::Logos;

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq)]
enum TemplateToken {
    #[regex("[ \t,]+")]
    Separator,
    // An unterminated quote runs to the end of the template.
    #[regex("'[^']*'?")]
    Quoted,
    #[regex("[^' \t,]+")]
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart<'a> {
    Text(&'a str),
    Register(&'a str),
}

/// Splits a message template into quoted text segments and register
/// references, in the order they appear.
pub fn split_template(template: &str) -> Result<Vec<TemplatePart>> {
    let mut lex = TemplateToken::lexer(template);

    let mut parts = vec![];
    while let Some(token) = lex.next() {
        match token {
            Err(_) => {
                return Err(Error::new(
                    ErrorType::Parse,
                    format!("Invalid message template near '{}'", lex.slice()),
                ))
            }
            Ok(TemplateToken::Separator) => continue,
            Ok(TemplateToken::Quoted) => {
                let text = &lex.slice()[1..];
                parts.push(TemplatePart::Text(text.strip_suffix('\'').unwrap_or(text)));
            }
            Ok(TemplateToken::Register) => parts.push(TemplatePart::Register(lex.slice())),
        }
    }

    Ok(parts)
}

/// Renders a message template, substituting each register reference with its
/// current value.
pub fn interpolate(template: &str, registers: &Registers) -> Result<String> {
    split_template(template)?
        .into_iter()
        .map(|part| match part {
            TemplatePart::Text(text) => Ok(text.to_string()),
            TemplatePart::Register(name) => registers.find(name).map(|value| value.to_string()),
        })
        .collect()
}
