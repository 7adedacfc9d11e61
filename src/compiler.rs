pub mod codegen;
pub mod lexer;
pub mod parser;

use crate::compiler::codegen::CodegenContext;
use crate::compiler::lexer::token_stack::TokenStack;
use crate::Program;
use anyhow::bail;

pub fn compile(source: &str) -> anyhow::Result<Program> {
    let tokens = lexer::lex(source)?;
    let mut tokens = TokenStack::new(tokens);
    let mut context = CodegenContext::new();
    parser::program_parser::parse_program(&mut tokens, &mut context)?;
    context.finish()
}

pub fn find_entry(program: &Program) -> anyhow::Result<usize> {
    let Some(entry) = program.functions.iter().position(|f| f.name == "main") else {
        bail!("No main function found");
    };
    if program.functions[entry].num_params != 0 {
        bail!("main must take 0 parameters");
    }
    Ok(entry)
}
