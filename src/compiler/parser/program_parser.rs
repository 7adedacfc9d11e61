use crate::compiler::codegen::CodegenContext;
use crate::compiler::lexer::lexer_error::LocationError;
use crate::compiler::lexer::location::Src;
use crate::compiler::lexer::token::{Keyword, StaticToken, Token};
use crate::compiler::lexer::token_stack::TokenStack;
use crate::compiler::lexer::SrcToken;
use crate::compiler::parser::expression_parser::parse_expression;
use crate::compiler::parser::parser_error::ParseResult;
use crate::Op;
use anyhow::Context;

pub fn pop_expected(tokens: &mut TokenStack, expected: Token) -> ParseResult<SrcToken> {
    let token = tokens.pop();
    if token.value != expected {
        Err(LocationError::new(
            format!("Expected '{}', found '{}'", expected, token.value),
            token.location,
        ))?
    } else {
        Ok(token)
    }
}

pub fn parse_identifier(tokens: &mut TokenStack) -> ParseResult<Src<String>> {
    let token = tokens.pop();
    if let Token::Identifier(name) = token.value {
        Ok(Src::new(name, token.location))
    } else {
        Err(LocationError::new(
            format!("Expected identifier, found '{}'", token.value),
            token.location,
        ))?
    }
}

pub fn parse_program(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    while tokens.peek().value != Token::Eof {
        let location = tokens.location().clone();
        parse_function(tokens, context)
            .with_context(|| format!("Failed to parse function at {}.", location))?;
    }
    Ok(())
}

fn parse_function(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    pop_expected(tokens, Token::Keyword(Keyword::Int))?;
    let name = parse_identifier(tokens)?;
    pop_expected(tokens, Token::Static(StaticToken::OpenParen))?;

    let mut params = Vec::new();
    if tokens.peek().value != Token::Static(StaticToken::CloseParen) {
        loop {
            pop_expected(tokens, Token::Keyword(Keyword::Int))?;
            params.push(parse_identifier(tokens)?.value);
            if tokens.peek().value == Token::Static(StaticToken::Comma) {
                tokens.pop();
                continue;
            }
            break;
        }
    }
    pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;

    context.begin_function(name.value, params, &name.location)?;
    parse_block(tokens, context)?;
    context.end_function();
    Ok(())
}

fn parse_block(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    pop_expected(tokens, Token::Static(StaticToken::OpenBrace))?;
    while tokens.peek().value != Token::Static(StaticToken::CloseBrace) {
        if tokens.peek().value == Token::Eof {
            Err(LocationError::new(
                "Expected '}', found end of input".to_string(),
                tokens.location().clone(),
            ))?;
        }
        parse_statement(tokens, context)?;
    }
    pop_expected(tokens, Token::Static(StaticToken::CloseBrace))?;
    Ok(())
}

pub fn parse_statement(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    match tokens.peek().value.clone() {
        Token::Keyword(Keyword::Int) => parse_declaration(tokens, context),
        Token::Keyword(Keyword::Return) => {
            tokens.pop();
            parse_expression(tokens, context)?;
            pop_expected(tokens, Token::Static(StaticToken::Semicolon))?;
            context.emit(Op::Ret);
            Ok(())
        }
        Token::Keyword(Keyword::If) => parse_if(tokens, context),
        Token::Keyword(Keyword::While) => parse_while(tokens, context),
        Token::Static(StaticToken::OpenBrace) => parse_block(tokens, context),
        Token::Identifier(_)
            if tokens.peek_next().value == Token::Static(StaticToken::Assign) =>
        {
            parse_assignment(tokens, context)
        }
        _ => {
            parse_expression(tokens, context)?;
            pop_expected(tokens, Token::Static(StaticToken::Semicolon))?;
            context.emit(Op::Pop);
            Ok(())
        }
    }
}

fn parse_declaration(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    pop_expected(tokens, Token::Keyword(Keyword::Int))?;
    let name = parse_identifier(tokens)?;
    let slot = context.add_local(&name.value, &name.location)?;
    if tokens.peek().value == Token::Static(StaticToken::Assign) {
        tokens.pop();
        parse_expression(tokens, context)?;
        context.emit_with_operand(Op::Store, slot as i32);
    }
    pop_expected(tokens, Token::Static(StaticToken::Semicolon))?;
    Ok(())
}

fn parse_assignment(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    let name = parse_identifier(tokens)?;
    pop_expected(tokens, Token::Static(StaticToken::Assign))?;
    parse_expression(tokens, context)?;
    pop_expected(tokens, Token::Static(StaticToken::Semicolon))?;
    let slot = context.local_index(&name.value, &name.location)?;
    context.emit_with_operand(Op::Store, slot as i32);
    Ok(())
}

fn parse_if(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    pop_expected(tokens, Token::Keyword(Keyword::If))?;
    pop_expected(tokens, Token::Static(StaticToken::OpenParen))?;
    parse_expression(tokens, context)?;
    pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;

    let jmp_false_pos = context.emit_with_operand(Op::JmpIfFalse, 0);
    parse_statement(tokens, context)?;

    if tokens.peek().value == Token::Keyword(Keyword::Else) {
        tokens.pop();
        let jmp_end_pos = context.emit_with_operand(Op::Jmp, 0);
        context.patch(jmp_false_pos, context.code_len() as i32);
        parse_statement(tokens, context)?;
        context.patch(jmp_end_pos, context.code_len() as i32);
    } else {
        context.patch(jmp_false_pos, context.code_len() as i32);
    }
    Ok(())
}

fn parse_while(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    pop_expected(tokens, Token::Keyword(Keyword::While))?;
    let loop_start = context.code_len();
    pop_expected(tokens, Token::Static(StaticToken::OpenParen))?;
    parse_expression(tokens, context)?;
    pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;

    let jmp_false_pos = context.emit_with_operand(Op::JmpIfFalse, 0);
    parse_statement(tokens, context)?;
    context.emit_with_operand(Op::Jmp, loop_start as i32);
    context.patch(jmp_false_pos, context.code_len() as i32);
    Ok(())
}
