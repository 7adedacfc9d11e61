use crate::compiler::codegen::CodegenContext;
use crate::compiler::lexer::lexer_error::LocationError;
use crate::compiler::lexer::token::{StaticToken, Token};
use crate::compiler::lexer::token_stack::TokenStack;
use crate::compiler::parser::parser_error::ParseResult;
use crate::compiler::parser::program_parser::{parse_identifier, pop_expected};
use crate::Op;

pub fn parse_expression(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    parse_equality(tokens, context)
}

fn parse_equality(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    parse_relational(tokens, context)?;
    loop {
        let op = match &tokens.peek().value {
            Token::Static(StaticToken::Equals) => Op::Eq,
            Token::Static(StaticToken::NotEquals) => Op::Ne,
            _ => return Ok(()),
        };
        tokens.pop();
        parse_relational(tokens, context)?;
        context.emit(op);
    }
}

fn parse_relational(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    parse_additive(tokens, context)?;
    loop {
        let op = match &tokens.peek().value {
            Token::Static(StaticToken::LessThan) => Op::Lt,
            Token::Static(StaticToken::LessThanOrEqual) => Op::Le,
            Token::Static(StaticToken::GreaterThan) => Op::Gt,
            Token::Static(StaticToken::GreaterThanOrEqual) => Op::Ge,
            _ => return Ok(()),
        };
        tokens.pop();
        parse_additive(tokens, context)?;
        context.emit(op);
    }
}

fn parse_additive(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    parse_term(tokens, context)?;
    loop {
        let op = match &tokens.peek().value {
            Token::Static(StaticToken::Plus) => Op::Add,
            Token::Static(StaticToken::Minus) => Op::Sub,
            _ => return Ok(()),
        };
        tokens.pop();
        parse_term(tokens, context)?;
        context.emit(op);
    }
}

fn parse_term(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    parse_unary(tokens, context)?;
    loop {
        let op = match &tokens.peek().value {
            Token::Static(StaticToken::Asterisk) => Op::Mul,
            Token::Static(StaticToken::Slash) => Op::Div,
            _ => return Ok(()),
        };
        tokens.pop();
        parse_unary(tokens, context)?;
        context.emit(op);
    }
}

fn parse_unary(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    if tokens.peek().value == Token::Static(StaticToken::Minus) {
        tokens.pop();
        parse_unary(tokens, context)?;
        // There is no dedicated negate opcode.
        context.emit_with_operand(Op::PushInt, -1);
        context.emit(Op::Mul);
        return Ok(());
    }
    parse_primary(tokens, context)
}

fn parse_primary(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    let token = tokens.peek().clone();
    match token.value {
        Token::Number(value) => {
            tokens.pop();
            context.emit_with_operand(Op::PushInt, value);
            Ok(())
        }
        Token::String(_) => Err(LocationError::new(
            "String literals are only allowed in print(...)".to_string(),
            token.location,
        ))?,
        Token::Identifier(name) => {
            if tokens.peek_next().value == Token::Static(StaticToken::OpenParen) {
                return parse_call(tokens, context);
            }
            tokens.pop();
            let slot = context.local_index(&name, &token.location)?;
            context.emit_with_operand(Op::Load, slot as i32);
            Ok(())
        }
        Token::Static(StaticToken::OpenParen) => {
            tokens.pop();
            parse_expression(tokens, context)?;
            pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;
            Ok(())
        }
        _ => Err(LocationError::new(
            format!("Expected expression, found '{}'", token.value),
            token.location,
        ))?,
    }
}

// `print` is a special form, not a user function: a string argument has no
// runtime value, so it cannot go through the normal call path. Both forms
// leave a sentinel 0 on the stack in place of a return value.
fn parse_call(tokens: &mut TokenStack, context: &mut CodegenContext) -> ParseResult<()> {
    let name = parse_identifier(tokens)?;
    pop_expected(tokens, Token::Static(StaticToken::OpenParen))?;

    if name.value == "print" {
        if let Token::String(value) = &tokens.peek().value {
            let index = context.add_string(value);
            tokens.pop();
            pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;
            context.emit_with_operand(Op::PrintStr, index as i32);
            context.emit_with_operand(Op::PushInt, 0);
            return Ok(());
        }
        if tokens.peek().value == Token::Static(StaticToken::CloseParen) {
            Err(LocationError::new(
                "print expects 1 argument".to_string(),
                tokens.location().clone(),
            ))?;
        }
        parse_expression(tokens, context)?;
        pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;
        context.emit(Op::Print);
        context.emit_with_operand(Op::PushInt, 0);
        return Ok(());
    }

    let mut arg_count = 0;
    if tokens.peek().value != Token::Static(StaticToken::CloseParen) {
        loop {
            parse_expression(tokens, context)?;
            arg_count += 1;
            if tokens.peek().value == Token::Static(StaticToken::Comma) {
                tokens.pop();
                continue;
            }
            break;
        }
    }
    pop_expected(tokens, Token::Static(StaticToken::CloseParen))?;
    context.record_call(name.value, arg_count, name.location);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::compiler::compile;
    use crate::{Op, Program};

    fn main_code(source: &str) -> Vec<i32> {
        let program: Program = compile(source).unwrap();
        program
            .functions
            .iter()
            .find(|f| f.name == "main")
            .unwrap()
            .code
            .clone()
    }

    fn compile_error(source: &str) -> String {
        format!("{:#}", compile(source).unwrap_err())
    }

    #[test]
    fn precedence_nests_multiplication_under_addition() {
        assert_eq!(
            main_code("int main() { return 2 + 3 * 4; }"),
            vec![
                Op::PushInt.code_word(),
                2,
                Op::PushInt.code_word(),
                3,
                Op::PushInt.code_word(),
                4,
                Op::Mul.code_word(),
                Op::Add.code_word(),
                Op::Ret.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(
            main_code("int main() { return 10 - 4 - 3; }"),
            vec![
                Op::PushInt.code_word(),
                10,
                Op::PushInt.code_word(),
                4,
                Op::Sub.code_word(),
                Op::PushInt.code_word(),
                3,
                Op::Sub.code_word(),
                Op::Ret.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn unary_minus_multiplies_by_negative_one() {
        assert_eq!(
            main_code("int main() { return -5; }"),
            vec![
                Op::PushInt.code_word(),
                5,
                Op::PushInt.code_word(),
                -1,
                Op::Mul.code_word(),
                Op::Ret.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            main_code("int main() { return (2 + 3) * 4; }"),
            vec![
                Op::PushInt.code_word(),
                2,
                Op::PushInt.code_word(),
                3,
                Op::Add.code_word(),
                Op::PushInt.code_word(),
                4,
                Op::Mul.code_word(),
                Op::Ret.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn comparisons_emit_boolean_opcodes() {
        assert_eq!(
            main_code("int main() { return 1 < 2 == 1; }"),
            vec![
                Op::PushInt.code_word(),
                1,
                Op::PushInt.code_word(),
                2,
                Op::Lt.code_word(),
                Op::PushInt.code_word(),
                1,
                Op::Eq.code_word(),
                Op::Ret.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn print_string_emits_print_str_and_sentinel() {
        assert_eq!(
            main_code(r#"int main() { print("hi"); }"#),
            vec![
                Op::PrintStr.code_word(),
                0,
                Op::PushInt.code_word(),
                0,
                Op::Pop.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn print_expression_emits_print_and_sentinel() {
        assert_eq!(
            main_code("int main() { print(1 + 2); }"),
            vec![
                Op::PushInt.code_word(),
                1,
                Op::PushInt.code_word(),
                2,
                Op::Add.code_word(),
                Op::Print.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Pop.code_word(),
                Op::PushInt.code_word(),
                0,
                Op::Ret.code_word(),
            ]
        );
    }

    #[test]
    fn identical_string_literals_share_a_pool_slot() {
        let program =
            compile(r#"int main() { print("hi"); print("there"); print("hi"); }"#).unwrap();
        assert_eq!(program.strings, vec!["hi", "there"]);
        let code = &program.functions[0].code;
        // First and third print refer to the same pool slot.
        assert_eq!(code[0], Op::PrintStr.code_word());
        assert_eq!(code[1], 0);
        assert_eq!(code[5], Op::PrintStr.code_word());
        assert_eq!(code[6], 1);
        assert_eq!(code[10], Op::PrintStr.code_word());
        assert_eq!(code[11], 0);
    }

    #[test]
    fn print_with_no_argument_is_an_error() {
        let err = compile_error("int main() { print(); }");
        assert!(err.contains("print expects 1 argument"), "{}", err);
    }

    #[test]
    fn string_outside_print_is_an_error() {
        let err = compile_error(r#"int main() { int x = "hi"; }"#);
        assert!(
            err.contains("String literals are only allowed in print(...)"),
            "{}",
            err
        );
    }

    #[test]
    fn string_as_call_argument_is_an_error() {
        let err = compile_error(r#"int f(int n) { return n; } int main() { f("hi"); }"#);
        assert!(
            err.contains("String literals are only allowed in print(...)"),
            "{}",
            err
        );
    }

    #[test]
    fn forward_calls_are_resolved() {
        let program = compile(
            "int main() { return double(21); } int double(int n) { return n * 2; }",
        )
        .unwrap();
        let code = &program.functions[0].code;
        let call_pos = code
            .iter()
            .position(|&w| w == Op::Call.code_word())
            .unwrap();
        assert_eq!(code[call_pos + 1], 1);
        assert_eq!(code[call_pos + 2], 1);
    }
}
