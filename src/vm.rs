pub mod runtime_error;

use crate::vm::runtime_error::RuntimeError;
use crate::{Op, Program};
use std::io::Write;

struct Frame {
    func_index: usize,
    ip: usize,
    locals: Vec<i32>,
}

pub fn execute(program: &Program, entry: usize, trace: bool) -> Result<i32, RuntimeError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(program, entry, &mut out, trace)
}

pub fn run<W: Write>(
    program: &Program,
    entry: usize,
    out: &mut W,
    trace: bool,
) -> Result<i32, RuntimeError> {
    let mut stack: Vec<i32> = Vec::new();
    let mut call_stack: Vec<Frame> = Vec::new();

    let mut func_index = entry;
    let mut ip = 0;
    let mut locals = vec![
        0;
        program
            .functions
            .get(func_index)
            .ok_or(RuntimeError::InvalidEntry)?
            .num_locals
    ];

    loop {
        let code = &program.functions[func_index].code;
        if ip >= code.len() {
            return Err(RuntimeError::IpOutOfRange);
        }
        let word = code[ip];
        ip += 1;
        let op = Op::from_word(word).ok_or(RuntimeError::UnknownOpcode(word))?;
        if trace {
            eprintln!(
                "{}[{}]: {:?}",
                program.functions[func_index].name,
                ip - 1,
                op
            );
        }
        match op {
            Op::PushInt => {
                let value = fetch(code, &mut ip)?;
                stack.push(value);
            }
            Op::Load => {
                let slot = slot_index(fetch(code, &mut ip)?)?;
                let value = *locals.get(slot).ok_or(RuntimeError::LocalOutOfRange)?;
                stack.push(value);
            }
            Op::Store => {
                let slot = slot_index(fetch(code, &mut ip)?)?;
                let value = pop(&mut stack)?;
                *locals.get_mut(slot).ok_or(RuntimeError::LocalOutOfRange)? = value;
            }
            Op::Add => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push(a.wrapping_add(b));
            }
            Op::Sub => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push(a.wrapping_sub(b));
            }
            Op::Mul => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push(a.wrapping_mul(b));
            }
            Op::Div => {
                let (a, b) = pop_pair(&mut stack)?;
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                stack.push(a.wrapping_div(b));
            }
            Op::Eq => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a == b) as i32);
            }
            Op::Ne => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a != b) as i32);
            }
            Op::Lt => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a < b) as i32);
            }
            Op::Le => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a <= b) as i32);
            }
            Op::Gt => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a > b) as i32);
            }
            Op::Ge => {
                let (a, b) = pop_pair(&mut stack)?;
                stack.push((a >= b) as i32);
            }
            Op::Jmp => {
                let target = fetch(code, &mut ip)?;
                ip = jump_target(target)?;
            }
            Op::JmpIfFalse => {
                let target = fetch(code, &mut ip)?;
                let cond = pop(&mut stack)?;
                if cond == 0 {
                    ip = jump_target(target)?;
                }
            }
            Op::Call => {
                let callee = fetch(code, &mut ip)?;
                let arg_count = fetch(code, &mut ip)?;
                let callee = usize::try_from(callee).map_err(|_| RuntimeError::CallOutOfRange)?;
                let function = program
                    .functions
                    .get(callee)
                    .ok_or(RuntimeError::CallOutOfRange)?;
                if arg_count < 0 || arg_count as usize != function.num_params {
                    return Err(RuntimeError::ArityMismatch);
                }
                // Args are popped right to left so the first argument lands
                // in slot 0.
                let mut new_locals = vec![0; function.num_locals];
                for slot in (0..function.num_params).rev() {
                    new_locals[slot] = pop(&mut stack)?;
                }
                call_stack.push(Frame {
                    func_index,
                    ip,
                    locals: std::mem::replace(&mut locals, new_locals),
                });
                func_index = callee;
                ip = 0;
            }
            Op::Ret => {
                let value = pop(&mut stack)?;
                match call_stack.pop() {
                    None => return Ok(value),
                    Some(frame) => {
                        func_index = frame.func_index;
                        ip = frame.ip;
                        locals = frame.locals;
                        stack.push(value);
                    }
                }
            }
            Op::Print => {
                let value = pop(&mut stack)?;
                writeln!(out, "{}", value)?;
            }
            Op::PrintStr => {
                let index = slot_index(fetch(code, &mut ip)?)
                    .map_err(|_| RuntimeError::StringOutOfRange)?;
                let string = program
                    .strings
                    .get(index)
                    .ok_or(RuntimeError::StringOutOfRange)?;
                writeln!(out, "{}", string)?;
            }
            Op::Pop => {
                pop(&mut stack)?;
            }
        }
    }
}

fn fetch(code: &[i32], ip: &mut usize) -> Result<i32, RuntimeError> {
    let word = code.get(*ip).copied().ok_or(RuntimeError::IpOutOfRange)?;
    *ip += 1;
    Ok(word)
}

fn pop(stack: &mut Vec<i32>) -> Result<i32, RuntimeError> {
    stack.pop().ok_or(RuntimeError::StackUnderflow)
}

fn pop_pair(stack: &mut Vec<i32>) -> Result<(i32, i32), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    Ok((a, b))
}

fn slot_index(word: i32) -> Result<usize, RuntimeError> {
    usize::try_from(word).map_err(|_| RuntimeError::LocalOutOfRange)
}

fn jump_target(word: i32) -> Result<usize, RuntimeError> {
    usize::try_from(word).map_err(|_| RuntimeError::JumpOutOfRange)
}
