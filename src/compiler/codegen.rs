use crate::compiler::lexer::lexer_error::LocationError;
use crate::compiler::lexer::location::Location;
use crate::compiler::parser::parser_error::ParseResult;
use crate::{Function, Op, Program};
use std::collections::HashMap;

pub struct PendingCall {
    pub func_index: usize,
    pub code_pos: usize,
    pub callee: String,
    pub arg_count: usize,
    pub location: Location,
}

pub struct CodegenContext {
    functions: Vec<Function>,
    function_indices: HashMap<String, usize>,
    strings: Vec<String>,
    string_indices: HashMap<String, usize>,
    locals: HashMap<String, usize>,
    pending_calls: Vec<PendingCall>,
    current_func: usize,
}

impl CodegenContext {
    pub fn new() -> Self {
        CodegenContext {
            functions: Vec::new(),
            function_indices: HashMap::new(),
            strings: Vec::new(),
            string_indices: HashMap::new(),
            locals: HashMap::new(),
            pending_calls: Vec::new(),
            current_func: 0,
        }
    }

    pub fn begin_function(
        &mut self,
        name: String,
        params: Vec<String>,
        location: &Location,
    ) -> ParseResult<()> {
        if self.function_indices.contains_key(&name) {
            Err(LocationError::new(
                format!("Function already defined: {}", name),
                location.clone(),
            ))?;
        }
        let index = self.functions.len();
        self.function_indices.insert(name.clone(), index);
        self.current_func = index;
        self.locals.clear();
        for (slot, param) in params.iter().enumerate() {
            if self.locals.insert(param.clone(), slot).is_some() {
                Err(LocationError::new(
                    format!("Parameter already defined: {}", param),
                    location.clone(),
                ))?;
            }
        }
        self.functions.push(Function {
            name,
            num_params: params.len(),
            num_locals: params.len(),
            code: Vec::new(),
        });
        Ok(())
    }

    // Every function body ends with an executable return so control can
    // never fall off the end of the code.
    pub fn end_function(&mut self) {
        self.emit_with_operand(Op::PushInt, 0);
        self.emit(Op::Ret);
        self.locals.clear();
    }

    pub fn add_local(&mut self, name: &str, location: &Location) -> ParseResult<usize> {
        if self.locals.contains_key(name) {
            Err(LocationError::new(
                format!("Variable already defined: {}", name),
                location.clone(),
            ))?;
        }
        let function = &mut self.functions[self.current_func];
        let slot = function.num_locals;
        function.num_locals += 1;
        self.locals.insert(name.to_string(), slot);
        Ok(slot)
    }

    pub fn local_index(&self, name: &str, location: &Location) -> ParseResult<usize> {
        match self.locals.get(name) {
            Some(slot) => Ok(*slot),
            None => Err(LocationError::new(
                format!("Unknown variable: {}", name),
                location.clone(),
            ))?,
        }
    }

    pub fn add_string(&mut self, value: &str) -> usize {
        if let Some(index) = self.string_indices.get(value) {
            return *index;
        }
        let index = self.strings.len();
        self.strings.push(value.to_string());
        self.string_indices.insert(value.to_string(), index);
        index
    }

    pub fn emit(&mut self, op: Op) -> usize {
        let code = &mut self.functions[self.current_func].code;
        code.push(op.code_word());
        code.len() - 1
    }

    // Returns the index of the operand word so jump placeholders can be
    // patched once the target is known.
    pub fn emit_with_operand(&mut self, op: Op, operand: i32) -> usize {
        let code = &mut self.functions[self.current_func].code;
        code.push(op.code_word());
        code.push(operand);
        code.len() - 1
    }

    pub fn emit_word(&mut self, word: i32) {
        self.functions[self.current_func].code.push(word);
    }

    pub fn patch(&mut self, pos: usize, value: i32) {
        self.functions[self.current_func].code[pos] = value;
    }

    pub fn code_len(&self) -> usize {
        self.functions[self.current_func].code.len()
    }

    pub fn record_call(&mut self, callee: String, arg_count: usize, location: Location) {
        let code_pos = self.emit_with_operand(Op::Call, 0);
        self.emit_word(arg_count as i32);
        self.pending_calls.push(PendingCall {
            func_index: self.current_func,
            code_pos,
            callee,
            arg_count,
            location,
        });
    }

    fn resolve_calls(&mut self) -> ParseResult<()> {
        for call in &self.pending_calls {
            let callee_index = match self.function_indices.get(&call.callee) {
                Some(index) => *index,
                None => Err(LocationError::new(
                    format!("Unknown function: {}", call.callee),
                    call.location.clone(),
                ))?,
            };
            let num_params = self.functions[callee_index].num_params;
            if num_params != call.arg_count {
                Err(LocationError::new(
                    format!(
                        "Function {} expects {} args, got {}",
                        call.callee, num_params, call.arg_count
                    ),
                    call.location.clone(),
                ))?;
            }
            self.functions[call.func_index].code[call.code_pos] = callee_index as i32;
        }
        Ok(())
    }

    pub fn finish(mut self) -> ParseResult<Program> {
        self.resolve_calls()?;
        Ok(Program {
            functions: self.functions,
            strings: self.strings,
        })
    }
}
