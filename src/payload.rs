use crate::{Function, Program};
use thiserror::Error;

pub const VERSION: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Unexpected end of payload")]
    UnexpectedEnd,
    #[error("Unsupported payload version {0}")]
    UnsupportedVersion(u32),
    #[error("Invalid entry function")]
    InvalidEntry,
    #[error("Invalid string data in payload")]
    InvalidString,
}

pub fn encode(program: &Program, entry: usize) -> Vec<u8> {
    let mut out = Vec::new();
    append_u32(&mut out, VERSION);
    append_u32(&mut out, entry as u32);

    append_u32(&mut out, program.strings.len() as u32);
    for string in &program.strings {
        append_bytes(&mut out, string.as_bytes());
    }

    append_u32(&mut out, program.functions.len() as u32);
    for function in &program.functions {
        append_bytes(&mut out, function.name.as_bytes());
        append_u32(&mut out, function.num_params as u32);
        append_u32(&mut out, function.num_locals as u32);
        append_u32(&mut out, function.code.len() as u32);
        for &word in &function.code {
            // Code words are signed; the wire carries their two's-complement
            // bit pattern.
            append_u32(&mut out, word as u32);
        }
    }
    out
}

pub fn decode(data: &[u8]) -> Result<(Program, usize), PayloadError> {
    let mut reader = Reader { data, pos: 0 };

    let version = reader.read_u32()?;
    if version != VERSION {
        return Err(PayloadError::UnsupportedVersion(version));
    }
    let entry = reader.read_u32()? as usize;

    let num_strings = reader.read_u32()?;
    let mut strings = Vec::new();
    for _ in 0..num_strings {
        strings.push(reader.read_string()?);
    }

    let num_functions = reader.read_u32()?;
    let mut functions = Vec::new();
    for _ in 0..num_functions {
        let name = reader.read_string()?;
        let num_params = reader.read_u32()? as usize;
        let num_locals = reader.read_u32()? as usize;
        let code_len = reader.read_u32()? as usize;
        let code_bytes = reader.take(
            code_len
                .checked_mul(4)
                .ok_or(PayloadError::UnexpectedEnd)?,
        )?;
        let code = code_bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()) as i32)
            .collect();
        functions.push(Function {
            name,
            num_params,
            num_locals,
            code,
        });
    }

    if entry >= functions.len() {
        return Err(PayloadError::InvalidEntry);
    }
    Ok((Program { functions, strings }, entry))
}

fn append_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn append_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    append_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], PayloadError> {
        if len > self.data.len() - self.pos {
            return Err(PayloadError::UnexpectedEnd);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32, PayloadError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn read_string(&mut self) -> Result<String, PayloadError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| PayloadError::InvalidString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, find_entry};

    fn sample_program() -> (Program, usize) {
        let program = compile(
            r#"
            int helper(int n) { return n * -2; }
            int main() { print("hello"); print("world"); print(helper(21)); return 0; }
            "#,
        )
        .unwrap();
        let entry = find_entry(&program).unwrap();
        (program, entry)
    }

    #[test]
    fn round_trip_preserves_the_program() {
        let (program, entry) = sample_program();
        let bytes = encode(&program, entry);
        let (decoded, decoded_entry) = decode(&bytes).unwrap();
        assert_eq!(decoded, program);
        assert_eq!(decoded_entry, entry);
    }

    #[test]
    fn negative_code_words_survive_the_bit_cast() {
        let (program, entry) = sample_program();
        // Unary minus compiles to a PushInt -1 immediate.
        assert!(program.functions[0].code.contains(&-1));
        let bytes = encode(&program, entry);
        let (decoded, _) = decode(&bytes).unwrap();
        assert!(decoded.functions[0].code.contains(&-1));
    }

    #[test]
    fn header_layout_is_little_endian() {
        let (program, entry) = sample_program();
        let bytes = encode(&program, entry);
        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(entry as u32).to_le_bytes());
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
    }

    #[test]
    fn truncation_anywhere_is_an_error() {
        let (program, entry) = sample_program();
        let bytes = encode(&program, entry);
        for len in 0..bytes.len() {
            assert_eq!(
                decode(&bytes[..len]).unwrap_err(),
                PayloadError::UnexpectedEnd,
                "truncated at {}",
                len
            );
        }
    }

    #[test]
    fn wrong_version_is_rejected() {
        let (program, entry) = sample_program();
        let mut bytes = encode(&program, entry);
        bytes[0] = 2;
        assert_eq!(
            decode(&bytes).unwrap_err(),
            PayloadError::UnsupportedVersion(2)
        );
    }

    #[test]
    fn entry_out_of_range_is_rejected() {
        let (program, _) = sample_program();
        let bytes = encode(&program, program.functions.len());
        assert_eq!(decode(&bytes).unwrap_err(), PayloadError::InvalidEntry);
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let (program, entry) = sample_program();
        let mut bytes = encode(&program, entry);
        // Claim a huge string count; the first string read must fail before
        // any oversized allocation happens.
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(decode(&bytes).unwrap_err(), PayloadError::UnexpectedEnd);
    }

    #[test]
    fn oversized_code_length_is_rejected() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                num_params: 0,
                num_locals: 0,
                code: vec![0, 0, 16],
            }],
            strings: Vec::new(),
        };
        let mut bytes = encode(&program, 0);
        let code_len_pos = bytes.len() - 4 * 4;
        bytes[code_len_pos..code_len_pos + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(decode(&bytes).unwrap_err(), PayloadError::UnexpectedEnd);
    }

    #[test]
    fn invalid_utf8_string_is_rejected() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                num_params: 0,
                num_locals: 0,
                code: vec![0, 0, 16],
            }],
            strings: vec!["x".to_string()],
        };
        let mut bytes = encode(&program, 0);
        // The pool's single string body is the byte after its length prefix.
        bytes[16] = 0xFF;
        assert_eq!(decode(&bytes).unwrap_err(), PayloadError::InvalidString);
    }
}
