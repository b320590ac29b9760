use lark_isa::{opcode::Opcode, FunctionLocation, Operator};

// format the bytecode with fixed length hex:
//
// 0x0000  00 11 22 33  44 55 66 77
// 0x0008  88 99 aa bb  cc dd ee ff
pub fn format_bytecode_as_binary(codes: &[u8]) -> String {
    codes
        .chunks(8)
        .enumerate()
        .map(|(chunk_addr, chunk)| {
            let binary = chunk
                .iter()
                .enumerate()
                .map(|(idx, byte)| {
                    // format the bytes as the following text:
                    // 00 11 22 33  44 55 66 77
                    // 00 11 22 33
                    // 00 11
                    if idx == 4 {
                        format!("  {:02x}", byte)
                    } else if idx == 0 {
                        format!("{:02x}", byte)
                    } else {
                        format!(" {:02x}", byte)
                    }
                })
                .collect::<Vec<String>>()
                .join("");

            format!("0x{:04x}  {}", chunk_addr * 8, binary)
        })
        .collect::<Vec<String>>()
        .join("\n")
}

// format the bytecode with instruction hex and instruction text:
//
// 0x0000  01 00 00 00  00              push_const        idx:0
// 0x0005  07 03                        call_op           pow
// 0x0007  00                          halt
//
// instructions longer than 8 bytes continue on an indented line holding
// the remaining hex only.
pub fn format_bytecode_as_text(codes: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::new();

    let code_length = codes.len(); // in bytes
    let mut offset = 0; // in bytes

    while offset < code_length {
        let (instruction_length, text) = read_instruction(codes, offset);
        let instruction_bytes = &codes[offset..(offset + instruction_length).min(code_length)];

        let (first_chunk, rest) = if instruction_bytes.len() > 8 {
            instruction_bytes.split_at(8)
        } else {
            (instruction_bytes, &[][..])
        };

        let hex = format_hex_chunk(first_chunk);
        lines.push(format!("0x{:04x}  {:<28}{}", offset, hex, text));

        if !rest.is_empty() {
            lines.push(format!("        {}", format_hex_chunk(rest)));
        }

        offset += instruction_length;
    }

    lines.join("\n")
}

fn format_hex_chunk(chunk: &[u8]) -> String {
    chunk
        .iter()
        .enumerate()
        .map(|(idx, byte)| {
            if idx == 4 {
                format!("  {:02x}", byte)
            } else if idx == 0 {
                format!("{:02x}", byte)
            } else {
                format!(" {:02x}", byte)
            }
        })
        .collect::<Vec<String>>()
        .join("")
}

fn read_param_i32(codes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(codes[offset..(offset + 4)].try_into().unwrap())
}

/// Decodes the instruction at `offset` and renders its text; returns the
/// instruction length in bytes together with the text.
fn read_instruction(codes: &[u8], offset: usize) -> (usize, String) {
    let opcode_num = codes[offset];

    let opcode = match Opcode::from_u8(opcode_num) {
        Some(opcode) => opcode,
        None => return (1, format!("(invalid 0x{:02x})", opcode_num)),
    };

    match opcode {
        Opcode::halt | Opcode::pop | Opcode::return_ | Opcode::start_worker => {
            (1, format!("{:?}", opcode))
        }
        Opcode::push_const
        | Opcode::push_local
        | Opcode::store_local
        | Opcode::inc_local
        | Opcode::dec_local => {
            let index = read_param_i32(codes, offset + 1);
            (5, format!("{:<18}idx:{}", format!("{:?}", opcode), index))
        }
        Opcode::jump | Opcode::jump_false => {
            let target = read_param_i32(codes, offset + 1);
            (5, format!("{:<18}addr:0x{:04x}", format!("{:?}", opcode), target))
        }
        Opcode::push | Opcode::store => {
            let frame_index = read_param_i32(codes, offset + 1);
            let local_index = read_param_i32(codes, offset + 5);
            (
                9,
                format!(
                    "{:<18}frame:{}  idx:{}",
                    format!("{:?}", opcode),
                    frame_index,
                    local_index
                ),
            )
        }
        Opcode::call_op => {
            let operator_num = codes[offset + 1];
            let operator_text = match Operator::from_u8(operator_num) {
                Some(operator) => format!("{:?}", operator),
                None => format!("(invalid 0x{:02x})", operator_num),
            };
            (2, format!("{:<18}{}", "call_op", operator_text))
        }
        Opcode::call_c_func => {
            let builtin_num = read_param_i32(codes, offset + 1);
            let argc = read_param_i32(codes, offset + 5);
            (
                9,
                format!("{:<18}func:{}  argc:{}", "call_c_func", builtin_num, argc),
            )
        }
        Opcode::call_func => {
            let location_num = codes[offset + 1];
            match FunctionLocation::from_u8(location_num) {
                Some(location @ (FunctionLocation::constant | FunctionLocation::local)) => {
                    let index = read_param_i32(codes, offset + 2);
                    let argc = read_param_i32(codes, offset + 6);
                    (
                        10,
                        format!(
                            "{:<18}{:?}  idx:{}  argc:{}",
                            "call_func", location, index, argc
                        ),
                    )
                }
                Some(FunctionLocation::global) => {
                    let frame_index = read_param_i32(codes, offset + 2);
                    let local_index = read_param_i32(codes, offset + 6);
                    let argc = read_param_i32(codes, offset + 10);
                    (
                        14,
                        format!(
                            "{:<18}global  frame:{}  idx:{}  argc:{}",
                            "call_func", frame_index, local_index, argc
                        ),
                    )
                }
                None => (
                    2,
                    format!("{:<18}(invalid location 0x{:02x})", "call_func", location_num),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lark_isa::{opcode::Opcode, FunctionLocation, Operator};

    use crate::{
        bytecode_reader::{format_bytecode_as_binary, format_bytecode_as_text},
        bytecode_writer::BytecodeWriter,
    };

    #[test]
    fn test_format_bytecode_as_binary() {
        let data = (0u8..10).collect::<Vec<u8>>();
        assert_eq!(
            format_bytecode_as_binary(&data),
            "\
0x0000  00 01 02 03  04 05 06 07
0x0008  08 09"
        );
    }

    #[test]
    fn test_format_bytecode_as_text() {
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode_i32(Opcode::push_local, 1);
        writer.write_opcode_operator(Opcode::call_op, Operator::pow);
        writer.write_opcode_location_i32_i32(Opcode::call_func, FunctionLocation::constant, 2, 1);
        writer.write_opcode(Opcode::halt);
        let codes = writer.to_bytes();

        let expected = [
            format!("0x0000  {:<28}{}", "01 00 00 00  00", "push_const        idx:0"),
            format!("0x0005  {:<28}{}", "02 01 00 00  00", "push_local        idx:1"),
            format!("0x000a  {:<28}{}", "07 03", "call_op           pow"),
            format!(
                "0x000c  {:<28}{}",
                "0b 00 02 00  00 00 01 00", "call_func         constant  idx:2  argc:1"
            ),
            "        00 00".to_string(),
            format!("0x0016  {:<28}{}", "00", "halt"),
        ]
        .join("\n");

        assert_eq!(format_bytecode_as_text(&codes), expected);
    }
}
