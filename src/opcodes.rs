//! CPU opcodes
//!
//! Cycle accounting and opcode metadata. The metadata table drives the
//! disassembler and execution tracing; the regular MOV/ALU blocks are
//! generated by loops, the irregular opcodes are listed explicitly.

use super::types::I8Byte;

/// Cycle table, indexed by opcode byte.
///
/// Conditional CALL/RET entries store the taken count; an untaken branch
/// consumes six fewer cycles.
pub const CYCLES: [u32; 256] = [
    4, 10, 7, 5, 5, 5, 7, 4, 4, 10, 7, 5, 5, 5, 7, 4, // 0x00
    4, 10, 7, 5, 5, 5, 7, 4, 4, 10, 7, 5, 5, 5, 7, 4, // 0x10
    4, 10, 16, 5, 5, 5, 7, 4, 4, 10, 16, 5, 5, 5, 7, 4, // 0x20
    4, 10, 7, 5, 10, 10, 7, 4, 4, 10, 13, 5, 5, 5, 7, 4, // 0x30
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 0x40
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 0x50
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 0x60
    5, 5, 7, 7, 7, 7, 7, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 0x70
    4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4, // 0x80
    4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4, // 0x90
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 7, 4, // 0xA0
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 7, 4, // 0xB0
    11, 10, 10, 10, 17, 11, 7, 11, 11, 10, 10, 10, 17, 17, 7, 11, // 0xC0
    11, 10, 10, 10, 17, 11, 7, 11, 11, 10, 10, 10, 10, 17, 7, 11, // 0xD0
    11, 10, 10, 18, 17, 11, 7, 11, 11, 5, 10, 5, 17, 17, 7, 11, // 0xE0
    11, 10, 10, 4, 17, 11, 7, 11, 11, 5, 10, 4, 17, 17, 7, 11, // 0xF0
];

/// Extra cycles consumed by a taken conditional CALL or RET
pub const BRANCH_CYCLES: u32 = 6;

/// Opcode bytes not defined on the 8080
pub const NOT_USED: [I8Byte; 12] = [
    0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD,
];

/// Opcode metadata
pub struct OpcodeDef {
    /// Mnemonic, with `d8` / `d16` / `a16` operand placeholders
    pub mnemonic: String,
    /// Instruction size in bytes
    pub size: usize,
}

lazy_static! {
    /// Opcode metadata table, indexed by opcode byte
    pub static ref OPCODES: Vec<OpcodeDef> = build_opcode_table();
}

const REGISTER_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "M", "A"];
const PAIR_NAMES: [&str; 4] = ["B", "D", "H", "SP"];
const STACK_PAIR_NAMES: [&str; 4] = ["B", "D", "H", "PSW"];
const CONDITION_NAMES: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];
const ALU_NAMES: [&str; 8] = ["ADD", "ADC", "SUB", "SBB", "ANA", "XRA", "ORA", "CMP"];
const IMMEDIATE_NAMES: [&str; 8] = ["ADI", "ACI", "SUI", "SBI", "ANI", "XRI", "ORI", "CPI"];

fn def(table: &mut Vec<OpcodeDef>, opcode: usize, mnemonic: &str, size: usize) {
    table[opcode] = OpcodeDef {
        mnemonic: mnemonic.to_string(),
        size,
    };
}

fn build_opcode_table() -> Vec<OpcodeDef> {
    // Undefined opcodes keep the "-" default.
    let mut table: Vec<OpcodeDef> = (0..256)
        .map(|_| OpcodeDef {
            mnemonic: String::from("-"),
            size: 1,
        })
        .collect();

    // Register pair operations
    for (idx, pair) in PAIR_NAMES.iter().enumerate() {
        let base = idx * 0x10;
        def(&mut table, base + 0x01, &format!("LXI {},d16", pair), 3);
        def(&mut table, base + 0x03, &format!("INX {}", pair), 1);
        def(&mut table, base + 0x09, &format!("DAD {}", pair), 1);
        def(&mut table, base + 0x0B, &format!("DCX {}", pair), 1);
    }

    // Single register operations
    for (idx, name) in REGISTER_NAMES.iter().enumerate() {
        def(&mut table, idx * 8 + 0x04, &format!("INR {}", name), 1);
        def(&mut table, idx * 8 + 0x05, &format!("DCR {}", name), 1);
        def(&mut table, idx * 8 + 0x06, &format!("MVI {},d8", name), 2);
    }

    def(&mut table, 0x00, "NOP", 1);
    def(&mut table, 0x02, "STAX B", 1);
    def(&mut table, 0x07, "RLC", 1);
    def(&mut table, 0x0A, "LDAX B", 1);
    def(&mut table, 0x0F, "RRC", 1);
    def(&mut table, 0x12, "STAX D", 1);
    def(&mut table, 0x17, "RAL", 1);
    def(&mut table, 0x1A, "LDAX D", 1);
    def(&mut table, 0x1F, "RAR", 1);
    def(&mut table, 0x22, "SHLD a16", 3);
    def(&mut table, 0x27, "DAA", 1);
    def(&mut table, 0x2A, "LHLD a16", 3);
    def(&mut table, 0x2F, "CMA", 1);
    def(&mut table, 0x32, "STA a16", 3);
    def(&mut table, 0x37, "STC", 1);
    def(&mut table, 0x3A, "LDA a16", 3);
    def(&mut table, 0x3F, "CMC", 1);

    // MOV block
    for (dst_idx, dst) in REGISTER_NAMES.iter().enumerate() {
        for (src_idx, src) in REGISTER_NAMES.iter().enumerate() {
            let opcode = 0x40 + dst_idx * 8 + src_idx;
            if opcode == 0x76 {
                continue;
            }
            def(&mut table, opcode, &format!("MOV {},{}", dst, src), 1);
        }
    }
    def(&mut table, 0x76, "HLT", 1);

    // ALU block
    for (op_idx, name) in ALU_NAMES.iter().enumerate() {
        for (src_idx, src) in REGISTER_NAMES.iter().enumerate() {
            let opcode = 0x80 + op_idx * 8 + src_idx;
            def(&mut table, opcode, &format!("{} {}", name, src), 1);
        }
    }

    // Conditional control and restarts
    for (idx, condition) in CONDITION_NAMES.iter().enumerate() {
        let base = 0xC0 + idx * 8;
        def(&mut table, base, &format!("R{}", condition), 1);
        def(&mut table, base + 0x02, &format!("J{} a16", condition), 3);
        def(&mut table, base + 0x04, &format!("C{} a16", condition), 3);
        def(&mut table, base + 0x07, &format!("RST {}", idx), 1);
    }

    // Stack pairs
    for (idx, pair) in STACK_PAIR_NAMES.iter().enumerate() {
        let base = 0xC0 + idx * 0x10;
        def(&mut table, base + 0x01, &format!("POP {}", pair), 1);
        def(&mut table, base + 0x05, &format!("PUSH {}", pair), 1);
    }

    // Immediate ALU operations
    for (idx, name) in IMMEDIATE_NAMES.iter().enumerate() {
        def(&mut table, 0xC6 + idx * 8, &format!("{} d8", name), 2);
    }

    def(&mut table, 0xC3, "JMP a16", 3);
    def(&mut table, 0xC9, "RET", 1);
    def(&mut table, 0xCD, "CALL a16", 3);
    def(&mut table, 0xD3, "OUT d8", 2);
    def(&mut table, 0xDB, "IN d8", 2);
    def(&mut table, 0xE3, "XTHL", 1);
    def(&mut table, 0xE9, "PCHL", 1);
    def(&mut table, 0xEB, "XCHG", 1);
    def(&mut table, 0xF3, "DI", 1);
    def(&mut table, 0xF9, "SPHL", 1);
    def(&mut table, 0xFB, "EI", 1);

    table
}

/// Disassemble one instruction.
///
/// # Arguments
///
/// * `data` - Instruction stream
/// * `offset` - Instruction offset
///
/// # Returns
///
/// * Assembly string and instruction size.
///
pub fn disassemble(data: &[I8Byte], offset: usize) -> (String, usize) {
    let opcode = data[offset];
    let def = &OPCODES[opcode as usize];

    let assembly = match def.size {
        2 => {
            let value = byte_at(data, offset + 1);
            def.mnemonic.replace("d8", &format!("#${:02X}", value))
        }
        3 => {
            let low = byte_at(data, offset + 1);
            let high = byte_at(data, offset + 2);
            let value = (u16::from(high) << 8) | u16::from(low);
            def.mnemonic
                .replace("d16", &format!("#${:04X}", value))
                .replace("a16", &format!("${:04X}", value))
        }
        _ => def.mnemonic.clone(),
    };

    (assembly, def.size)
}

fn byte_at(data: &[I8Byte], offset: usize) -> I8Byte {
    data.get(offset).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_table() {
        assert_eq!(CYCLES.len(), 256);
        assert_eq!(CYCLES[0x00], 4);
        assert_eq!(CYCLES[0x76], 7);
        assert_eq!(CYCLES[0xC3], 10);
        assert_eq!(CYCLES[0xCD], 17);

        // Every RST vector costs 11 cycles, which is also the cost of a
        // taken interrupt.
        for index in 0..8 {
            assert_eq!(CYCLES[0xC7 + index * 8], 11);
        }
    }

    #[test]
    fn test_opcode_table() {
        assert_eq!(OPCODES.len(), 256);
        assert_eq!(OPCODES[0x00].mnemonic, "NOP");
        assert_eq!(OPCODES[0x41].mnemonic, "MOV B,C");
        assert_eq!(OPCODES[0x76].mnemonic, "HLT");
        assert_eq!(OPCODES[0x86].mnemonic, "ADD M");
        assert_eq!(OPCODES[0xC2].mnemonic, "JNZ a16");
        assert_eq!(OPCODES[0xF5].mnemonic, "PUSH PSW");
        assert_eq!(OPCODES[0xFE].mnemonic, "CPI d8");

        assert_eq!(OPCODES[0x3E].size, 2);
        assert_eq!(OPCODES[0x21].size, 3);
        assert_eq!(OPCODES[0xC9].size, 1);

        for opcode in NOT_USED.iter() {
            assert_eq!(OPCODES[*opcode as usize].mnemonic, "-");
        }
    }

    #[test]
    fn test_disassemble() {
        let program = [0x3E, 0x42, 0x21, 0x00, 0x24, 0xC3, 0x08, 0x00];

        let (assembly, size) = disassemble(&program, 0);
        assert_eq!(assembly, "MVI A,#$42");
        assert_eq!(size, 2);

        let (assembly, size) = disassemble(&program, 2);
        assert_eq!(assembly, "LXI H,#$2400");
        assert_eq!(size, 3);

        let (assembly, size) = disassemble(&program, 5);
        assert_eq!(assembly, "JMP $0008");
        assert_eq!(size, 3);
    }

    #[test]
    fn test_disassemble_truncated_operand() {
        let program = [0xC3];
        let (assembly, size) = disassemble(&program, 0);
        assert_eq!(assembly, "JMP $0000");
        assert_eq!(size, 3);
    }
}
