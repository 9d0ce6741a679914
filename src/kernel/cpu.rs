use super::{ProcessControlBlock, StatusFlags};

/// Interpreter for the 8-bit accumulator machine.
///
/// Each word is `ooo aaaaa`: a 3-bit opcode and a 5-bit memory operand.
pub struct Cpu;

impl Cpu {
    /// Fetches, decodes and executes one instruction of `pcb`.
    ///
    /// Returns `false` when the instruction was STOP, `true` otherwise.
    pub fn execute_one(pcb: &mut ProcessControlBlock) -> bool {
        let current_instruction = pcb.read_word(pcb.program_counter());
        pcb.set_program_counter(pcb.program_counter() as i64 + 1);
        pcb.record_cycle();

        let decoded_instruction = Cpu::decode(current_instruction);
        log::trace!(
            "pid {} pc {:02} {:?}",
            pcb.id(),
            pcb.program_counter() - 1,
            decoded_instruction
        );

        Cpu::execute(pcb, decoded_instruction)
    }

    pub(crate) fn decode(instruction: u8) -> Instruction {
        let operand = Cpu::extract_bits(instruction, 0, 5) as usize;

        match Cpu::extract_bits(instruction, 5, 3) {
            0b000 => Instruction::Stop,
            0b001 => Instruction::Load(operand),
            0b010 => Instruction::Store(operand),
            0b011 => Instruction::Add(operand),
            0b100 => Instruction::Subtract(operand),
            0b101 => Instruction::BranchIfPositive(operand),
            0b110 => Instruction::BranchIfNegative(operand),
            _ => Instruction::BranchIfZero(operand),
        }
    }

    fn extract_bits(instruction: u8, start_index: u32, length: u32) -> u8 {
        (instruction >> start_index) & ((1u16 << length) - 1) as u8
    }

    fn execute(pcb: &mut ProcessControlBlock, instruction: Instruction) -> bool {
        match instruction {
            Instruction::Stop => return false,
            Instruction::Load(address) => pcb.set_accumulator(pcb.read_word(address)),
            Instruction::Store(address) => pcb.write_word(address, pcb.accumulator()),
            Instruction::Add(address) => {
                let sum = i16::from(pcb.accumulator()) + i16::from(pcb.read_word(address));
                Cpu::set_result(pcb, sum);
            }
            Instruction::Subtract(address) => {
                let difference = i16::from(pcb.accumulator()) - i16::from(pcb.read_word(address));
                Cpu::set_result(pcb, difference);
            }
            Instruction::BranchIfPositive(address) => Cpu::branch_if(pcb, StatusFlags::empty(), address),
            Instruction::BranchIfNegative(address) => Cpu::branch_if(pcb, StatusFlags::NEGATIVE, address),
            Instruction::BranchIfZero(address) => Cpu::branch_if(pcb, StatusFlags::ZERO, address),
        }

        true
    }

    /// Raises flags for an arithmetic result and stores its low byte.
    fn set_result(pcb: &mut ProcessControlBlock, result: i16) {
        if result > 0xFF {
            pcb.raise_flags(StatusFlags::OVERFLOW);
        }
        if result < 0 {
            pcb.raise_flags(StatusFlags::NEGATIVE);
        }
        if result == 0 {
            pcb.raise_flags(StatusFlags::ZERO);
        }

        pcb.set_accumulator((result & 0xFF) as u8);
    }

    /// Branches when the zero/negative bits equal `expected` exactly. Overflow is ignored.
    fn branch_if(pcb: &mut ProcessControlBlock, expected: StatusFlags, destination_address: usize) {
        let condition = pcb.flags() & (StatusFlags::ZERO | StatusFlags::NEGATIVE);

        if condition == expected {
            pcb.set_program_counter(destination_address as i64);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Instruction {
    Stop,
    Load(usize),
    Store(usize),
    Add(usize),
    Subtract(usize),
    BranchIfPositive(usize),
    BranchIfNegative(usize),
    BranchIfZero(usize),
}
