//! Fetch, decode, dispatch and commit.
//!
//! A step runs in two phases. `execute_instruction` reads the machine and
//! stages every side effect in an [`ExecuteState`], failing before anything is
//! written. `commit_execution` then applies the staged effects. A faulting
//! instruction therefore leaves registers, `HI`/`LO`, memory and `pc` as they
//! were before the fetch.

mod dispatch;
mod helpers;

pub use dispatch::{DispatchTable, Handler, IMMEDIATE_HANDLER_COUNT, REGISTER_HANDLER_COUNT};
pub use helpers::{
    branch_target, effective_address, signed_divide, signed_product, unsigned_divide,
    unsigned_product,
};

use std::collections::BTreeSet;

use crate::decoder::{decode, Instruction};
use crate::encoding::{ImmediateOp, RegisterOp};
use crate::memory::{decode_mapped_port, validate_fetch_alignment, MappedPort, WordIndex};
use crate::state::{Register, RunState, HALT_ADDRESS};
use crate::{CharIo, FaultCode, Machine, Status};

/// Fault raised while staging an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecuteFault {
    /// Fault taxonomy entry.
    pub cause: FaultCode,
    /// Faulting program counter or data byte address.
    pub addr: u32,
}

/// Side effects staged by one instruction, applied by [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteState {
    /// Program counter after the instruction.
    pub next_pc: u32,
    /// Register write.
    pub dest: Option<(Register, u32)>,
    /// `(hi, lo)` write.
    pub hi_lo: Option<(u32, u32)>,
    /// Memory word write.
    pub memory_write: Option<(WordIndex, u32)>,
    /// Character for the output port.
    pub output: Option<u8>,
}

impl ExecuteState {
    /// Creates a state that only advances the program counter.
    #[must_use]
    pub const fn new(next_pc: u32) -> Self {
        Self {
            next_pc,
            dest: None,
            hi_lo: None,
            memory_write: None,
            output: None,
        }
    }
}

/// Stages the effects of `instruction`, fetched at `pc`, under `handler`.
///
/// Only a load from the input port touches `io` here; it cannot fault
/// afterwards.
///
/// # Errors
///
/// Returns the fault and the address it is reported at. Nothing has been
/// written to `machine` in that case.
pub fn execute_instruction(
    handler: Handler,
    instruction: &Instruction,
    machine: &Machine,
    io: &mut dyn CharIo,
    pc: u32,
) -> Result<ExecuteState, ExecuteFault> {
    let mut exec = ExecuteState::new(pc.wrapping_add(4));

    match (handler, *instruction) {
        (Handler::Register(op), Instruction::Register { d, s, t, .. }) => {
            execute_register(op, d, s, t, machine, &mut exec)?;
        }
        (Handler::Immediate(op), Instruction::Immediate { s, t, imm, .. }) => {
            execute_immediate(op, s, t, imm, machine, io, &mut exec)?;
        }
        _ => {
            return Err(ExecuteFault {
                cause: FaultCode::InvalidInstruction,
                addr: pc,
            });
        }
    }

    Ok(exec)
}

/// Applies staged effects, then forces `$0` back to zero.
pub fn commit_execution(machine: &mut Machine, io: &mut dyn CharIo, exec: &ExecuteState) {
    machine.arch.set_pc(exec.next_pc);

    if let Some((reg, value)) = exec.dest {
        machine.arch.set_gpr(reg, value);
    }

    if let Some((hi, lo)) = exec.hi_lo {
        machine.arch.set_hi_lo(hi, lo);
    }

    if let Some((index, value)) = exec.memory_write {
        machine.memory.set_word(index, value);
    }

    if let Some(byte) = exec.output {
        io.write_byte(byte);
    }

    machine.arch.clear_zero_register();
}

fn execute_register(
    op: RegisterOp,
    d: Register,
    s: Register,
    t: Register,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), ExecuteFault> {
    let regs = &machine.arch;
    let (lhs, rhs) = (regs.gpr(s), regs.gpr(t));

    match op {
        RegisterOp::Add => exec.dest = Some((d, lhs.wrapping_add(rhs))),
        RegisterOp::Sub => exec.dest = Some((d, lhs.wrapping_sub(rhs))),
        RegisterOp::Mult => exec.hi_lo = Some(signed_product(lhs, rhs)),
        RegisterOp::Multu => exec.hi_lo = Some(unsigned_product(lhs, rhs)),
        RegisterOp::Div => exec.hi_lo = Some(signed_divide(lhs, rhs)),
        RegisterOp::Divu => exec.hi_lo = Some(unsigned_divide(lhs, rhs)),
        RegisterOp::Mfhi => exec.dest = Some((d, regs.hi())),
        RegisterOp::Mflo => exec.dest = Some((d, regs.lo())),
        RegisterOp::Lis => {
            // Inline data word sits at the already-advanced pc.
            let data_pc = exec.next_pc;
            let index = machine
                .memory
                .fetch_index(data_pc)
                .map_err(|cause| ExecuteFault {
                    cause,
                    addr: data_pc,
                })?;
            exec.dest = Some((d, machine.memory.word(index)));
            exec.next_pc = data_pc.wrapping_add(4);
        }
        RegisterOp::Slt => {
            #[allow(clippy::cast_possible_wrap)]
            let less = (lhs as i32) < (rhs as i32);
            exec.dest = Some((d, u32::from(less)));
        }
        RegisterOp::Sltu => exec.dest = Some((d, u32::from(lhs < rhs))),
        RegisterOp::Jr => exec.next_pc = lhs,
        RegisterOp::Jalr => {
            // Target is read before $31 is written, so `jalr $31` returns to itself.
            let target = lhs;
            exec.dest = Some((Register::RA, exec.next_pc));
            exec.next_pc = target;
        }
    }

    Ok(())
}

fn execute_immediate(
    op: ImmediateOp,
    s: Register,
    t: Register,
    imm: i16,
    machine: &Machine,
    io: &mut dyn CharIo,
    exec: &mut ExecuteState,
) -> Result<(), ExecuteFault> {
    if op.accesses_memory() {
        return execute_memory(op, s, t, imm, machine, io, exec);
    }

    let equal = machine.arch.gpr(s) == machine.arch.gpr(t);
    let taken = if matches!(op, ImmediateOp::Beq) {
        equal
    } else {
        !equal
    };
    if taken {
        exec.next_pc = branch_target(exec.next_pc, imm);
    }
    Ok(())
}

fn execute_memory(
    op: ImmediateOp,
    s: Register,
    t: Register,
    imm: i16,
    machine: &Machine,
    io: &mut dyn CharIo,
    exec: &mut ExecuteState,
) -> Result<(), ExecuteFault> {
    let byte_addr = effective_address(machine.arch.gpr(s), imm);

    match (op, decode_mapped_port(byte_addr)) {
        (ImmediateOp::Lw, Some(MappedPort::Input)) => {
            if let Some(byte) = io.read_byte() {
                exec.dest = Some((t, u32::from(byte)));
            }
            return Ok(());
        }
        (ImmediateOp::Sw, Some(MappedPort::Output)) => {
            exec.output = Some(machine.arch.gpr(t).to_le_bytes()[0]);
            return Ok(());
        }
        _ => {}
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = machine
        .memory
        .data_index(byte_addr)
        .map_err(|cause| ExecuteFault {
            cause,
            addr: byte_addr as u32,
        })?;

    if matches!(op, ImmediateOp::Lw) {
        exec.dest = Some((t, machine.memory.word(index)));
    } else {
        exec.memory_write = Some((index, machine.arch.gpr(t)));
    }

    Ok(())
}

/// Execution engine owning its dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Engine {
    table: DispatchTable,
}

impl Engine {
    /// Creates an engine with the standard dispatch table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: DispatchTable::STANDARD,
        }
    }

    /// Dispatch table used by this engine.
    #[must_use]
    pub const fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Executes at most one instruction.
    ///
    /// A machine that already halted or faulted returns its latched status
    /// without touching any state.
    pub fn step(&self, machine: &mut Machine, io: &mut dyn CharIo) -> Status {
        if let Some(status) = machine.run_state.latched_status(machine.arch.pc()) {
            return status;
        }

        let status = self.step_running(machine, io);
        machine.arch.clear_zero_register();
        machine.run_state = RunState::after(status);

        status
    }

    fn step_running(&self, machine: &mut Machine, io: &mut dyn CharIo) -> Status {
        let pc = machine.arch.pc();

        if let Err(cause) = validate_fetch_alignment(pc) {
            tracing::debug!(pc = format_args!("{pc:#010x}"), %cause, "fetch fault");
            return Status::Fault { cause, addr: pc };
        }

        if pc == HALT_ADDRESS {
            tracing::debug!("program returned to halt address");
            return Status::Halted { pc };
        }

        let index = match machine.memory.fetch_index(pc) {
            Ok(index) => index,
            Err(cause) => {
                tracing::debug!(pc = format_args!("{pc:#010x}"), %cause, "fetch fault");
                return Status::Fault { cause, addr: pc };
            }
        };

        let word = machine.memory.word(index);
        let instruction = decode(word);
        let handler = self.table.lookup(&instruction);
        tracing::trace!(
            pc = format_args!("{pc:#010x}"),
            word = format_args!("{word:#010x}"),
            ?handler,
            "step"
        );

        match execute_instruction(handler, &instruction, machine, io, pc) {
            Ok(exec) => {
                commit_execution(machine, io, &exec);
                Status::Continuing {
                    pc: machine.arch.pc(),
                }
            }
            Err(ExecuteFault { cause, addr }) => {
                tracing::debug!(
                    pc = format_args!("{pc:#010x}"),
                    addr = format_args!("{addr:#010x}"),
                    %cause,
                    "instruction fault"
                );
                Status::Fault { cause, addr }
            }
        }
    }

    /// Steps until the status is no longer [`Status::Continuing`].
    pub fn step_loop(&self, machine: &mut Machine, io: &mut dyn CharIo) -> Status {
        loop {
            let status = self.step(machine, io);
            if !matches!(status, Status::Continuing { .. }) {
                return status;
            }
        }
    }

    /// Like [`Engine::step_loop`], but also stops with [`Status::Breakpoint`]
    /// when a completed step leaves `pc` on an address in `breakpoints`.
    ///
    /// The first step always executes, so calling again resumes.
    pub fn run_until(
        &self,
        machine: &mut Machine,
        io: &mut dyn CharIo,
        breakpoints: &BTreeSet<u32>,
    ) -> Status {
        loop {
            match self.step(machine, io) {
                Status::Continuing { pc } if breakpoints.contains(&pc) => {
                    tracing::debug!(pc = format_args!("{pc:#010x}"), "breakpoint");
                    return Status::Breakpoint { pc };
                }
                Status::Continuing { .. } => {}
                status => return status,
            }
        }
    }
}
