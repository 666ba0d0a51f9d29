#![no_main]

use libfuzzer_sys::fuzz_target;
use mips241_core::{decode, render, BufferedIo, Engine, Machine, Status};

const FUZZ_MEMORY_BYTES: u32 = 256;

fuzz_target!(|data: &[u8]| {
    let Ok(mut machine) = Machine::new(FUZZ_MEMORY_BYTES) else {
        return;
    };

    for (slot, chunk) in machine
        .memory
        .words_mut()
        .iter_mut()
        .zip(data.chunks_exact(4))
    {
        *slot = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let _ = render(&decode(*slot));
    }
    machine.prepare_entry(0);

    let engine = Engine::new();
    let mut io = BufferedIo::new(data.to_vec());
    for _ in 0..1024 {
        let zero = machine.arch.gprs()[0];
        assert_eq!(zero, 0);
        if !matches!(engine.step(&mut machine, &mut io), Status::Continuing { .. }) {
            break;
        }
    }
});
