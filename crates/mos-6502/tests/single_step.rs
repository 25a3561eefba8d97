//! Single-instruction state vectors.
//!
//! Each case gives the full register file and the interesting RAM before and
//! after one instruction, in the layout of Tom Harte's `SingleStepTests`.
//! A handful of hand-checked vectors are embedded below. The full upstream
//! suite can be dropped into `test-data/65x02/6502/v1/XX.json` and run with
//! `--ignored`; it is compared with B and U masked, and cases whose result
//! depends on decimal-mode arithmetic are skipped.

use emu_core::{Bus, Cpu, SimpleBus};
use mos_6502::{Mnemonic, Mos6502, Status, decode, flags};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Cycles,
}

/// Upstream files list every bus cycle; embedded vectors just give a count.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cycles {
    Count(u32),
    Bus(Vec<(u16, u8, String)>),
}

impl Cycles {
    fn count(&self) -> u32 {
        match self {
            Self::Count(n) => *n,
            Self::Bus(list) => list.len() as u32,
        }
    }
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

/// Set up the CPU and bus from the initial test state.
fn setup(cpu: &mut Mos6502, bus: &mut SimpleBus, state: &CpuState) {
    for &(addr, value) in &state.ram {
        bus.write(addr, value);
    }
    cpu.regs.pc = state.pc;
    cpu.regs.s = state.s;
    cpu.regs.a = state.a;
    cpu.regs.x = state.x;
    cpu.regs.y = state.y;
    cpu.regs.p = Status(state.p);
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &Mos6502, bus: &SimpleBus, expected: &CpuState, p_mask: u8) -> Vec<String> {
    let mut errors = Vec::new();

    let regs = [
        ("S", cpu.regs.s, expected.s),
        ("A", cpu.regs.a, expected.a),
        ("X", cpu.regs.x, expected.x),
        ("Y", cpu.regs.y, expected.y),
        ("P", cpu.regs.p.0 & p_mask, expected.p & p_mask),
    ];
    if cpu.regs.pc != expected.pc {
        errors.push(format!(
            "PC: got ${:04X}, want ${:04X}",
            cpu.regs.pc, expected.pc
        ));
    }
    for (name, got, want) in regs {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }

    for &(addr, expected_val) in &expected.ram {
        let actual_val = bus.peek(addr);
        if actual_val != expected_val {
            errors.push(format!(
                "RAM[${addr:04X}]: got ${actual_val:02X}, want ${expected_val:02X}"
            ));
        }
    }

    errors
}

/// Run one case, returning mismatches (including the cycle count).
fn run_case(test: &TestCase, p_mask: u8) -> Vec<String> {
    let mut cpu = Mos6502::new();
    let mut bus = SimpleBus::new();
    setup(&mut cpu, &mut bus, &test.initial);

    let mut errors = match cpu.step(&mut bus) {
        Ok(cycles) if cycles == test.cycles.count() => Vec::new(),
        Ok(cycles) => vec![format!(
            "cycles: got {cycles}, want {}",
            test.cycles.count()
        )],
        Err(e) => return vec![e.to_string()],
    };
    errors.extend(compare(&cpu, &bus, &test.final_state, p_mask));
    errors
}

const EMBEDDED: &str = r#"[
  {"name": "a9 LDA #imm",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 4, "ram": [[512, 169], [513, 66]]},
   "final":   {"pc": 514, "s": 253, "a": 66, "x": 0, "y": 0, "p": 4, "ram": []},
   "cycles": 2},
  {"name": "69 ADC signed overflow",
   "initial": {"pc": 512, "s": 253, "a": 127, "x": 0, "y": 0, "p": 1, "ram": [[512, 105], [513, 0]]},
   "final":   {"pc": 514, "s": 253, "a": 128, "x": 0, "y": 0, "p": 192, "ram": []},
   "cycles": 2},
  {"name": "69 ADC ignores decimal flag",
   "initial": {"pc": 512, "s": 253, "a": 9, "x": 0, "y": 0, "p": 8, "ram": [[512, 105], [513, 1]]},
   "final":   {"pc": 514, "s": 253, "a": 10, "x": 0, "y": 0, "p": 8, "ram": []},
   "cycles": 2},
  {"name": "bd LDA abs,X page cross",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 1, "y": 0, "p": 0, "ram": [[512, 189], [513, 255], [514, 18], [4864, 128]]},
   "final":   {"pc": 515, "s": 253, "a": 128, "x": 1, "y": 0, "p": 128, "ram": []},
   "cycles": 5},
  {"name": "91 STA (zp),Y",
   "initial": {"pc": 512, "s": 253, "a": 90, "x": 0, "y": 16, "p": 0, "ram": [[512, 145], [513, 64], [64, 248], [65, 32]]},
   "final":   {"pc": 514, "s": 253, "a": 90, "x": 0, "y": 16, "p": 0, "ram": [[8456, 90]]},
   "cycles": 6},
  {"name": "6c JMP (ind) page wrap",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 0, "ram": [[512, 108], [513, 255], [514, 16], [4351, 52], [4096, 18], [4352, 86]]},
   "final":   {"pc": 4660, "s": 253, "a": 0, "x": 0, "y": 0, "p": 0, "ram": []},
   "cycles": 5},
  {"name": "20 JSR",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 0, "ram": [[512, 32], [513, 0], [514, 3]]},
   "final":   {"pc": 768, "s": 251, "a": 0, "x": 0, "y": 0, "p": 0, "ram": [[509, 2], [508, 2]]},
   "cycles": 6},
  {"name": "28 PLP drops B and U",
   "initial": {"pc": 512, "s": 252, "a": 0, "x": 0, "y": 0, "p": 0, "ram": [[512, 40], [509, 255]]},
   "final":   {"pc": 513, "s": 253, "a": 0, "x": 0, "y": 0, "p": 207, "ram": []},
   "cycles": 4},
  {"name": "e6 INC zp wraps to zero",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 128, "ram": [[512, 230], [513, 16], [16, 255]]},
   "final":   {"pc": 514, "s": 253, "a": 0, "x": 0, "y": 0, "p": 2, "ram": [[16, 0]]},
   "cycles": 5},
  {"name": "d0 BNE taken across page",
   "initial": {"pc": 752, "s": 253, "a": 0, "x": 0, "y": 0, "p": 0, "ram": [[752, 208], [753, 32]]},
   "final":   {"pc": 786, "s": 253, "a": 0, "x": 0, "y": 0, "p": 0, "ram": []},
   "cycles": 4},
  {"name": "c0 CPY borrow",
   "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 16, "p": 3, "ram": [[512, 192], [513, 32]]},
   "final":   {"pc": 514, "s": 253, "a": 0, "x": 0, "y": 16, "p": 128, "ram": []},
   "cycles": 2},
  {"name": "40 RTI",
   "initial": {"pc": 512, "s": 252, "a": 0, "x": 0, "y": 0, "p": 4, "ram": [[512, 64], [509, 49], [510, 0], [511, 128]]},
   "final":   {"pc": 32768, "s": 255, "a": 0, "x": 0, "y": 0, "p": 1, "ram": []},
   "cycles": 6}
]"#;

#[test]
fn embedded_vectors() {
    let tests: Vec<TestCase> = serde_json::from_str(EMBEDDED).expect("embedded vectors parse");
    assert_eq!(tests.len(), 12);

    let failures: Vec<String> = tests
        .iter()
        .filter_map(|test| {
            let errors = run_case(test, 0xFF);
            (!errors.is_empty()).then(|| format!("{}: {}", test.name, errors.join("; ")))
        })
        .collect();

    assert!(failures.is_empty(), "failures:\n{}", failures.join("\n"));
}

/// The upstream suite records the NMOS 6502's BCD results.
fn depends_on_decimal(test: &TestCase) -> bool {
    let Some(opcode) = test
        .initial
        .ram
        .iter()
        .find(|&&(addr, _)| addr == test.initial.pc)
        .map(|&(_, v)| v)
    else {
        return false;
    };
    test.initial.p & flags::D != 0
        && decode(opcode).is_some_and(|i| matches!(i.mnemonic, Mnemonic::Adc | Mnemonic::Sbc))
}

#[test]
#[ignore = "requires test-data/65x02, run with --ignored"]
fn run_all() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/65x02/6502/v1");

    if !test_dir.exists() {
        eprintln!("Test data not found at {}", test_dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let p_mask = !(flags::B | flags::U);
    let mut total_pass = 0u64;
    let mut total_fail = 0u64;
    let mut first_failures: Vec<String> = Vec::new();

    for opcode in 0..=0xFF_u8 {
        if decode(opcode).is_none() {
            continue;
        }
        let path = test_dir.join(format!("{opcode:02x}.json"));
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        for test in tests.iter().filter(|t| !depends_on_decimal(t)) {
            let errors = run_case(test, p_mask);
            if errors.is_empty() {
                total_pass += 1;
            } else {
                total_fail += 1;
                if first_failures.len() < 20 {
                    first_failures.push(format!("{}: {}", test.name, errors.join("; ")));
                }
            }
        }
    }

    eprintln!("SingleStepTests: {total_pass} passed, {total_fail} failed");
    assert!(
        total_fail == 0,
        "first failures:\n{}",
        first_failures.join("\n")
    );
}
