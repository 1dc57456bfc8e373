use super::logic::Nibble;

/*
Shift-Register Accumulator
==========================

A 5-bit register (4 data bits + carry) that either adds a nibble to itself or
shifts one bit in on each clock edge. It is stepped once per subsample, so
edges resolved by the subsample edge detectors land on the right subsample.

Vocabulary
----------

  held          Registered value, 0..=31. Bit 4 is the carry.

  addend        Nibble added on a clock edge. With `subtract` set it is
                replaced by its 4-bit two's complement, (16 − n) mod 16.

  combinational What the register *would* latch on the next edge. In async
                mode this is what the main output shows.

  offset tap    A second output: (opposite tap + bias) mod 16, with the bias
                picked from [0, 2, 4, 8] by two switches.


One Subsample
-------------

    comb = shift_enable ? ((held & 0xF) << 1 | (data ⊕ data_xor)) & 0x1F
                        : (held + addend + carry_in) & 0x1F

    1. clock edge  →  held = comb
    2. reset edge  →  held = 0        (after step 1: reset wins)
    3. otherwise held is unchanged

Shifting drops the old carry and moves bit 3 into the carry position.


Clocking
--------

  Sync   only a rising clock edge latches, the main tap shows `held`
  Async  a rising clock OR shift edge latches, the main tap shows `comb`

Async is also forced when nothing is connected to the clock input, so the
module still does something useful with only gates patched.

    held ──▶ ┌──────┐  comb   ┌──────────┐
             │ +/<< │ ──────▶ │ register │──┬──▶ sync tap
    addend ─▶└──────┘    │    └──────────┘  │
                         └─────────────────────────▶ async tap
*/

/// Mask for the 5-bit register (4 data bits + carry).
pub const REGISTER_MASK: u8 = 0x1F;

const OFFSET_BIAS: [u8; 4] = [0, 2, 4, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    #[default]
    Sync,
    Async,
}

impl ClockMode {
    /// Async when the switch says so or when no clock source is connected.
    pub fn resolve(async_switch: bool, clock_connected: bool) -> Self {
        if async_switch || !clock_connected {
            ClockMode::Async
        } else {
            ClockMode::Sync
        }
    }

    /// Whether this subsample's edges latch the register.
    pub fn triggers(self, clock_rise: bool, shift_rise: bool) -> bool {
        match self {
            ClockMode::Sync => clock_rise,
            ClockMode::Async => clock_rise || shift_rise,
        }
    }
}

/// Everything the register sees during one subsample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterInput {
    pub addend: Nibble,
    pub subtract: bool,
    pub carry_in: bool,
    pub shift_enable: bool,
    pub shift_data: bool,
    pub data_xor: bool,
    pub clock_edge: bool,
    pub reset_edge: bool,
}

impl RegisterInput {
    pub fn effective_addend(&self) -> Nibble {
        if self.subtract {
            self.addend.negated()
        } else {
            self.addend
        }
    }
}

/// Both output taps after one subsample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taps {
    /// 5-bit value shown on the bit and carry outputs.
    pub main: u8,
    pub offset: Nibble,
}

impl Taps {
    pub fn nibble(&self) -> Nibble {
        Nibble::new(self.main)
    }

    pub fn carry(&self) -> bool {
        self.main & 0x10 != 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    held: u8,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> u8 {
        self.held
    }

    pub fn combinational(&self, input: &RegisterInput) -> u8 {
        if input.shift_enable {
            let data = (input.shift_data ^ input.data_xor) as u8;
            (((self.held & 0xF) << 1) | data) & REGISTER_MASK
        } else {
            let sum = self.held as u16
                + input.effective_addend().value() as u16
                + input.carry_in as u16;
            (sum & REGISTER_MASK as u16) as u8
        }
    }

    /// Advance one subsample and return the new registered value.
    pub fn step(&mut self, input: &RegisterInput) -> u8 {
        if input.clock_edge {
            self.held = self.combinational(input);
        }
        if input.reset_edge {
            self.held = 0;
        }
        self.held
    }

    /// Advance one subsample and read both taps.
    ///
    /// `input.clock_edge` is expected to already reflect `mode`
    /// (see [`ClockMode::triggers`]).
    pub fn tick(&mut self, mode: ClockMode, input: &RegisterInput, offset: [bool; 2]) -> Taps {
        let comb = self.combinational(input);
        let held = self.step(input);
        let (main, other) = match mode {
            ClockMode::Async => (comb, held),
            ClockMode::Sync => (held, comb),
        };
        Taps {
            main,
            offset: offset_tap(other, offset),
        }
    }

    pub fn reset(&mut self) {
        self.held = 0;
    }
}

/// Bias selected by the two offset switches, `o1 + 2·o2` into [0, 2, 4, 8].
pub fn offset_bias(offset: [bool; 2]) -> u8 {
    OFFSET_BIAS[offset[0] as usize + 2 * offset[1] as usize]
}

pub fn offset_tap(value: u8, offset: [bool; 2]) -> Nibble {
    Nibble::new(value.wrapping_add(offset_bias(offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(addend: u8) -> RegisterInput {
        RegisterInput {
            addend: Nibble::new(addend),
            clock_edge: true,
            ..RegisterInput::default()
        }
    }

    #[test]
    fn five_clocks_of_one() {
        let mut acc = Accumulator::new();
        for _ in 0..5 {
            acc.step(&clock(1));
        }
        assert_eq!(acc.held(), 5);
    }

    #[test]
    fn no_edge_holds_value() {
        let mut acc = Accumulator::new();
        acc.step(&clock(3));
        let idle = RegisterInput {
            addend: Nibble::new(7),
            ..RegisterInput::default()
        };
        for _ in 0..10 {
            assert_eq!(acc.step(&idle), 3);
        }
    }

    #[test]
    fn reset_wins_over_clock() {
        let mut acc = Accumulator::new();
        acc.step(&clock(9));
        let input = RegisterInput {
            reset_edge: true,
            ..clock(4)
        };
        assert_eq!(acc.step(&input), 0);
    }

    #[test]
    fn shift_moves_data_in() {
        let mut acc = Accumulator::new();
        acc.step(&clock(0b0011));
        let shift = RegisterInput {
            shift_enable: true,
            shift_data: true,
            ..clock(0)
        };
        assert_eq!(acc.step(&shift), 0b0111);
    }

    #[test]
    fn shift_ignores_addend() {
        let mut acc = Accumulator::new();
        acc.step(&clock(0b0011));
        let shift = RegisterInput {
            shift_enable: true,
            shift_data: true,
            carry_in: true,
            ..clock(0b1011)
        };
        assert_eq!(acc.combinational(&shift), 0b0111);
        assert_eq!(acc.step(&shift), 0b0111);
    }

    #[test]
    fn shift_moves_bit_three_into_carry() {
        let mut acc = Accumulator::new();
        acc.step(&clock(0b1000));
        let shift = RegisterInput {
            shift_enable: true,
            ..clock(0)
        };
        assert_eq!(acc.step(&shift), 0b1_0000);
        // Old carry is dropped on the next shift.
        assert_eq!(acc.step(&shift), 0);
    }

    #[test]
    fn data_xor_inverts_shift_data() {
        let mut acc = Accumulator::new();
        let shift = RegisterInput {
            shift_enable: true,
            shift_data: true,
            data_xor: true,
            ..clock(0)
        };
        assert_eq!(acc.step(&shift), 0);
    }

    #[test]
    fn subtract_adds_twos_complement() {
        let mut acc = Accumulator::new();
        let input = RegisterInput {
            subtract: true,
            ..clock(5)
        };
        assert_eq!(acc.step(&input), 11);
    }

    #[test]
    fn sum_wraps_through_carry() {
        let mut acc = Accumulator::new();
        for _ in 0..3 {
            acc.step(&clock(15));
        }
        // 45 mod 32
        assert_eq!(acc.held(), 13);

        let mut acc = Accumulator::new();
        let input = RegisterInput {
            carry_in: true,
            ..clock(15)
        };
        assert_eq!(acc.step(&input), 16);
    }

    #[test]
    fn register_stays_in_range() {
        let mut acc = Accumulator::new();
        for n in 0..500u32 {
            let input = RegisterInput {
                addend: Nibble::new((n * 7) as u8),
                subtract: n % 3 == 0,
                carry_in: n % 5 == 0,
                shift_enable: n % 4 == 0,
                shift_data: n % 2 == 0,
                data_xor: n % 7 == 0,
                clock_edge: n % 2 == 1,
                reset_edge: n % 97 == 0,
            };
            assert!(acc.step(&input) <= REGISTER_MASK);
        }
    }

    #[test]
    fn clock_mode_resolution() {
        assert_eq!(ClockMode::resolve(false, true), ClockMode::Sync);
        assert_eq!(ClockMode::resolve(true, true), ClockMode::Async);
        assert_eq!(ClockMode::resolve(false, false), ClockMode::Async);

        assert!(!ClockMode::Sync.triggers(false, true));
        assert!(ClockMode::Async.triggers(false, true));
        assert!(ClockMode::Sync.triggers(true, false));
    }

    #[test]
    fn taps_follow_clock_mode() {
        let mut acc = Accumulator::new();
        let idle = RegisterInput {
            addend: Nibble::new(2),
            ..RegisterInput::default()
        };

        let taps = acc.tick(ClockMode::Sync, &idle, [false, false]);
        assert_eq!(taps.main, 0);
        assert_eq!(taps.offset.value(), 2);

        let taps = acc.tick(ClockMode::Async, &idle, [true, false]);
        assert_eq!(taps.main, 2);
        assert_eq!(taps.offset.value(), 2);
    }

    #[test]
    fn offset_bias_table() {
        assert_eq!(offset_bias([false, false]), 0);
        assert_eq!(offset_bias([true, false]), 2);
        assert_eq!(offset_bias([false, true]), 4);
        assert_eq!(offset_bias([true, true]), 8);
        assert_eq!(offset_tap(12, [true, true]).value(), 4);
    }
}
