/// System tick rate. Clocks that count in scheduler ticks report this rate
/// unless they say otherwise.
pub const TICKS_PER_SEC: u64 = 100;

pub const NSEC_PER_SEC: u64 = 1_000_000_000;
pub const NSEC_PER_USEC: u64 = 1_000;
