/// Number of interrupt lines tracked by the global interrupt table.
pub const NR_IRQS: usize = 64;
