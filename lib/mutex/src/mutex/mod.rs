use spin_mutex::SpinMutex;

#[cfg(target_arch = "riscv64")]
use riscv::register::sstatus;

pub mod spin_mutex;

pub type SpinLock<T> = SpinMutex<T, Spin>;
pub type SpinNoIrqLock<T> = SpinMutex<T, SpinNoIrq>;

/// Low-level support for mutex(spinlock, etc)
pub trait MutexSupport {
    /// Guard data
    type GuardData;
    /// Called before lock() & try_lock()
    fn before_lock() -> Self::GuardData;
    /// Called when MutexGuard dropping
    fn after_unlock(_: &mut Self::GuardData);
}

/// Spin MutexSupport
#[derive(Debug)]
pub struct Spin;

impl MutexSupport for Spin {
    type GuardData = ();
    #[inline(always)]
    fn before_lock() -> Self::GuardData {}
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}

/// Saves the local interrupt-enable bit and clears it; restores it on drop.
///
/// On targets without a supervisor interrupt-enable bit (host builds) the
/// guard only records that nothing was masked.
pub struct SieGuard(bool);

impl SieGuard {
    fn new() -> Self {
        let old_ie = {
            #[cfg(target_arch = "riscv64")]
            {
                let sie = sstatus::read().sie();
                unsafe {
                    sstatus::clear_sie();
                }
                sie
            }
            #[cfg(not(target_arch = "riscv64"))]
            {
                false
            }
        };
        Self(old_ie)
    }
}

impl Drop for SieGuard {
    fn drop(&mut self) {
        if self.0 {
            #[cfg(target_arch = "riscv64")]
            unsafe {
                sstatus::set_sie();
            }
        }
    }
}

/// SpinNoIrq MutexSupport
#[derive(Debug)]
pub struct SpinNoIrq;

impl MutexSupport for SpinNoIrq {
    type GuardData = SieGuard;
    #[inline(always)]
    fn before_lock() -> Self::GuardData {
        SieGuard::new()
    }
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}
