//! Register helpers for the general purpose timers
//!
//! embassy's low-level `Timer` enables the clock and configures channels;
//! these take the raw register block so interrupt handlers can use them too.

use embassy_stm32::pac::timer::TimGp16;
use peripheral_core::TimerSetup;

/// Load prescaler and reload and latch them without leaving UIF set
pub fn load(regs: TimGp16, setup: &TimerSetup) {
    regs.psc().write_value(setup.prescaler);
    regs.arr().modify(|w| w.set_arr(setup.reload as _));
    regs.egr().write(|w| w.set_ug(true));
    clear_update(regs);
}

pub fn start(regs: TimGp16) {
    regs.cr1().modify(|w| w.set_cen(true));
}

pub fn stop(regs: TimGp16) {
    regs.cr1().modify(|w| w.set_cen(false));
}

/// Stop counting at the next update event
pub fn set_one_pulse(regs: TimGp16, enabled: bool) {
    regs.cr1().modify(|w| w.set_opm(enabled));
}

pub fn listen_update(regs: TimGp16, enabled: bool) {
    regs.dier().modify(|w| w.set_uie(enabled));
}

pub fn clear_update(regs: TimGp16) {
    regs.sr().modify(|w| w.set_uif(false));
}

/// Compare register of channel `index` (0 for CH1)
pub fn set_compare(regs: TimGp16, index: usize, value: u32) {
    regs.ccr(index).modify(|w| w.set_ccr(value as _));
}

/// Next capture on channel `index`, if one has been latched
pub fn take_capture(regs: TimGp16, index: usize) -> Option<u32> {
    if !regs.sr().read().ccif(index) {
        return None;
    }
    // reading CCR clears CCxIF
    Some(regs.ccr(index).read().ccr() as u32)
}
