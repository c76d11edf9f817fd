//! RTC periodic wakeup
//!
//! The RTC must already run from the LSI (`board::hsi_16mhz_with_lsi_rtc`).
//! The wakeup flag is routed to EXTI line 22 and the `RTC_WKUP` vector.

use embassy_stm32::pac;
use embassy_stm32::pac::rtc::vals::Wucksel;
use peripheral_core::wakeup::WakeupSetup;

const EXTI_LINE: usize = 22;

fn write_protect(enabled: bool) {
    if enabled {
        pac::RTC.wpr().write(|w| w.set_key(0xFF));
    } else {
        pac::RTC.wpr().write(|w| w.set_key(0xCA));
        pac::RTC.wpr().write(|w| w.set_key(0x53));
    }
}

/// Program and start the wakeup timer
pub fn start(setup: &WakeupSetup) {
    pac::PWR.cr1().modify(|w| w.set_dbp(true));
    write_protect(false);

    pac::RTC.cr().modify(|w| w.set_wute(false));
    while !pac::RTC.isr().read().wutwf() {}

    pac::RTC.wutr().write(|w| w.set_wut(setup.reload));
    pac::RTC.cr().modify(|w| {
        w.set_wucksel(Wucksel::from_bits(setup.wucksel()));
        w.set_wutie(true);
        w.set_wute(true);
    });
    write_protect(true);

    pac::EXTI.rtsr(0).modify(|w| w.set_line(EXTI_LINE, true));
    pac::EXTI.imr(0).modify(|w| w.set_line(EXTI_LINE, true));
}

/// Acknowledge a wakeup, called from the interrupt handler
pub fn clear() {
    pac::RTC.isr().modify(|w| w.set_wutf(false));
    pac::EXTI.pr(0).write(|w| w.set_line(EXTI_LINE, true));
}
