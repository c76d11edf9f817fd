//! Window watchdog on PCLK1

use embassy_stm32::pac;
use embassy_stm32::pac::wwdg::vals::Wdgtb;
use peripheral_core::watchdog::WwdgSetup;

pub struct WindowWatchdog {
    setup: WwdgSetup,
}

impl WindowWatchdog {
    /// Clock the watchdog and start it.
    ///
    /// Once WDGA is set only a reset stops it again.
    pub fn start(setup: WwdgSetup) -> Self {
        pac::RCC.apb1enr().modify(|w| w.set_wwdgen(true));
        pac::WWDG.cfr().write(|w| {
            w.set_wdgtb(Wdgtb::from_bits(setup.wdgtb()));
            w.set_w(setup.window());
        });
        pac::WWDG.cr().write(|w| {
            w.set_t(setup.counter());
            w.set_wdga(true);
        });
        Self { setup }
    }

    /// Current value of the down counter
    pub fn counter(&self) -> u8 {
        pac::WWDG.cr().read().t()
    }

    pub fn window(&self) -> u8 {
        pac::WWDG.cfr().read().w()
    }

    pub fn may_refresh(&self) -> bool {
        self.setup.may_refresh(self.counter())
    }

    /// Reload the counter; resets the MCU when called inside the closed
    /// window
    pub fn refresh(&mut self) {
        pac::WWDG.cr().write(|w| {
            w.set_t(self.setup.counter());
            w.set_wdga(true);
        });
    }
}
