//! STM32F4 Discovery clock profiles and pin map
//!
//! | Function                | Pin            |
//! |-------------------------|----------------|
//! | LEDs green/orange/red/blue | PD12/PD13/PD14/PD15 |
//! | User button             | PA0            |
//! | USART2 TX / RX          | PA2 / PA3      |
//! | ADC1 channel 1          | PA1            |
//! | SPI1 slave SCK/MISO/MOSI | PA5 / PA6 / PA7 |
//! | SPI1 chip select (EXTI) | PA4            |
//! | SPI2 master SCK/MISO/MOSI/CS | PB13 / PB14 / PB15 / PB12 |
//! | GoBus interrupt line    | PB0            |
//! | I2C1 SCL / SDA          | PB6 / PB9      |
//! | Diagnostic clock / data | PE0 / PE1      |
//! | Diagnostic status / error | PE2 / PE3    |
//! | 74HC595 clk/data/latch/clear/OE | PE7 / PE8 / PE9 / PE10 / PE11 |

use embassy_stm32::Config;
use embassy_stm32::time::Hertz;
use peripheral_core::ActiveLevel;

/// Internal RC oscillator
pub const HSI_HZ: u32 = 16_000_000;

/// Crystal fitted to the Discovery board
pub const HSE_HZ: u32 = 8_000_000;

/// Core clock reached by [`pll_168mhz`]
pub const PLL_SYSCLK_HZ: u32 = 168_000_000;

/// LEDs sit between the pin and ground
pub const LED_ACTIVE: ActiveLevel = ActiveLevel::High;

/// Blue user button is pulled down and reads high when pressed
pub const BUTTON_ACTIVE: ActiveLevel = ActiveLevel::High;

/// Run everything from the 16 MHz HSI without the PLL.
///
/// AHB and both APB buses run undivided, so every timer and the window
/// watchdog see 16 MHz.
pub fn hsi_16mhz() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hsi = true;
        config.rcc.hse = None;
        config.rcc.pll = None;
        config.rcc.sys = Sysclk::HSI;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV1;
        config.rcc.apb2_pre = APBPrescaler::DIV1;
    }
    config
}

/// 8 MHz HSE through the PLL to 168 MHz; APB1 at 42 MHz, APB2 at 84 MHz
pub fn pll_168mhz() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(HSE_HZ),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2),
            divq: Some(PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    config
}

/// [`hsi_16mhz`] with the LSI running the RTC
pub fn hsi_16mhz_with_lsi_rtc() -> Config {
    let mut config = hsi_16mhz();
    config.rcc.ls = embassy_stm32::rcc::LsConfig::default_lsi();
    config
}

/// Busy-wait for roughly `us` microseconds at `sysclk_hz`
pub fn delay_us(sysclk_hz: u32, us: u32) {
    cortex_m::asm::delay(sysclk_hz / 1_000_000 * us);
}
