pub mod board;
pub mod gpio_button;
pub mod gpio_led;
#[cfg(feature = "async")]
pub mod gobus_master;
pub mod i2c;
pub mod spi_slave;
pub mod timer;
pub mod traits;
pub mod wakeup;
pub mod window_watchdog;
