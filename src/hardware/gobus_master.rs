//! Main board side of a GoBus exchange over any async SPI bus

use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiBus;
use peripheral_core::gobus::{self, ExchangeError, RX_SIZE};

/// Clock `request` out with chip select held low and return the module's
/// frame after checking its prefix and CRC.
pub async fn exchange<SPI, CS>(
    spi: &mut SPI,
    cs: &mut CS,
    request: &[u8; RX_SIZE],
) -> Result<[u8; RX_SIZE], ExchangeError<SPI::Error, CS::Error>>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    let mut response = [0u8; RX_SIZE];
    cs.set_low().map_err(ExchangeError::Pin)?;
    let result = spi.transfer(&mut response, request).await;
    let flushed = spi.flush().await;
    let released = cs.set_high();

    gobus::settle_exchange(result.and(flushed), released, &response)?;
    Ok(response)
}
