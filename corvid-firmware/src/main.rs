//! Corvid demo firmware
//!
//! Brings up the buses listed in `board.toml` and polls a BMP180 on I2C1
//! once a second, logging over RTT.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use corvid_hal::BusId;
use corvid_hal_stm32f4::{clock, pac};
use corvid_hal_stm32f4::{Stm32I2c, Stm32Pins, TransportConfig};
use corvid_i2c::{parse_board_config, I2cDriver, Status};

mod bmp180;

use bmp180::Bmp180;

/// Embedded board description; edit board.toml and rebuild to change it
const BOARD_CONFIG: &str = include_str!("../board.toml");

/// System clock after `embassy_stm32::init` with the default config (HSI)
const SYSCLK_HZ: u32 = 16_000_000;

const POLL_INTERVAL_MS: u64 = 1000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Corvid firmware starting...");

    // Clocks and the time driver; the I2C and GPIO blocks stay ours
    let _p = embassy_stm32::init(Default::default());

    let transport_config = TransportConfig {
        apb1_hz: clock::apb1_hz(pac::RCC, SYSCLK_HZ),
        ..Default::default()
    };
    info!("APB1 at {} Hz", transport_config.apb1_hz);

    // SAFETY: single-core, and these are the only handles to the GPIO and
    // I2C register blocks.
    let transports = BusId::ALL.map(|bus| unsafe { Stm32I2c::steal(bus, transport_config) });
    let pins = unsafe { Stm32Pins::steal() };
    let mut driver = I2cDriver::new(transports, pins);

    let configs = match parse_board_config(BOARD_CONFIG) {
        Ok(configs) => configs,
        Err(e) => {
            error!("board.toml rejected: {}", e);
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    for config in configs {
        if let Err(e) = driver.initialize(config) {
            error!("{}: init failed: {}", config.bus, e);
        }
    }
    info!("Init mask: {=u8:#05b}", driver.init_mask());

    for report in driver.reports() {
        debug!("{}", report);
    }

    let mut sensor = Bmp180::new(driver.bus(BusId::I2c1));
    match sensor.probe() {
        Ok(true) => info!("BMP180 found"),
        Ok(false) => warn!("Unexpected chip id at {=u8:#x}", bmp180::ADDRESS),
        Err(e) => warn!("BMP180 probe failed: {}", e),
    }

    loop {
        match sensor.raw_temperature().await {
            Ok(ut) => info!("UT = {}", ut),
            Err(e) => {
                let status = e.status();
                warn!("Temperature read failed: {} ({})", e, status);
                if status == Status::ErrBus {
                    // Faulted until reinitialized
                    break;
                }
            }
        }

        if let Ok(up) = sensor.raw_pressure().await {
            info!("UP = {}", up);
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }

    drop(sensor);
    let report = driver.report(BusId::I2c1);
    error!("Polling stopped: {}", report);
    if driver.deinitialize(BusId::I2c1).is_ok() {
        info!("I2C1 released");
    }
}
