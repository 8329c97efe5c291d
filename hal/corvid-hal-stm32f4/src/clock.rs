//! Bus clock decoding
//!
//! The I2C timing registers are derived from the APB1 clock, which is the
//! system clock divided by the AHB and APB1 prescalers in RCC CFGR.

use crate::pac::rcc::Rcc;

/// Divider selected by a 4-bit HPRE field
pub fn ahb_divider(hpre: u8) -> u32 {
    match hpre & 0xF {
        0x8 => 2,
        0x9 => 4,
        0xA => 8,
        0xB => 16,
        0xC => 64,
        0xD => 128,
        0xE => 256,
        0xF => 512,
        _ => 1,
    }
}

/// Divider selected by a 3-bit PPREx field
pub fn apb_divider(ppre: u8) -> u32 {
    match ppre & 0x7 {
        0x4 => 2,
        0x5 => 4,
        0x6 => 8,
        0x7 => 16,
        _ => 1,
    }
}

/// AHB clock for a given system clock
pub fn ahb_hz(rcc: Rcc, sysclk_hz: u32) -> u32 {
    sysclk_hz / ahb_divider(rcc.cfgr().read().hpre().to_bits())
}

/// APB1 clock for a given system clock
pub fn apb1_hz(rcc: Rcc, sysclk_hz: u32) -> u32 {
    ahb_hz(rcc, sysclk_hz) / apb_divider(rcc.cfgr().read().ppre1().to_bits())
}
