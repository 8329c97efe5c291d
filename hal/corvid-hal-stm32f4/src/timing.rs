//! Clock-control timing for the I2C peripheral
//!
//! Converts an APB1 clock and a speed mode into the CR2.FREQ, CCR and
//! TRISE register values.

use corvid_hal::{SpeedMode, TransportError};

/// Lowest peripheral clock accepted by the I2C block (MHz)
pub const MIN_FREQ_MHZ: u32 = 2;

/// Lowest peripheral clock for fast mode (MHz)
pub const MIN_FAST_FREQ_MHZ: u32 = 4;

/// Highest peripheral clock accepted by the I2C block (MHz)
pub const MAX_FREQ_MHZ: u32 = 50;

/// Widest divider the 12-bit CCR field holds
pub const CCR_MAX: u32 = 0xFFF;

/// Maximum SCL rise time: 1000 ns standard, 300 ns fast
const FAST_RISE_NS: u32 = 300;

/// Register values for one speed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// CR2.FREQ, peripheral clock in MHz
    pub freq_mhz: u32,
    /// CCR clock-control field
    pub ccr: u32,
    /// TRISE value
    pub trise: u32,
    /// Fast mode select (CCR.FS)
    pub fast: bool,
}

impl Timing {
    /// Compute register values for `speed` with the given APB1 clock
    ///
    /// The CCR divider is rounded up so SCL never exceeds the mode's
    /// nominal frequency.
    pub fn compute(apb1_hz: u32, speed: SpeedMode) -> Result<Self, TransportError> {
        let freq_mhz = apb1_hz / 1_000_000;
        if !(MIN_FREQ_MHZ..=MAX_FREQ_MHZ).contains(&freq_mhz) {
            return Err(TransportError::Config);
        }

        let timing = match speed {
            SpeedMode::Standard => Self {
                freq_mhz,
                // Thigh = Tlow = CCR * Tpclk1
                ccr: apb1_hz.div_ceil(2 * speed.frequency_hz()).max(4),
                trise: freq_mhz + 1,
                fast: false,
            },
            SpeedMode::Fast => {
                if freq_mhz < MIN_FAST_FREQ_MHZ {
                    return Err(TransportError::Config);
                }
                Self {
                    freq_mhz,
                    // Duty 2:1, Tlow = 2 * Thigh
                    ccr: apb1_hz.div_ceil(3 * speed.frequency_hz()).max(1),
                    trise: freq_mhz * FAST_RISE_NS / 1000 + 1,
                    fast: true,
                }
            }
        };

        if timing.ccr > CCR_MAX {
            return Err(TransportError::Config);
        }
        Ok(timing)
    }

    /// Resulting SCL frequency in Hz
    pub fn scl_hz(&self, apb1_hz: u32) -> u32 {
        let divider = if self.fast { 3 } else { 2 };
        apb1_hz / (divider * self.ccr)
    }
}
