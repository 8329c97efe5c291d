//! Board configuration parser
//!
//! Handles the small TOML subset used to describe which buses a board
//! brings up:
//!
//! ```toml
//! [i2c1]
//! speed = "fast"    # or "standard"
//! scl = "PB8"
//! sda = "PB9"
//! ```
//!
//! Supported: `[i2cN]` headers, `key = value` pairs with quoted or bare
//! values, and `#` comments. Omitted keys keep the bus defaults.

use corvid_hal::{BusId, Pin, SpeedMode, BUS_COUNT};
use heapless::Vec;

use super::BusConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header is not a known bus, or a key appears outside a section
    InvalidSection,
    /// Malformed line or unrecognised value
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Same bus configured twice
    DuplicateBus,
    /// Key not valid in a bus section
    UnknownKey,
}

/// Parse a board description into per-bus configurations
///
/// Buses are returned in the order their sections appear.
pub fn parse_board_config(input: &str) -> Result<Vec<BusConfig, BUS_COUNT>, ParseError> {
    let mut configs: Vec<BusConfig, BUS_COUNT> = Vec::new();
    let mut current: Option<BusConfig> = None;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if let Some(done) = current.take() {
                push_unique(&mut configs, done)?;
            }
            let bus = parse_section_header(&line[1..line.len() - 1])?;
            current = Some(BusConfig::new(bus, SpeedMode::Standard));
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        let config = current.as_mut().ok_or(ParseError::InvalidSection)?;
        match key {
            "speed" => config.speed = parse_speed(value)?,
            "scl" => config.pins.scl = parse_pin(value)?,
            "sda" => config.pins.sda = parse_pin(value)?,
            _ => return Err(ParseError::UnknownKey),
        }
    }

    if let Some(done) = current {
        push_unique(&mut configs, done)?;
    }
    Ok(configs)
}

fn push_unique(
    configs: &mut Vec<BusConfig, BUS_COUNT>,
    config: BusConfig,
) -> Result<(), ParseError> {
    if configs.iter().any(|c| c.bus == config.bus) {
        return Err(ParseError::DuplicateBus);
    }
    // At most BUS_COUNT distinct buses exist, so this cannot overflow
    configs.push(config).map_err(|_| ParseError::DuplicateBus)
}

fn parse_section_header(header: &str) -> Result<BusId, ParseError> {
    match header.trim() {
        "i2c1" => Ok(BusId::I2c1),
        "i2c2" => Ok(BusId::I2c2),
        "i2c3" => Ok(BusId::I2c3),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment unless the `#` sits inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Remove surrounding quotes; bare words are accepted too
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_speed(value: &str) -> Result<SpeedMode, ParseError> {
    match parse_string(value) {
        "standard" => Ok(SpeedMode::Standard),
        "fast" => Ok(SpeedMode::Fast),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_pin(value: &str) -> Result<Pin, ParseError> {
    Pin::parse(parse_string(value)).map_err(|_| ParseError::InvalidPin)
}
