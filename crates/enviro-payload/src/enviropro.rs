use crate::{PayloadDecoder, PayloadError, Result};
use serde::{Deserialize, Serialize};

// Command bytes from the EnviroPro uplink frame layout
pub const CMD_MOISTURE: u8 = 0;
pub const CMD_TEMPERATURE: u8 = 1;

// Frame layout (all multi-byte fields big-endian)
pub const HEADER_LEN: usize = 10;
pub const VALUE_COUNT: usize = 8;
pub const VALUE_LEN: usize = 4;
pub const FRAME_LEN: usize = HEADER_LEN + VALUE_COUNT * VALUE_LEN;

/// Fixed header shared by both command variants.
///
/// `batmv` is parsed for completeness but neither reading variant carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub rtc: u32,
    pub batmv: u16,
    pub solmv: u16,
    pub command: u8,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PayloadError::InsufficientData {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            rtc: read_u32_be(&bytes[0..4]),
            batmv: read_u16_be(&bytes[4..6]),
            solmv: read_u16_be(&bytes[6..8]),
            // byte 8 is reserved
            command: bytes[9],
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoistureReading {
    pub rtc: u32,
    pub solmv: u16,
    pub command: u8,
    pub moisture1: f64,
    pub moisture2: f64,
    pub moisture3: f64,
    pub moisture4: f64,
    pub moisture5: f64,
    pub moisture6: f64,
    pub moisture7: f64,
    pub moisture8: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub rtc: u32,
    pub solmv: u16,
    pub command: u8,
    pub temperature1: f64,
    pub temperature2: f64,
    pub temperature3: f64,
    pub temperature4: f64,
    pub temperature5: f64,
    pub temperature6: f64,
    pub temperature7: f64,
    pub temperature8: f64,
}

/// Decoded probe reading, one variant per supported command byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeReading {
    Moisture(MoistureReading),
    Temperature(TemperatureReading),
}

pub struct EnviroProDecoder;

impl EnviroProDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a raw frame into a typed reading.
    pub fn decode_reading(&self, bytes: &[u8]) -> Result<ProbeReading> {
        let header = FrameHeader::parse(bytes)?;
        match header.command {
            CMD_MOISTURE => {
                let v = Self::read_values(bytes)?;
                Ok(ProbeReading::Moisture(MoistureReading {
                    rtc: header.rtc,
                    solmv: header.solmv,
                    command: header.command,
                    moisture1: v[0],
                    moisture2: v[1],
                    moisture3: v[2],
                    moisture4: v[3],
                    moisture5: v[4],
                    moisture6: v[5],
                    moisture7: v[6],
                    moisture8: v[7],
                }))
            }
            CMD_TEMPERATURE => {
                let v = Self::read_values(bytes)?;
                Ok(ProbeReading::Temperature(TemperatureReading {
                    rtc: header.rtc,
                    solmv: header.solmv,
                    command: header.command,
                    temperature1: v[0],
                    temperature2: v[1],
                    temperature3: v[2],
                    temperature4: v[3],
                    temperature5: v[4],
                    temperature6: v[5],
                    temperature7: v[6],
                    temperature8: v[7],
                }))
            }
            other => Err(PayloadError::UnsupportedCommand(other)),
        }
    }

    fn read_values(bytes: &[u8]) -> Result<[f64; VALUE_COUNT]> {
        if bytes.len() < FRAME_LEN {
            return Err(PayloadError::InsufficientData {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }
        let mut values = [0.0; VALUE_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            let offset = HEADER_LEN + i * VALUE_LEN;
            let bits = read_u32_be(&bytes[offset..offset + VALUE_LEN]);
            *value = round2(bits_to_float32(bits));
        }
        Ok(values)
    }
}

impl Default for EnviroProDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadDecoder for EnviroProDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        let reading = self.decode_reading(bytes)?;
        Ok(serde_json::to_value(reading)?)
    }
}

impl enviro_domain::UplinkDecoder for EnviroProDecoder {
    // The probe emits the same frame layout on every port.
    fn decode_uplink(
        &self,
        _f_port: u32,
        payload: &[u8],
    ) -> enviro_domain::DomainResult<serde_json::Value> {
        PayloadDecoder::decode(self, payload)
            .map_err(|e| enviro_domain::DomainError::PayloadDecodeError(e.to_string()))
    }
}

fn read_u16_be(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

fn read_u32_be(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

/// Reconstruct an IEEE-754 binary32 value from its raw bits.
///
/// Bit-exact with `f32::from_bits`, including subnormals, NaN and the signed
/// infinities and zeros.
pub fn bits_to_float32(bits: u32) -> f64 {
    let sign = if bits & 0x8000_0000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 23) & 0xFF) as i32 - 127;
    let significand = bits & 0x007F_FFFF;

    if exponent == 128 {
        return if significand != 0 {
            f64::NAN
        } else {
            sign * f64::INFINITY
        };
    }
    if exponent == -127 {
        if significand == 0 {
            return sign * 0.0;
        }
        // subnormal: no implicit leading bit, effective exponent -126
        return sign * (significand as f64 / (1u32 << 23) as f64) * 2f64.powi(-126);
    }
    sign * ((significand | (1 << 23)) as f64 / (1u32 << 23) as f64) * 2f64.powi(exponent)
}

/// Round to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
