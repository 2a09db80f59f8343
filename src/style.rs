//! Colors and stroke styles shared by the figure model and the renderer.
//!
//! Colors are written the way chart configs usually spell them:
//! `"#2E91E5"`, `"#2e91e5cc"`, `"rgb(141,211,199)"`, `"rgba(0,0,0,0)"` or a small set of
//! names (`black`, `white`, `gray`, ...). They serialize back to hex so figure JSON
//! round-trips through [`Rgba::from_str`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb` at compile time for palette tables.
    pub const fn from_hex6(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Alpha as a 0..=1 fraction.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

fn named(name: &str) -> Option<Rgba> {
    let c = match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "transparent" => Rgba::TRANSPARENT,
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Rgba::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Rgba::rgb(169, 169, 169),
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "orange" => Rgba::rgb(255, 165, 0),
        "navy" => Rgba::rgb(0, 0, 128),
        _ => return None,
    };
    Some(c)
}

fn parse_channel(s: &str) -> Option<u8> {
    let v: f64 = s.trim().parse().ok()?;
    if (0.0..=255.0).contains(&v) {
        Some(v.round() as u8)
    } else {
        None
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = t.strip_prefix('#') {
            let byte = |i: usize| {
                let pair = hex.get(i..i + 2).ok_or_else(err)?;
                u8::from_str_radix(pair, 16).map_err(|_| err())
            };
            return match hex.len() {
                6 => Ok(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
                8 => Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
                _ => Err(err()),
            };
        }

        let functional = t
            .strip_prefix("rgba(")
            .or_else(|| t.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(body) = functional {
            let parts: Vec<&str> = body.split(',').collect();
            return match parts.as_slice() {
                [r, g, b] => Ok(Rgba::rgb(
                    parse_channel(r).ok_or_else(err)?,
                    parse_channel(g).ok_or_else(err)?,
                    parse_channel(b).ok_or_else(err)?,
                )),
                [r, g, b, a] => {
                    let a: f64 = a.trim().parse().map_err(|_| err())?;
                    if !(0.0..=1.0).contains(&a) {
                        return Err(err());
                    }
                    Ok(Rgba::new(
                        parse_channel(r).ok_or_else(err)?,
                        parse_channel(g).ok_or_else(err)?,
                        parse_channel(b).ok_or_else(err)?,
                        (a * 255.0).round() as u8,
                    ))
                }
                _ => Err(err()),
            };
        }

        named(&t).ok_or_else(err)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Marker shape for point traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Square,
    Diamond,
}

/// Line dash pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    /// Dash length and gap, in pixels.
    Dash { size: u32, gap: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_creation() {
        let color = Rgba::rgb(255, 128, 64);
        assert_eq!(color.r, 255);
        assert_eq!(color.g, 128);
        assert_eq!(color.b, 64);
        assert_eq!(color.a, 255);
    }

    #[test]
    fn parses_config_spellings() {
        assert_eq!("#2E91E5".parse::<Rgba>().unwrap(), Rgba::from_hex6(0x2E91E5));
        assert_eq!("rgb(141,211,199)".parse::<Rgba>().unwrap(), Rgba::rgb(141, 211, 199));
        assert_eq!("rgba(0,0,0,0)".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
        assert_eq!(" Black ".parse::<Rgba>().unwrap(), Rgba::BLACK);
        assert!("chartreuse-ish".parse::<Rgba>().is_err());
        assert!("#12345".parse::<Rgba>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for c in [Rgba::rgb(1, 2, 3), Rgba::new(10, 20, 30, 40)] {
            assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);
        }
    }
}
