//! Catalogue of named format presets.
//!
//! Keys are lowercase (`"fp32"`, `"bf16"`, `"fp8_e4m3"`, `"int8"`, ...).
//! Lookups ignore case.

use crate::{Error, FloatFormat, Format, IntFormat, Result, Specials};
use serde::Serialize;
use std::fmt;

/// The group a preset is listed under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "IEEE 754")]
    Ieee754,
    #[serde(rename = "ML")]
    MachineLearning,
    #[serde(rename = "OCP Microscaling")]
    OcpMicroscaling,
    #[serde(rename = "Integer")]
    Integer,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Ieee754,
        Category::MachineLearning,
        Category::OcpMicroscaling,
        Category::Integer,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Category::Ieee754 => "IEEE 754",
            Category::MachineLearning => "ML",
            Category::OcpMicroscaling => "OCP Microscaling",
            Category::Integer => "Integer",
        })
    }
}

/// Layout parameters of a preset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Params {
    Float {
        exponent_bits: u32,
        mantissa_bits: u32,
        bias: i64,
        specials: Specials,
    },
    Integer {
        bits: u32,
        signed: bool,
    },
}

/// A named format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub params: Params,
}

impl Preset {
    /// Instantiates the preset's format.
    pub fn format(&self) -> Result<Format> {
        Ok(match self.params {
            Params::Float { exponent_bits, mantissa_bits, bias, specials } => Format::Float(
                FloatFormat::new(1, exponent_bits, mantissa_bits)?
                    .with_bias(bias)
                    .with_specials(specials),
            ),
            Params::Integer { bits, signed } => Format::Integer(IntFormat::new(bits, signed)?),
        })
    }
}

const fn float(
    key: &'static str,
    name: &'static str,
    category: Category,
    exponent_bits: u32,
    mantissa_bits: u32,
    bias: i64,
    specials: Specials,
) -> Preset {
    Preset {
        key,
        name,
        category,
        params: Params::Float { exponent_bits, mantissa_bits, bias, specials },
    }
}

const fn integer(key: &'static str, name: &'static str, bits: u32, signed: bool) -> Preset {
    Preset {
        key,
        name,
        category: Category::Integer,
        params: Params::Integer { bits, signed },
    }
}

const NONE: Specials = Specials::empty();
const IEEE: Specials = Specials::IEEE;

static PRESETS: [Preset; 18] = [
    float("fp64", "FP64 (double)", Category::Ieee754, 11, 52, 1023, IEEE),
    float("fp32", "FP32 (single)", Category::Ieee754, 8, 23, 127, IEEE),
    float("fp16", "FP16 (half)", Category::Ieee754, 5, 10, 15, IEEE),
    float("bf16", "BF16 (bfloat16)", Category::MachineLearning, 8, 7, 127, IEEE),
    float("tf32", "TF32 (TensorFloat-32)", Category::MachineLearning, 8, 10, 127, IEEE),
    float("fp8_e4m3", "FP8 E4M3", Category::OcpMicroscaling, 4, 3, 7, Specials::NAN),
    float("fp8_e5m2", "FP8 E5M2", Category::OcpMicroscaling, 5, 2, 15, IEEE),
    float("fp6_e3m2", "FP6 E3M2", Category::OcpMicroscaling, 3, 2, 3, NONE),
    float("fp6_e2m3", "FP6 E2M3", Category::OcpMicroscaling, 2, 3, 1, NONE),
    float("fp4_e2m1", "FP4 E2M1", Category::OcpMicroscaling, 2, 1, 1, NONE),
    integer("int4", "INT4", 4, true),
    integer("int8", "INT8", 8, true),
    integer("int16", "INT16", 16, true),
    integer("int32", "INT32", 32, true),
    integer("uint4", "UINT4", 4, false),
    integer("uint8", "UINT8", 8, false),
    integer("uint16", "UINT16", 16, false),
    integer("uint32", "UINT32", 32, false),
];

/// All presets, in listing order.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Finds the preset with the given key.
pub fn preset(key: &str) -> Result<&'static Preset> {
    PRESETS
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| Error::FormatNotFound(key.to_string()))
}

/// Instantiates the preset with the given key.
pub fn lookup(key: &str) -> Result<Format> {
    preset(key)?.format()
}

/// Presets grouped by category, in listing order.
pub fn categories() -> Vec<(Category, Vec<&'static Preset>)> {
    Category::ALL
        .iter()
        .map(|&cat| (cat, PRESETS.iter().filter(|p| p.category == cat).collect()))
        .collect()
}

/// A serializable description of one preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub total_bits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponent_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mantissa_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_infinity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_nan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
}

impl<'a> From<&'a Preset> for PresetInfo {
    fn from(p: &'a Preset) -> Self {
        let mut info = PresetInfo {
            key: p.key,
            name: p.name,
            total_bits: 0,
            exponent_bits: None,
            mantissa_bits: None,
            bias: None,
            has_infinity: None,
            has_nan: None,
            signed: None,
        };
        match p.params {
            Params::Float { exponent_bits, mantissa_bits, bias, specials } => {
                info.total_bits = 1 + exponent_bits + mantissa_bits;
                info.exponent_bits = Some(exponent_bits);
                info.mantissa_bits = Some(mantissa_bits);
                info.bias = Some(bias);
                info.has_infinity = Some(specials.contains(Specials::INFINITY));
                info.has_nan = Some(specials.contains(Specials::NAN));
            }
            Params::Integer { bits, signed } => {
                info.total_bits = bits;
                info.signed = Some(signed);
            }
        }
        info
    }
}

/// One category of the format listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub formats: Vec<PresetInfo>,
}

/// Lists every preset grouped by category, for callers that don't know the
/// keys in advance.
pub fn listing() -> Vec<CategoryListing> {
    categories()
        .into_iter()
        .map(|(category, presets)| CategoryListing {
            category,
            formats: presets.into_iter().map(PresetInfo::from).collect(),
        })
        .collect()
}
