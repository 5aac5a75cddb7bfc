//! Generation parameters scraped from the free-text `Parameters` tag.
//!
//! The text written by the generator looks like
//! `prompt...\nSteps: 20, Sampler: Euler a, CFG scale: 7, Seed: 1234, Model: v1-5`.
//! Scraping is lenient on purpose: a segment belongs to the first known key it
//! mentions anywhere, and anything unrecognised is dropped.

use std::{collections::BTreeMap, fmt};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder stored in a sidecar for images without parameter metadata
pub const ABSENT_MARKER: &str = "None";

/// Known parameter keys, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    Steps,
    Seed,
    #[serde(rename = "CFG scale")]
    CfgScale,
    #[serde(rename = "Denoising strength")]
    DenoisingStrength,
    Sampler,
    Model,
}

impl ParamKey {
    pub const ALL: [ParamKey; 6] = [
        ParamKey::Steps,
        ParamKey::Seed,
        ParamKey::CfgScale,
        ParamKey::DenoisingStrength,
        ParamKey::Sampler,
        ParamKey::Model,
    ];

    /// Key as it appears in the parameter text and in sidecars
    pub fn label(&self) -> &'static str {
        match self {
            ParamKey::Steps => "Steps",
            ParamKey::Seed => "Seed",
            ParamKey::CfgScale => "CFG scale",
            ParamKey::DenoisingStrength => "Denoising strength",
            ParamKey::Sampler => "Sampler",
            ParamKey::Model => "Model",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub type ParamMap = BTreeMap<ParamKey, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRecord {
    Present(ParamMap),
    /// Image carried no parameter text at all
    Absent,
}

impl ParameterRecord {
    pub fn get(&self, key: ParamKey) -> Option<&str> {
        match self {
            ParameterRecord::Present(map) => map.get(&key).map(String::as_str),
            ParameterRecord::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ParameterRecord::Absent)
    }
}

pub fn parse(text: Option<&str>) -> ParameterRecord {
    let Some(text) = text else {
        return ParameterRecord::Absent;
    };
    let mut map = ParamMap::new();
    for segment in text.split(',') {
        let Some(key) = ParamKey::ALL
            .into_iter()
            .find(|k| segment.contains(k.label()))
        else {
            continue;
        };
        if let Some((_, value)) = segment.split_once(':') {
            map.insert(key, value.trim().to_string());
        }
    }
    ParameterRecord::Present(map)
}

impl Serialize for ParameterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterRecord::Present(map) => map.serialize(serializer),
            ParameterRecord::Absent => serializer.serialize_str(ABSENT_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for ParameterRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Map(ParamMap),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Map(map) => Ok(ParameterRecord::Present(map)),
            Repr::Marker(s) if s == ABSENT_MARKER => Ok(ParameterRecord::Absent),
            Repr::Marker(s) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a parameter object or \"None\"",
            )),
        }
    }
}
