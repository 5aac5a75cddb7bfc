//! Embedded metadata via `exiftool -json`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::{Error, Result};

pub const TAG_SOURCE_FILE: &str = "SourceFile";
/// Set when another application modified the file
pub const TAG_DATE_MODIFY: &str = "Datemodify";
pub const TAG_FILE_MODIFY_DATE: &str = "FileModifyDate";
pub const TAG_PARAMETERS: &str = "Parameters";

pub const PIPELINE_TAGS: [&str; 4] = [
    TAG_SOURCE_FILE,
    TAG_DATE_MODIFY,
    TAG_FILE_MODIFY_DATE,
    TAG_PARAMETERS,
];

const DATE_MODIFY_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%:z"];
const FILE_MODIFY_DATE_FORMATS: [&str; 2] = ["%Y:%m:%d %H:%M:%S%z", "%Y:%m:%d %H:%M:%S%:z"];

pub trait TagReader: Sync {
    /// Read `tags` from `path`. Tags the file doesn't carry are missing from the map.
    fn read_tags(&self, path: &Path, tags: &[&str]) -> Result<HashMap<String, String>>;
}

#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new(crate::utils::find_program("exiftool"))
    }
}

impl TagReader for ExifTool {
    fn read_tags(&self, path: &Path, tags: &[&str]) -> Result<HashMap<String, String>> {
        let output = Command::new(&self.program)
            .arg("-json")
            .args(tags.iter().map(|t| format!("-{t}")))
            .arg(path)
            .output()?;
        if !output.status.success() {
            debug!("{}", String::from_utf8_lossy(&output.stderr));
            return Err(Error::ExternalTool {
                tool: self.name(),
                code: output.status.code().unwrap_or(crate::error::EXIT_FAILURE),
            });
        }
        parse_exiftool_json(&output.stdout).map_err(|source| Error::ToolOutput {
            tool: self.name(),
            source,
        })
    }
}

/// First entry of exiftool's JSON array, values stringified
pub fn parse_exiftool_json(stdout: &[u8]) -> serde_json::Result<HashMap<String, String>> {
    let entries: Vec<HashMap<String, serde_json::Value>> = serde_json::from_slice(stdout)?;
    let Some(entry) = entries.into_iter().next() else {
        return Ok(HashMap::new());
    };
    Ok(entry
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

/// Tags the pipeline cares about for one source image
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTags {
    pub source_file: String,
    pub modify_date: Option<DateTime<FixedOffset>>,
    pub parameters_text: Option<String>,
}

impl ExtractedTags {
    pub fn read(reader: &dyn TagReader, path: &Path) -> Result<Self> {
        let tags = reader.read_tags(path, &PIPELINE_TAGS)?;
        debug!("tags read from {}: {:?}", path.display(), &tags);
        Ok(Self::from_tags(path, tags))
    }

    pub fn from_tags(path: &Path, mut tags: HashMap<String, String>) -> Self {
        let source_file = tags.remove(TAG_SOURCE_FILE).unwrap_or_else(|| {
            debug!("missing {TAG_SOURCE_FILE} tag, using file name");
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        });
        Self {
            source_file,
            modify_date: resolve_modify_date(&tags),
            parameters_text: tags.remove(TAG_PARAMETERS),
        }
    }
}

/// `Datemodify` wins over `FileModifyDate`; neither means no date
pub fn resolve_modify_date(tags: &HashMap<String, String>) -> Option<DateTime<FixedOffset>> {
    if let Some(date) = tags.get(TAG_DATE_MODIFY) {
        match parse_date(date, &DATE_MODIFY_FORMATS) {
            Some(d) => return Some(d),
            None => debug!("can't parse {TAG_DATE_MODIFY} '{date}'"),
        }
    }
    debug!("falling back on {TAG_FILE_MODIFY_DATE}");
    let date = tags.get(TAG_FILE_MODIFY_DATE)?;
    let parsed = parse_date(date, &FILE_MODIFY_DATE_FORMATS);
    if parsed.is_none() {
        debug!("can't parse {TAG_FILE_MODIFY_DATE} '{date}'");
    }
    parsed
}

fn parse_date(s: &str, formats: &[&str]) -> Option<DateTime<FixedOffset>> {
    formats
        .iter()
        .find_map(|f| DateTime::parse_from_str(s.trim(), f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_first_entry() {
        let out = br#"[{
            "SourceFile": "dir/00001.png",
            "FileModifyDate": "2023:10:01 12:34:56+02:00",
            "Parameters": "Steps: 20, Seed: 1",
            "ImageWidth": 512,
            "Datemodify": null
        }]"#;
        let map = parse_exiftool_json(out).unwrap();
        assert_eq!(map["SourceFile"], "dir/00001.png");
        assert_eq!(map["ImageWidth"], "512");
        assert!(!map.contains_key("Datemodify"));
    }

    #[test]
    fn empty_array_is_empty_map() {
        assert!(parse_exiftool_json(b"[]").unwrap().is_empty());
        assert!(parse_exiftool_json(b"not json").is_err());
    }

    #[test]
    fn datemodify_preferred() {
        let t = tags(&[
            (TAG_DATE_MODIFY, "2023-05-06T07:08:09+00:00"),
            (TAG_FILE_MODIFY_DATE, "2024:01:01 00:00:00+00:00"),
        ]);
        let d = resolve_modify_date(&t).unwrap();
        assert_eq!(d.format("%y%m%d%H%M%S").to_string(), "230506070809");
    }

    #[test]
    fn falls_back_on_file_modify_date() {
        let t = tags(&[(TAG_FILE_MODIFY_DATE, "2024:02:03 04:05:06+01:00")]);
        let d = resolve_modify_date(&t).unwrap();
        assert_eq!(d.format("%y%m%d%H%M%S").to_string(), "240203040506");

        let t = tags(&[
            (TAG_DATE_MODIFY, "garbage"),
            (TAG_FILE_MODIFY_DATE, "2024:02:03 04:05:06+0100"),
        ]);
        assert!(resolve_modify_date(&t).is_some());
    }

    #[test]
    fn no_dates() {
        assert_eq!(resolve_modify_date(&HashMap::new()), None);
    }

    #[test]
    fn source_file_defaults_to_file_name() {
        let extracted = ExtractedTags::from_tags(Path::new("/a/b/img.png"), HashMap::new());
        assert_eq!(extracted.source_file, "img.png");
        assert_eq!(extracted.modify_date, None);
        assert_eq!(extracted.parameters_text, None);
    }

    #[test]
    fn missing_exiftool_is_an_io_error() {
        let tool = ExifTool::new("/nonexistent/exiftool-for-tests");
        let err = tool.read_tags(Path::new("x.png"), &PIPELINE_TAGS).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
