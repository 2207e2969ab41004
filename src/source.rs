//! Record sources (spec §6): the external, pluggable collaborators that
//! turn bytes on disk into `(record_name, Element)` pairs for [`crate::compiler::compile`].
//!
//! This is the one place in the crate that reaches for `ion-rs` — everything
//! above [`RecordSource::load`] only ever sees [`crate::model::value::Element`],
//! never a raw `ion_rs` type (spec §1's stated boundary).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use num_bigint::BigInt;
use smol_str::SmolStr;

use crate::err::{ConfigError, ConfigResult};
use crate::model::value::{Element, Timestamp, TimestampPrecision, Value};

/// A collaborator that produces `(record_name, Element)` pairs to feed the
/// compiler. `record_name` is an opaque handle (spec §4.1) used only in
/// error messages — a filename here.
pub trait RecordSource {
    fn load(&self) -> ConfigResult<Vec<(String, Element)>>;
}

/// A single `.ion` file.
pub struct SingleFileSource(PathBuf);

impl SingleFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl RecordSource for SingleFileSource {
    fn load(&self) -> ConfigResult<Vec<(String, Element)>> {
        load_file(&self.0)
    }
}

/// An explicit, caller-ordered list of files.
pub struct FileListSource(Vec<PathBuf>);

impl FileListSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self(paths.into_iter().collect())
    }
}

impl RecordSource for FileListSource {
    fn load(&self) -> ConfigResult<Vec<(String, Element)>> {
        let mut records = Vec::new();
        for path in &self.0 {
            records.extend(load_file(path)?);
        }
        Ok(records)
    }
}

/// A directory, walked non-recursively. Only files whose extension is
/// exactly `.ion` are read; everything else is silently ignored (spec §6).
/// Files are processed in ascending filename order for deterministic load.
pub struct DirectorySource(PathBuf);

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl RecordSource for DirectorySource {
    fn load(&self) -> ConfigResult<Vec<(String, Element)>> {
        let mut paths = ion_file_paths(&self.0)?;
        paths.sort();
        let mut records = Vec::new();
        for path in &paths {
            records.extend(load_file(path)?);
        }
        Ok(records)
    }
}

fn ion_file_paths(dir: &Path) -> ConfigResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::SourceIo {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::SourceIo {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ion") {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// An in-memory source — used by tests and by embedders that already have a
/// parsed data tree and never touch `.ion` bytes at all.
#[derive(Default, Clone)]
pub struct InMemorySource(Vec<(String, Element)>);

impl InMemorySource {
    pub fn new(records: impl IntoIterator<Item = (String, Element)>) -> Self {
        Self(records.into_iter().collect())
    }
}

impl RecordSource for InMemorySource {
    fn load(&self) -> ConfigResult<Vec<(String, Element)>> {
        Ok(self.0.clone())
    }
}

fn load_file(path: &Path) -> ConfigResult<Vec<(String, Element)>> {
    let record_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = std::fs::read(path).map_err(|e| ConfigError::SourceIo {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let ion_elements = read_ion_elements(&bytes).map_err(|e| ConfigError::SourceIo {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    ion_elements
        .iter()
        .map(|ion_elem| {
            convert_element(ion_elem)
                .map(|elem| (record_name.clone(), elem))
                .map_err(|reason| ConfigError::SourceIo {
                    path: path.display().to_string(),
                    reason,
                })
        })
        .collect()
}

fn read_ion_elements(bytes: &[u8]) -> Result<Vec<ion_rs::element::Element>, String> {
    use ion_rs::element::reader::ElementReader;
    let mut reader = ion_rs::ReaderBuilder::new()
        .build(bytes)
        .map_err(|e| e.to_string())?;
    reader.read_all_elements().map_err(|e| e.to_string())
}

/// Bridge one decoded `ion_rs` element into this crate's own value domain
/// (spec §1 / AMBIENT 1.A: the compiler never sees `ion_rs` types directly).
fn convert_element(ion_elem: &ion_rs::element::Element) -> Result<Element, String> {
    let annotations = ion_elem
        .annotations()
        .iter()
        .map(|a| SmolStr::new(a.text().unwrap_or_default()))
        .collect();
    let value = convert_value(ion_elem)?;
    Ok(Element::with_annotations(annotations, value))
}

fn convert_value(ion_elem: &ion_rs::element::Element) -> Result<Value, String> {
    use ion_rs::element::Value as IonValue;
    match ion_elem.value() {
        IonValue::Null(_) => Ok(Value::Null),
        IonValue::Bool(b) => Ok(Value::Bool(*b)),
        // `Int`'s `Display` always renders a plain base-10 integer literal,
        // so round-tripping through it sidesteps depending on exactly which
        // internal representation (`i64` vs big) this `ion-rs` version uses.
        IonValue::Int(i) => BigInt::from_str(&i.to_string())
            .map(Value::Int)
            .map_err(|e| format!("malformed ion integer `{i}`: {e}")),
        IonValue::Float(f) => Ok(Value::Float(*f)),
        IonValue::Decimal(d) => BigDecimal::from_str(&d.to_string())
            .map(Value::Decimal)
            .map_err(|e| format!("malformed ion decimal `{d}`: {e}")),
        IonValue::Timestamp(t) => convert_timestamp(t),
        IonValue::String(s) => Ok(Value::String(SmolStr::new(s.text()))),
        IonValue::Symbol(s) => Ok(Value::Symbol(SmolStr::new(s.text().unwrap_or_default()))),
        IonValue::Blob(b) => Ok(Value::Blob(b.as_slice().to_vec())),
        IonValue::Clob(b) => Ok(Value::Blob(b.as_slice().to_vec())),
        IonValue::SExp(seq) | IonValue::List(seq) => {
            let items = seq
                .elements()
                .map(convert_element)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(items))
        }
        IonValue::Struct(s) => {
            let fields = s
                .fields()
                .map(|(name, value)| {
                    let key = SmolStr::new(name.text().unwrap_or_default());
                    convert_element(value).map(|elem| (key, elem))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Struct(fields))
        }
    }
}

fn convert_timestamp(t: &ion_rs::Timestamp) -> Result<Value, String> {
    let text = t.to_string();
    let instant = DateTime::<FixedOffset>::parse_from_rfc3339(&text)
        .or_else(|_| DateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f%:z"))
        .map_err(|e| format!("malformed ion timestamp `{text}`: {e}"))?;
    // The precision this crate tracks is a coarser concern than `ion-rs`'s
    // own internal precision enum; days-only vs full-instant is the
    // distinction this crate's consumers actually care about (spec §6).
    let precision = if t.has_fractional_seconds() {
        TimestampPrecision::FractionalSecond(instant.timestamp_subsec_nanos())
    } else {
        TimestampPrecision::Second
    };
    Ok(Value::Timestamp(Timestamp { instant, precision }))
}
