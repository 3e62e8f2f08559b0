//! The field table: per-model tracer and field metadata.
//!
//! ```yaml
//! field_table:
//! - field_type: tracer
//!   modlist:
//!   - model_type: atmos_mod
//!     varlist:
//!     - variable: sphum
//!       longname: specific humidity
//!       units: kg/kg
//!       profile_type:
//!       - value: fixed
//!         surface_value: 3.0e-6
//! ```
//!
//! Scalar attributes are kept as text. A list-valued attribute is a
//! subparameter list: each item is a mapping of scalars, and the first
//! item's `value` names the method.

use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::yaml;

/// An attribute of a field entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    /// A plain value.
    Text(String),
    /// A method with parameters.
    Subparameters(Vec<IndexMap<String, String>>),
}

impl Attribute {
    /// The text of a plain value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Subparameters(_) => None,
        }
    }

    /// The method name of a subparameter list.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Subparameters(items) => items.first()?.get("value").map(String::as_str),
        }
    }
}

/// One variable attached to one model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    /// Kind of field, e.g. `tracer`.
    pub field_type: String,
    /// Owning model, e.g. `atmos_mod`.
    pub model_type: String,
    /// Variable name.
    pub name: String,
    /// Remaining keys in file order.
    pub attributes: IndexMap<String, Attribute>,
}

impl FieldEntry {
    /// A plain attribute's text.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Attribute::as_text)
    }

    /// Long name, falling back to the variable name.
    pub fn long_name(&self) -> &str {
        self.attr("longname").unwrap_or(&self.name)
    }

    /// Units, or `"none"`.
    pub fn units(&self) -> &str {
        self.attr("units").unwrap_or("none")
    }
}

/// A parsed field table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldTable {
    entries: Vec<FieldEntry>,
}

impl FieldTable {
    /// Parse from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let doc = yaml::parse(text)?;
        let root = yaml::as_map(&doc, "document")?;
        let list = yaml::get_seq(root, "field_table", "document")?;

        let mut entries: Vec<FieldEntry> = Vec::new();
        for (n, item) in list.iter().enumerate() {
            let ctx = format!("field_table[{n}]");
            let item = yaml::as_map(item, &ctx)?;
            let field_type = yaml::get_str(item, "field_type", &ctx)?;
            for (m, model) in yaml::get_seq(item, "modlist", &ctx)?.iter().enumerate() {
                let ctx = format!("{ctx}.modlist[{m}]");
                let model = yaml::as_map(model, &ctx)?;
                let model_type = yaml::get_str(model, "model_type", &ctx)?;
                for (v, var) in yaml::get_seq(model, "varlist", &ctx)?.iter().enumerate() {
                    let ctx = format!("{ctx}.varlist[{v}]");
                    let entry = parse_var(&field_type, &model_type, var, &ctx)?;
                    if entries
                        .iter()
                        .any(|e| e.model_type == entry.model_type && e.name == entry.name)
                    {
                        return Err(ConfigError::invalid(
                            "variable",
                            &ctx,
                            format!("'{}' is already defined for {}", entry.name, entry.model_type),
                        ));
                    }
                    entries.push(entry);
                }
            }
        }
        debug!("field table: {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Read and parse a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&yaml::read_file(path.as_ref())?)
    }

    /// Every entry in file order.
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries attached to `model`.
    pub fn fields<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a FieldEntry> + 'a {
        self.entries.iter().filter(move |e| e.model_type == model)
    }

    /// The entry named `name` in `model`.
    pub fn find<'a>(&'a self, model: &'a str, name: &str) -> Option<&'a FieldEntry> {
        self.fields(model).find(|e| e.name == name)
    }

    /// Number of tracers attached to `model`.
    pub fn tracer_count(&self, model: &str) -> usize {
        self.fields(model).filter(|e| e.field_type == "tracer").count()
    }

    /// Render the flattened table as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&self.entries)?)
    }
}

fn parse_var(field_type: &str, model_type: &str, var: &Value, ctx: &str) -> Result<FieldEntry, ConfigError> {
    let map = yaml::as_map(var, ctx)?;
    let name = yaml::get_str(map, "variable", ctx)?;
    let mut attributes = IndexMap::new();
    for (k, v) in map {
        let key = yaml::key_text(k, ctx)?;
        if key == "variable" {
            continue;
        }
        let attr = match v {
            Value::Sequence(items) => Attribute::Subparameters(
                items
                    .iter()
                    .map(|item| subparameters(item, &key, ctx))
                    .collect::<Result<_, _>>()?,
            ),
            other => Attribute::Text(yaml::scalar(other).ok_or_else(|| {
                ConfigError::invalid(key.as_str(), ctx, "expected a scalar or a subparameter list")
            })?),
        };
        attributes.insert(key, attr);
    }
    Ok(FieldEntry {
        field_type: field_type.to_string(),
        model_type: model_type.to_string(),
        name,
        attributes,
    })
}

fn subparameters(item: &Value, key: &str, ctx: &str) -> Result<IndexMap<String, String>, ConfigError> {
    let map = item
        .as_mapping()
        .ok_or_else(|| ConfigError::invalid(key, ctx, "subparameter items must be mappings"))?;
    let mut out = IndexMap::new();
    for (k, v) in map {
        let name = yaml::key_text(k, ctx)?;
        let text = yaml::scalar(v)
            .ok_or_else(|| ConfigError::invalid(format!("{key}.{name}"), ctx, "expected a scalar"))?;
        out.insert(name, text);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
field_table:
- field_type: tracer
  modlist:
  - model_type: atmos_mod
    varlist:
    - variable: sphum
      longname: specific humidity
      units: kg/kg
      profile_type:
      - value: fixed
        surface_value: 3.0e-6
    - variable: o3
      units: VMR
  - model_type: ocean_mod
    varlist:
    - variable: temp
- field_type: diag
  modlist:
  - model_type: atmos_mod
    varlist:
    - variable: cloud_frac
"#;

    #[test]
    fn queries_by_model() {
        let t = FieldTable::from_yaml_str(TABLE).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.tracer_count("atmos_mod"), 2);
        assert_eq!(t.tracer_count("ocean_mod"), 1);
        assert_eq!(t.fields("atmos_mod").count(), 3);
        let sphum = t.find("atmos_mod", "sphum").unwrap();
        assert_eq!(sphum.long_name(), "specific humidity");
        assert_eq!(sphum.units(), "kg/kg");
        let profile = &sphum.attributes["profile_type"];
        assert_eq!(profile.method(), Some("fixed"));
        assert_eq!(t.find("atmos_mod", "o3").unwrap().long_name(), "o3");
        assert!(t.find("ocean_mod", "sphum").is_none());
    }

    #[test]
    fn missing_model_type_is_named() {
        let text = "field_table:\n- field_type: tracer\n  modlist:\n  - varlist: []\n";
        assert_eq!(
            FieldTable::from_yaml_str(text),
            Err(ConfigError::MissingKey {
                key: "model_type",
                context: "field_table[0].modlist[0]".into()
            })
        );
    }

    #[test]
    fn missing_top_level_key() {
        assert!(matches!(
            FieldTable::from_yaml_str("fields: []"),
            Err(ConfigError::MissingKey {
                key: "field_table",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_variable_rejected() {
        let text = "field_table:\n- field_type: tracer\n  modlist:\n  - model_type: m\n    varlist:\n    - variable: a\n    - variable: a\n";
        assert!(matches!(
            FieldTable::from_yaml_str(text),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn nested_mapping_attribute_rejected() {
        let text = "field_table:\n- field_type: tracer\n  modlist:\n  - model_type: m\n    varlist:\n    - variable: a\n      units: {x: 1}\n";
        let err = FieldTable::from_yaml_str(text).unwrap_err();
        assert!(err.to_string().contains("'units'"), "{err}");
    }

    #[test]
    fn dumps_entries() {
        let t = FieldTable::from_yaml_str(TABLE).unwrap();
        let out = t.to_yaml().unwrap();
        assert!(out.contains("sphum"));
        assert!(out.contains("surface_value"));
    }
}
