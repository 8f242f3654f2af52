use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// App labels that belong to the framework rather than the project.
/// Hidden by default, matching the server's `exclude_django` behaviour.
pub const DJANGO_APPS: [&str; 6] = [
    "admin",
    "auth",
    "contenttypes",
    "sessions",
    "messages",
    "staticfiles",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub apps: BTreeMap<String, AppRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppRecord {
    #[serde(default)]
    pub verbose_name: String,
    #[serde(default)]
    pub models: BTreeMap<String, ModelRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(default)]
    pub verbose_name: String,
    #[serde(default)]
    pub verbose_name_plural: String,
    #[serde(default)]
    pub db_table: String,
    #[serde(default)]
    pub proxy: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default = "default_true")]
    pub managed: bool,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub null: bool,
    #[serde(default)]
    pub blank: bool,
    #[serde(default)]
    pub db_index: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelKind {
    ForeignKey,
    OneToOne,
    ManyToMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RelKind,
    pub direction: RelDirection,
    pub target_app: String,
    pub target_model: String,
    #[serde(default)]
    pub related_name: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub null: bool,
    #[serde(default)]
    pub on_delete: Option<String>,
}

impl RelationshipRecord {
    pub fn is_forward(&self) -> bool {
        self.direction == RelDirection::Forward
    }

    pub fn target_key(&self) -> String {
        format!("{}.{}", self.target_app, self.target_model)
    }
}

impl ModelRecord {
    /// Display name shown in the node header; the mapping key is the fallback.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if self.verbose_name.is_empty() {
            key
        } else {
            &self.verbose_name
        }
    }
}

impl Schema {
    /// Drop apps the user asked to hide. `include` of `None` keeps every app;
    /// `exclude_django` removes the framework's built-in apps.
    pub fn retain_apps(&mut self, include: Option<&[String]>, exclude_django: bool) {
        self.apps.retain(|label, _| {
            if exclude_django && DJANGO_APPS.contains(&label.as_str()) {
                return false;
            }
            match include {
                Some(labels) if !labels.is_empty() => labels.iter().any(|l| l == label),
                _ => true,
            }
        });
    }

    pub fn model(&self, app: &str, model: &str) -> Option<&ModelRecord> {
        self.apps.get(app).and_then(|a| a.models.get(model))
    }
}

pub fn parse_schema(input: &str) -> Result<Schema> {
    let schema = serde_json::from_str(input)?;
    Ok(schema)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "apps": {
            "catalog": {
                "verbose_name": "Catalog",
                "models": {
                    "book": {
                        "verbose_name": "book",
                        "db_table": "catalog_book",
                        "proxy": false,
                        "abstract": false,
                        "fields": [
                            {"name": "id", "type": "AutoField", "primary_key": true},
                            {"name": "title", "type": "CharField", "max_length": 300}
                        ],
                        "relationships": [
                            {"name": "publisher", "type": "foreign_key",
                             "direction": "forward", "target_app": "catalog",
                             "target_model": "publisher", "on_delete": "SET_NULL"},
                            {"name": "reviews", "type": "foreign_key",
                             "direction": "reverse", "target_app": "catalog",
                             "target_model": "review", "field_name": "book"}
                        ]
                    }
                }
            },
            "auth": {"verbose_name": "Authentication", "models": {}}
        }
    }"#;

    #[test]
    fn parses_schema_json() {
        let schema = parse_schema(SAMPLE).expect("parse failed");
        let book = schema.model("catalog", "book").expect("missing model");
        assert_eq!(book.fields.len(), 2);
        assert!(book.fields[0].primary_key);
        assert_eq!(book.fields[1].max_length, Some(300));
        assert_eq!(book.relationships.len(), 2);
        assert_eq!(book.relationships[0].kind, RelKind::ForeignKey);
        assert!(book.relationships[0].is_forward());
        assert!(!book.relationships[1].is_forward());
        assert_eq!(book.relationships[0].target_key(), "catalog.publisher");
    }

    #[test]
    fn partial_records_use_defaults() {
        let schema = parse_schema(r#"{"apps": {"a": {"models": {"m": {}}}}}"#).expect("parse");
        let model = schema.model("a", "m").expect("missing model");
        assert!(model.fields.is_empty());
        assert!(model.managed);
        assert!(!model.is_abstract);
        assert_eq!(model.display_name("a.m"), "a.m");
    }

    #[test]
    fn retain_apps_filters_django_and_includes() {
        let mut schema = parse_schema(SAMPLE).expect("parse failed");
        schema.retain_apps(None, true);
        assert!(schema.apps.contains_key("catalog"));
        assert!(!schema.apps.contains_key("auth"));

        let mut schema = parse_schema(SAMPLE).expect("parse failed");
        schema.retain_apps(Some(&["auth".to_string()]), false);
        assert!(schema.apps.contains_key("auth"));
        assert!(!schema.apps.contains_key("catalog"));
    }
}
