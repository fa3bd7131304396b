//! Output-set assembly: decide every file name and its content.
//!
//! The pipeline per document:
//!
//! 1. Swagger 2 only: build `_definitions.json` (Kubernetes augmentation,
//!    strict sealing)
//! 2. Collect components: the same `definitions` (Swagger 2) or `components.schemas`
//!    plus extracted body/parameter components (OpenAPI 3)
//! 3. Per component: name the file, add `$schema` / `type`, then passes 1-4
//!    and optional stand-alone inlining
//! 4. `all.json` referencing every component that converted
//!
//! A failing component is logged, recorded in [`OutputSet::failures`] and
//! left out of `all.json`; the rest of the run continues. Document-level
//! errors (malformed `paths`) abort.

use serde_json::{json, Map, Value};

use crate::config::ConvertOptions;
use crate::document::{SchemaDocument, SpecVersion};
use crate::error::ConvertError;
use crate::extract::{body_components, parameter_components};
use crate::kubernetes;
use crate::passes::p1_refs::{rewrite_refs, COMPONENT_SCHEMAS_PREFIX};
use crate::passes::p2_strict::{additional_properties, additional_properties_of_each};
use crate::passes::p3_int_or_string::int_or_string_expansion;
use crate::passes::p4_nullable_optional::nullable_optional_fields;
use crate::standalone::{inline_refs, RefResolver};

/// Name of the Swagger 2 shared definitions file.
pub const DEFINITIONS_FILE: &str = "_definitions.json";
/// Name of the aggregate file referencing every component.
pub const ALL_FILE: &str = "all.json";
/// `$schema` stamped on every component file.
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/schema#";

/// One file to be written into the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub schema: Value,
}

/// A component that could not be converted.
#[derive(Debug)]
pub struct ComponentFailure {
    pub title: String,
    pub error: ConvertError,
}

/// Every file produced for one document, in emission order.
#[derive(Debug, Default)]
pub struct OutputSet {
    pub files: Vec<OutputFile>,
    pub failures: Vec<ComponentFailure>,
}

impl OutputSet {
    /// Content of the file called `name`, if produced.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .map(|file| &file.schema)
    }

    /// Add a file; a later file with the same name replaces the earlier one.
    fn push(&mut self, file: OutputFile) {
        match self.files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => {
                tracing::debug!(file = %file.name, "overwriting previously generated file");
                *existing = file;
            }
            None => self.files.push(file),
        }
    }
}

/// Convert a whole document into its output files.
///
/// # Errors
///
/// Extraction errors from [`body_components`] / [`parameter_components`]
/// abort the run. Per-component errors are collected in
/// [`OutputSet::failures`] instead.
pub fn build_output(
    document: &SchemaDocument,
    options: &ConvertOptions,
) -> Result<OutputSet, ConvertError> {
    let version = document.spec_version();
    let mut output = OutputSet::default();
    let mut resolver = RefResolver::new();

    tracing::debug!(declared = document.version(), %version, "converting document");

    let components = match version {
        SpecVersion::Swagger2 => {
            tracing::info!("Generating shared definitions");
            let mut definitions = document.definitions();
            if options.kubernetes {
                definitions = kubernetes::augment_definitions(definitions, options.expanded);
            }

            if options.strict {
                definitions = additional_properties_of_each(definitions);
            }
            let shared = json!({ "definitions": definitions.clone() });

            if options.stand_alone {
                let file_name = options.prefix.split('#').next().unwrap_or_default();
                resolver.insert(file_name, rewrite_refs(shared.clone(), &options.prefix, version));
            }
            output.push(OutputFile {
                name: DEFINITIONS_FILE.to_string(),
                schema: shared,
            });
            definitions
        }
        SpecVersion::OpenApi3 => {
            let mut components = document.component_schemas();
            if options.include_bodies {
                let paths = document.paths();
                components.extend(body_components(&paths)?);
                components.extend(parameter_components(
                    &paths,
                    &document.component_parameters(),
                )?);
            }

            if options.stand_alone {
                for (title, schema) in &components {
                    resolver.insert(
                        format!("{title}.json"),
                        rewrite_refs(schema.clone(), &options.prefix, version),
                    );
                }
            }
            components
        }
    };

    tracing::info!("Generating individual schemas");
    let mut converted = Vec::with_capacity(components.len());
    for (title, schema) in components {
        match component_file(&title, schema, version, options, &resolver) {
            Ok(file) => {
                tracing::debug!(file = %file.name, "Generating schema file");
                output.push(file);
                converted.push(title);
            }
            Err(error) => {
                tracing::error!(component = %title, %error, "An error occurred processing component");
                output.failures.push(ComponentFailure { title, error });
            }
        }
    }

    tracing::info!("Generating schema for all types");
    output.push(OutputFile {
        name: ALL_FILE.to_string(),
        schema: all_schema(&converted, version, &options.prefix),
    });

    Ok(output)
}

/// Convert one named component into its output file.
fn component_file(
    title: &str,
    schema: Value,
    version: SpecVersion,
    options: &ConvertOptions,
    resolver: &RefResolver,
) -> Result<OutputFile, ConvertError> {
    let stem = if options.kubernetes {
        kubernetes::file_stem(title, options.expanded)?
    } else if version == SpecVersion::OpenApi3 {
        // The lower-cased ref target: `Api.Pet` is referenced as `Api.Pet.json`
        title.to_lowercase()
    } else {
        kubernetes::kind_of(title)
    };
    if options.kubernetes {
        kubernetes::check_supported(title, options.stand_alone)?;
    }

    let Value::Object(mut schema) = schema else {
        return Err(ConvertError::SchemaError {
            path: title.to_string(),
            message: "component schema must be a mapping".to_string(),
        });
    };
    schema.insert("$schema".to_string(), Value::String(SCHEMA_DIALECT.to_string()));
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    if options.strict {
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    let mut schema = rewrite_refs(Value::Object(schema), &options.prefix, version);
    if options.stand_alone {
        schema = inline_refs(schema, resolver, options.max_depth)?;
    }

    if options.strict {
        schema = additional_properties(schema);
    }
    if let Value::Object(obj) = &mut schema {
        if options.kubernetes {
            map_properties(obj, |properties| {
                nullable_optional_fields(int_or_string_expansion(properties))
            });
        }
    }

    Ok(OutputFile {
        name: format!("{stem}.json"),
        schema,
    })
}

/// Apply `f` to the `properties` mapping, if any.
fn map_properties(obj: &mut Map<String, Value>, f: impl FnOnce(Value) -> Value) {
    if let Some(properties) = obj.get_mut("properties") {
        *properties = f(properties.take());
    }
}

/// `{"oneOf": [{"$ref": ...}, ...]}` over the converted component titles.
fn all_schema(titles: &[String], version: SpecVersion, prefix: &str) -> Value {
    let refs: Vec<Value> = titles
        .iter()
        .map(|title| {
            let reference = match version {
                SpecVersion::Swagger2 => format!("{prefix}#/definitions/{title}"),
                SpecVersion::OpenApi3 => {
                    format!("{}.json", title.replace(COMPONENT_SCHEMAS_PREFIX, ""))
                }
            };
            json!({ "$ref": reference })
        })
        .collect();
    json!({ "oneOf": refs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn openapi3(components: Value) -> SchemaDocument {
        SchemaDocument::from_value(json!({
            "openapi": "3.0.0",
            "paths": {},
            "components": { "schemas": components }
        }))
        .unwrap()
    }

    #[test]
    fn test_component_file_stamps_dialect_and_type() {
        let doc = openapi3(json!({ "Tag": { "properties": { "name": { "type": "string" } } } }));
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();

        assert_eq!(
            output.get("tag.json"),
            Some(&json!({
                "properties": { "name": { "type": "string" } },
                "$schema": "http://json-schema.org/schema#",
                "type": "object"
            }))
        );
    }

    #[test]
    fn test_existing_type_kept() {
        let doc = openapi3(json!({ "Pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } } }));
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();
        let pets = output.get("pets.json").unwrap();
        assert_eq!(pets["type"], json!("array"));
        assert_eq!(pets["items"]["$ref"], json!("Pet.json"));
    }

    #[test]
    fn test_non_mapping_component_is_failure() {
        let doc = openapi3(json!({ "Broken": true, "Tag": {} }));
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();

        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].title, "Broken");
        assert!(output.get("broken.json").is_none());
        assert_eq!(
            output.get(ALL_FILE),
            Some(&json!({ "oneOf": [{ "$ref": "Tag.json" }] }))
        );
    }

    #[test]
    fn test_strict_seals_top_level_and_nested() {
        let doc = openapi3(json!({
            "Pet": {
                "properties": {
                    "owner": { "type": "object", "properties": { "name": { "type": "string" } } }
                }
            }
        }));
        let options = ConvertOptions {
            strict: true,
            ..ConvertOptions::default()
        };
        let output = build_output(&doc, &options).unwrap();
        let pet = output.get("pet.json").unwrap();

        assert_eq!(pet["additionalProperties"], json!(false));
        assert_eq!(pet["properties"]["owner"]["additionalProperties"], json!(false));
    }

    #[test]
    fn test_later_file_with_same_name_wins() {
        let doc = SchemaDocument::from_value(json!({
            "swagger": "2.0",
            "definitions": {
                "v1.Thing": { "description": "first" },
                "v2.Thing": { "description": "second" }
            }
        }))
        .unwrap();
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();

        let names: Vec<&str> = output.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, [DEFINITIONS_FILE, "thing.json", ALL_FILE]);
        assert_eq!(output.get("thing.json").unwrap()["description"], json!("second"));
    }

    #[test]
    fn test_openapi3_dotted_title_names_file_after_whole_title() {
        let doc = openapi3(json!({
            "Api.Pet": {
                "properties": { "category": { "$ref": "#/components/schemas/Api.Category" } }
            },
            "Api.Category": { "type": "object" }
        }));
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();

        let names: Vec<&str> = output.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["api.pet.json", "api.category.json", ALL_FILE]);
        assert_eq!(
            output.get("api.pet.json").unwrap()["properties"]["category"]["$ref"],
            json!("Api.Category.json")
        );
        assert_eq!(
            output.get(ALL_FILE),
            Some(&json!({ "oneOf": [{ "$ref": "Api.Pet.json" }, { "$ref": "Api.Category.json" }] }))
        );
    }

    #[test]
    fn test_swagger2_strict_components_sealed_like_shared_file() {
        let doc = SchemaDocument::from_value(json!({
            "swagger": "2.0",
            "definitions": {
                "Pets": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "a": { "type": "string" },
                            "labels": {
                                "type": "object",
                                "additionalProperties": {
                                    "type": "object",
                                    "properties": { "b": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let options = ConvertOptions {
            strict: true,
            ..ConvertOptions::default()
        };
        let output = build_output(&doc, &options).unwrap();

        let shared = &output.get(DEFINITIONS_FILE).unwrap()["definitions"]["Pets"]["items"];
        let component = &output.get("pets.json").unwrap()["items"];
        assert_eq!(component, shared);
        assert_eq!(component["additionalProperties"], json!(false));
        assert_eq!(
            component["properties"]["labels"]["additionalProperties"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn test_strict_leaves_field_named_properties_alone() {
        let doc = openapi3(json!({
            "Schema": { "properties": { "properties": { "type": "object" } } }
        }));
        let options = ConvertOptions {
            strict: true,
            ..ConvertOptions::default()
        };
        let output = build_output(&doc, &options).unwrap();
        let schema = output.get("schema.json").unwrap();

        assert_eq!(schema["properties"], json!({ "properties": { "type": "object" } }));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn test_swagger2_definitions_file_and_all() {
        let doc = SchemaDocument::from_value(json!({
            "swagger": "2.0",
            "paths": {},
            "definitions": {
                "Category": { "type": "object", "properties": { "id": { "type": "integer" } } },
                "Pet": {
                    "type": "object",
                    "properties": { "category": { "$ref": "#/definitions/Category" } }
                }
            }
        }))
        .unwrap();
        let output = build_output(&doc, &ConvertOptions::default()).unwrap();

        // Shared file keeps in-document fragments
        assert_eq!(
            output.get(DEFINITIONS_FILE).unwrap()["definitions"]["Pet"]["properties"]["category"]
                ["$ref"],
            json!("#/definitions/Category")
        );
        assert_eq!(
            output.get("pet.json").unwrap()["properties"]["category"]["$ref"],
            json!("_definitions.json#/definitions/Category")
        );
        assert_eq!(
            output.get(ALL_FILE),
            Some(&json!({
                "oneOf": [
                    { "$ref": "_definitions.json#/definitions/Category" },
                    { "$ref": "_definitions.json#/definitions/Pet" }
                ]
            }))
        );
    }

    #[test]
    fn test_bodies_only_extracted_when_requested() {
        let doc = SchemaDocument::from_value(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "post": {
                        "operationId": "createPet",
                        "requestBody": {
                            "content": { "application/json": { "schema": { "type": "object" } } }
                        },
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap();

        let plain = build_output(&doc, &ConvertOptions::default()).unwrap();
        assert_eq!(plain.files.len(), 1);

        let options = ConvertOptions {
            include_bodies: true,
            ..ConvertOptions::default()
        };
        let output = build_output(&doc, &options).unwrap();
        assert!(output.get("paths_pets_post_request_json.json").is_some());
        assert_eq!(
            output.get("createpet.json").unwrap()["requestBody"],
            json!("paths_pets_post_request_json.json")
        );
    }

    #[test]
    fn test_extraction_error_aborts() {
        let doc = SchemaDocument::from_value(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "get": { "operationId": "listPets" } } }
        }))
        .unwrap();
        let options = ConvertOptions {
            include_bodies: true,
            ..ConvertOptions::default()
        };
        assert!(matches!(
            build_output(&doc, &options),
            Err(ConvertError::MissingField { .. })
        ));
    }
}
