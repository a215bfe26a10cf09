use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const PRODUCER: &str = "https://github.com/frame-lineage/frame-lineage";
pub const RUN_EVENT_SCHEMA_URL: &str =
    "https://openlineage.io/spec/2-0-2/OpenLineage.json#/$defs/RunEvent";
pub const JOB_TYPE_FACET_SCHEMA_URL: &str =
    "https://openlineage.io/spec/facets/2-0-3/JobTypeJobFacet.json#/$defs/JobTypeJobFacet";
pub const SCHEMA_FACET_SCHEMA_URL: &str =
    "https://openlineage.io/spec/facets/1-1-1/SchemaDatasetFacet.json#/$defs/SchemaDatasetFacet";

/// Placeholder type for every observed column. Real types are not inferred.
pub const PLACEHOLDER_COLUMN_TYPE: &str = "string";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Start,
    Complete,
}

/// OpenLineage run event. Field names follow the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    pub event_type: EventType,
    pub event_time: String,
    pub run: Run,
    pub job: Job,
    pub inputs: Vec<Dataset>,
    pub outputs: Vec<Dataset>,
    pub producer: String,
    #[serde(rename = "schemaURL")]
    pub schema_url: String,
}

impl RunEvent {
    pub fn new(
        event_type: EventType,
        event_time: DateTime<Utc>,
        run_id: Uuid,
        job: Job,
        inputs: Vec<Dataset>,
        outputs: Vec<Dataset>,
    ) -> Self {
        Self {
            event_type,
            event_time: event_time.to_rfc3339_opts(SecondsFormat::Micros, true),
            run: Run {
                run_id: run_id.to_string(),
                facets: BTreeMap::new(),
            },
            job,
            inputs,
            outputs,
            producer: PRODUCER.to_string(),
            schema_url: RUN_EVENT_SCHEMA_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    #[serde(default)]
    pub facets: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub namespace: String,
    pub name: String,
    pub facets: JobFacets,
}

impl Job {
    pub fn task(namespace: &str, name: &str, integration: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            facets: JobFacets {
                job_type: JobTypeFacet {
                    producer: PRODUCER.to_string(),
                    schema_url: JOB_TYPE_FACET_SCHEMA_URL.to_string(),
                    job_type: "TASK".to_string(),
                    integration: integration.to_string(),
                    processing_type: "BATCH".to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFacets {
    pub job_type: JobTypeFacet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTypeFacet {
    #[serde(rename = "_producer")]
    pub producer: String,
    #[serde(rename = "_schemaURL")]
    pub schema_url: String,
    pub job_type: String,
    pub integration: String,
    pub processing_type: String,
}

/// A namespaced dataset with its schema facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub namespace: String,
    pub name: String,
    pub facets: DatasetFacets,
}

impl Dataset {
    pub fn with_columns(namespace: String, name: String, columns: &[String]) -> Self {
        Self {
            namespace,
            name,
            facets: DatasetFacets {
                schema: SchemaFacet {
                    producer: PRODUCER.to_string(),
                    schema_url: SCHEMA_FACET_SCHEMA_URL.to_string(),
                    fields: columns
                        .iter()
                        .map(|c| SchemaField {
                            name: c.clone(),
                            field_type: PLACEHOLDER_COLUMN_TYPE.to_string(),
                        })
                        .collect(),
                },
            },
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.facets.schema.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFacets {
    pub schema: SchemaFacet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFacet {
    #[serde(rename = "_producer")]
    pub producer: String,
    #[serde(rename = "_schemaURL")]
    pub schema_url: String,
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}
