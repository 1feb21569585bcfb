//! Fixed response schema and its normalizer.
//!
//! The model is asked for one JSON object with thirteen scenario lists and four
//! analysis blocks. Whatever comes back, `normalize` guarantees that every list
//! key holds an array and every block key holds an object. Keys outside the
//! schema are kept untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::{is_blank, value_to_text};

/// Scenario categories in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Functional,
    Negative,
    Boundary,
    Integration,
    Usability,
    Load,
    Stress,
    Acceptance,
    Smoke,
    Exploratory,
    Compatibility,
    Recovery,
    Security,
}

impl Category {
    /// Declaration order is the row order of every generated table.
    pub const ALL: [Category; 13] = [
        Category::Functional,
        Category::Negative,
        Category::Boundary,
        Category::Integration,
        Category::Usability,
        Category::Load,
        Category::Stress,
        Category::Acceptance,
        Category::Smoke,
        Category::Exploratory,
        Category::Compatibility,
        Category::Recovery,
        Category::Security,
    ];

    /// Key used in the model payload.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Functional => "cenarios_funcionais",
            Category::Negative => "cenarios_negativos",
            Category::Boundary => "cenarios_borda",
            Category::Integration => "cenarios_integracao",
            Category::Usability => "cenarios_usabilidade",
            Category::Load => "cenarios_carga",
            Category::Stress => "cenarios_estresse",
            Category::Acceptance => "cenarios_aceitacao",
            Category::Smoke => "cenarios_smoke",
            Category::Exploratory => "cenarios_exploratorios",
            Category::Compatibility => "cenarios_compatibilidade",
            Category::Recovery => "cenarios_recuperacao",
            Category::Security => "cenarios_seguranca",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.key() == key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Object-valued blocks of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Metadata,
    PredictiveAnalysis,
    RequirementsAnalysis,
    QualityMetrics,
}

impl Block {
    pub const ALL: [Block; 4] = [
        Block::Metadata,
        Block::PredictiveAnalysis,
        Block::RequirementsAnalysis,
        Block::QualityMetrics,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Block::Metadata => "meta_info",
            Block::PredictiveAnalysis => "analise_preditiva_bugs",
            Block::RequirementsAnalysis => "analise_requisitos",
            Block::QualityMetrics => "metricas_qualidade",
        }
    }
}

/// `meta_info` fields the pipeline reads or defaults.
pub mod meta_keys {
    pub const TARGET_FEATURE: &str = "funcionalidade_alvo";
    pub const GENERATED_ON: &str = "data_geracao";
    pub const PERCEIVED_COMPLEXITY: &str = "complexidade_percebida";
}

/// `analise_preditiva_bugs` fields shown above the table.
pub mod prediction_keys {
    pub const ESTIMATED_BUGS: &str = "estimativa_total_bugs_esperados";
    pub const TOP_RISK_AREAS: &str = "top_3_areas_risco_critico";
}

/// A response object that satisfies the schema invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    fields: Map<String, Value>,
}

impl NormalizedRecord {
    /// Scenarios of one category, in payload order.
    pub fn scenarios(&self, category: Category) -> &[Value] {
        match self.fields.get(category.key()) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    pub fn block(&self, block: Block) -> Option<&Map<String, Value>> {
        self.fields.get(block.key()).and_then(Value::as_object)
    }

    fn block_mut(&mut self, block: Block) -> Option<&mut Map<String, Value>> {
        self.fields.get_mut(block.key()).and_then(Value::as_object_mut)
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.block(Block::Metadata)
    }

    pub fn predictive_analysis(&self) -> Option<&Map<String, Value>> {
        self.block(Block::PredictiveAnalysis)
    }

    /// Total scenario count across all categories.
    pub fn scenario_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.scenarios(*c).len()).sum()
    }

    /// Top-level keys outside the schema, kept for debugging.
    pub fn extra_keys(&self) -> Vec<&str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|k| Category::from_key(k).is_none() && !Block::ALL.iter().any(|b| b.key() == *k))
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Force `payload` into the schema. Non-object payloads start from `{}`.
pub fn normalize(payload: Value) -> NormalizedRecord {
    let mut fields = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for category in Category::ALL {
        let valid = matches!(fields.get(category.key()), Some(Value::Array(_)));
        if !valid {
            fields.insert(category.key().to_string(), Value::Array(Vec::new()));
        }
    }

    for block in Block::ALL {
        let valid = matches!(fields.get(block.key()), Some(Value::Object(_)));
        if !valid {
            fields.insert(block.key().to_string(), Value::Object(Map::new()));
        }
    }

    NormalizedRecord { fields }
}

/// Fill generation date and target feature when the model left them blank.
/// Present non-blank values are never overwritten.
pub fn apply_metadata_defaults(record: &mut NormalizedRecord, document_name: &str, today: NaiveDate) {
    let Some(meta) = record.block_mut(Block::Metadata) else {
        return;
    };

    let date_missing = meta.get(meta_keys::GENERATED_ON).map_or(true, is_blank);
    if date_missing {
        meta.insert(
            meta_keys::GENERATED_ON.to_string(),
            Value::String(today.format("%Y-%m-%d").to_string()),
        );
    }

    let feature_missing = meta.get(meta_keys::TARGET_FEATURE).map_or(true, is_blank);
    if feature_missing {
        meta.insert(
            meta_keys::TARGET_FEATURE.to_string(),
            Value::String(document_name.to_string()),
        );
    }
}

/// Header block shown above each document's table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryBlock {
    pub target_feature: String,
    pub generated_on: String,
    pub perceived_complexity: String,
    pub estimated_bug_total: String,
    pub top_risk_areas: String,
}

impl SummaryBlock {
    pub fn from_record(record: &NormalizedRecord) -> Self {
        let meta = record.metadata();
        let prediction = record.predictive_analysis();

        let top_risk_areas = match prediction.and_then(|p| p.get(prediction_keys::TOP_RISK_AREAS)) {
            Some(Value::Array(items)) => items.iter().map(value_to_text).collect::<Vec<_>>().join(", "),
            Some(other) => value_to_text(other),
            None => String::new(),
        };

        Self {
            target_feature: field_text(meta, meta_keys::TARGET_FEATURE),
            generated_on: field_text(meta, meta_keys::GENERATED_ON),
            perceived_complexity: field_text(meta, meta_keys::PERCEIVED_COMPLEXITY),
            estimated_bug_total: field_text(prediction, prediction_keys::ESTIMATED_BUGS),
            top_risk_areas,
        }
    }
}

fn field_text(block: Option<&Map<String, Value>>, key: &str) -> String {
    block.and_then(|m| m.get(key)).map(value_to_text).unwrap_or_default()
}
