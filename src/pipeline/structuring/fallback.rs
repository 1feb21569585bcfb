// Heuristic scenarios for runs without a model.
// The output is a response document in the regular schema, so it goes through
// the same parser, normalizer and aggregator as a model response.

use serde_json::{json, Map, Value};

use super::aggregate::scenario_keys;
use super::schema::{meta_keys, Block, Category};
use super::StructuringError;

/// Lines at most this long (after trimming) are ignored.
const MIN_LINE_CHARS: usize = 10;
const MAX_BASIC_SCENARIOS: usize = 5;
const TITLE_EXCERPT_CHARS: usize = 50;

fn scenario(id: &str, title: String, precondition: &str, steps: String, expected: &str, priority: &str) -> Value {
    let mut fields = Map::new();
    fields.insert(scenario_keys::ID.into(), json!(id));
    fields.insert(scenario_keys::TITLE.into(), json!(title));
    fields.insert(scenario_keys::PRECONDITIONS[1].into(), json!(precondition));
    fields.insert(scenario_keys::STEPS.into(), json!(steps));
    fields.insert(scenario_keys::EXPECTED_RESULT.into(), json!(expected));
    fields.insert(scenario_keys::PRIORITY.into(), json!(priority));
    Value::Object(fields)
}

/// Up to five functional scenarios, one per substantial line of text.
/// An empty document yields a single default scenario.
pub fn basic_scenarios(document_text: &str) -> Vec<Value> {
    let scenarios: Vec<Value> = document_text
        .lines()
        .map(str::trim)
        .filter(|l| l.chars().count() > MIN_LINE_CHARS)
        .take(MAX_BASIC_SCENARIOS)
        .enumerate()
        .map(|(i, line)| {
            let idx = i + 1;
            let excerpt: String = line.chars().take(TITLE_EXCERPT_CHARS).collect();
            scenario(
                &format!("TC{idx:03}"),
                format!("Teste de Funcionalidade - {excerpt}"),
                "Aplicação instalada e configurada",
                format!("1. Acessar a funcionalidade\n2. Verificar: {line}\n3. Validar resultado"),
                "Funcionalidade funcionando conforme esperado",
                if idx % 3 == 0 { "Média" } else { "Alta" },
            )
        })
        .collect();

    if !scenarios.is_empty() {
        return scenarios;
    }

    vec![scenario(
        "TC001",
        "Teste Padrão - Validação do Documento".to_string(),
        "Documento disponível",
        "1. Ler documento\n2. Validar conteúdo\n3. Confirmar estrutura".to_string(),
        "Documento processado com sucesso",
        "Alta",
    )]
}

/// Render an offline response document for `document_text`.
pub fn offline_response(document_text: &str, feature_name: &str) -> Result<String, StructuringError> {
    let scenarios = basic_scenarios(document_text);
    tracing::info!(
        doc = %feature_name,
        scenarios = scenarios.len(),
        "Basic scenarios generated offline"
    );

    let mut meta = Map::new();
    meta.insert(meta_keys::TARGET_FEATURE.into(), json!(feature_name));

    let mut response = Map::new();
    response.insert(Block::Metadata.key().into(), Value::Object(meta));
    response.insert(Category::Functional.key().into(), Value::Array(scenarios));

    serde_json::to_string_pretty(&Value::Object(response))
        .map_err(|e| StructuringError::Fallback(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::aggregate::aggregate;
    use crate::pipeline::structuring::parser::parse_model_response;
    use crate::pipeline::structuring::schema::normalize;

    #[test]
    fn short_lines_are_skipped() {
        let text = "curto\n\n   O sistema deve permitir login por e-mail   \nok";
        let scenarios = basic_scenarios(text);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0]["id"], "TC001");
        assert_eq!(
            scenarios[0]["titulo"],
            "Teste de Funcionalidade - O sistema deve permitir login por e-mail"
        );
        assert_eq!(
            scenarios[0]["passos"],
            "1. Acessar a funcionalidade\n2. Verificar: O sistema deve permitir login por e-mail\n3. Validar resultado"
        );
    }

    #[test]
    fn at_most_five_and_every_third_is_medium() {
        let text: String = (1..=8).map(|i| format!("Requisito funcional número {i}\n")).collect();
        let scenarios = basic_scenarios(&text);
        assert_eq!(scenarios.len(), 5);
        let ids: Vec<&str> = scenarios.iter().map(|s| s["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["TC001", "TC002", "TC003", "TC004", "TC005"]);
        let priorities: Vec<&str> = scenarios.iter().map(|s| s["prioridade"].as_str().unwrap()).collect();
        assert_eq!(priorities, vec!["Alta", "Alta", "Média", "Alta", "Alta"]);
    }

    #[test]
    fn title_excerpt_is_fifty_characters() {
        let line = "á".repeat(80);
        let scenarios = basic_scenarios(&line);
        let title = scenarios[0]["titulo"].as_str().unwrap();
        assert_eq!(title, format!("Teste de Funcionalidade - {}", "á".repeat(50)));
    }

    #[test]
    fn empty_document_gets_default_scenario() {
        let scenarios = basic_scenarios("");
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0]["titulo"], "Teste Padrão - Validação do Documento");
        assert_eq!(scenarios[0]["prioridade"], "Alta");
    }

    #[test]
    fn offline_response_flows_through_pipeline() {
        let raw = offline_response("O carrinho deve somar os itens\nO cupom aplica desconto", "Carrinho").unwrap();
        let parsed = parse_model_response(&raw).unwrap();
        let record = normalize(parsed.payload);
        assert_eq!(record.metadata().unwrap()["funcionalidade_alvo"], "Carrinho");

        let rows = aggregate(&record);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].preconditions, "Aplicação instalada e configurada");
        assert_eq!(rows[0].steps.lines().count(), 3);
        assert!(rows.iter().all(|r| r.category == Category::Functional));
    }
}
