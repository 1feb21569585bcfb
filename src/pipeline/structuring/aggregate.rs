use serde::Serialize;
use serde_json::Value;

use super::coerce::{as_text, as_text_list, first_present, value_to_text};
use super::schema::{Category, NormalizedRecord};

/// Scenario keys as the model spells them.
pub mod scenario_keys {
    pub const ID: &str = "id";
    pub const TITLE: &str = "titulo";
    pub const DESCRIPTION: &str = "descricao";
    /// Checked in order; the model alternates between spellings.
    pub const PRECONDITIONS: &[&str] = &["pre_condicao", "pre_condicoes", "precondições"];
    pub const STEPS: &str = "passos";
    pub const TEST_DATA: &str = "dados_teste";
    pub const EXPECTED_RESULT: &str = "resultado_esperado";
    pub const PRIORITY: &str = "prioridade";
}

/// One table row, flattened from a single scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRow {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Preconditions joined with line breaks.
    pub preconditions: String,
    /// Steps joined with line breaks.
    pub steps: String,
    pub test_data: String,
    pub expected_result: String,
    pub priority: String,
    pub category: Category,
}

/// Flatten every category into rows: canonical category order, then payload
/// order inside a category. One row per list element, malformed or not.
pub fn aggregate(record: &NormalizedRecord) -> Vec<AggregatedRow> {
    let mut rows = Vec::with_capacity(record.scenario_count());
    for category in Category::ALL {
        for scenario in record.scenarios(category) {
            rows.push(flatten_scenario(scenario, category));
        }
    }
    rows
}

fn flatten_scenario(scenario: &Value, category: Category) -> AggregatedRow {
    if !scenario.is_object() {
        return AggregatedRow {
            id: String::new(),
            title: String::new(),
            description: value_to_text(scenario),
            preconditions: String::new(),
            steps: String::new(),
            test_data: String::new(),
            expected_result: String::new(),
            priority: String::new(),
            category,
        };
    }

    let title = as_text(scenario, scenario_keys::TITLE);
    let own_id = as_text(scenario, scenario_keys::ID);
    let id = if own_id.is_empty() { title.clone() } else { own_id };

    let preconditions = first_present(scenario, scenario_keys::PRECONDITIONS)
        .map(as_text_list)
        .unwrap_or_default();
    let steps = scenario
        .get(scenario_keys::STEPS)
        .map(as_text_list)
        .unwrap_or_default();

    AggregatedRow {
        id,
        title,
        description: as_text(scenario, scenario_keys::DESCRIPTION),
        preconditions: preconditions.join("\n"),
        steps: steps.join("\n"),
        test_data: as_text(scenario, scenario_keys::TEST_DATA),
        expected_result: as_text(scenario, scenario_keys::EXPECTED_RESULT),
        priority: as_text(scenario, scenario_keys::PRIORITY),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::schema::normalize;
    use serde_json::json;

    #[test]
    fn bare_string_and_partial_record() {
        let record = normalize(json!({
            "cenarios_funcionais": ["bump the button", {"titulo": "Login falha"}]
        }));
        let rows = aggregate(&record);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].title, "");
        assert_eq!(rows[0].description, "bump the button");
        assert_eq!(rows[0].id, "");
        assert_eq!(rows[0].steps, "");

        assert_eq!(rows[1].title, "Login falha");
        // Missing id falls back to the title.
        assert_eq!(rows[1].id, "Login falha");
        assert_eq!(rows[1].description, "");
        assert_eq!(rows[1].preconditions, "");
        assert_eq!(rows[1].expected_result, "");
        assert!(rows.iter().all(|r| r.category == Category::Functional));
    }

    #[test]
    fn full_scenario_is_flattened() {
        let record = normalize(json!({
            "cenarios_negativos": [{
                "id": "CN-01",
                "titulo": "Senha inválida",
                "descricao": "Usuário digita senha errada",
                "pre_condicoes": ["Usuário cadastrado", "Tela de login aberta"],
                "passos": "1. Digitar e-mail\n2. Digitar senha errada\n3. Clicar em Entrar",
                "dados_teste": {"email": "a@b.com"},
                "resultado_esperado": "Mensagem de erro exibida",
                "prioridade": "Alta"
            }]
        }));
        let rows = aggregate(&record);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, "CN-01");
        assert_eq!(row.preconditions, "Usuário cadastrado\nTela de login aberta");
        assert_eq!(
            row.steps,
            "1. Digitar e-mail\n2. Digitar senha errada\n3. Clicar em Entrar"
        );
        assert_eq!(row.test_data, r#"{"email":"a@b.com"}"#);
        assert_eq!(row.priority, "Alta");
        assert_eq!(row.category, Category::Negative);
    }

    #[test]
    fn singular_precondition_key_wins() {
        let record = normalize(json!({
            "cenarios_smoke": [{"pre_condicao": "A", "pre_condicoes": "B"}]
        }));
        assert_eq!(aggregate(&record)[0].preconditions, "A");
    }

    #[test]
    fn empty_id_uses_title() {
        let record = normalize(json!({"cenarios_carga": [{"id": "", "titulo": "Pico"}]}));
        assert_eq!(aggregate(&record)[0].id, "Pico");
    }

    #[test]
    fn row_count_is_sum_of_category_lengths() {
        let record = normalize(json!({
            "cenarios_seguranca": [{"id": "S1"}, "texto solto", null],
            "cenarios_borda": [1, 2],
            "cenarios_usabilidade": {"not": "a list"},
            "cenarios_recuperacao": [[1, 2]]
        }));
        let expected: usize = Category::ALL.iter().map(|c| record.scenarios(*c).len()).sum();
        assert_eq!(expected, 6);
        assert_eq!(aggregate(&record).len(), expected);
    }

    #[test]
    fn canonical_order_ignores_payload_order() {
        let record = normalize(json!({
            "cenarios_seguranca": [{"id": "sec"}],
            "cenarios_smoke": [{"id": "smoke"}],
            "cenarios_funcionais": [{"id": "f1"}, {"id": "f2"}],
            "cenarios_negativos": [{"id": "neg"}]
        }));
        let ids: Vec<String> = aggregate(&record).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["f1", "f2", "neg", "smoke", "sec"]);
    }

    #[test]
    fn degraded_elements_use_text_form() {
        let record = normalize(json!({"cenarios_estresse": [42, null, ["a"]]}));
        let rows = aggregate(&record);
        assert_eq!(rows[0].description, "42");
        assert_eq!(rows[1].description, "");
        assert_eq!(rows[2].description, r#"["a"]"#);
    }

    #[test]
    fn empty_record_has_no_rows() {
        assert!(aggregate(&normalize(Value::Null)).is_empty());
    }
}
