use crate::pipeline::extraction::DocumentSection;

pub const QA_SYSTEM_PROMPT: &str = r#"
Você é um Engenheiro de QA Sênior e Especialista em Automação com 15+ anos de experiência.

Sua missão: analisar a funcionalidade e gerar testes completos + análise preditiva de bugs.

REGRAS:
1. NÃO produza explicações fora do JSON. Apenas JSON válido em português (PT-BR).
2. Mantenha todas as chaves da estrutura, mesmo que vazias.
3. Se uma categoria não for aplicável, retorne [].
4. Cada cenário é um objeto com: id, titulo, descricao, pre_condicoes (lista),
   passos (lista), dados_teste, resultado_esperado, prioridade (Alta | Média | Baixa).
"#;

/// JSON shape the model must fill. Keys match `schema::Category` and `schema::Block`.
pub const RESPONSE_TEMPLATE: &str = r#"ESTRUTURA DO JSON FINAL:
{
  "meta_info": {
    "funcionalidade_alvo": "",
    "data_geracao": "",
    "complexidade_percebida": ""
  },
  "analise_preditiva_bugs": {
    "estimativa_total_bugs_esperados": "",
    "densidade_defeitos_por_area": {
      "funcional": "",
      "seguranca": "",
      "usabilidade": "",
      "integracao": ""
    },
    "top_3_areas_risco_critico": [],
    "justificativa_analise": ""
  },
  "analise_requisitos": {
    "riscos_identificados": [],
    "suposicoes": []
  },
  "cenarios_funcionais": [],
  "cenarios_negativos": [],
  "cenarios_borda": [],
  "cenarios_integracao": [],
  "cenarios_usabilidade": [],
  "cenarios_carga": [],
  "cenarios_estresse": [],
  "cenarios_aceitacao": [],
  "cenarios_smoke": [],
  "cenarios_exploratorios": [],
  "cenarios_compatibilidade": [],
  "cenarios_recuperacao": [],
  "cenarios_seguranca": [],
  "metricas_qualidade": {
    "cobertura_caminhos_logicos": "",
    "prioridade_automacao": ""
  }
}"#;

/// Appended when the prompt had to be cut to fit the budget.
pub const REDUCTION_NOTE: &str = "... (conteúdo reduzido automaticamente)";

/// Build the user prompt for one document.
///
/// Requirement lines are flattened to one line each. If the result exceeds
/// `max_chars` characters it is cut at the budget, the trailing partial line
/// is dropped and [`REDUCTION_NOTE`] is appended.
pub fn build_prompt(
    sections: &[DocumentSection],
    feature_name: Option<&str>,
    max_chars: usize,
) -> String {
    let mut prompt = String::from(RESPONSE_TEMPLATE);
    prompt.push_str("\n\n");

    if let Some(name) = feature_name.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("FUNCIONALIDADE_ALVO: {name}\n"));
    }

    prompt.push_str("\nREQUISITOS_ANALISADOS:\n");
    for section in sections {
        prompt.push_str(&format!("\nSEÇÃO: {}\n", section.title));
        for requirement in &section.requirements {
            let line = requirement.trim().replace('\n', " ");
            prompt.push_str(&format!("- {line}\n"));
        }
    }

    apply_budget(prompt, max_chars)
}

fn apply_budget(prompt: String, max_chars: usize) -> String {
    let total = prompt.chars().count();
    if total <= max_chars {
        return prompt;
    }

    tracing::warn!(
        chars = total,
        budget = max_chars,
        "Requirements too long, prompt reduced"
    );

    let cut: String = prompt.chars().take(max_chars).collect();
    let kept = match cut.rfind('\n') {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{kept}\n{REDUCTION_NOTE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::schema::{Block, Category};

    fn section(title: &str, reqs: &[&str]) -> DocumentSection {
        DocumentSection {
            title: title.into(),
            requirements: reqs.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn template_lists_every_schema_key() {
        for category in Category::ALL {
            assert!(RESPONSE_TEMPLATE.contains(&format!("\"{}\"", category.key())));
        }
        for block in Block::ALL {
            assert!(RESPONSE_TEMPLATE.contains(&format!("\"{}\"", block.key())));
        }
    }

    #[test]
    fn prompt_contains_header_and_sections() {
        let prompt = build_prompt(
            &[
                section("Login", &["O usuário informa e-mail", "Senha\ncom quebra"]),
                section("Logout", &["  Botão sair  "]),
            ],
            Some("Autenticação"),
            100_000,
        );
        assert!(prompt.starts_with("ESTRUTURA DO JSON FINAL:"));
        assert!(prompt.contains("FUNCIONALIDADE_ALVO: Autenticação\n"));
        assert!(prompt.contains("\nREQUISITOS_ANALISADOS:\n"));
        assert!(prompt.contains("\nSEÇÃO: Login\n- O usuário informa e-mail\n- Senha com quebra\n"));
        assert!(prompt.contains("\nSEÇÃO: Logout\n- Botão sair\n"));
        assert!(!prompt.contains(REDUCTION_NOTE));
    }

    #[test]
    fn blank_feature_name_has_no_header() {
        let prompt = build_prompt(&[], Some("  "), 100_000);
        assert!(!prompt.contains("FUNCIONALIDADE_ALVO"));
        let prompt = build_prompt(&[], None, 100_000);
        assert!(!prompt.contains("FUNCIONALIDADE_ALVO"));
    }

    #[test]
    fn long_prompt_is_reduced_on_a_line_boundary() {
        let reqs: Vec<String> = (0..500).map(|i| format!("Requisito número {i}")).collect();
        let refs: Vec<&str> = reqs.iter().map(String::as_str).collect();
        let budget = 2_000;
        let prompt = build_prompt(&[section("Grande", &refs)], Some("X"), budget);

        assert!(prompt.ends_with(&format!("\n{REDUCTION_NOTE}")));
        let body = prompt.trim_end_matches(REDUCTION_NOTE).trim_end_matches('\n');
        assert!(body.chars().count() <= budget);
        // The last kept line is complete.
        let last = body.lines().last().unwrap();
        assert!(last.starts_with("- Requisito número "));
        assert!(reqs.iter().any(|r| last == format!("- {r}")));
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        let text = "ção\n".repeat(10);
        let reduced = apply_budget(text, 10);
        assert_eq!(reduced, format!("ção\nção\n{REDUCTION_NOTE}"));
    }
}
