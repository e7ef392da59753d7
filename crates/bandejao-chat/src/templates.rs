//! Response templates and the static lookup tables around them.
//!
//! A template binds an intent to candidate answers, optional follow-up
//! suggestions and the slots that must be filled before answering.

use bandejao_core::config::ResponseTemplateConfig;
use bandejao_core::error::BandejaoError;
use bandejao_core::{DialogContext, Intent};

/// Candidate answers for one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTemplate {
    pub intent: Intent,
    /// Candidate answers; may contain `{slot_name}` placeholders.
    pub responses: Vec<String>,
    pub follow_up_questions: Option<Vec<String>>,
    pub requires_slots: Option<Vec<String>>,
}

impl ResponseTemplate {
    pub fn new<S: Into<String>>(intent: Intent, responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            intent,
            responses: responses.into_iter().map(Into::into).collect(),
            follow_up_questions: None,
            requires_slots: None,
        }
    }

    pub fn with_follow_ups<S: Into<String>>(mut self, questions: impl IntoIterator<Item = S>) -> Self {
        self.follow_up_questions = Some(questions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_required_slots<S: Into<String>>(mut self, slots: impl IntoIterator<Item = S>) -> Self {
        self.requires_slots = Some(slots.into_iter().map(Into::into).collect());
        self
    }

    /// Build a template from a `[[templates]]` config entry.
    ///
    /// Empty follow-up and slot lists are treated as absent.
    pub fn from_config(config: &ResponseTemplateConfig) -> Result<Self, BandejaoError> {
        let intent: Intent = config.intent.parse()?;
        Ok(Self {
            intent,
            responses: config.responses.clone(),
            follow_up_questions: non_empty(&config.follow_up_questions),
            requires_slots: non_empty(&config.requires_slots),
        })
    }

    /// Required slots that are absent or unfilled in `context`.
    pub fn missing_slots(&self, context: &DialogContext) -> Vec<String> {
        match &self.requires_slots {
            Some(required) => context.missing_slots(required),
            None => Vec::new(),
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Replace `{slot_name}` placeholders with filled slot values.
///
/// Placeholders naming unknown or unfilled slots are left untouched.
pub fn render(text: &str, context: &DialogContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match context.slot_value(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Clarification question asked for a missing slot.
pub fn slot_question(slot_name: &str) -> String {
    let question = match slot_name {
        "restricao_alimentar" => "Qual é sua restrição alimentar específica?",
        "campus" => "Em qual campus você está?",
        "refeicao" => "Você quer saber sobre o café da manhã, o almoço ou o jantar?",
        "data" => "Para qual dia você gostaria de saber?",
        "forma_pagamento" => "Qual forma de pagamento você pretende usar?",
        "categoria" => "Você é estudante, servidor ou visitante?",
        _ => {
            return format!(
                "Preciso de mais informações sobre {}. Pode me fornecer?",
                slot_name
            )
        }
    };
    question.to_string()
}

/// Suggestions used when a template declares no follow-ups.
pub fn default_suggestions(intent: &Intent) -> Vec<String> {
    let suggestions: &[&str] = match intent {
        Intent::Hours => &["Abre no feriado?", "Qual o cardápio de hoje?", "A fila está grande?"],
        Intent::Price => &["Quais as formas de pagamento?", "Como recarregar o cartão?"],
        Intent::Location => &["Qual o horário de funcionamento?", "Qual o cardápio de hoje?"],
        Intent::Menu => &["Tem opção vegetariana?", "Tem opção vegana?", "Quanto custa?"],
        Intent::VegetarianOption | Intent::VeganOption => {
            &["Qual o cardápio de hoje?", "Tenho alergia, o que posso comer?"]
        }
        Intent::Allergy => &["Qual o cardápio de hoje?", "Tem opção vegetariana?"],
        Intent::PaymentMethods => &["Como recarregar o cartão?", "Quanto custa a refeição?"],
        Intent::CardReload => &["Quais as formas de pagamento?", "Como consultar meu saldo?"],
        Intent::FoodAssistance | Intent::SocialPrograms => {
            &["Como pedir auxílio alimentação?", "Quanto custa a refeição?"]
        }
        Intent::QueueWait => &["Qual o horário de funcionamento?", "Qual o cardápio de hoje?"],
        Intent::HolidayHours => &["Qual o horário de funcionamento?", "Onde fica o restaurante?"],
        Intent::SanitaryProtocol => &["Qual o horário de funcionamento?", "Como falar com a administração?"],
        Intent::Contact => &["Qual o horário de funcionamento?", "Onde fica o restaurante?"],
        Intent::Greeting => &["Qual o cardápio de hoje?", "Qual o horário de funcionamento?", "Quanto custa?"],
        Intent::Thanks | Intent::Goodbye => &["Qual o cardápio de hoje?"],
        Intent::Unknown | Intent::OutOfScope | Intent::Custom(_) => {
            &["Qual o horário de funcionamento?", "Qual o cardápio de hoje?", "Quanto custa?"]
        }
    };
    suggestions.iter().map(|s| s.to_string()).collect()
}

/// The built-in pt-BR answers for every in-domain intent.
///
/// `Unknown` and `OutOfScope` have no template and always fall back.
pub fn default_templates() -> Vec<ResponseTemplate> {
    vec![
        ResponseTemplate::new(
            Intent::Hours,
            [
                "O restaurante universitário funciona de segunda a sexta: café da manhã das 7h às 9h, almoço das 11h às 14h e jantar das 17h30 às 19h30. Aos sábados, apenas almoço das 11h às 13h30.",
                "De segunda a sexta servimos café da manhã (7h às 9h), almoço (11h às 14h) e jantar (17h30 às 19h30). Aos sábados só há almoço, das 11h às 13h30.",
            ],
        ),
        ResponseTemplate::new(
            Intent::Price,
            ["A refeição custa R$ 3,00 para estudantes de graduação e pós-graduação, R$ 8,00 para servidores e R$ 15,00 para visitantes."],
        )
        .with_follow_ups(["Quais as formas de pagamento?", "Tenho direito a isenção?"]),
        ResponseTemplate::new(
            Intent::Location,
            ["O restaurante universitário do campus {campus} fica ao lado da biblioteca central. Procure as placas \"RU\" a partir da entrada principal."],
        )
        .with_required_slots(["campus"]),
        ResponseTemplate::new(
            Intent::Menu,
            [
                "O cardápio da semana é publicado toda segunda-feira no site e no aplicativo do RU. Hoje há prato principal, opção vegetariana, guarnição, salada e sobremesa.",
                "Você encontra o cardápio atualizado no aplicativo do RU. Toda refeição inclui prato principal, opção vegetariana, acompanhamentos, salada e sobremesa.",
            ],
        ),
        ResponseTemplate::new(
            Intent::VegetarianOption,
            ["Sim! Todas as refeições têm uma opção vegetariana, sem carne, que substitui o prato principal."],
        ),
        ResponseTemplate::new(
            Intent::VeganOption,
            ["A opção vegetariana é vegana às terças e quintas. Nos demais dias ela pode conter ovos ou leite; consulte o cardápio do dia."],
        ),
        ResponseTemplate::new(
            Intent::Allergy,
            ["Para restrição a {restricao_alimentar}, procure a nutricionista no balcão de atendimento antes de se servir. Os alergênicos de cada preparação estão indicados no cardápio."],
        )
        .with_required_slots(["restricao_alimentar"])
        .with_follow_ups(["Qual o cardápio de hoje?", "Como falar com a nutricionista?"]),
        ResponseTemplate::new(
            Intent::PaymentMethods,
            ["Aceitamos o cartão do RU com créditos, PIX pelo aplicativo e cartões de débito. Não aceitamos dinheiro no caixa."],
        ),
        ResponseTemplate::new(
            Intent::CardReload,
            ["Você pode recarregar o cartão pelo aplicativo do RU via PIX ou nos totens de autoatendimento na entrada do restaurante. O crédito fica disponível em alguns minutos."],
        )
        .with_follow_ups(["Como consultar meu saldo?", "Quais as formas de pagamento?"]),
        ResponseTemplate::new(
            Intent::FoodAssistance,
            ["O auxílio alimentação dá isenção total ou parcial da refeição. A inscrição é feita no edital semestral da Pró-Reitoria de Assuntos Estudantis."],
        ),
        ResponseTemplate::new(
            Intent::SocialPrograms,
            ["Estudantes em situação de vulnerabilidade podem participar dos programas de assistência estudantil, como bolsa permanência e auxílio alimentação. Procure o serviço social do seu campus."],
        ),
        ResponseTemplate::new(
            Intent::QueueWait,
            [
                "Os horários de maior movimento são entre 11h30 e 12h30 no almoço e 18h no jantar. Fora desses horários a espera costuma ser menor que 10 minutos.",
                "A fila costuma ser maior entre 11h30 e 12h30. Se puder, venha logo na abertura ou depois das 13h.",
            ],
        ),
        ResponseTemplate::new(
            Intent::HolidayHours,
            ["Em feriados e recessos o restaurante não abre. Durante as férias funciona em horário reduzido, divulgado no site do RU."],
        ),
        ResponseTemplate::new(
            Intent::SanitaryProtocol,
            ["Seguimos as normas da vigilância sanitária: higienize as mãos na entrada, use o álcool em gel disponível e não leve alimentos para fora do refeitório."],
        ),
        ResponseTemplate::new(
            Intent::Contact,
            ["Você pode falar com a administração do RU pelo e-mail ru@universidade.br ou pelo telefone (00) 0000-0000. Reclamações e sugestões também podem ser enviadas pela ouvidoria."],
        ),
        ResponseTemplate::new(
            Intent::Greeting,
            [
                "Olá! Sou o assistente do bandejão. Posso ajudar com horários, cardápio, preços e muito mais.",
                "Oi! Em que posso ajudar? Pergunte sobre horários, cardápio, preços ou formas de pagamento.",
            ],
        ),
        ResponseTemplate::new(
            Intent::Thanks,
            ["Por nada! Bom apetite.", "Disponha! Se precisar, é só chamar."],
        ),
        ResponseTemplate::new(
            Intent::Goodbye,
            ["Até logo! Bom apetite.", "Tchau! Volte sempre."],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandejao_core::{Slot, SlotType};

    #[test]
    fn test_default_templates_cover_in_domain_intents() {
        let templates = default_templates();
        for intent in Intent::BUILT_IN {
            let found = templates.iter().any(|t| t.intent == intent);
            assert_eq!(found, !intent.is_sentinel(), "coverage of {}", intent);
        }
        assert!(templates.iter().all(|t| !t.responses.is_empty()));
    }

    #[test]
    fn test_required_slots_in_defaults() {
        let templates = default_templates();
        let location = templates.iter().find(|t| t.intent == Intent::Location).unwrap();
        assert_eq!(location.requires_slots, Some(vec!["campus".to_string()]));
        let hours = templates.iter().find(|t| t.intent == Intent::Hours).unwrap();
        assert!(hours.requires_slots.is_none());
    }

    #[test]
    fn test_missing_slots() {
        let template = ResponseTemplate::new(Intent::Location, ["x"])
            .with_required_slots(["campus", "refeicao"]);
        let ctx = DialogContext::new()
            .with_slot(Slot::new("campus", SlotType::Text))
            .with_slot(Slot::with_value("refeicao", "almoço", SlotType::Choice));
        assert_eq!(template.missing_slots(&ctx), vec!["campus".to_string()]);

        let none = ResponseTemplate::new(Intent::Hours, ["x"]);
        assert!(none.missing_slots(&ctx).is_empty());
    }

    #[test]
    fn test_render_placeholders() {
        let ctx = DialogContext::new().with_slot(Slot::with_value("campus", "Centro", SlotType::Text));
        assert_eq!(render("Campus {campus}.", &ctx), "Campus Centro.");
        assert_eq!(render("{campus}/{campus}", &ctx), "Centro/Centro");
        assert_eq!(render("Sem {outro} valor", &ctx), "Sem {outro} valor");
        assert_eq!(render("chave { aberta", &ctx), "chave { aberta");
        assert_eq!(render("", &ctx), "");
    }

    #[test]
    fn test_render_skips_unfilled_slot() {
        let ctx = DialogContext::new().with_slot(Slot::new("campus", SlotType::Text));
        assert_eq!(render("Campus {campus}", &ctx), "Campus {campus}");
    }

    #[test]
    fn test_slot_question_table_and_fallback() {
        assert_eq!(
            slot_question("restricao_alimentar"),
            "Qual é sua restrição alimentar específica?"
        );
        assert_eq!(slot_question("campus"), "Em qual campus você está?");
        assert_eq!(
            slot_question("matricula"),
            "Preciso de mais informações sobre matricula. Pode me fornecer?"
        );
    }

    #[test]
    fn test_default_suggestions_never_empty() {
        for intent in Intent::BUILT_IN {
            assert!(!default_suggestions(&intent).is_empty(), "{}", intent);
        }
        assert!(!default_suggestions(&Intent::custom("festa_junina")).is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ResponseTemplateConfig {
            intent: "festa_junina".to_string(),
            responses: vec!["Dia 24 de junho.".to_string()],
            follow_up_questions: vec![],
            requires_slots: vec!["campus".to_string()],
        };
        let template = ResponseTemplate::from_config(&config).unwrap();
        assert_eq!(template.intent, Intent::custom("festa_junina"));
        assert!(template.follow_up_questions.is_none());
        assert_eq!(template.requires_slots, Some(vec!["campus".to_string()]));
    }

    #[test]
    fn test_from_config_rejects_empty_intent() {
        let config = ResponseTemplateConfig {
            intent: String::new(),
            responses: vec!["x".to_string()],
            follow_up_questions: vec![],
            requires_slots: vec![],
        };
        assert!(ResponseTemplate::from_config(&config).is_err());
    }
}
