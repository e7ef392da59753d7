//! Intent pattern definitions.
//!
//! Each intent owns one [`IntentPattern`]: keywords, regexes and a weight.
//! Keywords and regex sources are normalized when the pattern is built, so
//! scoring only ever compares normalized text.

use bandejao_core::config::IntentPatternConfig;
use bandejao_core::Intent;
use regex::{Regex, RegexBuilder};

use crate::error::NluError;
use crate::normalize::{normalize, strip_diacritics};

/// Keyword, regex and weight rules bound to a single intent.
#[derive(Debug, Clone)]
pub struct IntentPattern {
    pub intent: Intent,
    /// Relative importance of this intent's signals.
    pub weight: f32,
    keywords: Vec<String>,
    regexes: Vec<Regex>,
    context_keywords: Vec<String>,
}

impl IntentPattern {
    /// Build a pattern, normalizing keywords and compiling regexes.
    ///
    /// Regexes are matched against normalized utterances, case-insensitively.
    pub fn new<K, P>(intent: Intent, keywords: K, patterns: P, weight: f32) -> Result<Self, NluError>
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let keywords = normalize_keywords(keywords);

        let mut regexes = Vec::new();
        for source in patterns {
            let source = source.as_ref();
            let regex = RegexBuilder::new(&strip_diacritics(source))
                .case_insensitive(true)
                .build()
                .map_err(|e| NluError::InvalidRegex {
                    intent: intent.to_string(),
                    pattern: source.to_string(),
                    source: e,
                })?;
            regexes.push(regex);
        }

        Ok(Self {
            intent,
            weight,
            keywords,
            regexes,
            context_keywords: Vec::new(),
        })
    }

    /// Build a pattern from a `[[intents]]` config entry.
    pub fn from_config(config: &IntentPatternConfig) -> Result<Self, NluError> {
        let intent: Intent = config.intent.parse()?;
        let pattern = Self::new(intent, &config.keywords, &config.patterns, config.weight)?;
        Ok(pattern.with_context_keywords(&config.context_keywords))
    }

    /// Attach context keywords (normalized like regular keywords).
    pub fn with_context_keywords<K>(mut self, keywords: K) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        self.context_keywords = normalize_keywords(keywords);
        self
    }

    /// Normalized keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Compiled regexes.
    pub fn regexes(&self) -> &[Regex] {
        &self.regexes
    }

    /// Normalized context keywords. Not used in scoring yet.
    pub fn context_keywords(&self) -> &[String] {
        &self.context_keywords
    }
}

fn normalize_keywords<K>(keywords: K) -> Vec<String>
where
    K: IntoIterator,
    K::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| normalize(k.as_ref().trim()))
        .filter(|k| !k.is_empty())
        .collect()
}

/// A built-in table row: intent, keywords, regexes, weight.
type PatternRow = (
    Intent,
    &'static [&'static str],
    &'static [&'static str],
    f32,
);

fn row(
    intent: Intent,
    keywords: &'static [&'static str],
    patterns: &'static [&'static str],
    weight: f32,
) -> PatternRow {
    (intent, keywords, patterns, weight)
}

/// The built-in pt-BR pattern table for the cafeteria domain.
///
/// `Unknown` has no pattern; the recognizer scores it as 0.
pub fn default_patterns() -> Vec<IntentPattern> {
    let rows: Vec<PatternRow> = vec![
        row(
            Intent::Hours,
            &["horário", "funcionamento", "que horas", "abre", "fecha", "aberto"],
            &[
                r"\bhorarios?\b",
                r"\b(abre|fecha|funciona)\b",
                r"\bque horas?\b",
            ],
            1.0,
        ),
        row(
            Intent::Price,
            &["preço", "valor", "quanto custa", "custa", "tarifa"],
            &[
                r"\bquanto (custa|e|fica)\b",
                r"\bprecos?\b",
                r"\b(valor|tarifa)\b",
                r"r\$\s*\d",
            ],
            1.0,
        ),
        row(
            Intent::Location,
            &["onde fica", "localização", "endereço", "como chegar"],
            &[
                r"\bonde (fica|ficam|e|esta)\b",
                r"\b(endereco|localizacao)\b",
                r"\bcomo (chego|chegar)\b",
            ],
            1.0,
        ),
        row(
            Intent::Menu,
            &["cardápio", "menu", "almoço", "jantar", "café da manhã", "prato do dia"],
            &[
                r"\bcardapio\b",
                r"\b(o que|que) (tem|vai ter) (pra|para|no|de) (almoco|jantar|comer)\b",
                r"\bprato do dia\b",
            ],
            1.0,
        ),
        row(
            Intent::VegetarianOption,
            &["vegetariano", "vegetariana", "sem carne", "opção vegetariana"],
            &[r"\bvegetarian[oa]s?\b", r"\bsem carne\b"],
            1.0,
        ),
        row(
            Intent::VeganOption,
            &["vegano", "vegana", "origem animal", "sem leite"],
            &[r"\bvegan[oa]?s?\b", r"\b(sem|nada de) origem animal\b"],
            1.0,
        ),
        row(
            Intent::Allergy,
            &[
                "alergia",
                "alérgico",
                "alergênico",
                "glúten",
                "lactose",
                "intolerância",
                "amendoim",
            ],
            &[
                r"\balergi(a|co|ca)s?\b",
                r"\bintoleran(te|cia)\b",
                r"\bsem (gluten|lactose)\b",
            ],
            1.0,
        ),
        row(
            Intent::PaymentMethods,
            &["pagamento", "pagar", "pix", "cartão de crédito", "débito", "dinheiro"],
            &[
                r"\b(forma|formas|metodo|meios?) de pagamento\b",
                r"\baceitam?\b.*\b(pix|cartao|dinheiro|debito|credito)\b",
                r"\bcomo (pago|pagar)\b",
            ],
            1.0,
        ),
        row(
            Intent::CardReload,
            &["recarga", "recarregar", "carregar o cartão", "créditos", "saldo"],
            &[
                r"\brecarreg(ar|o|a)\b",
                r"\brecargas?\b",
                r"\bsaldo\b",
                r"\b(colocar|por|adicionar) creditos?\b",
            ],
            1.0,
        ),
        row(
            Intent::FoodAssistance,
            &[
                "auxílio alimentação",
                "auxílio",
                "bolsa alimentação",
                "isenção",
                "gratuidade",
            ],
            &[
                r"\bauxilio[- ]?alimentacao\b",
                r"\b(isencao|isento|gratuidade|gratuit[oa])\b",
            ],
            1.0,
        ),
        row(
            Intent::SocialPrograms,
            &[
                "assistência estudantil",
                "programa social",
                "vulnerabilidade",
                "cadúnico",
                "bolsa permanência",
            ],
            &[
                r"\bassistencia estudantil\b",
                r"\bprogramas? socia(l|is)\b",
                r"\bbolsa permanencia\b",
            ],
            1.0,
        ),
        row(
            Intent::QueueWait,
            &["fila", "espera", "demora", "lotado", "cheio"],
            &[
                r"\bfilas?\b",
                r"\b(quanto tempo|tempo de espera|demora)\b",
                r"\b(esta|ta) (cheio|lotado)\b",
            ],
            1.0,
        ),
        row(
            Intent::HolidayHours,
            &["feriado", "recesso", "férias", "carnaval", "natal"],
            &[r"\bferiados?\b", r"\b(recesso|ferias)\b"],
            1.0,
        ),
        row(
            Intent::SanitaryProtocol,
            &[
                "protocolo sanitário",
                "máscara",
                "higiene",
                "vigilância sanitária",
                "álcool em gel",
            ],
            &[r"\bprotocolos?( sanitarios?)?\b", r"\b(mascara|higiene|covid)\b"],
            1.0,
        ),
        row(
            Intent::Contact,
            &["contato", "telefone", "e-mail", "ouvidoria", "reclamação", "falar com"],
            &[
                r"\b(telefone|e-?mail|whatsapp)\b",
                r"\b(reclamar|reclamacao|ouvidoria|sugestao)\b",
                r"\bfalar com (alguem|atendente|a administracao)\b",
            ],
            1.0,
        ),
        row(
            Intent::Greeting,
            &["bom dia", "boa tarde", "boa noite", "tudo bem"],
            &[
                r"^\s*(oi|ola|opa|e ai|eai|hey|salve)\b",
                r"^\s*(bom dia|boa tarde|boa noite)\b",
            ],
            1.0,
        ),
        row(
            Intent::Thanks,
            &["obrigado", "obrigada", "valeu", "agradeço"],
            &[r"\b(obrigad[oa]|valeu|vlw|agradeco|brigad[oa])\b"],
            1.0,
        ),
        row(
            Intent::Goodbye,
            &["tchau", "até logo", "até mais", "adeus"],
            &[r"\b(tchau|adeus|flw)\b", r"\bate (logo|mais|breve|amanha)\b"],
            1.0,
        ),
        row(
            Intent::OutOfScope,
            &["futebol", "previsão do tempo", "política", "piada", "novela"],
            &[
                r"\b(futebol|politica|eleicao|novela)\b",
                r"\bprevisao do tempo\b",
                r"\b(conta|me conta) uma piada\b",
            ],
            0.8,
        ),
    ];

    rows.into_iter()
        .map(|(intent, keywords, patterns, weight)| {
            IntentPattern::new(intent, keywords, patterns, weight)
                .expect("Invalid built-in intent regex")
        })
        .collect()
}
