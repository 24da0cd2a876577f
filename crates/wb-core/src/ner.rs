//! Pattern-based named-entity recognition.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::scores::ScoreSource;
use crate::tokenizer::char_offset;

pub const DEFAULT_NER_MODEL: &str = "dbmdz/bert-large-cased-finetuned-conll03-english";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Org,
    Gpe,
    Date,
    Money,
}

static PATTERNS: LazyLock<Vec<(EntityType, Regex)>> = LazyLock::new(|| {
    [
        (EntityType::Person, r"\b[A-Z][a-z]+ [A-Z][a-z]+\b"),
        (
            EntityType::Org,
            r"\b(Company|Corp|Inc|LLC|Ltd|University|College)\b",
        ),
        (
            EntityType::Gpe,
            r"\b(New York|London|Paris|Tokyo|California|Texas|United States|UK|USA)\b",
        ),
        (
            EntityType::Date,
            r"\b\d{4}\b|\b\d{1,2}/\d{1,2}/\d{4}\b|\b(January|February|March|April|May|June|July|August|September|October|November|December)\b",
        ),
        (
            EntityType::Money,
            r"\$\d+|\b\d+\s*(dollars|USD|euros|pounds)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// One match, with character offsets into the input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entity {
    pub entity_group: EntityType,
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityMention {
    pub text: String,
    pub confidence: f64,
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct NerOutput {
    pub task: &'static str,
    pub entities: Vec<Entity>,
    pub entities_by_type: BTreeMap<EntityType, Vec<EntityMention>>,
    pub model_used: String,
}

/// Extract entities pattern by pattern; an overlapping span can be reported
/// under more than one type ("New York" is both PERSON-shaped and a GPE).
pub fn recognize_entities<S: ScoreSource + ?Sized>(
    text: &str,
    model_name: Option<&str>,
    source: &mut S,
) -> NerOutput {
    let mut entities = Vec::new();
    let mut entities_by_type: BTreeMap<EntityType, Vec<EntityMention>> = BTreeMap::new();

    for (kind, re) in PATTERNS.iter() {
        for m in re.find_iter(text) {
            let start = char_offset(text, m.start());
            let end = char_offset(text, m.end());
            let score = source.uniform(0.8, 0.95);
            entities.push(Entity {
                entity_group: *kind,
                word: m.as_str().to_string(),
                start,
                end,
                score,
            });
            entities_by_type.entry(*kind).or_default().push(EntityMention {
                text: m.as_str().to_string(),
                confidence: score,
                start,
                end,
            });
        }
    }

    NerOutput {
        task: "named_entity_recognition",
        entities,
        entities_by_type,
        model_used: model_name.unwrap_or(DEFAULT_NER_MODEL).to_string(),
    }
}
