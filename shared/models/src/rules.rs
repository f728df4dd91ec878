//! Filename and entity lookup rules.
//!
//! Both tables come from `.properties` files read once at startup:
//!
//! ```text
//! # entity_types.properties
//! IBM=IBM,INTL BUSINESS MACHINES
//!
//! # entity_names.properties
//! IBM=International Business Machines Corp.
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::classification::MatchSource;
use crate::nlu::Entity;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}:{line}: expected `key=value`, found {content:?}")]
    Syntax {
        origin: String,
        line: usize,
        content: String,
    },
}

/// Parse `.properties` text into ordered `(key, value)` pairs.
///
/// A repeated key overwrites the earlier value but keeps its position.
pub fn parse_properties(origin: &str, source: &str) -> Result<Vec<(String, String)>, RulesError> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (key, value) = line
            .find(|c: char| c == '=' || c == ':')
            .map(|pos| (line[..pos].trim(), line[pos + 1..].trim()))
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| RulesError::Syntax {
                origin: origin.to_string(),
                line: index + 1,
                content: line.to_string(),
            })?;

        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    Ok(entries)
}

/// One entity key and the uppercased filename fragments that point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPattern {
    pub key: String,
    pub substrings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityMatch {
    pub key: Option<String>,
    pub label: String,
    pub source: MatchSource,
}

/// Immutable lookup tables shared by every request.
#[derive(Debug, Clone, Default)]
pub struct EntityRules {
    patterns: Vec<EntityPattern>,
    names: HashMap<String, String>,
}

impl EntityRules {
    pub fn new(patterns: Vec<EntityPattern>, names: HashMap<String, String>) -> Self {
        Self { patterns, names }
    }

    pub fn from_sources(types_source: &str, names_source: &str) -> Result<Self, RulesError> {
        Self::parse("entity types", types_source, "entity names", names_source)
    }

    pub fn load(
        types_path: impl AsRef<Path>,
        names_path: impl AsRef<Path>,
    ) -> Result<Self, RulesError> {
        let types_path = types_path.as_ref();
        let names_path = names_path.as_ref();

        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| RulesError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        Self::parse(
            &types_path.display().to_string(),
            &read(types_path)?,
            &names_path.display().to_string(),
            &read(names_path)?,
        )
    }

    fn parse(
        types_origin: &str,
        types_source: &str,
        names_origin: &str,
        names_source: &str,
    ) -> Result<Self, RulesError> {
        let patterns = parse_properties(types_origin, types_source)?
            .into_iter()
            .map(|(key, value)| EntityPattern {
                key,
                substrings: value
                    .split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
            })
            .collect();

        let names = parse_properties(names_origin, names_source)?
            .into_iter()
            .collect();

        Ok(Self::new(patterns, names))
    }

    pub fn patterns(&self) -> &[EntityPattern] {
        &self.patterns
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    /// Display label for a key, or the key itself when none is configured.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.names.get(key).map(String::as_str).unwrap_or(key)
    }

    /// First entity key whose substring occurs in `text`, case-insensitively.
    pub fn resolve_key(&self, text: &str) -> Option<&str> {
        let haystack = text.to_uppercase();
        self.patterns
            .iter()
            .find(|pattern| pattern.substrings.iter().any(|s| haystack.contains(s.as_str())))
            .map(|pattern| pattern.key.as_str())
    }

    pub fn match_filename(&self, filename: &str) -> Option<EntityMatch> {
        self.resolve_key(filename).map(|key| EntityMatch {
            key: Some(key.to_string()),
            label: self.label_for(key).to_string(),
            source: MatchSource::Filename,
        })
    }

    /// First entity of `entity_type` wins. Its text is mapped through the
    /// pattern table when possible, otherwise reported as-is.
    pub fn match_entity(&self, entities: &[Entity], entity_type: &str) -> Option<EntityMatch> {
        let entity = entities.iter().find(|e| e.entity_type == entity_type)?;

        let matched = match self.resolve_key(&entity.text) {
            Some(key) => EntityMatch {
                key: Some(key.to_string()),
                label: self.label_for(key).to_string(),
                source: MatchSource::Entity,
            },
            None => EntityMatch {
                key: None,
                label: entity.text.clone(),
                source: MatchSource::Entity,
            },
        };

        Some(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = "\
# filename fragments per entity
IBM = IBM, intl business machines
ACME=ACME,ROADRUNNER
! legacy comment style
EMPTY=
";

    const NAMES: &str = "\
IBM=International Business Machines Corp.
";

    fn rules() -> EntityRules {
        EntityRules::from_sources(TYPES, NAMES).unwrap()
    }

    fn entity(entity_type: &str, text: &str) -> Entity {
        Entity {
            entity_type: entity_type.to_string(),
            text: text.to_string(),
            relevance: 0.9,
            count: Some(1),
            sentiment: None,
            emotion: None,
        }
    }

    #[test]
    fn test_parse_properties_skips_comments_and_blanks() {
        let entries = parse_properties("test", "# c\n\n a = b \n! x\nc:d\n").unwrap();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_properties_repeated_key_keeps_position() {
        let entries = parse_properties("test", "a=1\nb=2\na=3\n").unwrap();
        assert_eq!(entries[0], ("a".to_string(), "3".to_string()));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_properties_rejects_missing_separator() {
        let err = parse_properties("types.properties", "a=1\nbroken line\n").unwrap_err();
        assert!(matches!(err, RulesError::Syntax { line: 2, .. }));
        assert!(err.to_string().starts_with("types.properties:2"));
    }

    #[test]
    fn test_substrings_are_uppercased_and_empty_dropped() {
        let rules = rules();
        assert_eq!(rules.pattern_count(), 3);
        assert_eq!(
            rules.patterns()[0].substrings,
            vec!["IBM".to_string(), "INTL BUSINESS MACHINES".to_string()]
        );
        assert!(rules.patterns()[2].substrings.is_empty());
    }

    #[test]
    fn test_match_filename_case_insensitive() {
        let matched = rules().match_filename("2017 ibm annual report.pdf").unwrap();
        assert_eq!(matched.key.as_deref(), Some("IBM"));
        assert_eq!(matched.label, "International Business Machines Corp.");
        assert_eq!(matched.source, MatchSource::Filename);
    }

    #[test]
    fn test_match_filename_falls_back_to_key_label() {
        let matched = rules().match_filename("roadrunner-10k.pdf").unwrap();
        assert_eq!(matched.key.as_deref(), Some("ACME"));
        assert_eq!(matched.label, "ACME");
    }

    #[test]
    fn test_match_filename_first_key_wins() {
        let matched = rules().match_filename("acme vs ibm.pdf").unwrap();
        assert_eq!(matched.key.as_deref(), Some("IBM"));
    }

    #[test]
    fn test_match_filename_no_match() {
        assert!(rules().match_filename("quarterly.pdf").is_none());
    }

    #[test]
    fn test_match_entity_first_of_type_wins() {
        let entities = vec![
            entity("Location", "Armonk"),
            entity("Company", "Initech"),
            entity("Company", "IBM"),
        ];
        let matched = rules().match_entity(&entities, "Company").unwrap();
        assert_eq!(matched.key, None);
        assert_eq!(matched.label, "Initech");
        assert_eq!(matched.source, MatchSource::Entity);
    }

    #[test]
    fn test_match_entity_resolves_known_key() {
        let entities = vec![entity("Company", "IBM")];
        let matched = rules().match_entity(&entities, "Company").unwrap();
        assert_eq!(matched.key.as_deref(), Some("IBM"));
        assert_eq!(matched.label, "International Business Machines Corp.");
    }

    #[test]
    fn test_match_entity_type_is_case_sensitive() {
        let entities = vec![entity("company", "IBM")];
        assert!(rules().match_entity(&entities, "Company").is_none());
    }
}
