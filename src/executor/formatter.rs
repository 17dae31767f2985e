//! Formatted-value annotation
//!
//! Only option-set values carry a display label. Labels come from the value
//! itself when present, else from the attribute metadata. Aliased values
//! are resolved against the entity and attribute they were read from.

use crate::metadata::MetadataCatalog;
use crate::record::{AttributeValue, Record};

/// Adds display labels to returned records
pub struct FormattedValueAnnotator<'a> {
    catalog: &'a dyn MetadataCatalog,
}

impl<'a> FormattedValueAnnotator<'a> {
    pub fn new(catalog: &'a dyn MetadataCatalog) -> Self {
        Self { catalog }
    }

    /// Returns an annotated copy of `record`
    pub fn annotate(&self, record: &Record) -> Record {
        let mut annotated = record.clone();
        self.annotate_in_place(&mut annotated);
        annotated
    }

    /// Annotates `record`, leaving existing formatted values untouched
    pub fn annotate_in_place(&self, record: &mut Record) {
        let mut labels = Vec::new();

        for (key, value) in &record.attributes {
            if record.formatted_values.contains_key(key) {
                continue;
            }
            if let Some(label) = self.label_for(&record.logical_name, key, value) {
                labels.push((key.clone(), label));
            }
        }

        record.formatted_values.extend(labels);
    }

    fn label_for(&self, entity: &str, attribute: &str, value: &AttributeValue) -> Option<String> {
        match value {
            AttributeValue::OptionSet(option) => option.label.clone().or_else(|| {
                self.catalog
                    .attribute(entity, attribute)
                    .and_then(|meta| meta.option_label(option.value))
                    .map(str::to_string)
            }),
            AttributeValue::Aliased(aliased) => {
                let source_entity = aliased.entity_logical_name.as_deref().unwrap_or(entity);
                self.label_for(source_entity, &aliased.attribute_logical_name, &aliased.value)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AttributeMetadata, EntityMetadata, InMemoryCatalog};
    use crate::record::{AliasedValue, OptionSetValue};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new().with_entity(
            EntityMetadata::new("contact").with_attribute(AttributeMetadata::picklist(
                "gendercode",
                [(1, "Male"), (2, "Female")],
            )),
        )
    }

    #[test]
    fn test_inline_label_wins() {
        let catalog = catalog();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let record = Record::new("contact").with("gendercode", OptionSetValue::labeled(1, "M"));

        let annotated = annotator.annotate(&record);
        assert_eq!(annotated.formatted_value("gendercode"), Some("M"));
        assert!(record.formatted_values.is_empty());
    }

    #[test]
    fn test_catalog_label() {
        let catalog = catalog();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let record = Record::new("contact").with("gendercode", OptionSetValue::new(2));

        let annotated = annotator.annotate(&record);
        assert_eq!(annotated.formatted_value("gendercode"), Some("Female"));
    }

    #[test]
    fn test_unknown_option_has_no_label() {
        let catalog = catalog();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let record = Record::new("contact").with("gendercode", OptionSetValue::new(9));

        assert!(annotator.annotate(&record).formatted_values.is_empty());
    }

    #[test]
    fn test_existing_value_not_overwritten() {
        let catalog = catalog();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let mut record = Record::new("contact").with("gendercode", OptionSetValue::new(1));
        record
            .formatted_values
            .insert("gendercode".into(), "Custom".into());

        annotator.annotate_in_place(&mut record);
        assert_eq!(record.formatted_value("gendercode"), Some("Custom"));
    }

    #[test]
    fn test_aliased_uses_source_attribute() {
        let catalog = catalog();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let record = Record::new("account").with(
            "primary.gender",
            AliasedValue::new(
                Some("contact".into()),
                "gendercode",
                OptionSetValue::new(1).into(),
            ),
        );

        let annotated = annotator.annotate(&record);
        assert_eq!(annotated.formatted_value("primary.gender"), Some("Male"));
    }

    #[test]
    fn test_other_types_ignored() {
        let catalog = InMemoryCatalog::new();
        let annotator = FormattedValueAnnotator::new(&catalog);
        let record = Record::new("contact").with("name", "Ada").with("age", 30);

        assert!(annotator.annotate(&record).formatted_values.is_empty());
    }
}
