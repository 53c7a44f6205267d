//! Descriptor-driven sample synthesis.
//!
//! Walks a message descriptor field by field and fills a [`SampleMessage`]
//! according to [`crate::policy`]. Nested messages are synthesized
//! recursively; a message type that is already on the current root-to-leaf
//! path is never entered again, so cyclic schemas terminate.

use crate::error::{Error, Result};
use crate::policy::{self, Policy};
use crate::value::{SampleMessage, SampleValue};
use protome_schema::{FieldDescriptor, MessageDescriptor, Schema};

/// Message types being synthesized on the current recursion path.
#[derive(Debug, Clone, Default)]
pub struct VisitedPath {
    types: Vec<String>,
}

impl VisitedPath {
    /// A path that already contains the root type.
    pub fn seeded(root: &str) -> Self {
        Self {
            types: vec![root.to_string()],
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }

    fn enter(&mut self, type_name: &str) {
        self.types.push(type_name.to_string());
    }

    fn leave(&mut self) {
        self.types.pop();
    }

    pub fn depth(&self) -> usize {
        self.types.len()
    }
}

/// Builds sample instances from a read-only schema.
pub struct Synthesizer<'a> {
    schema: &'a Schema,
}

impl<'a> Synthesizer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Resolve `type_name` and return a fully populated sample of it.
    pub fn synthesize(&self, type_name: &str) -> Result<SampleMessage> {
        let descriptor = self.schema.get_message(type_name)?;
        let mut instance = SampleMessage::new(descriptor.full_name.clone());
        let mut visited = VisitedPath::seeded(&descriptor.full_name);

        self.populate(descriptor, &mut instance, &mut visited)?;
        Ok(instance)
    }

    /// Fill every field of `instance` reachable under `descriptor`.
    ///
    /// `visited` must contain the message types already being synthesized
    /// above this call; it is restored before returning.
    pub fn populate(
        &self,
        descriptor: &MessageDescriptor,
        instance: &mut SampleMessage,
        visited: &mut VisitedPath,
    ) -> Result<()> {
        for field in &descriptor.fields {
            if oneof_taken(descriptor, field, instance) {
                tracing::debug!(
                    "Skipping {}.{}: oneof already populated",
                    descriptor.name,
                    field.name
                );
                continue;
            }

            if field.is_repeated() {
                self.populate_repeated(descriptor, field, instance, visited)?;
            } else {
                self.populate_singular(descriptor, field, instance, visited)?;
            }
        }
        Ok(())
    }

    fn populate_repeated(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        instance: &mut SampleMessage,
        visited: &mut VisitedPath,
    ) -> Result<()> {
        match policy::repeated_element(&field.kind) {
            Policy::Literal(value) => instance.push_repeated(field, value),
            Policy::Nested => {
                let descriptor = self.referenced_message(owner, field)?;
                let Some(element) = self.nested(owner, field, descriptor, visited)? else {
                    return Ok(());
                };
                match descriptor.map_entry_fields() {
                    Some((key, value)) => match (element.get(&key.name), element.get(&value.name)) {
                        (Some(k), Some(v)) => instance.insert_map_entry(field, k.clone(), v.clone()),
                        _ => unsupported(owner, field),
                    },
                    None => instance.push_repeated(field, SampleValue::Message(Box::new(element))),
                }
            }
            Policy::EnumCode | Policy::Unsupported => unsupported(owner, field),
        }
        Ok(())
    }

    fn populate_singular(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        instance: &mut SampleMessage,
        visited: &mut VisitedPath,
    ) -> Result<()> {
        match policy::singular(field) {
            Policy::Literal(value) => instance.set(field, value),
            Policy::Nested => {
                let descriptor = self.referenced_message(owner, field)?;
                match self.nested(owner, field, descriptor, visited)? {
                    // a sub-message with nothing set does not count as present
                    Some(nested) if nested.is_empty() => tracing::debug!(
                        "Leaving {}.{} unset, {} has no populated fields",
                        owner.name,
                        field.name,
                        descriptor.full_name
                    ),
                    Some(nested) => instance.set(field, SampleValue::Message(Box::new(nested))),
                    None => {}
                }
            }
            Policy::EnumCode => instance.set(field, SampleValue::Enum(self.enum_code(owner, field)?)),
            Policy::Unsupported => unsupported(owner, field),
        }
        Ok(())
    }

    fn referenced_message(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<&'a MessageDescriptor> {
        let type_name = field.kind.referenced_type().unwrap_or_default();
        self.schema
            .message(type_name)
            .filter(|_| !type_name.is_empty())
            .ok_or_else(|| Error::UnresolvedMessageType {
                message: owner.full_name.clone(),
                field: field.name.clone(),
                type_name: type_name.to_string(),
            })
    }

    /// Synthesize `descriptor`, the type referenced by `field`, or `None` when
    /// it is already on the path.
    fn nested(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        descriptor: &MessageDescriptor,
        visited: &mut VisitedPath,
    ) -> Result<Option<SampleMessage>> {
        if visited.contains(&descriptor.full_name) {
            tracing::debug!(
                "Not entering {} again via {}.{}",
                descriptor.full_name,
                owner.name,
                field.name
            );
            return Ok(None);
        }

        let mut nested = SampleMessage::new(descriptor.full_name.clone());
        visited.enter(&descriptor.full_name);
        let result = self.populate(descriptor, &mut nested, visited);
        visited.leave();
        result?;

        Ok(Some(nested))
    }

    fn enum_code(&self, owner: &MessageDescriptor, field: &FieldDescriptor) -> Result<i32> {
        let type_name = field.kind.referenced_type().unwrap_or_default();
        let enum_type =
            self.schema
                .get_enum(type_name)
                .ok_or_else(|| Error::UnresolvedEnumType {
                    message: owner.full_name.clone(),
                    field: field.name.clone(),
                    type_name: type_name.to_string(),
                })?;

        policy::enum_value_index(enum_type.values.len())
            .and_then(|index| enum_type.values.get(index))
            .map(|value| value.number)
            .ok_or_else(|| Error::EmptyEnum {
                message: owner.full_name.clone(),
                field: field.name.clone(),
                type_name: enum_type.full_name.clone(),
            })
    }
}

/// Whether another member of `field`'s oneof group is already set.
fn oneof_taken(
    descriptor: &MessageDescriptor,
    field: &FieldDescriptor,
    instance: &SampleMessage,
) -> bool {
    let Some(group) = field.oneof_group.as_deref() else {
        return false;
    };
    descriptor
        .fields
        .iter()
        .filter(|other| other.number != field.number)
        .filter(|other| other.oneof_group.as_deref() == Some(group))
        .any(|other| instance.has(&other.name))
}

fn unsupported(owner: &MessageDescriptor, field: &FieldDescriptor) {
    tracing::debug!(
        "No placeholder for {}.{} ({}{}), leaving it unset",
        owner.name,
        field.name,
        if field.is_repeated() { "repeated " } else { "" },
        field.kind
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use protome_schema::{EnumDescriptor, FieldKind};

    fn message(name: &str) -> FieldKind {
        FieldKind::Message(name.to_string())
    }

    #[test]
    fn test_profile_scalars() {
        let schema = Schema::new().with_message(
            MessageDescriptor::new("Profile")
                .with_field(FieldDescriptor::singular("name", 1, FieldKind::String))
                .with_field(FieldDescriptor::singular("verified", 2, FieldKind::Bool)),
        );

        let sample = Synthesizer::new(&schema).synthesize("Profile").unwrap();
        assert_eq!(
            sample.get("name"),
            Some(&SampleValue::String("name_value".to_string()))
        );
        assert_eq!(sample.get("verified"), Some(&SampleValue::Bool(true)));
    }

    #[test]
    fn test_direct_self_reference_is_left_unset() {
        let schema = Schema::new()
            .with_message(MessageDescriptor::new("Node").with_field(FieldDescriptor::singular(
                "next",
                1,
                message("Node"),
            )));

        let sample = Synthesizer::new(&schema).synthesize("Node").unwrap();
        assert!(sample.is_empty());
    }

    #[test]
    fn test_indirect_cycle_stops_at_reentry() {
        // A -> B -> C -> A
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("A")
                    .with_field(FieldDescriptor::singular("b", 1, message("B")))
                    .with_field(FieldDescriptor::singular("label", 2, FieldKind::String)),
            )
            .with_message(
                MessageDescriptor::new("B").with_field(FieldDescriptor::singular(
                    "c",
                    1,
                    message("C"),
                )),
            )
            .with_message(
                MessageDescriptor::new("C")
                    .with_field(FieldDescriptor::singular("a", 1, message("A")))
                    .with_field(FieldDescriptor::repeated("more_a", 2, message("A")))
                    .with_field(FieldDescriptor::singular("depth", 3, FieldKind::Int32)),
            );

        let sample = Synthesizer::new(&schema).synthesize("A").unwrap();

        let Some(SampleValue::Message(b)) = sample.get("b") else {
            panic!("b should be populated");
        };
        let Some(SampleValue::Message(c)) = b.get("c") else {
            panic!("b.c should be populated");
        };
        assert!(!c.has("a"));
        assert!(!c.has("more_a"));
        assert_eq!(c.get("depth"), Some(&SampleValue::Int32(12345)));
    }

    #[test]
    fn test_same_type_in_sibling_fields_is_populated_twice() {
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("Route")
                    .with_field(FieldDescriptor::singular("from", 1, message("Point")))
                    .with_field(FieldDescriptor::singular("to", 2, message("Point"))),
            )
            .with_message(
                MessageDescriptor::new("Point")
                    .with_field(FieldDescriptor::singular("x", 1, FieldKind::Float)),
            );

        let sample = Synthesizer::new(&schema).synthesize("Route").unwrap();
        assert!(sample.has("from"));
        assert!(sample.has("to"));
    }

    #[test]
    fn test_oneof_first_member_wins() {
        let schema = Schema::new().with_message(
            MessageDescriptor::new("Choice")
                .with_field(FieldDescriptor::singular("a", 1, FieldKind::String).in_oneof("pick"))
                .with_field(FieldDescriptor::singular("b", 2, FieldKind::Int64).in_oneof("pick"))
                .with_field(FieldDescriptor::singular("c", 3, FieldKind::Bool).in_oneof("pick")),
        );

        let sample = Synthesizer::new(&schema).synthesize("Choice").unwrap();
        assert_eq!(
            sample.get("a"),
            Some(&SampleValue::String("a_value".to_string()))
        );
        assert!(!sample.has("b"));
        assert!(!sample.has("c"));
    }

    #[test]
    fn test_oneof_falls_through_when_first_member_cannot_be_set() {
        let schema = Schema::new().with_message(
            MessageDescriptor::new("Payload")
                .with_field(FieldDescriptor::singular("raw", 1, FieldKind::Bytes).in_oneof("body"))
                .with_field(FieldDescriptor::singular("text", 2, FieldKind::String).in_oneof("body"))
                .with_field(FieldDescriptor::singular("n", 3, FieldKind::Int32).in_oneof("body")),
        );

        let sample = Synthesizer::new(&schema).synthesize("Payload").unwrap();
        assert!(!sample.has("raw"));
        assert!(sample.has("text"));
        assert!(!sample.has("n"));
    }

    #[test]
    fn test_enum_picks_second_value() {
        let schema = Schema::new()
            .with_enum(
                EnumDescriptor::new("Status")
                    .with_value("UNKNOWN", 0)
                    .with_value("ACTIVE", 1)
                    .with_value("DONE", 2),
            )
            .with_enum(EnumDescriptor::new("Only").with_value("ONLY", 7))
            .with_message(
                MessageDescriptor::new("Tag")
                    .with_field(FieldDescriptor::singular(
                        "status",
                        1,
                        FieldKind::Enum("Status".to_string()),
                    ))
                    .with_field(FieldDescriptor::singular(
                        "only",
                        2,
                        FieldKind::Enum("Only".to_string()),
                    )),
            );

        let sample = Synthesizer::new(&schema).synthesize("Tag").unwrap();
        assert_eq!(sample.get("status"), Some(&SampleValue::Enum(1)));
        assert_eq!(sample.get("only"), Some(&SampleValue::Enum(7)));
    }

    #[test]
    fn test_empty_enum_fails_fast() {
        let schema = Schema::new()
            .with_enum(EnumDescriptor::new("Nothing"))
            .with_message(MessageDescriptor::new("Holder").with_field(
                FieldDescriptor::singular("value", 1, FieldKind::Enum("Nothing".to_string())),
            ));

        let err = Synthesizer::new(&schema).synthesize("Holder").unwrap_err();
        assert!(matches!(err, Error::EmptyEnum { ref field, .. } if field == "value"));
    }

    #[test]
    fn test_unresolved_message_reference_fails_fast() {
        let schema = Schema::new()
            .with_message(MessageDescriptor::new("Outer").with_field(FieldDescriptor::singular(
                "inner",
                1,
                message("Missing"),
            )))
            .with_message(MessageDescriptor::new("Blank").with_field(
                FieldDescriptor::singular("inner", 1, message("")),
            ));

        let synthesizer = Synthesizer::new(&schema);
        assert!(matches!(
            synthesizer.synthesize("Outer").unwrap_err(),
            Error::UnresolvedMessageType { .. }
        ));
        assert!(matches!(
            synthesizer.synthesize("Blank").unwrap_err(),
            Error::UnresolvedMessageType { .. }
        ));
    }

    #[test]
    fn test_repeated_fields_get_one_element() {
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("Bag")
                    .with_field(FieldDescriptor::repeated("names", 1, FieldKind::String))
                    .with_field(FieldDescriptor::repeated("ids", 2, FieldKind::Int64))
                    .with_field(FieldDescriptor::repeated("flags", 3, FieldKind::Bool))
                    .with_field(FieldDescriptor::repeated("items", 4, message("Item")))
                    .with_field(FieldDescriptor::repeated("weights", 5, FieldKind::Double)),
            )
            .with_message(
                MessageDescriptor::new("Item")
                    .with_field(FieldDescriptor::singular("sku", 1, FieldKind::String)),
            );

        let sample = Synthesizer::new(&schema).synthesize("Bag").unwrap();
        for name in ["names", "ids", "flags", "items"] {
            match sample.get(name) {
                Some(SampleValue::Repeated(items)) => assert_eq!(items.len(), 1, "{name}"),
                other => panic!("{name}: expected one element, got {other:?}"),
            }
        }
        assert_eq!(
            sample.get("ids"),
            Some(&SampleValue::Repeated(vec![SampleValue::Int64(123)]))
        );
        assert!(!sample.has("weights"));
    }

    #[test]
    fn test_populate_restores_visited_path() {
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("Outer")
                    .with_field(FieldDescriptor::singular("inner", 1, message("Inner"))),
            )
            .with_message(MessageDescriptor::new("Inner"));

        let outer = schema.get_message("Outer").unwrap();
        let mut instance = SampleMessage::new("Outer");
        let mut visited = VisitedPath::seeded("Outer");

        Synthesizer::new(&schema)
            .populate(outer, &mut instance, &mut visited)
            .unwrap();
        assert_eq!(visited.depth(), 1);
        assert!(!visited.contains("Inner"));
    }

    #[test]
    fn test_singular_message_with_nothing_set_is_absent() {
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("Envelope")
                    .with_field(FieldDescriptor::singular("empty", 1, message("Empty")))
                    .with_field(FieldDescriptor::repeated("empties", 2, message("Empty")))
                    .with_field(FieldDescriptor::singular("raw", 3, message("Raw"))),
            )
            .with_message(MessageDescriptor::new("Empty"))
            .with_message(
                MessageDescriptor::new("Raw")
                    .with_field(FieldDescriptor::singular("data", 1, FieldKind::Bytes)),
            );

        let sample = Synthesizer::new(&schema).synthesize("Envelope").unwrap();
        assert!(!sample.has("empty"));
        assert!(!sample.has("raw"));
        assert_eq!(
            sample.get("empties"),
            Some(&SampleValue::Repeated(vec![SampleValue::Message(Box::new(
                SampleMessage::new("Empty")
            ))]))
        );
    }

    #[test]
    fn test_map_field_gets_one_entry() {
        let entry = |name: &str, value: FieldKind| {
            MessageDescriptor::new(name)
                .with_field(FieldDescriptor::singular("key", 1, FieldKind::String))
                .with_field(FieldDescriptor::singular("value", 2, value))
                .as_map_entry()
        };
        let schema = Schema::new()
            .with_message(
                MessageDescriptor::new("Doc")
                    .with_field(FieldDescriptor::repeated("counts", 1, message("Doc.CountsEntry")))
                    .with_field(FieldDescriptor::repeated("blobs", 2, message("Doc.BlobsEntry"))),
            )
            .with_message(entry("Doc.CountsEntry", FieldKind::Int32))
            .with_message(entry("Doc.BlobsEntry", FieldKind::Bytes));

        let sample = Synthesizer::new(&schema).synthesize("Doc").unwrap();
        assert_eq!(
            sample.get("counts"),
            Some(&SampleValue::Map(vec![(
                SampleValue::String("key_value".to_string()),
                SampleValue::Int32(12345)
            )]))
        );
        // bytes values have no placeholder, so the map stays empty
        assert!(!sample.has("blobs"));
    }
}
