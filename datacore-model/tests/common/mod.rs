//! Shared fixtures for the model tests: a small shop domain.

#![allow(dead_code)]

use datacore_model::{Entity, EntityCollection, EntityDefinition, FieldDescriptor, Registry};
use serde_json::{Value, json};

/// Registry with widget, customer, person, line item, order and a product
/// hierarchy (`digital_product` extends `product`, `catalog_item` is abstract).
pub fn shop_registry() -> Registry {
    let mut registry = Registry::new();

    registry.register(
        EntityDefinition::builder("widget")
            .field(FieldDescriptor::string("name"))
            .field(FieldDescriptor::float("price"))
            .build(),
    );
    registry.register(
        EntityDefinition::builder("customer")
            .field(FieldDescriptor::string("name"))
            .field(FieldDescriptor::string("email"))
            .build(),
    );
    registry.register(
        EntityDefinition::builder("person")
            .field(FieldDescriptor::string("name"))
            .field(FieldDescriptor::int("age"))
            .build(),
    );
    registry.register(
        EntityDefinition::builder("line_item")
            .field(FieldDescriptor::string("label"))
            .field(FieldDescriptor::int("quantity"))
            .field(FieldDescriptor::float("price"))
            .build(),
    );
    registry.register(
        EntityDefinition::builder("order")
            .field(FieldDescriptor::string("orderNumber"))
            .field(FieldDescriptor::timestamp("orderDate"))
            .field(FieldDescriptor::entity("customer", "customer"))
            .field(FieldDescriptor::entity("billedTo", "customer").not_null())
            .field(FieldDescriptor::collection("lineItems", "line_item_collection"))
            .field(FieldDescriptor::array("tags"))
            .field(FieldDescriptor::untyped("metadata"))
            .field(FieldDescriptor::union("payment", &["card", "cash"]))
            .build(),
    );

    let catalog_item = registry.register(
        EntityDefinition::builder("catalog_item")
            .field(FieldDescriptor::string("sku"))
            .make_abstract()
            .build(),
    );
    let product = registry.register(
        EntityDefinition::builder("product")
            .extends(&catalog_item)
            .field(FieldDescriptor::string("name"))
            .build(),
    );
    registry.register(
        EntityDefinition::builder("digital_product")
            .extends(&product)
            .field(FieldDescriptor::string("downloadUrl"))
            .build(),
    );

    registry
}

pub fn entity(registry: &Registry, entity_type: &str, attributes: Value) -> Entity {
    registry
        .create_from_array(entity_type, &attributes)
        .expect("fixture entity hydrates")
}

pub fn line_item(registry: &Registry, id: Option<&str>, label: &str) -> Entity {
    let mut attributes = json!({ "label": label, "quantity": 1 });
    if let Some(id) = id {
        attributes["id"] = json!(id);
    }
    entity(registry, "line_item", attributes)
}

pub fn line_items(registry: &Registry, ids: &[&str]) -> EntityCollection {
    let mut collection = registry
        .create_collection("line_item_collection")
        .expect("line item collection is registered");
    for id in ids {
        collection
            .add(line_item(registry, Some(id), &format!("item {id}")))
            .expect("line item fits its collection");
    }
    collection
}
