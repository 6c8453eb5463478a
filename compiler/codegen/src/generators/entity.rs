//! Entity Emitter
//!
//! One ORM entity expands into its primary record, the expression record
//! family used by queries and writes, CRUD operation signatures and the
//! provider closures that back them.

use std::fmt;

use ir::{EntityMetadata, RegistrySnapshot};
use tracing::debug;

use super::GEN;
use crate::escape::{binding, escape};
use crate::idl::{Annotation, IdlField, IdlFunction, IdlStruct, Requiredness};
use crate::type_mapper::map_field;
use crate::{CodegenError, CodegenOptions, Result};

/// Operand record of a where/query operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Partial,
    Like,
    Multi,
    Null,
    Where,
    WhereList,
}

impl Operand {
    fn type_for(self, entity: &str) -> String {
        match self {
            Operand::Partial => format!("{}PartialExpr", entity),
            Operand::Like => format!("{}LikeExpr", entity),
            Operand::Multi => format!("{}MultiExpr", entity),
            Operand::Null => format!("{}NullExpr", entity),
            Operand::Where => format!("{}WhereExpr", entity),
            Operand::WhereList => format!("list<{}WhereExpr>", entity),
        }
    }
}

/// Where operators in field-id order. New operators are appended only, so
/// existing field ids stay stable on the wire.
const OPERATORS: &[(&str, Operand)] = &[
    ("if", Operand::Partial),
    ("eq", Operand::Partial),
    ("ne", Operand::Partial),
    ("gt", Operand::Partial),
    ("gte", Operand::Partial),
    ("lt", Operand::Partial),
    ("lte", Operand::Partial),
    ("like", Operand::Like),
    ("nlike", Operand::Like),
    ("rlike", Operand::Like),
    ("in", Operand::Multi),
    ("nin", Operand::Multi),
    ("nil", Operand::Null),
    ("not", Operand::Where),
    ("nor", Operand::Where),
    ("and", Operand::WhereList),
    ("or", Operand::WhereList),
];

/// Marker on generated CRUD operations read by the service auth layer
const CRUD_COMMENT: &str = "@crud(auth: {})";

/// Script closure delegating one CRUD operation to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderClosure {
    /// Handler method name
    pub name: String,
    /// Typed parameters, without the trailing context
    pub params: Vec<String>,
    /// Script result type
    pub result: String,
    /// Provider call expression
    pub call: String,
}

impl fmt::Display for ProviderClosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = self.params.clone();
        params.push("ctx?: Context".to_string());
        write!(
            f,
            "{}({}): Promise<{}> {{\n  return {};\n}}",
            self.name,
            params.join(", "),
            self.result,
            self.call
        )
    }
}

/// Everything one entity contributes to its database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEmission {
    /// Entity name
    pub name: String,
    /// Primary record
    pub model: IdlStruct,
    /// Expression records in emission order
    pub expressions: Vec<IdlStruct>,
    /// Read operations
    pub queries: Vec<IdlFunction>,
    /// Write operations (empty with CRUD disabled)
    pub mutations: Vec<IdlFunction>,
    /// Closures backing `queries`
    pub query_closures: Vec<ProviderClosure>,
    /// Closures backing `mutations`
    pub mutation_closures: Vec<ProviderClosure>,
}

fn provider_call(method: &str, entity: &str, args: &str) -> String {
    format!("ctx.provider.{}(Metadata.Entity['{}'], null, {}, ctx)", method, entity, args)
}

fn key_object(bindings: &[String]) -> String {
    if bindings.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", bindings.join(", "))
    }
}

/// Emit one entity.
///
/// A relation whose inverse entity is not in `snapshot` is emitted as a
/// dangling reference, or fails with [`CodegenError::MissingReference`] when
/// `options.strict_references` is set.
pub fn emit_entity(
    entity: &EntityMetadata,
    snapshot: &RegistrySnapshot,
    options: &CodegenOptions,
) -> Result<EntityEmission> {
    let name = entity.name.as_str();
    let expression = |suffix: &str| IdlStruct::new(format!("{}{}", name, suffix)).with_kind("Expression");

    let mut model = IdlStruct::new(name).with_kind("Entity");
    let mut partial = expression("PartialExpr");
    let mut nil = expression("NullExpr");
    let mut multi = expression("MultiExpr");
    let mut like = expression("LikeExpr");
    let mut order = expression("OrderExpr");
    let mut create = expression("CreateRecord");
    let mut update = expression("UpdateRecord");

    let mut keys: Vec<IdlField> = Vec::new();
    let mut key_params: Vec<String> = Vec::new();
    let mut key_bindings: Vec<String> = Vec::new();

    for column in entity.persistent_columns() {
        let mapping = map_field(&column.name, &column.ty);
        let dt = mapping.idl.as_str();
        let field = escape(&column.name);
        let requiredness = Requiredness::from_flag(column.mandatory);

        model.push(requiredness, dt, &field);
        if column.primary {
            keys.push(IdlField::new(keys.len() + 1, requiredness, dt, &field));
            key_params.push(format!("{}: {}", field, mapping.script));
            key_bindings.push(binding(&column.name));
        }
        partial.push(Requiredness::Optional, dt, &field);
        nil.push(Requiredness::Optional, "bool", &field);
        multi.push(Requiredness::Optional, format!("list<{}>", dt), &field);
        like.push(Requiredness::Optional, "string", &field);
        order.push(Requiredness::Optional, "i16", &field);
        create.push(Requiredness::from_flag(column.mandatory && !column.is_server_assigned()), dt, &field);
        update.push(Requiredness::from_flag(column.primary), dt, &field);
    }

    for relation in &entity.relations {
        if snapshot.find_entity(&relation.inverse).is_none() {
            if options.strict_references {
                return Err(CodegenError::MissingReference {
                    entity: name.to_string(),
                    relation: relation.property.clone(),
                    inverse: relation.inverse.clone(),
                });
            }
            debug!(
                "Entity {} relation {} references unknown entity {}",
                name, relation.property, relation.inverse
            );
        }
        let ty = if relation.kind.is_to_many() {
            format!("list<{}>", relation.inverse)
        } else {
            relation.inverse.clone()
        };
        model
            .push(Requiredness::Optional, ty, escape(&relation.property))
            .annotations
            .push(Annotation::pair("relation", relation.kind.as_str()));
    }

    for column in entity.transient_columns() {
        let mapping = map_field(&column.name, &column.ty);
        model
            .push(Requiredness::Optional, mapping.idl, escape(&column.name))
            .annotations
            .push(Annotation::flag("transient"));
    }

    let mut where_expr = expression("WhereExpr");
    let mut query_expr = expression("QueryExpr");
    for (op, operand) in OPERATORS {
        let ty = operand.type_for(name);
        where_expr.push(Requiredness::Optional, ty.as_str(), *op);
        query_expr.push(Requiredness::Optional, ty, *op);
    }
    query_expr.push(Requiredness::Optional, format!("{}OrderExpr", name), "order");
    query_expr.push(Requiredness::Optional, "i32", "skip");
    query_expr.push(Requiredness::Optional, "i32", "take");
    query_expr.push(Requiredness::Optional, "bool", "exists");

    let mut expressions = vec![query_expr, where_expr, partial, nil, multi, like, order];

    let model_type = format!("{}.{}", GEN, name);
    let keys_arg = key_object(&key_bindings);

    let queries = vec![
        IdlFunction::new(name, escape(&format!("get{}", name)), keys.clone()).with_comment(CRUD_COMMENT),
        IdlFunction::new(
            format!("list<{}>", name),
            escape(&format!("search{}", name)),
            vec![IdlField::new(1, Requiredness::Optional, format!("{}QueryExpr", name), "query")],
        )
        .with_comment(CRUD_COMMENT),
    ];
    let query_closures = vec![
        ProviderClosure {
            name: escape(&format!("get{}", name)),
            params: key_params.clone(),
            result: model_type.clone(),
            call: provider_call("get", name, &keys_arg),
        },
        ProviderClosure {
            name: escape(&format!("search{}", name)),
            params: vec![format!("query: {}.{}QueryExpr", GEN, name)],
            result: format!("{}[]", model_type),
            call: provider_call("search", name, "{ query }"),
        },
    ];

    let mut mutations = Vec::new();
    let mut mutation_closures = Vec::new();
    if options.crud {
        expressions.push(create);
        expressions.push(update);

        for (verb, record) in [("create", "CreateRecord"), ("update", "UpdateRecord")] {
            let op = escape(&format!("{}{}", verb, name));
            let params = vec![IdlField::new(1, Requiredness::Required, format!("{}{}", name, record), "record")];
            mutations.push(IdlFunction::new(name, op.clone(), params).with_comment(CRUD_COMMENT));
            mutation_closures.push(ProviderClosure {
                name: op,
                params: vec![format!("record: {}.{}{}", GEN, name, record)],
                result: model_type.clone(),
                call: provider_call(verb, name, "record"),
            });
        }
        let remove = escape(&format!("remove{}", name));
        mutations.push(IdlFunction::new(name, remove.clone(), keys).with_comment(CRUD_COMMENT));
        mutation_closures.push(ProviderClosure {
            name: remove,
            params: key_params,
            result: model_type,
            call: provider_call("remove", name, &keys_arg),
        });
    }

    debug!(
        "Emitted entity {} ({} columns, {} relations, {} records)",
        name,
        entity.columns.len(),
        entity.relations.len(),
        expressions.len() + 1
    );

    Ok(EntityEmission {
        name: name.to_string(),
        model,
        expressions,
        queries,
        mutations,
        query_closures,
        mutation_closures,
    })
}

#[cfg(test)]
mod tests {
    use ir::{ColumnMetadata, DatabaseMetadata, RelationKind, RelationMetadata, Scalar, VarType};

    use super::*;

    fn create_test_user() -> EntityMetadata {
        EntityMetadata::new("User")
            .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
            .with_column(ColumnMetadata::new("name", VarType::scalar(Scalar::String)))
    }

    fn snapshot_with(entity: &EntityMetadata) -> RegistrySnapshot {
        RegistrySnapshot::new().with_database(DatabaseMetadata::new("Zoo").with_entity(entity.clone()))
    }

    #[test]
    fn test_primary_record() {
        let user = create_test_user();
        let emission = emit_entity(&user, &snapshot_with(&user), &CodegenOptions::default()).expect("emit");
        assert_eq!(
            emission.model.to_string(),
            "struct User {\n  1: required ID id,\n  2: optional string name\n} (kind=\"Entity\")"
        );
    }

    #[test]
    fn test_expression_family_order() {
        let user = create_test_user();
        let emission = emit_entity(&user, &snapshot_with(&user), &CodegenOptions::default()).expect("emit");
        let names: Vec<_> = emission.expressions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "UserQueryExpr",
                "UserWhereExpr",
                "UserPartialExpr",
                "UserNullExpr",
                "UserMultiExpr",
                "UserLikeExpr",
                "UserOrderExpr",
                "UserCreateRecord",
                "UserUpdateRecord",
            ]
        );
        assert!(emission.expressions.iter().all(|s| s.kind.as_deref() == Some("Expression")));
    }

    #[test]
    fn test_query_operators() {
        let user = create_test_user();
        let emission = emit_entity(&user, &snapshot_with(&user), &CodegenOptions::default()).expect("emit");
        let query = &emission.expressions[0];
        assert_eq!(query.fields.len(), 21);
        assert_eq!(query.fields[0].to_string(), "1: optional UserPartialExpr if");
        assert_eq!(query.fields[15].to_string(), "16: optional list<UserWhereExpr> and");
        assert_eq!(query.fields[17].to_string(), "18: optional UserOrderExpr order");
        assert_eq!(query.fields[20].to_string(), "21: optional bool exists");
        assert_eq!(emission.expressions[1].fields.len(), 17);
    }

    #[test]
    fn test_create_and_update_requiredness() {
        let mut created = ColumnMetadata::new("created", VarType::scalar(Scalar::Date)).mandatory();
        created.create_date = true;
        let entity = create_test_user()
            .with_column(ColumnMetadata::new("email", VarType::scalar(Scalar::Email)).mandatory())
            .with_column(created);
        let emission = emit_entity(&entity, &snapshot_with(&entity), &CodegenOptions::default()).expect("emit");

        let create = &emission.expressions[7];
        let required: Vec<_> =
            create.fields.iter().filter(|f| f.requiredness == Requiredness::Required).map(|f| f.name.as_str()).collect();
        assert_eq!(required, vec!["id", "email"]);

        let update = &emission.expressions[8];
        let required: Vec<_> =
            update.fields.iter().filter(|f| f.requiredness == Requiredness::Required).map(|f| f.name.as_str()).collect();
        assert_eq!(required, vec!["id"]);
    }

    #[test]
    fn test_server_assigned_columns_are_optional_on_create() {
        let mandatory = |name: &str| ColumnMetadata::new(name, VarType::scalar(Scalar::Int)).mandatory();
        let entity = EntityMetadata::new("Order")
            .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
            .with_column(ColumnMetadata::new("total", VarType::scalar(Scalar::Float)).mandatory())
            .with_column(ColumnMetadata { generated: true, ..mandatory("seq") })
            .with_column(ColumnMetadata { is_virtual: true, ..mandatory("lines") })
            .with_column(ColumnMetadata { create_date: true, ..mandatory("created") })
            .with_column(ColumnMetadata { update_date: true, ..mandatory("updated") })
            .with_column(ColumnMetadata { version: true, ..mandatory("revision") });
        let emission = emit_entity(&entity, &snapshot_with(&entity), &CodegenOptions::default()).expect("emit");

        let render = |record: &IdlStruct| record.fields.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        let create = emission.expressions.iter().find(|s| s.name == "OrderCreateRecord").expect("create record");
        assert_eq!(
            render(create),
            vec![
                "1: required ID id",
                "2: required double total",
                "3: optional i32 seq",
                "4: optional i32 lines",
                "5: optional i32 created",
                "6: optional i32 updated",
                "7: optional i32 revision",
            ]
        );

        let update = emission.expressions.iter().find(|s| s.name == "OrderUpdateRecord").expect("update record");
        assert_eq!(
            render(update),
            vec![
                "1: required ID id",
                "2: optional double total",
                "3: optional i32 seq",
                "4: optional i32 lines",
                "5: optional i32 created",
                "6: optional i32 updated",
                "7: optional i32 revision",
            ]
        );
        // The primary record keeps the declared requiredness
        assert!(emission.model.fields.iter().all(|f| f.requiredness == Requiredness::Required));
    }

    #[test]
    fn test_relations_and_transient_columns_come_last() {
        let entity = create_test_user()
            .with_column(ColumnMetadata::new("score", VarType::scalar(Scalar::Int)).transient())
            .with_relation(RelationMetadata::new("owner", RelationKind::ManyToOne, "User"))
            .with_relation(RelationMetadata::new("friends", RelationKind::OneToMany, "User"));
        let emission = emit_entity(&entity, &snapshot_with(&entity), &CodegenOptions::default()).expect("emit");

        let fields: Vec<_> = emission.model.fields.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            fields,
            vec![
                "1: required ID id",
                "2: optional string name",
                "3: optional User owner (relation = \"ManyToOne\")",
                "4: optional list<User> friends (relation = \"OneToMany\")",
                "5: optional i32 score (transient)",
            ]
        );
        // Transient columns stay out of the expression records
        assert_eq!(emission.expressions[2].fields.len(), 2);
    }

    #[test]
    fn test_dangling_relation_is_emitted_unless_strict() {
        let entity = create_test_user().with_relation(RelationMetadata::new("group", RelationKind::ManyToOne, "Group"));
        let snapshot = snapshot_with(&entity);

        let emission = emit_entity(&entity, &snapshot, &CodegenOptions::default()).expect("lenient emit");
        assert!(emission.model.field("group").is_some());

        let strict = CodegenOptions { strict_references: true, ..CodegenOptions::default() };
        let err = emit_entity(&entity, &snapshot, &strict).expect_err("strict emit");
        assert!(matches!(err, CodegenError::MissingReference { ref inverse, .. } if inverse == "Group"));
    }

    #[test]
    fn test_closures() {
        let entity = EntityMetadata::new("Item")
            .with_column(ColumnMetadata::primary("list", VarType::scalar(Scalar::Int)))
            .with_column(ColumnMetadata::primary("tenantId", VarType::scalar(Scalar::String)));
        let emission = emit_entity(&entity, &snapshot_with(&entity), &CodegenOptions::default()).expect("emit");

        assert_eq!(
            emission.query_closures[0].to_string(),
            "getItem(__esc_list: number, tenantId: string, ctx?: Context): Promise<srv.Item> {\n  \
             return ctx.provider.get(Metadata.Entity['Item'], null, { list: __esc_list, tenantId }, ctx);\n}"
        );
        assert_eq!(emission.mutation_closures[0].call, "ctx.provider.create(Metadata.Entity['Item'], null, record, ctx)");
        assert_eq!(emission.mutations[2].to_string(), "Item removeItem(1: required i32 __esc_list, 2: required ID tenantId)");
    }

    #[test]
    fn test_crud_disabled() {
        let user = create_test_user();
        let options = CodegenOptions { crud: false, ..CodegenOptions::default() };
        let emission = emit_entity(&user, &snapshot_with(&user), &options).expect("emit");
        assert!(emission.mutations.is_empty());
        assert!(emission.mutation_closures.is_empty());
        assert_eq!(emission.expressions.len(), 7);
        assert_eq!(emission.queries.len(), 2);
    }
}
