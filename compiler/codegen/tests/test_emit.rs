use idlsmith_codegen::idl::Requiredness;
use idlsmith_codegen::{emit, write_generated, CodegenError, CodegenOptions, ThriftGenerator};
use ir::{
    ApiMetadata, ColumnMetadata, DatabaseMetadata, EntityMetadata, EnumMetadata, MethodKind, MethodMetadata,
    RegistrySnapshot, RelationKind, RelationMetadata, Scalar, StructKind, TypeMetadata, TypeSelect, VarType,
};
use registry::{Registry, Signature};

/// Helper function to create a snapshot touching every category
fn create_test_snapshot() -> RegistrySnapshot {
    let user = EntityMetadata::new("User")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
        .with_column(ColumnMetadata::new("name", VarType::scalar(Scalar::String)));
    let tag = EntityMetadata::new("Tag")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
        .with_column(ColumnMetadata::new("list", VarType::scalar(Scalar::Int)));
    let post = EntityMetadata::new("Post")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
        .with_relation(RelationMetadata::new("tags", RelationKind::ManyToMany, "Tag"));

    RegistrySnapshot::new()
        .with_enum(EnumMetadata::new("Size", vec!["S".into(), "M".into()]))
        .with_enum(EnumMetadata::new("Color", vec!["RED".into(), "GREEN".into(), "BLUE".into()]))
        .with_input(TypeMetadata::new("GetUserInput", StructKind::Input).with_member("id", VarType::scalar(Scalar::Id)))
        .with_type(
            TypeMetadata::new("Profile", StructKind::Type)
                .with_member("color", VarType::enumeration("Color"))
                .with_member("list", VarType::array(VarType::scalar(Scalar::String))),
        )
        .with_type(TypeMetadata::new("Address", StructKind::Type).with_member("city", VarType::scalar(Scalar::String)))
        .with_database(DatabaseMetadata::new("Zoo").with_entity(user).with_entity(tag).with_entity(post))
        .with_api(ApiMetadata::new("UserApi").with_method(
            MethodMetadata::new("UserApi", "getUser", MethodKind::Query, VarType::structure("User", StructKind::Entity))
                .with_input("input", VarType::structure("GetUserInput", StructKind::Input)),
        ))
        .with_api(ApiMetadata::new("AdminApi").with_method(MethodMetadata::new(
            "AdminApi",
            "ping",
            MethodKind::Query,
            VarType::scalar(Scalar::String),
        )))
        .with_registry_type(
            TypeMetadata::new("ApiMetadata", StructKind::Registry).with_member("name", VarType::scalar(Scalar::String)),
        )
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack.find(needle).unwrap_or_else(|| panic!("`{}` not found in:\n{}", needle, haystack))
}

#[test]
fn test_emit_is_deterministic() {
    let snapshot = create_test_snapshot();
    let first = emit(&snapshot, "App").expect("first run");
    let second = emit(&snapshot, "App").expect("second run");
    assert_eq!(first.idl, second.idl);
    assert_eq!(first.script, second.script);
    assert_eq!(first.patch, second.patch);
    assert_eq!(first.replacements, second.replacements);
}

#[test]
fn test_empty_snapshot_renders_prolog_and_banners() {
    let artifacts = emit(&RegistrySnapshot::new(), "App").expect("emit");
    assert_eq!(
        artifacts.idl,
        "typedef string ID\n\n\
         union Json {\n  1: double N,\n  2: string S,\n  3: bool B,\n  4: list<Json> L,\n  5: map<string, Json> M\n}\n\n\
         struct Timestamp {\n  1: i64 ms\n}\n\n\
         //////// API ////////\n\n\
         //////// ENUM ////////\n\n\
         //////// INPUTS ////////\n\n\
         //////// TYPES ////////\n\n\
         //////// DATABASE ////////\n\n\
         //////// METADATA ////////\n"
    );
    assert!(artifacts.replacements.is_empty());
}

#[test]
fn test_categories_and_names_are_ordered() {
    let idl = emit(&create_test_snapshot(), "App").expect("emit").idl;

    let order = [
        "//////// API ////////",
        "service AdminApi {",
        "service UserApi {",
        "//////// ENUM ////////",
        "enum Color {",
        "enum Size {",
        "//////// INPUTS ////////",
        "struct GetUserInput {",
        "//////// TYPES ////////",
        "struct Address {",
        "struct Profile {",
        "//////// DATABASE ////////",
        "# -- Database: Zoo --",
        "service Zoo {",
        "struct Post {",
        "struct Tag {",
        "struct User {",
        "struct PostQueryExpr {",
        "struct TagQueryExpr {",
        "struct UserQueryExpr {",
        "//////// METADATA ////////",
        "struct ApiMetadata {",
    ];
    let positions: Vec<usize> = order.iter().map(|needle| position(&idl, needle)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "unexpected order:\n{}", idl);
}

#[test]
fn test_reserved_member_is_escaped_everywhere() {
    let artifacts = emit(&create_test_snapshot(), "App").expect("emit");

    for record in artifacts.document.structs() {
        assert!(record.field("list").is_none(), "{} kept a raw `list` field", record.name);
    }
    let profile = artifacts.document.find_struct("Profile").expect("profile");
    assert_eq!(profile.fields[1].to_string(), "2: optional list<string> __esc_list");
    let tag = artifacts.document.find_struct("Tag").expect("tag");
    assert_eq!(tag.fields[1].to_string(), "2: optional i32 __esc_list");
    let tag_order = artifacts.document.find_struct("TagOrderExpr").expect("tag order");
    assert!(tag_order.field("__esc_list").is_some());
}

#[test]
fn test_enum_ordinals() {
    let idl = emit(&create_test_snapshot(), "App").expect("emit").idl;
    assert!(idl.contains("enum Color {\n  RED = 0,\n  GREEN = 1,\n  BLUE = 2\n}"));
}

#[test]
fn test_crud_toggle() {
    let snapshot = create_test_snapshot();
    let options = CodegenOptions { crud: false, ..CodegenOptions::default() };
    let artifacts = ThriftGenerator::new(&snapshot).with_options(options).emit("App").expect("emit");

    let zoo = artifacts.document.find_service("Zoo").expect("zoo");
    let names: Vec<&str> = zoo.functions().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["getPost", "searchPost", "getTag", "searchTag", "getUser", "searchUser"]);
    assert!(artifacts.document.find_struct("UserCreateRecord").is_none());
    assert!(artifacts.document.find_struct("UserUpdateRecord").is_none());
    assert!(!artifacts.script.contains("ctx.provider.remove("));

    let full = emit(&snapshot, "App").expect("emit");
    let zoo = full.document.find_service("Zoo").expect("zoo");
    assert!(zoo.function("createUser").is_some());
    assert!(zoo.function("updateUser").is_some());
    assert!(zoo.function("removeUser").is_some());
    assert!(full.document.find_struct("UserCreateRecord").is_some());
}

#[test]
fn test_composite_key_order() {
    let account = EntityMetadata::new("Account")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Int)))
        .with_column(ColumnMetadata::new("balance", VarType::scalar(Scalar::Float)))
        .with_column(ColumnMetadata::primary("tenantId", VarType::scalar(Scalar::String)));
    let snapshot = RegistrySnapshot::new().with_database(DatabaseMetadata::new("Bank").with_entity(account));
    let artifacts = emit(&snapshot, "Bank").expect("emit");

    let bank = artifacts.document.find_service("Bank").expect("bank");
    for op in ["getAccount", "removeAccount"] {
        let function = bank.function(op).expect(op);
        assert_eq!(function.param_names(), vec!["id", "tenantId"]);
        assert_eq!(function.params[1].ty, "ID");
        assert!(function.params.iter().all(|p| p.requiredness == Requiredness::Required));
    }
    assert!(artifacts.script.contains("{ id, tenantId }"));
}

#[test]
fn test_relation_annotation() {
    let idl = emit(&create_test_snapshot(), "App").expect("emit").idl;
    assert!(idl.contains("2: optional list<Tag> tags (relation = \"ManyToMany\")"));
}

#[test]
fn test_user_entity_record() {
    let artifacts = emit(&create_test_snapshot(), "App").expect("emit");
    let user = artifacts.document.find_struct("User").expect("user");
    assert_eq!(user.to_string(), "struct User {\n  1: required ID id,\n  2: optional string name\n} (kind=\"Entity\")");
}

#[test]
fn test_api_operation_and_closure() {
    let artifacts = emit(&create_test_snapshot(), "App").expect("emit");
    let api = artifacts.document.find_service("UserApi").expect("api");
    assert_eq!(api.function("getUser").expect("getUser").to_string(), "User getUser(1: GetUserInput input)");
    assert!(artifacts.script.contains("const res = await ctx.execute(USER_API_GET_USER_GQL, { input });"));
    assert!(artifacts
        .script
        .contains("result: UserApi_getUser(input: $input) {\n      id\n      name\n    }\n    # variables: { input }\n  }"));
    // Scalar results are marked with their kind and carry no variables comment
    assert!(artifacts.script.contains("  query request {\n    result: AdminApi_ping # : String\n  }\n"));
}

#[test]
fn test_dispatch_routes_databases_then_apis() {
    let script = emit(&create_test_snapshot(), "App").expect("emit").script;
    assert!(script.starts_with("import { ContentType,"));
    assert!(script.contains("import srv = require('./app');"));
    let zoo = position(&script, "case ZOO:");
    let admin = position(&script, "case ADMIN_API:");
    let user = position(&script, "case USER_API:");
    assert!(zoo < admin && admin < user);
    // Every route has a handler further down
    assert!(position(&script, "const ZOO_HANDLER") > zoo);
    assert!(position(&script, "const USER_API_HANDLER") > user);
}

#[test]
fn test_runtime_module_option() {
    let snapshot = create_test_snapshot();
    let options = CodegenOptions { runtime_module: "tyx".to_string(), ..CodegenOptions::default() };
    let script = ThriftGenerator::new(&snapshot).with_options(options).emit("App").expect("emit").script;
    assert!(script.contains("RequestObject, Service } from 'tyx';"));
}

#[test]
fn test_enum_members_are_patched() {
    let artifacts = emit(&create_test_snapshot(), "App").expect("emit");
    assert!(artifacts.patch.starts_with("/// Patch to support javascript Date and Json"));
    assert!(artifacts.patch.contains("const codec = { ...ProfileCodec };"));
    assert!(!artifacts.patch.contains("AddressCodec"));
    assert!(artifacts.patch.contains("export const ColorCoercion = {\n"));
    assert_eq!(artifacts.replacements.get(": Color").map(String::as_str), Some(": (Color | string)"));
    assert_eq!(
        artifacts.replacements.get("output.writeI32(obj.color);").map(String::as_str),
        Some("output.writeI32(obj.color as number);")
    );
}

#[test]
fn test_lenient_dangling_relations_are_emitted_verbatim() {
    let note = EntityMetadata::new("Note")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
        .with_relation(RelationMetadata::new("cover", RelationKind::OneToOne, "Image"))
        .with_relation(RelationMetadata::new("labels", RelationKind::ManyToMany, "Label"));
    let snapshot = RegistrySnapshot::new().with_database(DatabaseMetadata::new("Notes").with_entity(note));

    let artifacts = emit(&snapshot, "Notes").expect("lenient emit");
    let note = artifacts.document.find_struct("Note").expect("note");
    assert_eq!(
        note.to_string(),
        "struct Note {\n  1: required ID id,\n  2: optional Image cover (relation = \"OneToOne\"),\n  \
         3: optional list<Label> labels (relation = \"ManyToMany\")\n} (kind=\"Entity\")"
    );
    // Missing inverses get no records of their own
    for name in ["Image", "Label", "ImageQueryExpr", "LabelWhereExpr"] {
        assert!(artifacts.document.find_struct(name).is_none(), "{} emitted", name);
    }
    assert!(artifacts.document.find_service("Notes").and_then(|s| s.function("getNote")).is_some());
}

#[test]
fn test_strict_references() {
    let post = EntityMetadata::new("Post")
        .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
        .with_relation(RelationMetadata::new("author", RelationKind::ManyToOne, "Author"));
    let snapshot = RegistrySnapshot::new().with_database(DatabaseMetadata::new("Blog").with_entity(post));

    let lenient = emit(&snapshot, "Blog").expect("lenient");
    assert!(lenient.idl.contains("2: optional Author author (relation = \"ManyToOne\")"));

    let options = CodegenOptions { strict_references: true, ..CodegenOptions::default() };
    let err = ThriftGenerator::new(&snapshot).with_options(options).emit("Blog").expect_err("strict");
    assert!(matches!(
        err,
        CodegenError::MissingReference { ref entity, ref relation, ref inverse }
            if entity == "Post" && relation == "author" && inverse == "Author"
    ));
}

#[test]
fn test_invalid_select_aborts_generation() {
    let snapshot = create_test_snapshot().with_api(ApiMetadata::new("BadApi").with_method(
        MethodMetadata::new("BadApi", "find", MethodKind::Query, VarType::structure("User", StructKind::Entity))
            .with_select(TypeSelect::new().field("nickname")),
    ));
    let err = emit(&snapshot, "App").expect_err("invalid select");
    assert!(matches!(err, CodegenError::InvalidSelect { ref member, .. } if member == "nickname"));
}

#[test]
fn test_registry_snapshot_to_files() {
    let mut registry = Registry::new();
    registry.define_enum("Color", ["RED", "GREEN", "BLUE"]).expect("define enum");
    let db = registry.define_database("Zoo", "zoo").expect("define database");
    let user = registry.define_entity(db, "User").expect("define entity");
    registry.add_column(user, ColumnMetadata::primary("id", VarType::scalar(Scalar::Id))).expect("add column");
    let api = registry.define_api("UserApi").expect("define api");
    registry
        .define_method(api, "count", "advice", Signature::returning(VarType::scalar(Scalar::Int)))
        .expect("define method");

    let artifacts = emit(&registry.snapshot(), "App").expect("emit");
    let files = artifacts.files("App").expect("files");
    let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["app.thrift", "app.service.ts", "app.patch.ts", "app.replace.json"]);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let written = write_generated(dir.path(), &files).expect("write");
    assert_eq!(written.len(), 4);
    let idl = std::fs::read_to_string(dir.path().join("app.thrift")).expect("read idl");
    assert!(idl.contains("  i32 count()"));
    let replace = std::fs::read_to_string(dir.path().join("app.replace.json")).expect("read replace");
    assert_eq!(replace, "{}\n");
}
