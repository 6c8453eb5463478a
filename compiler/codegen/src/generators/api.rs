//! API Emitter
//!
//! Each API becomes an IDL service over its query and mutation methods, and
//! a proxy object that forwards every call into the GraphQL executor with a
//! generated query document.

use std::fmt::Write as _;

use ir::{ApiMetadata, MethodMetadata, ParamMetadata, RegistrySnapshot};
use tracing::debug;

use super::selection::SelectionBuilder;
use super::GEN;
use crate::escape::{binding, escape};
use crate::idl::{IdlField, IdlFunction, IdlService, Requiredness, ServiceMember};
use crate::type_mapper::map_type;
use crate::utils::{kebab_case, screaming_snake_case};
use crate::Result;

/// Service and script emitted for one API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEmission {
    /// IDL service
    pub service: IdlService,
    /// Route constant, query documents, proxy and handler
    pub script: String,
}

/// Name of the generated document constant for `method`
pub fn document_name(method: &MethodMetadata) -> String {
    format!("{}_GQL", screaming_snake_case(&format!("{}_{}", method.api, method.name)))
}

/// IDL operation for a query or mutation method
fn operation(method: &MethodMetadata) -> IdlFunction {
    let params = method
        .wire_inputs()
        .enumerate()
        .map(|(i, p)| IdlField::new(i + 1, Requiredness::Default, map_type(&p.ty).idl, escape(&p.name)))
        .collect();
    IdlFunction::new(map_type(&method.result).idl, escape(&method.name), params)
}

/// GraphQL document constant for one method
fn document(method: &MethodMetadata, selection: &SelectionBuilder<'_>) -> Result<String> {
    let inputs: Vec<_> = method.wire_inputs().collect();
    let (variables, arguments) = if inputs.is_empty() {
        (String::new(), String::new())
    } else {
        let variables: Vec<String> =
            inputs.iter().map(|p| format!("${}: {}", p.name, map_type(&p.ty).gql_variable())).collect();
        let arguments: Vec<String> = inputs.iter().map(|p| format!("{}: ${}", p.name, p.name)).collect();
        (format!("({})", variables.join(", ")), format!("({})", arguments.join(", ")))
    };
    let wrapper = if method.is_mutation() { "mutation" } else { "query" };

    let mut out = String::new();
    writeln!(out, "const {} = gql`", document_name(method))?;
    writeln!(out, "  {} request{} {{", wrapper, variables)?;
    write!(out, "    result: {}_{}{}", method.api, method.name, arguments)?;
    match selection.render(&method.result, method.select.as_ref(), 2)? {
        Some(block) => write!(out, " {}", block)?,
        None => write!(out, " # : {}", method.result)?,
    }
    writeln!(out)?;
    if !inputs.is_empty() {
        writeln!(out, "    # variables: {}", variable_object(&inputs))?;
    }
    writeln!(out, "  }}")?;
    writeln!(out, "`;")?;
    Ok(out)
}

/// `{ a, b: __esc_b }` object binding each wire parameter to its variable
fn variable_object(inputs: &[&ParamMetadata]) -> String {
    let variables: Vec<String> = inputs.iter().map(|p| binding(&p.name)).collect();
    if variables.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", variables.join(", "))
    }
}

/// Proxy method forwarding one call into the executor
fn proxy_method(method: &MethodMetadata) -> String {
    let inputs: Vec<_> = method.wire_inputs().collect();
    let mut params: Vec<String> = inputs.iter().map(|p| escape(&p.name)).collect();
    params.push("ctx?".to_string());
    let variables = variable_object(&inputs);

    format!(
        "  async {}({}) {{\n    const res = await ctx.execute({}, {});\n    return res;\n  }}",
        escape(&method.name),
        params.join(", "),
        document_name(method),
        variables
    )
}

/// `const X_HANDLER = new CoreThriftHandler<...>(...)` wiring a proxy into a processor
pub fn handler(service: &str) -> String {
    let snake = screaming_snake_case(service);
    format!(
        "const {snake}_HANDLER = new CoreThriftHandler<{module}.{service}.Processor>({{\n  serviceName: {snake},\n  handler: new {module}.{service}.Processor({snake}_PROXY),\n}});\n",
        snake = snake,
        module = GEN,
        service = service
    )
}

/// Emit one API
pub fn emit_api(api: &ApiMetadata, snapshot: &RegistrySnapshot) -> Result<ApiEmission> {
    let selection = SelectionBuilder::new(snapshot);
    let snake = screaming_snake_case(&api.name);

    let mut service = IdlService::new(&api.name);
    let mut documents = String::new();
    let mut methods: Vec<String> = Vec::new();
    for method in api.operations() {
        service.members.push(ServiceMember::Function(operation(method)));
        documents.push_str(&document(method, &selection)?);
        documents.push('\n');
        methods.push(proxy_method(method));
    }

    let mut script = String::new();
    writeln!(script, "const {} = '{}';", snake, kebab_case(&api.name))?;
    writeln!(script)?;
    script.push_str(&documents);
    writeln!(script, "const {}_PROXY: {}.{}.IHandler<Context> = {{", snake, GEN, api.name)?;
    for method in &methods {
        writeln!(script, "{},", method)?;
    }
    writeln!(script, "}};")?;
    writeln!(script)?;
    script.push_str(&handler(&api.name));

    debug!("Emitted api {} ({} operations)", api.name, methods.len());
    Ok(ApiEmission { service, script })
}
