//! Dispatch service
//!
//! The script opens with one HTTP-facing class that routes
//! `/thrift/{service}` to the handler of every database and API.

use std::fmt::Write as _;

use super::GEN;
use crate::utils::screaming_snake_case;
use crate::Result;

/// Render the dispatch class `<root>ThriftService`.
///
/// `routes` lists database names first, then API names; each must have a
/// matching `<SNAKE>_HANDLER` further down the script.
pub fn dispatch_service(root: &str, runtime_module: &str, routes: &[&str]) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "import {{ ContentType, Context, ContextObject, CoreThriftHandler, Forbidden, gql, HttpRequest, HttpResponse, Metadata, Post, Public, RequestObject, Service }} from '{}';",
        runtime_module
    )?;
    writeln!(out, "import {} = require('./{}');", GEN, root.to_lowercase())?;
    writeln!(out)?;
    writeln!(out, "///////// SERVICE /////////")?;
    writeln!(out)?;
    writeln!(out, "@Service(true)")?;
    writeln!(out, "export class {}ThriftService {{", root)?;
    writeln!(out, "  @Public()")?;
    writeln!(out, "  @Post('/thrift/{{service}}')")?;
    writeln!(out, "  @ContentType(HttpResponse)")?;
    writeln!(
        out,
        "  public async process(@RequestObject() req: HttpRequest, @ContextObject() ctx: Context): Promise<HttpResponse> {{"
    )?;
    writeln!(out, "    const service = req.pathParameters['service'];")?;
    writeln!(out, "    let result: any = undefined;")?;
    writeln!(out, "    switch (service) {{")?;
    for route in routes {
        let snake = screaming_snake_case(route);
        writeln!(out, "      case {0}: result = await {0}_HANDLER.execute(req, ctx); break;", snake)?;
    }
    writeln!(out, "      default: throw new Forbidden(`Unknown service [${{service}}]`);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    return {{ statusCode: 200, body: result }};")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(out)
}
