//! Fixed definitions every document starts with

use crate::idl::{IdlItem, IdlStruct, Requiredness};

/// `typedef string ID`, the `Json` union and the `Timestamp` record
pub fn prolog_items() -> Vec<IdlItem> {
    let mut json = IdlStruct::new("Json");
    json.push(Requiredness::Default, "double", "N");
    json.push(Requiredness::Default, "string", "S");
    json.push(Requiredness::Default, "bool", "B");
    json.push(Requiredness::Default, "list<Json>", "L");
    json.push(Requiredness::Default, "map<string, Json>", "M");

    let mut timestamp = IdlStruct::new("Timestamp");
    timestamp.push(Requiredness::Default, "i64", "ms");

    vec![
        IdlItem::Typedef { target: "string".to_string(), name: "ID".to_string() },
        IdlItem::Union(json),
        IdlItem::Struct(timestamp),
    ]
}

/// Codec patch for the prolog types: `Date` values travel as `Timestamp`
/// and arbitrary JSON values travel as the `Json` union.
pub const BASE_PATCH: &str = r#"/// Patch to support javascript Date and Json
{
  const codec = { ...TimestampCodec };
  TimestampCodec.encode = (args: ITimestampArgs, output: thrift.TProtocol) => {
    if (args instanceof Date) args = { ms: args.getTime() };
    codec.encode(args, output);
  };
  TimestampCodec.decode = (input: thrift.TProtocol): ITimestamp => {
    const val = codec.decode(input);
    if (!val || val.ms === void 0) return val;
    const obj: any = new Date(+val.ms.toString());
    obj.ms = val.ms;
    return obj;
  };
}
{
  const codec = { ...JsonCodec };
  JsonCodec.encode = (args: IJsonArgs, output: thrift.TProtocol) => {
    const tson = isTson(args) ? args : marshal(args);
    codec.encode(tson, output);
  };
  JsonCodec.decode = (input: thrift.TProtocol): IJson => {
    return unmarshal(codec.decode(input));
  };
  function isTson(value: any): boolean {
    if (value === null || typeof value !== 'object' || Array.isArray(value)) return false;
    const keys = Object.keys(value);
    return keys.length === 1 && ['N', 'S', 'B', 'L', 'M'].includes(keys[0]);
  }
  function marshal(value: any): IJsonArgs {
    if (typeof value === 'number') return { N: value };
    if (typeof value === 'string') return { S: value };
    if (typeof value === 'boolean') return { B: value };
    if (value instanceof Date) return { S: value.toISOString() };
    if (Array.isArray(value)) return { L: value.map(marshal) };
    if (value !== null && typeof value === 'object') {
      const map = new Map<string, IJsonArgs>();
      for (const [key, item] of Object.entries(value)) if (item !== undefined) map.set(key, marshal(item));
      return { M: map };
    }
    return undefined;
  }
  function unmarshal(tson: IJson): any {
    if (!tson) return tson;
    if (tson.N !== undefined) return tson.N;
    if (tson.S !== undefined) return tson.S;
    if (tson.B !== undefined) return tson.B;
    if (tson.L !== undefined) return tson.L.map(unmarshal);
    if (tson.M !== undefined) {
      const obj: any = {};
      tson.M.forEach((item, key) => obj[key] = unmarshal(item));
      return obj;
    }
    return undefined;
  }
}
"#;
