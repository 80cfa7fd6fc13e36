//! Names that resolve without a declaration.

/// Bound in every function or script without being declared.
pub const CONTEXT_VARIABLES: &[&str] = &["arguments", "undefined", "Infinity", "NaN"];

const BUILTIN_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "Atomics",
    "Boolean",
    "DataView",
    "Date",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "Error",
    "escape",
    "eval",
    "EvalError",
    "Float32Array",
    "Float64Array",
    "Function",
    "globalThis",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "Intl",
    "isFinite",
    "isNaN",
    "JSON",
    "Map",
    "Math",
    "Number",
    "Object",
    "parseFloat",
    "parseInt",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "SharedArrayBuffer",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "unescape",
    "URIError",
    "WeakMap",
    "WeakSet",
];

pub fn is_builtin_global(name: &str) -> bool {
    BUILTIN_GLOBALS.contains(&name)
}
