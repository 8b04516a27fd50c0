//! Static evaluation of `tailwind.config.js` files.
//!
//! The config module is parsed with swc and the exported object literal is
//! folded into a JSON value. Nothing is executed: `require("x")` and default
//! imports evaluate to the module name, which is how plugins are recorded.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::sync::Arc;
use swc_core::common::{FileName, Globals, SourceMap, Span, Spanned, GLOBALS};
use swc_core::ecma::ast::*;
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax};
use tracing::debug;

use crate::errors::{Result, ThemeError};

/// Nesting limit for objects and chained bindings
const MAX_DEPTH: usize = 64;

/// Upper bound on JSON nodes produced, counting every reuse of a binding
const MAX_NODES: usize = 100_000;

/// Parse a config file and evaluate its exported object
pub fn evaluate_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ThemeError::JsConfig {
        path: path.display().to_string(),
        message: format!("Failed to read file: {}", e),
    })?;
    evaluate_config_source(&content, &path.display().to_string())
}

/// Parse config source and evaluate its exported object
pub fn evaluate_config_source(content: &str, source_name: &str) -> Result<Value> {
    let source_map = Arc::new(SourceMap::default());
    let source_file = source_map.new_source_file(
        FileName::Custom(source_name.to_string()).into(),
        content.to_string(),
    );

    let syntax = Syntax::Es(EsSyntax {
        jsx: false,
        ..Default::default()
    });

    let module = GLOBALS.set(&Globals::new(), || {
        parse_file_as_module(
            &source_file,
            syntax,
            EsVersion::latest(),
            None,
            &mut vec![],
        )
        .map_err(|e| ThemeError::JsConfig {
            path: source_name.to_string(),
            message: format!("Failed to parse JavaScript: {:?}", e),
        })
    })?;

    let evaluator = ConfigEvaluator::new(&module, source_name, &source_map);
    let exported = evaluator.exported.ok_or_else(|| ThemeError::JsConfig {
        path: source_name.to_string(),
        message: "no `module.exports = ...` or `export default ...` found".to_string(),
    })?;

    debug!(source = source_name, bindings = evaluator.bindings.len(), "evaluating config export");
    evaluator.eval(exported, 0)
}

/// Top-level bindings of a config module and its export
struct ConfigEvaluator<'a> {
    source_name: &'a str,
    source_map: &'a SourceMap,
    bindings: IndexMap<String, &'a Expr>,
    imports: IndexMap<String, String>,
    exported: Option<&'a Expr>,
    /// Evaluated bindings; `None` while a binding is being evaluated
    cache: RefCell<IndexMap<String, Option<Value>>>,
    nodes: Cell<usize>,
}

impl<'a> ConfigEvaluator<'a> {
    fn new(module: &'a Module, source_name: &'a str, source_map: &'a SourceMap) -> Self {
        let mut evaluator = Self {
            source_name,
            source_map,
            bindings: IndexMap::new(),
            imports: IndexMap::new(),
            exported: None,
            cache: RefCell::new(IndexMap::new()),
            nodes: Cell::new(0),
        };

        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                    for decl in &var.decls {
                        if let (Pat::Ident(binding), Some(init)) = (&decl.name, &decl.init) {
                            evaluator
                                .bindings
                                .insert(binding.id.sym.to_string(), &**init);
                        }
                    }
                }
                ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                    if let Expr::Assign(assign) = &*stmt.expr {
                        if is_module_exports(&assign.left) {
                            evaluator.exported = Some(&*assign.right);
                        }
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    evaluator.exported = Some(&*export.expr);
                }
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    let source = import.src.value.to_string();
                    for specifier in &import.specifiers {
                        let local = match specifier {
                            ImportSpecifier::Default(s) => &s.local,
                            ImportSpecifier::Named(s) => &s.local,
                            ImportSpecifier::Namespace(s) => &s.local,
                        };
                        evaluator
                            .imports
                            .insert(local.sym.to_string(), source.clone());
                    }
                }
                _ => {}
            }
        }

        evaluator
    }

    fn eval(&self, expr: &Expr, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error(expr.span(), "expression is nested too deeply"));
        }
        self.charge(1, expr.span())?;

        match expr {
            Expr::Object(object) => self.eval_object(object, depth),
            Expr::Array(array) => {
                let mut values = Vec::with_capacity(array.elems.len());
                for element in &array.elems {
                    match element {
                        Some(ExprOrSpread { spread: None, expr }) => {
                            values.push(self.eval(expr, depth + 1)?)
                        }
                        Some(ExprOrSpread { spread: Some(span), .. }) => {
                            return Err(self.error(*span, "array spread is not supported"))
                        }
                        None => return Err(self.error(array.span, "array holes are not supported")),
                    }
                }
                Ok(Value::Array(values))
            }
            Expr::Lit(lit) => self.eval_lit(lit),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => Ok(Value::String(
                tpl.quasis
                    .iter()
                    .map(|quasi| match &quasi.cooked {
                        Some(cooked) => cooked.to_string(),
                        None => quasi.raw.to_string(),
                    })
                    .collect(),
            )),
            Expr::Paren(paren) => self.eval(&paren.expr, depth + 1),
            Expr::Unary(unary) if unary.op == UnaryOp::Minus => {
                match self.eval(&unary.arg, depth + 1)? {
                    Value::Number(n) => n
                        .as_f64()
                        .map(|value| number(-value))
                        .ok_or_else(|| self.error(unary.span, "number out of range")),
                    _ => Err(self.error(unary.span, "unary minus needs a number")),
                }
            }
            Expr::Ident(ident) => self.lookup(ident, depth),
            Expr::Call(call) => self.eval_call(call, depth),
            other => Err(self.error(
                other.span(),
                format!("{} is not supported in a static config", describe(other)),
            )),
        }
    }

    fn eval_object(&self, object: &ObjectLit, depth: usize) -> Result<Value> {
        let mut map = Map::new();
        for prop in &object.props {
            let prop = match prop {
                PropOrSpread::Prop(prop) => prop,
                PropOrSpread::Spread(spread) => {
                    return Err(self.error(spread.dot3_token, "object spread is not supported"))
                }
            };

            match &**prop {
                Prop::KeyValue(kv) => {
                    let key = self.prop_key(&kv.key)?;
                    map.insert(key, self.eval(&kv.value, depth + 1)?);
                }
                Prop::Shorthand(ident) => {
                    map.insert(ident.sym.to_string(), self.lookup(ident, depth + 1)?);
                }
                other => {
                    return Err(self.error(
                        other.span(),
                        "methods and accessors are not supported in a static config",
                    ))
                }
            }
        }
        Ok(Value::Object(map))
    }

    fn eval_lit(&self, lit: &Lit) -> Result<Value> {
        match lit {
            Lit::Str(s) => Ok(Value::String(s.value.to_string())),
            Lit::Num(n) => Ok(number(n.value)),
            Lit::Bool(b) => Ok(Value::Bool(b.value)),
            Lit::Null(_) => Ok(Value::Null),
            other => Err(self.error(other.span(), "only string, number, boolean and null literals are supported")),
        }
    }

    /// `require("x")`, optionally called again with plugin options
    fn eval_call(&self, call: &CallExpr, depth: usize) -> Result<Value> {
        let callee = match &call.callee {
            Callee::Expr(callee) => callee,
            _ => return Err(self.error(call.span, "only `require(...)` calls are supported")),
        };

        match &**callee {
            Expr::Ident(ident) if &*ident.sym == "require" => match call.args.as_slice() {
                [ExprOrSpread { spread: None, expr }] => match &**expr {
                    Expr::Lit(Lit::Str(name)) => Ok(Value::String(name.value.to_string())),
                    _ => Err(self.error(call.span, "`require` needs a string literal")),
                },
                _ => Err(self.error(call.span, "`require` takes exactly one argument")),
            },
            // require("plugin")(options) or an imported plugin factory
            Expr::Call(_) | Expr::Ident(_) => match self.eval(callee, depth + 1)? {
                Value::String(name) => Ok(Value::String(name)),
                _ => Err(self.error(call.span, "only plugin factories can be called")),
            },
            _ => Err(self.error(call.span, "only `require(...)` calls are supported")),
        }
    }

    fn lookup(&self, ident: &Ident, depth: usize) -> Result<Value> {
        let name: &str = &ident.sym;
        if let Some(init) = self.bindings.get(name) {
            match self.cache.borrow().get(name) {
                Some(Some(value)) => {
                    let remaining = MAX_NODES.saturating_sub(self.nodes.get());
                    self.charge(count_nodes(value, remaining + 1), ident.span)?;
                    return Ok(value.clone());
                }
                Some(None) => {
                    return Err(self.error(ident.span, format!("`{}` refers to itself", name)))
                }
                None => {}
            }

            self.cache.borrow_mut().insert(name.to_string(), None);
            let value = self.eval(init, depth + 1)?;
            self.cache
                .borrow_mut()
                .insert(name.to_string(), Some(value.clone()));
            return Ok(value);
        }
        if let Some(source) = self.imports.get(name) {
            return Ok(Value::String(source.clone()));
        }
        Err(self.error(ident.span, format!("`{}` is not defined at top level", name)))
    }

    fn prop_key(&self, key: &PropName) -> Result<String> {
        match key {
            PropName::Ident(ident) => Ok(ident.sym.to_string()),
            PropName::Str(s) => Ok(s.value.to_string()),
            PropName::Num(n) => Ok(number_key(n.value)),
            other => Err(self.error(other.span(), "computed and bigint keys are not supported")),
        }
    }

    fn charge(&self, nodes: usize, span: Span) -> Result<()> {
        let total = self.nodes.get().saturating_add(nodes);
        if total > MAX_NODES {
            return Err(self.error(
                span,
                format!("config expands to more than {} values", MAX_NODES),
            ));
        }
        self.nodes.set(total);
        Ok(())
    }

    fn error(&self, span: Span, message: impl Into<String>) -> ThemeError {
        let loc = self.source_map.lookup_char_pos(span.lo);
        ThemeError::JsConfig {
            path: self.source_name.to_string(),
            message: format!("{} (line {}, column {})", message.into(), loc.line, loc.col_display),
        }
    }
}

fn is_module_exports(target: &AssignTarget) -> bool {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
            let object_is_module =
                matches!(&*member.obj, Expr::Ident(obj) if &*obj.sym == "module");
            let prop_is_exports =
                matches!(&member.prop, MemberProp::Ident(prop) if &*prop.sym == "exports");
            object_is_module && prop_is_exports
        }
        _ => false,
    }
}

/// Number of JSON nodes in `value`, counting stops at `limit`
fn count_nodes(value: &Value, limit: usize) -> usize {
    let mut count = 0;
    let mut stack = vec![value];
    while let Some(value) = stack.pop() {
        count += 1;
        if count >= limit {
            break;
        }
        match value {
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.values()),
            _ => {}
        }
    }
    count
}

/// Integral numbers stay integers so `0` round-trips as `0`, not `0.0`
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn describe(expr: &Expr) -> &'static str {
    match expr {
        Expr::Fn(_) | Expr::Arrow(_) => "a function",
        Expr::Tpl(_) => "a template literal with substitutions",
        Expr::Member(_) => "a member access",
        Expr::Bin(_) => "a binary expression",
        Expr::Cond(_) => "a conditional expression",
        Expr::New(_) => "a `new` expression",
        Expr::Await(_) => "an `await` expression",
        _ => "this expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_exports_object() {
        let value = evaluate_config_source(
            r##"
/** @type {import('tailwindcss').Config} */
module.exports = {
  content: ["*.html"],
  theme: {
    fontFamily: {
      sans: ["Itim"],
    },
    extend: {
      colors: {
        primary: "#FCA5A5",
      },
    },
  },
  plugins: [],
};
"##,
            "tailwind.config.js",
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "content": ["*.html"],
                "theme": {
                    "fontFamily": { "sans": ["Itim"] },
                    "extend": { "colors": { "primary": "#FCA5A5" } }
                },
                "plugins": []
            })
        );
    }

    #[test]
    fn test_export_default_through_binding() {
        let value = evaluate_config_source(
            r##"
import forms from "@tailwindcss/forms";
const brand = "#FCA5A5";
const config = {
  content: [`./src/**/*.{html,js}`],
  theme: { extend: { colors: { brand }, lineHeight: { 0: "0" }, zIndex: { under: -1 } } },
  plugins: [forms, require("@tailwindcss/typography")({ className: "prose" })],
};
export default config;
"##,
            "tailwind.config.mjs",
        )
        .unwrap();

        assert_eq!(value["content"], json!(["./src/**/*.{html,js}"]));
        assert_eq!(value["theme"]["extend"]["colors"]["brand"], json!("#FCA5A5"));
        assert_eq!(value["theme"]["extend"]["lineHeight"], json!({ "0": "0" }));
        assert_eq!(value["theme"]["extend"]["zIndex"]["under"], json!(-1));
        assert_eq!(
            value["plugins"],
            json!(["@tailwindcss/forms", "@tailwindcss/typography"])
        );
    }

    #[test]
    fn test_missing_export() {
        let err = evaluate_config_source("const config = { content: [] };", "empty.js").unwrap_err();
        assert!(err.to_string().contains("no `module.exports"));
    }

    #[test]
    fn test_spread_is_rejected_with_location() {
        let err = evaluate_config_source(
            "const base = {};\nmodule.exports = {\n  ...base,\n};\n",
            "spread.js",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("spread.js"), "{}", message);
        assert!(message.contains("object spread"), "{}", message);
        assert!(message.contains("line 3"), "{}", message);
    }

    #[test]
    fn test_functions_are_rejected() {
        let err = evaluate_config_source(
            "module.exports = { theme: { extend: { colors: ({ theme }) => theme('x') } } };",
            "fn.js",
        )
        .unwrap_err();
        assert!(err.to_string().contains("a function"));
    }

    #[test]
    fn test_cyclic_bindings_terminate() {
        let err = evaluate_config_source(
            "const a = b;\nconst b = a;\nmodule.exports = a;\n",
            "cycle.js",
        )
        .unwrap_err();
        assert!(err.to_string().contains("`a` refers to itself"));
    }

    #[test]
    fn test_shared_bindings_are_evaluated_once() {
        let mut source = String::from("const a0 = { primary: \"#FCA5A5\" };\n");
        for i in 1..=8 {
            source.push_str(&format!("const a{} = [a{}, a{}];\n", i, i - 1, i - 1));
        }
        source.push_str("module.exports = { theme: { extend: { colors: a8 } } };\n");

        let value = evaluate_config_source(&source, "shared.js").unwrap();
        let mut colors = &value["theme"]["extend"]["colors"];
        for _ in 0..8 {
            assert_eq!(colors.as_array().map(Vec::len), Some(2));
            colors = &colors[1];
        }
        assert_eq!(colors["primary"], json!("#FCA5A5"));
    }

    #[test]
    fn test_exponential_fan_out_is_rejected() {
        let mut source = String::from("const a0 = \"x\";\n");
        for i in 1..=12 {
            let j = i - 1;
            source.push_str(&format!("const a{} = [a{}, a{}, a{}, a{}];\n", i, j, j, j, j));
        }
        source.push_str("module.exports = { content: a12 };\n");

        let err = evaluate_config_source(&source, "fanout.js").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fanout.js"), "{}", message);
        assert!(message.contains("more than 100000 values"), "{}", message);
    }

    #[test]
    fn test_syntax_error() {
        let err = evaluate_config_source("module.exports = { content: [", "broken.js").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_evaluate_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::with_suffix(".config.js").unwrap();
        file.write_all(br#"module.exports = { content: ["*.html"], plugins: [] };"#)
            .unwrap();
        let value = evaluate_config_file(file.path()).unwrap();
        assert_eq!(value, json!({ "content": ["*.html"], "plugins": [] }));

        let missing = file.path().with_file_name("missing.config.js");
        let err = evaluate_config_file(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.config.js"));
    }
}
