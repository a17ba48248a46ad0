//! Rhai script executor implementation

use crate::bindings::{self, Database};
use crate::engine::{EntryArgument, ExecutorOptions, ScriptExecutor};
use crate::error::{FailureKind, Result, ScriptError};
use dust_store::{Document, DocumentStore};
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{CallFnOptions, Dynamic, Engine, ImmutableString, Scope, AST};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Rhai executor
///
/// Holds only the store and the options. The interpreter itself is created
/// per call and dropped before the call returns.
pub struct RhaiExecutor {
    store: Arc<dyn DocumentStore>,
    options: ExecutorOptions,
}

impl RhaiExecutor {
    /// Create executor with default options
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_options(store, ExecutorOptions::default())
    }

    /// Create executor with custom options
    pub fn with_options(store: Arc<dyn DocumentStore>, options: ExecutorOptions) -> Self {
        Self { store, options }
    }

    /// Execution options
    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Fresh engine carrying the limits and the store bindings
    fn build_engine(&self) -> Engine {
        let options = &self.options;
        let mut engine = Engine::new();

        engine.set_max_operations(options.max_operations);
        engine.set_max_call_levels(options.max_call_levels);
        engine.set_max_expr_depths(options.max_expr_depth, options.max_function_expr_depth);
        engine.set_max_string_size(options.max_string_size);
        engine.set_max_array_size(options.max_array_size);
        engine.set_max_map_size(options.max_map_size);

        // Scripts reach the store only through the bindings
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        if let Some(timeout) = options.timeout {
            let deadline = Instant::now() + timeout;
            engine.on_progress(move |_| {
                (Instant::now() >= deadline)
                    .then(|| Dynamic::from(FailureKind::Deadline.as_str().to_string()))
            });
        }

        bindings::register(&mut engine);
        engine
    }

    fn entry_argument(&self) -> Dynamic {
        let store = Arc::clone(&self.store);
        match self.options.entry_argument {
            EntryArgument::Document => Dynamic::from(Document::root(store)),
            EntryArgument::Database => Dynamic::from(Database::new(store)),
        }
    }

    fn has_entry_point(&self, ast: &AST) -> bool {
        ast.iter_functions()
            .any(|f| f.name == self.options.entry_point && f.params.len() == 1)
    }

    fn execute(&self, script: &str) -> Result<String> {
        let engine = self.build_engine();
        let mut scope = Scope::new();

        let ast = engine.compile(script)?;
        trace!(functions = ast.iter_functions().count(), "Script compiled");

        engine.run_ast_with_scope(&mut scope, &ast)?;

        if !self.has_entry_point(&ast) {
            return Err(ScriptError::EntryPointMissing {
                name: self.options.entry_point.clone(),
            });
        }

        let result: Dynamic = engine.call_fn_with_options(
            CallFnOptions::new().eval_ast(false).rewind_scope(true),
            &mut scope,
            &ast,
            &self.options.entry_point,
            (self.entry_argument(),),
        )?;

        into_string(result)
    }
}

fn into_string(value: Dynamic) -> Result<String> {
    let type_name = value.type_name().to_string();
    value
        .try_cast::<ImmutableString>()
        .map(|s| s.to_string())
        .ok_or(ScriptError::NonStringReturn { type_name })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}

impl ScriptExecutor for RhaiExecutor {
    fn apply_script(&self, script: &str) -> String {
        let start = Instant::now();
        debug!(script_len = script.len(), "Applying script");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(script)))
            .unwrap_or_else(|payload| Err(ScriptError::panic(panic_message(payload.as_ref()))));

        let elapsed_us = start.elapsed().as_micros() as u64;
        match outcome {
            Ok(result) => {
                debug!(elapsed_us, result_len = result.len(), "Script executed");
                result
            }
            Err(ScriptError::Panic { message }) => {
                warn!(elapsed_us, panic = %message, "Script execution panicked");
                ScriptError::panic(message).to_string()
            }
            Err(err) => {
                let kind = err.kind().map(|k| k.as_str()).unwrap_or("script");
                debug!(elapsed_us, kind, error = %err, "Script failed");
                err.to_string()
            }
        }
    }
}

impl fmt::Debug for RhaiExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RhaiExecutor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dust_store::InMemoryStore;
    use std::time::Duration;

    fn executor() -> (RhaiExecutor, Document) {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let root = Document::root(Arc::clone(&store));
        (RhaiExecutor::new(store), root)
    }

    #[test]
    fn test_hello() {
        let (executor, root) = executor();
        let result = executor
            .apply_script(r#"fn run(doc) { doc.get("foo").set("Hello"); doc.get("foo").val() }"#);

        assert_eq!(result, "Hello");
        assert_eq!(root.get("foo").val().unwrap(), "Hello");
    }

    #[test]
    fn test_hello_world() {
        let (executor, _) = executor();
        let result = executor.apply_script(
            r#"
            fn run(db) {
                db.get("foo").get("bar").set("Hello");
                db.get("foo").get("baz").set("World");
                db.get("foo").get("bar").val() + ", " + db.get("foo/baz").val()
            }
            "#,
        );

        assert_eq!(result, "Hello, World");
    }

    #[test]
    fn test_missing_entry_point() {
        let (executor, _) = executor();
        assert_eq!(executor.apply_script("let x = 1;"), "run method not defined");
        assert_eq!(
            executor.apply_script("fn run() { \"no args\" }"),
            "run method not defined"
        );
    }

    #[test]
    fn test_syntax_error() {
        let (executor, _) = executor();
        let result = executor.apply_script("fn run(doc) { ");
        assert!(result.starts_with("error: syntax error"), "{result}");
    }

    #[test]
    fn test_non_string_return() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script("fn run(doc) { 42 }"),
            "error: non-string return type"
        );
        assert_eq!(
            executor.apply_script("fn run(doc) { }"),
            "error: non-string return type"
        );
    }

    #[test]
    fn test_store_errors_are_verbatim() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script(r#"fn run(doc) { doc.get("non/existent").val() }"#),
            "error: Database value does not exist"
        );
        assert_eq!(
            executor.apply_script(
                r#"fn run(doc) { doc.get("foo/bar").set("x"); doc.get("foo").set("y"); "" }"#
            ),
            "error: Can't override value with composite"
        );
        assert_eq!(
            executor.apply_script(
                r#"fn run(doc) { doc.get("a").set("x"); doc.get("a/b/c").set("y"); "" }"#
            ),
            "error: Inconsistent database: parent is not a composite"
        );
    }

    #[test]
    fn test_thrown_values() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script(r#"fn run(doc) { throw "custom failure"; }"#),
            "error: custom failure"
        );
        assert_eq!(
            executor.apply_script("fn run(doc) { throw; }"),
            "error: runtime error"
        );
    }

    #[test]
    fn test_thrown_document_renders_as_json() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script(r#"fn run(doc) { doc.get("a").set("1"); throw doc; }"#),
            r#"error: {"a":"1"}"#
        );
    }

    #[test]
    fn test_top_level_error() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script(r#"throw "early"; fn run(doc) { "late" }"#),
            "error: early"
        );
    }

    #[test]
    fn test_executions_are_isolated() {
        let (executor, _) = executor();
        assert_eq!(
            executor.apply_script(r#"let x = 1; fn run(doc) { "first" }"#),
            "first"
        );
        assert_eq!(
            executor.apply_script(
                r#"if is_def_var("x") { throw "leaked"; } fn run(doc) { "clean" }"#
            ),
            "clean"
        );
    }

    #[test]
    fn test_store_persists_across_executions() {
        let (executor, _) = executor();
        executor.apply_script(r#"fn run(doc) { doc.get("counter").set("1"); "" }"#);

        assert_eq!(
            executor.apply_script(r#"fn run(doc) { doc.get("counter").val() }"#),
            "1"
        );
    }

    #[test]
    fn test_tree_operations() {
        let (executor, _) = executor();
        let result = executor.apply_script(
            r#"
            fn run(doc) {
                let users = doc.get("users");
                users.get("bob").set("b");
                users.get("ada").set("a");
                users.get("eve/role").set("admin");
                users.get("bob").remove();

                let out = "";
                for child in users.children() {
                    out += `${child.index()}=${child.is_composite()};`;
                }
                out += `${users.get("bob").exists()};`;
                out += `${doc.index()}|${users.index()}`;
                out
            }
            "#,
        );

        assert_eq!(result, "ada=false;eve=true;false;|users");
    }

    #[test]
    fn test_json_in_scripts() {
        let (executor, root) = executor();
        let result = executor.apply_script(
            r#"
            fn run(doc) {
                doc.get("src").from_json(`{"b":"2","a":{"c":"1"}}`);
                doc.get("dst").from_json(doc.get("src").to_json());
                doc.get("dst/a/c").val() + doc.get("missing").to_json()
            }
            "#,
        );

        assert_eq!(result, "1{}");
        assert_eq!(
            root.get("dst").to_json().unwrap(),
            r#"{"a":{"c":"1"},"b":"2"}"#
        );
    }

    #[test]
    fn test_root_document_stays_composite() {
        let (executor, root) = executor();

        assert_eq!(
            executor.apply_script(
                r#"fn run(doc) { doc.get("users/ada").set("admin"); doc.get("users").remove(); doc.set("oops"); "done" }"#
            ),
            "error: Can't override value with composite"
        );
        assert_eq!(
            executor.apply_script(r#"fn run(doc) { doc.from_json(`"str"`); "done" }"#),
            "error: Can't override value with composite"
        );

        assert_eq!(
            executor.apply_script(
                r#"fn run(doc) { doc.get("users/bob").set("x"); `${doc.children().len()}` }"#
            ),
            "1"
        );
        assert_eq!(root.to_json().unwrap(), r#"{"users":{"bob":"x"}}"#);
    }

    #[test]
    fn test_invalid_json_is_runtime_error() {
        let (executor, _) = executor();
        let result = executor.apply_script(r#"fn run(doc) { doc.from_json("[1, 2]"); "" }"#);
        assert!(result.starts_with("error: Invalid document JSON"), "{result}");
    }

    #[test]
    fn test_database_argument() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let executor = RhaiExecutor::with_options(
            Arc::clone(&store),
            ExecutorOptions::default().with_entry_argument(EntryArgument::Database),
        );

        let result = executor.apply_script(
            r#"
            fn run(db) {
                db.get_document("/app/name").set("dust");
                db.get_document("app").get("name").val()
            }
            "#,
        );

        assert_eq!(result, "dust");
        assert_eq!(Document::root(store).get("app/name").val().unwrap(), "dust");
    }

    #[test]
    fn test_deadline() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let executor = RhaiExecutor::with_options(
            store,
            ExecutorOptions::default().with_timeout(Duration::from_millis(50)),
        );

        assert_eq!(
            executor.apply_script("fn run(doc) { let i = 0; loop { i += 1; } }"),
            "error: execution deadline exceeded"
        );
    }

    #[test]
    fn test_operations_limit() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let executor = RhaiExecutor::with_options(
            store,
            ExecutorOptions::default().with_max_operations(1_000),
        );

        let result = executor.apply_script("fn run(doc) { let i = 0; loop { i += 1; } }");
        assert!(result.starts_with("error: "), "{result}");
        assert_ne!(result, "error: non-string return type");
    }

    #[test]
    fn test_no_module_imports() {
        let (executor, _) = executor();
        let result = executor.apply_script(r#"import "secrets" as s; fn run(doc) { "" }"#);
        assert!(result.starts_with("error: "), "{result}");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "");
    }
}
