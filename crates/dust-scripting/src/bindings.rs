//! Store bindings exposed to scripts
//!
//! Registers two opaque types on an engine: `Document`, a handle to one node
//! of the store, and `Database`, a handle to the whole store. Store errors
//! are raised as script errors carrying the store's message verbatim.

use dust_store::{Document, DocumentPath, DocumentStore, StoreError};
use rhai::{Array, Dynamic, Engine, EvalAltResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Script-visible name of [`Document`]
pub const DOCUMENT_TYPE: &str = "Document";

/// Script-visible name of [`Database`]
pub const DATABASE_TYPE: &str = "Database";

type FnResult<T> = Result<T, Box<EvalAltResult>>;

/// Whole-store handle handed to scripts
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    /// Wrap a store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Document at an absolute `/`-separated path
    pub fn get_document(&self, path: &str) -> Document {
        Document::new(Arc::clone(&self.store), DocumentPath::parse(path))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

fn raise(err: StoreError) -> Box<EvalAltResult> {
    err.to_string().into()
}

/// Register the document types and the logging functions on `engine`
pub fn register(engine: &mut Engine) {
    register_document(engine);
    register_database(engine);
    register_logging(engine);
}

fn register_document(engine: &mut Engine) {
    engine
        .register_type_with_name::<Document>(DOCUMENT_TYPE)
        .register_fn("get", |doc: &mut Document, name: &str| doc.get(name))
        .register_fn("set", |doc: &mut Document, value: &str| -> FnResult<()> {
            doc.set(value).map_err(raise)
        })
        .register_fn("val", |doc: &mut Document| -> FnResult<String> {
            doc.val().map_err(raise)
        })
        .register_fn("exists", |doc: &mut Document| doc.exists())
        .register_fn("is_composite", |doc: &mut Document| doc.is_composite())
        .register_fn("remove", |doc: &mut Document| doc.remove())
        .register_fn("children", |doc: &mut Document| -> FnResult<Array> {
            let children = doc.children().map_err(raise)?;
            Ok(children.into_iter().map(Dynamic::from).collect())
        })
        .register_fn("index", |doc: &mut Document| doc.index())
        .register_fn("to_json", |doc: &mut Document| -> FnResult<String> {
            doc.to_json().map_err(raise)
        })
        .register_fn("from_json", |doc: &mut Document, json: &str| -> FnResult<()> {
            doc.from_json(json).map_err(raise)
        })
        .register_fn("to_string", |doc: &mut Document| -> FnResult<String> {
            doc.to_json().map_err(raise)
        })
        .register_fn("to_debug", |doc: &mut Document| {
            format!("{}({})", DOCUMENT_TYPE, doc.path())
        });
}

fn register_database(engine: &mut Engine) {
    engine
        .register_type_with_name::<Database>(DATABASE_TYPE)
        .register_fn("get_document", |db: &mut Database, path: &str| {
            db.get_document(path)
        })
        .register_fn("to_debug", |_: &mut Database| DATABASE_TYPE.to_string());
}

fn register_logging(engine: &mut Engine) {
    engine.register_fn("log_debug", |msg: &str| {
        debug!(script_log = msg);
    });

    engine.register_fn("log_info", |msg: &str| {
        info!(script_log = msg);
    });

    engine.register_fn("log_warn", |msg: &str| {
        warn!(script_log = msg);
    });

    engine.on_print(|text| debug!(target: "dust::script", "{}", text));
    engine.on_debug(|text, source, pos| {
        debug!(target: "dust::script", source = source.unwrap_or(""), %pos, "{}", text)
    });
}
