//! Basic usage example for dust-store

use dust_store::{snapshot, Document, DocumentStore, InMemoryStore, Result};
use std::sync::Arc;

fn main() -> Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let root = Document::root(Arc::clone(&store));

    // Scalars and composites
    println!("=== Basic Operations ===");
    root.get("users/alice/name").set("Alice")?;
    root.get("users/bob/name").set("Bob")?;
    println!("alice: {}", root.get("users").get("alice").get("name").val()?);
    println!("users is composite: {}", root.get("users").is_composite());

    // Children come back in name order
    println!("\n=== Children ===");
    for user in root.get("users").children()? {
        println!("  {}", user.index());
    }

    // Consistency rules
    println!("\n=== Consistency ===");
    if let Err(e) = root.get("users/alice/name/first").set("A") {
        println!("Rejected: {}", e);
    }

    // JSON in and out
    println!("\n=== JSON ===");
    root.get("config").from_json(r#"{"mode":"fast","retries":"3"}"#)?;
    println!("{}", root.to_json()?);

    // Removal prunes empty parents
    root.get("users/bob/name").remove();
    println!("bob exists: {}", root.get("users/bob").exists());

    let path = std::env::temp_dir().join("dust-example.json");
    snapshot::save(store.as_ref(), &path)?;
    println!("\nSnapshot written to {}", path.display());

    Ok(())
}
