//! Example demonstrating runtime schemas with base and derived layers

use envira::{EnumType, Schema, TypeDesc, Value};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Fields shared by every service
    let base = Schema::new("ServiceEnv")
        .class_var("SCHEMA_VERSION", TypeDesc::Str, "2")
        .field("HOST", TypeDesc::Str)
        .field_with_default("PORT", TypeDesc::Int, 8080)
        .field("DEBUG", TypeDesc::Bool);

    // A worker overrides PORT and adds its own fields
    let worker = base
        .extend("WorkerEnv")
        .field("PORT", TypeDesc::optional(TypeDesc::Int))
        .field("QUEUES", TypeDesc::list_of(TypeDesc::Str))
        .field(
            "MODE",
            EnumType::new("Mode", [("Batch", "batch"), ("Stream", "stream")]).into(),
        )
        .field("RETRY", TypeDesc::literal([Value::Null, Value::Int(3), Value::Int(5)]));

    std::env::set_var("WORKER_HOST", "queue.internal");
    std::env::set_var("WORKER_QUEUES", "emails;reports");
    std::env::set_var("WORKER_MODE", "stream");
    std::env::set_var("WORKER_RETRY", "5");

    let instance = worker.load("WORKER_")?;
    println!("{instance}");
    println!("{}", serde_json::to_string_pretty(&instance)?);
    println!(
        "Schema version: {:?}",
        worker.class_value("SCHEMA_VERSION")
    );

    Ok(())
}
