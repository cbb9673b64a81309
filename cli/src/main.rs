use clap::{Parser, Subcommand};
use std::path::PathBuf;

use protolink::schema::{ExtensionRegistry, Type};
use protolink::{
    load_and_link, load_catalogs_and_link, summary_json, type_set, LinkError, LinkedSet,
};

#[derive(Parser)]
#[command(name = "plk")]
#[command(about = "Link and inspect protobuf descriptor sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link descriptor-set files and report the resolution tiers
    Link {
        /// Input descriptor-set files (`.bin`)
        inputs: Vec<PathBuf>,

        /// Emit the report as pretty-printed JSON
        #[arg(long)]
        json: bool,
    },

    /// List the types defined across descriptor-set files
    Types {
        /// Input descriptor-set files (`.bin`)
        inputs: Vec<PathBuf>,

        /// Only list one kind: message, enum, or service
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Link every descriptor set named by the given reference catalogs
    Catalog {
        /// Input catalog files
        catalogs: Vec<PathBuf>,

        /// Emit the report as pretty-printed JSON
        #[arg(long)]
        json: bool,
    },
}

/// Whether a type is of the requested kind. Entity messages are still
/// messages for filtering purposes; the entity label is display only.
fn kind_matches(type_entry: &Type, kind: Option<&str>) -> bool {
    match kind {
        None => true,
        Some("message") => matches!(type_entry, Type::Message(_)),
        Some("enum") => matches!(type_entry, Type::Enum(_)),
        Some("service") => matches!(type_entry, Type::Service(_)),
        Some(_) => false,
    }
}

fn report(linked: &LinkedSet, json: bool) {
    if json {
        println!("{}", summary_json(linked));
        return;
    }
    for (tier, set) in [
        ("resolved", &linked.resolved),
        ("partially resolved", &linked.partially_resolved),
        ("unresolved", &linked.unresolved),
    ] {
        println!("{tier} ({}):", set.len());
        for name in set.names() {
            println!("  {name}");
        }
    }
}

fn main() -> Result<(), LinkError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Link { inputs, json } => {
            let linked = load_and_link(inputs)?;
            report(&linked, *json);
            Ok(())
        }

        Commands::Types { inputs, kind } => {
            let linked = load_and_link(inputs)?;
            let types = type_set(&linked);
            let registry = ExtensionRegistry::with_known_options();
            for type_entry in types.all_types() {
                if !kind_matches(&type_entry, kind.as_deref()) {
                    continue;
                }
                let label = match &type_entry {
                    Type::Message(message) if message.is_entity(&registry) => "entity",
                    Type::Message(_) => "message",
                    Type::Enum(_) => "enum",
                    Type::Service(_) => "service",
                };
                println!("{label} {}", type_entry.qualified_name());
            }
            Ok(())
        }

        Commands::Catalog { catalogs, json } => {
            let linked = load_catalogs_and_link(catalogs)?;
            report(&linked, *json);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protolink::schema::{
        known, EntityKind, EntityOption, EnumDescriptor, EnumValueDescriptor, FileSet,
        LinkedFileDescriptor, MessageDescriptor, OptionsWriter, RawFileDescriptor,
        ServiceDescriptor, TypeSet,
    };
    use std::sync::Arc;

    fn sample_types() -> Vec<Type> {
        let raw = RawFileDescriptor {
            name: Some("acme/order.proto".to_owned()),
            package: Some("acme".to_owned()),
            message_type: vec![MessageDescriptor {
                name: Some("Order".to_owned()),
                options: Some(
                    OptionsWriter::new()
                        .message_field(
                            known::ENTITY_OPTION,
                            &EntityOption {
                                kind: Some(EntityKind::Entity as i32),
                            },
                        )
                        .finish(),
                ),
                ..Default::default()
            }],
            enum_type: vec![EnumDescriptor {
                name: Some("Status".to_owned()),
                value: vec![EnumValueDescriptor {
                    name: Some("UNSET".to_owned()),
                    number: Some(0),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            service: vec![ServiceDescriptor {
                name: Some("Orders".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut files = FileSet::new();
        files.add(Arc::new(LinkedFileDescriptor::new(raw, Vec::new())));
        TypeSet::from_file_set(&files).all_types()
    }

    #[test]
    fn kind_filter_matches_on_the_type_variant() {
        let all = sample_types();
        let count = |k: Option<&str>| all.iter().filter(|t| kind_matches(t, k)).count();
        assert_eq!(count(None), 3);
        // The entity message is still a message for filtering purposes.
        assert_eq!(count(Some("message")), 1);
        assert_eq!(count(Some("enum")), 1);
        assert_eq!(count(Some("service")), 1);
        assert_eq!(count(Some("widget")), 0);

        let registry = ExtensionRegistry::with_known_options();
        let message = all
            .iter()
            .find(|t| matches!(t, Type::Message(_)))
            .expect("message type");
        if let Type::Message(order) = message {
            assert!(order.is_entity(&registry));
        }
    }
}
