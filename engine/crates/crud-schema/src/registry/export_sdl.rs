use std::fmt::Write;

use indexmap::IndexMap;

use super::{InputField, OperationKind, Registry, RootField};

pub(super) fn render(registry: &Registry) -> String {
    let mut sdl = registry.graph.to_sdl();

    for shape in registry.input_shapes() {
        if shape.fields.is_empty() {
            writeln!(sdl, "input {}", shape.name).ok();
        } else {
            writeln!(sdl, "input {} {{", shape.name).ok();
            for field in shape.fields.values() {
                writeln!(sdl, "\t{}", export_input_field(registry, field)).ok();
            }
            writeln!(sdl, "}}").ok();
        }
        sdl.push('\n');
    }

    let mut schema = String::new();

    for kind in [OperationKind::Query, OperationKind::Mutation] {
        let fields = match kind {
            OperationKind::Query => registry.query_fields(),
            OperationKind::Mutation => registry.mutation_fields(),
        };

        if fields.is_empty() {
            continue;
        }

        let type_name = registry.root_type_name(kind);
        export_root_type(registry, type_name, fields, &mut sdl);

        let operation = match kind {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        };
        writeln!(schema, "\t{operation}: {type_name}").ok();
    }

    if !schema.is_empty() {
        writeln!(sdl, "schema {{\n{schema}}}").ok();
    }

    sdl
}

fn export_root_type(registry: &Registry, type_name: &str, fields: &IndexMap<String, RootField>, sdl: &mut String) {
    writeln!(sdl, "type {type_name} {{").ok();

    for field in fields.values() {
        write!(sdl, "\t{}", field.name).ok();

        if !field.arguments.is_empty() {
            let arguments = field
                .arguments
                .values()
                .map(|argument| export_input_field(registry, argument))
                .collect::<Vec<_>>()
                .join(", ");
            write!(sdl, "({arguments})").ok();
        }

        writeln!(sdl, ": {}", registry.graph.render_type(&field.ty)).ok();
    }

    writeln!(sdl, "}}\n").ok();
}

fn export_input_field(registry: &Registry, field: &InputField) -> String {
    let mut out = format!("{}: {}", field.name, registry.render_input_type(&field.ty));

    if let Some(default_value) = &field.default_value {
        write!(out, " = {default_value}").ok();
    }

    out
}
