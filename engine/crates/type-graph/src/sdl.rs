use std::fmt::Write;

use crate::{
    ingest::{DEFAULT_DIRECTIVE, VALUE_ARGUMENT},
    DefinitionKind, DefinitionWalker, InputValue, TypeGraph,
};

pub(crate) fn render(graph: &TypeGraph) -> String {
    let mut sdl = String::new();

    let has_field_defaults = graph
        .definitions()
        .filter(|definition| matches!(definition.kind(), DefinitionKind::Object | DefinitionKind::Interface))
        .flat_map(|definition| definition.fields())
        .any(|field| field.default_value().is_some());

    if has_field_defaults {
        writeln!(sdl, "directive @{DEFAULT_DIRECTIVE}({VALUE_ARGUMENT}: String) on FIELD_DEFINITION\n").ok();
    }

    for definition in graph.definitions().filter(|definition| !definition.is_builtin()) {
        export_definition(graph, definition, &mut sdl);
    }

    sdl
}

fn export_definition(graph: &TypeGraph, definition: DefinitionWalker<'_>, sdl: &mut String) {
    export_description(sdl, definition.description(), "");

    match definition.kind() {
        DefinitionKind::Scalar => {
            writeln!(sdl, "scalar {}", definition.name()).ok();
        }
        DefinitionKind::Enum => {
            writeln!(sdl, "enum {} {{", definition.name()).ok();
            for value in definition.enum_values() {
                writeln!(sdl, "\t{value}").ok();
            }
            writeln!(sdl, "}}").ok();
        }
        DefinitionKind::Union => {
            let members = definition
                .possible_types()
                .map(|member| member.name())
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(sdl, "union {} = {members}", definition.name()).ok();
        }
        DefinitionKind::InputObject => {
            writeln!(sdl, "input {} {{", definition.name()).ok();
            for field in definition.fields() {
                export_description(sdl, field.description(), "\t");
                write!(sdl, "\t{}: {}", field.name(), graph.render_type(field.ty())).ok();
                if let Some(default_value) = field.default_value() {
                    write!(sdl, " = {default_value}").ok();
                }
                sdl.push('\n');
            }
            writeln!(sdl, "}}").ok();
        }
        DefinitionKind::Object | DefinitionKind::Interface => {
            let keyword = if definition.kind() == DefinitionKind::Object {
                "type"
            } else {
                "interface"
            };

            write!(sdl, "{keyword} {}", definition.name()).ok();

            let interfaces = definition
                .implements()
                .map(|interface| interface.name())
                .collect::<Vec<_>>()
                .join(" & ");

            if !interfaces.is_empty() {
                write!(sdl, " implements {interfaces}").ok();
            }

            writeln!(sdl, " {{").ok();

            for field in definition.fields() {
                export_description(sdl, field.description(), "\t");
                write!(sdl, "\t{}", field.name()).ok();

                if !field.arguments().is_empty() {
                    let arguments = field
                        .arguments()
                        .iter()
                        .map(|argument| export_input_value(graph, argument))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(sdl, "({arguments})").ok();
                }

                write!(sdl, ": {}", graph.render_type(field.ty())).ok();

                if let Some(default_value) = field.default_value() {
                    write!(sdl, " @{DEFAULT_DIRECTIVE}({VALUE_ARGUMENT}: {default_value})").ok();
                }

                sdl.push('\n');
            }

            writeln!(sdl, "}}").ok();
        }
    }

    sdl.push('\n');
}

fn export_input_value(graph: &TypeGraph, input_value: &InputValue) -> String {
    let mut out = format!("{}: {}", input_value.name, graph.render_type(&input_value.ty));

    if let Some(default_value) = &input_value.default_value {
        write!(out, " = {default_value}").ok();
    }

    out
}

fn export_description(sdl: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let description = description.replace('\n', &format!("\n{indent}"));
        writeln!(sdl, "{indent}\"\"\"\n{indent}{description}\n{indent}\"\"\"").ok();
    }
}
