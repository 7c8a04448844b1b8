//! Flattens a selection into the relation paths the storage should eager-load.

use async_graphql_parser::{
    types::{Field, Selection, SelectionSet},
    Positioned,
};
use indexmap::IndexSet;
use type_graph::RelationLinks;

use crate::storage::IncludePath;

/// Every relation reached by `selection`, as paths from `type_name`, in order of first
/// occurrence. Fragments are not expanded: relations selected inside them are not included.
pub fn flatten<L>(links: &L, selection: &Selection, type_name: &str, path: &IncludePath) -> Vec<IncludePath>
where
    L: RelationLinks + ?Sized,
{
    let mut includes = IndexSet::new();
    collect(links, selection, type_name, path, &mut includes);
    includes.into_iter().collect()
}

/// [`flatten`] over all the selections of a field returning `type_name`.
pub fn flatten_selection_set<L>(links: &L, selection_set: &SelectionSet, type_name: &str) -> Vec<IncludePath>
where
    L: RelationLinks + ?Sized,
{
    let mut includes = IndexSet::new();
    let root = IncludePath::root();

    for selection in &selection_set.items {
        collect(links, &selection.node, type_name, &root, &mut includes);
    }

    includes.into_iter().collect()
}

fn collect<L>(links: &L, selection: &Selection, type_name: &str, path: &IncludePath, includes: &mut IndexSet<IncludePath>)
where
    L: RelationLinks + ?Sized,
{
    match selection {
        Selection::Field(Positioned { node: field, .. }) => collect_field(links, field, type_name, path, includes),
        Selection::FragmentSpread(_) | Selection::InlineFragment(_) => (),
    }
}

fn collect_field<L>(links: &L, field: &Field, type_name: &str, path: &IncludePath, includes: &mut IndexSet<IncludePath>)
where
    L: RelationLinks + ?Sized,
{
    let field_name = field.name.node.as_str();

    match links.relation_link(type_name, field_name) {
        Some(linked_type) => {
            let path = path.child(field_name);
            includes.insert(path.clone());

            for selection in &field.selection_set.node.items {
                collect(links, &selection.node, linked_type, &path, includes);
            }
        }
        None => {
            for selection in &field.selection_set.node.items {
                collect(links, &selection.node, type_name, path, includes);
            }
        }
    }
}
