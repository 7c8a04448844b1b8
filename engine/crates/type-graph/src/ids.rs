// Isolating ids from the rest to prevent misuse of the NonZeroU32.
// They can only be created by From<usize>
use crate::{Definition, Field, TypeGraph};

/// Declares `NonZeroU32` id newtypes indexing into a `Vec` field of an arena struct.
#[macro_export]
macro_rules! id_newtypes {
    ($($ty:ident.$field:ident[$name:ident] => $out:ident unless $msg:literal,)*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
            pub struct $name(std::num::NonZeroU32);

            impl std::ops::Index<$name> for $ty {
                type Output = $out;

                fn index(&self, index: $name) -> &$out {
                    &self.$field[usize::from(index)]
                }
            }

            impl std::ops::IndexMut<$name> for $ty {
                fn index_mut(&mut self, index: $name) -> &mut $out {
                    &mut self.$field[usize::from(index)]
                }
            }

            impl From<usize> for $name {
                fn from(index: usize) -> Self {
                    Self(
                        u32::try_from(index)
                            .ok()
                            .and_then(|index| std::num::NonZeroU32::new(index + 1))
                            .expect($msg),
                    )
                }
            }

            impl From<$name> for usize {
                fn from(id: $name) -> Self {
                    (id.0.get() - 1) as usize
                }
            }
        )*
    }
}

id_newtypes! {
    TypeGraph.definitions[DefinitionId] => Definition unless "Too many definitions",
    TypeGraph.fields[FieldId] => Field unless "Too many fields",
}
