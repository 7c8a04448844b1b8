// Isolating ids from the rest to prevent misuse of the NonZeroU32.
// They can only be created by From<usize>
use super::{InputShape, Registry};

type_graph::id_newtypes! {
    Registry.input_shapes[InputShapeId] => InputShape unless "Too many input shapes",
}
