use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for every canvas entity
static NEXT_ENTITY_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::SeqCst)
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(usize);

        impl $name {
            /// Allocates a fresh, never reused identifier
            pub fn next() -> Self {
                Self(generate_id())
            }

            pub fn raw(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a placed image on the canvas
    LayerId,
    "layer"
);
entity_id!(
    /// Identifies a freehand stroke
    StrokeId,
    "stroke"
);
entity_id!(
    /// Identifies one decoded (or decodable) pixel source. Replaced on crop.
    BitmapId,
    "bitmap"
);
