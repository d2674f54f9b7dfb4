//! Classification taxonomy of lane lines, road boundaries and road markings.
//!
//! Every axis is a small integer code in the persisted file. Decoding is
//! total: unknown codes map to the axis' default variant instead of failing,
//! because the codes come straight from untrusted files.

/// Declares a taxonomy axis backed by an integer code.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Decodes a persisted code, falling back to the default variant.
            #[must_use]
            pub fn from_code(code: i32) -> Self {
                match code {
                    $( $code => Self::$variant, )+
                    _ => Self::$default,
                }
            }

            /// Returns the persisted code of this variant.
            #[must_use]
            pub fn code(self) -> i32 {
                match self {
                    $( Self::$variant => $code, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

pub mod boundary;
pub mod lane;
pub mod marker;
pub mod packing;

pub use boundary::{BoundaryInfo, BoundarySide, BoundarySurface, UNKNOWN_BOUNDARY_SLOT};
pub use lane::{BicycleLane, Continuation, LaneInfo, LaneSide, LineColor, LinePattern, Multiplicity};
pub use marker::RoadMarkerKind;
pub use packing::{pack_side_slot, unpack_side_slot};
