//! Markdown post body rendering with component overrides.
//!
//! | Stage | Module |
//! |---|---|
//! | **Parse** | [`tree`]: `pulldown-cmark` events + `quick-xml` for embedded HTML |
//! | **Override** | [`overrides`]: element kinds → presentational components |
//! | **Highlight** | [`highlight`]: `syntect` inline-styled code blocks |
//! | **Serialize** | [`render`]: display tree → HTML via Maud |

pub mod highlight;
pub mod overrides;
pub mod render;
pub mod tree;

pub use overrides::{Display, NoteVariant, Override, OverrideTable};
pub use render::Renderer;
pub use tree::{Attributes, Element, Node};
