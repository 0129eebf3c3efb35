//! Pipeline stages for page preparation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. switch the rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ materialize ──▶ layout ──▶ rotation ──▶ render
//! (URL/path)  (split+decrypt)  (boxes)   (verdict)    (PNG, lattice only)
//! ```
//!
//! 1. [`input`]       - canonicalise the user-supplied path or URL to a local file
//! 2. [`materialize`] - split out each selected page, decrypting as needed,
//!    and normalise its orientation
//! 3. [`layout`]      - decompose a single-page document into character,
//!    text-line, and image boxes
//! 4. [`rotation`]    - pure skew verdict over the layout partitions
//! 5. [`render`]      - rasterise the page to PNG when the flavor needs it

pub mod input;
pub mod layout;
pub mod materialize;
pub mod render;
pub mod rotation;
