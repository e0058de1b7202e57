//! Markup engine for annotating blueprint images.
//!
//! The crate is headless. A host (web view, native shell, test) forwards raw
//! pointer, wheel, and key events to [`engine::MarkupEditor`] and reacts to
//! the [`engine::Action`]s it returns: repaint, prompt for text, persist the
//! markup. Independently of any editor, [`snapshot::render_snapshot`]
//! flattens a markup list onto the source image and encodes the result.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The editor: tool dispatch, gestures, selection, history |
//! | [`doc`] | Markup object types and the immutable [`doc::ObjectList`] |
//! | [`camera`] | Viewer transform and client/world conversions |
//! | [`input`] | Tools, tool settings, and the gesture state machine |
//! | [`hit`] | Hit-testing against markup objects |
//! | [`history`] | Snapshot undo/redo |
//! | [`preview`] | Transient in-progress pen and box shapes |
//! | [`style`] | Colors, size tiers, and shape enums |
//! | [`render`] | Rasterizing objects onto an image |
//! | [`glyphs`] | Text rasterization |
//! | [`snapshot`] | Load, flatten, and encode a snapshot |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod glyphs;
pub mod hit;
pub mod history;
pub mod input;
pub mod preview;
pub mod render;
pub mod snapshot;
pub mod style;

pub use config::MarkupConfig;
pub use doc::{MarkupObject, ObjectId, ObjectList};
pub use engine::{Action, MarkupEditor};
pub use error::MarkupError;
pub use snapshot::{ImageSource, Snapshot, SnapshotFormat, SnapshotOptions, render_snapshot};
