//! SketchCalc Core Library
//!
//! Platform-agnostic core data structures and logic for the SketchCalc
//! drawing canvas: pixel surface, stroke capture, undo/redo history, pan,
//! input handling, themes and recognition results.

pub mod camera;
pub mod canvas;
pub mod history;
pub mod input;
pub mod layout;
pub mod raster;
pub mod results;
pub mod storage;
pub mod theme;
pub mod tools;

pub use camera::Camera;
pub use canvas::{CanvasConfig, EquationSpan, SketchCanvas, Snapshot};
pub use history::History;
pub use input::{InputMode, InputState, KeyEvent, PointerEvent, TouchPhase};
pub use layout::{estimate_label_width, place_results};
pub use raster::{Paint, PixelBuffer, Rgba};
pub use results::{RecognitionResult, ResultKind};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use theme::{CanvasColors, ResolvedTheme, Theme, ThemePalette, ThemeStore};
pub use tools::{Pen, ToolKind};
