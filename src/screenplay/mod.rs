/*!
 * Screenplay structure: text cleanup, scene heading detection, segmentation
 * and linear export (text, JSON scene list, DOCX).
 *
 * Raw text flows `clean_text -> Segmenter::segment -> Vec<Scene>`; everything
 * downstream works on the scene list only.
 */

pub mod cleaner;
pub mod export;
pub mod header;
pub mod scene;
pub mod segmenter;

pub use cleaner::{clean_lines, clean_text};
pub use export::{
    docx_paragraphs, export_docx, export_scenes, export_scenes_json, export_screenplay,
    load_scenes_json, render_docx, render_screenplay, DocxParagraph, ExportFormat,
};
pub use header::{detect_header, HeaderLayer, HeaderMatch};
pub use scene::{Scene, SceneKey};
pub use segmenter::{parse_scenes, Segmentation, Segmenter, SegmenterConfig};
