pub mod canvas;
pub mod recorder;
pub mod sink;
pub mod types;
pub mod utils;

pub use canvas::{encode_png, render_page};
pub use recorder::ActionRecorder;
pub use sink::{ArtifactSink, DirectorySink};
pub use types::{ActionEvent, ArtifactError, ArtifactResult};
pub use utils::{generate_filename, generate_timestamp, sanitize_label};
