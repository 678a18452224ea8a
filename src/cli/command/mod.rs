pub mod station;
pub mod summary;

use std::path::{Path, PathBuf};

pub use station::station;
pub use summary::summary;

use crate::{export::OutputFormat, range::DateRange};

/// `ogimet-<from>.<ext>` for one day, `ogimet-<from>_<to>.<ext>` for a range.
pub fn make_output_file_name(range: &DateRange, format: OutputFormat, output_dir: &Path) -> PathBuf {
    let file_name = if range.is_single_day() {
        format!("ogimet-{}.{}", range.start(), format.extension())
    } else {
        format!(
            "ogimet-{}_{}.{}",
            range.start(),
            range.end(),
            format.extension()
        )
    };

    output_dir.join(file_name)
}

// -- Tests -------------------------------------------------------------------
