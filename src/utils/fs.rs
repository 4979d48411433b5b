use std::path::{Path, PathBuf};

/// Marker glued in front of every converted copy's name.
pub const CONVERTED_PREFIX: &str = "converted";

/// Name of the converted copy: the marker plus the untouched original name.
pub fn converted_filename(original: &str) -> String {
    format!("{CONVERTED_PREFIX}{original}")
}

/// Full output location for a converted copy inside `destination`.
pub fn output_path(destination: &str, original: &str) -> PathBuf {
    Path::new(destination).join(converted_filename(original))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_name_keeps_extension_casing() {
        assert_eq!(converted_filename("Photo.JPG"), "convertedPhoto.JPG");
        assert_eq!(converted_filename("a.png"), "converteda.png");
    }

    #[test]
    fn output_path_joins_destination() {
        let path = output_path("/tmp/out", "cat.jpeg");
        assert_eq!(path, Path::new("/tmp/out/convertedcat.jpeg"));
    }
}
