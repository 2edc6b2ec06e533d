use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::shared::constants::{CONTAINER_EXTENSIONS, IMAGE_EXTENSIONS};

pub fn is_image(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS)
}

pub fn is_container(path: &Path) -> bool {
    has_extension_in(path, CONTAINER_EXTENSIONS)
}

pub fn is_supported(path: &Path) -> bool {
    is_image(path) || is_container(path)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expands a mix of files and directories into a sorted, deduplicated list
/// of supported input files. Directories are walked recursively.
///
/// Unsupported files given explicitly (or invalid paths) are reported via
/// `on_skip`; unsupported files found while walking a directory are ignored
/// silently, matching the expectation that directories contain mixed content.
pub fn collect_supported_inputs(
    inputs: &[PathBuf],
    mut on_skip: impl FnMut(&Path, &str),
) -> Vec<PathBuf> {
    let mut filenames = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_supported(entry.path()) {
                    filenames.push(entry.path().to_path_buf());
                }
            }
        } else if input.is_file() {
            if is_supported(input) {
                filenames.push(input.clone());
            } else {
                on_skip(input, "unsupported file type");
            }
        } else {
            on_skip(input, "invalid path");
        }
    }

    filenames.sort();
    filenames.dedup();
    filenames
}

/// Output path for an input file: output directory + input basename, with
/// the extension swapped when an explicit format override is given.
pub fn output_path_for(input: &Path, output_dir: &Path, format: Option<&str>) -> PathBuf {
    let mut name = PathBuf::from(input.file_name().unwrap_or_default());
    if let Some(ext) = format {
        name.set_extension(ext);
    }
    output_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_extension_discrimination() {
        assert!(is_image(Path::new("photo.JPG")));
        assert!(is_image(Path::new("photo.webp")));
        assert!(!is_image(Path::new("clip.mp4")));
        assert!(is_container(Path::new("clip.mp4")));
        assert!(is_container(Path::new("clip.MKV")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_collect_expands_directories_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        File::create(dir.path().join("a.mp4")).unwrap();
        File::create(sub.join("b.jpg")).unwrap();
        File::create(sub.join("ignore.txt")).unwrap();

        let result = collect_supported_inputs(&[dir.path().to_path_buf()], |_, _| {
            panic!("no skips expected for directory walk")
        });
        assert_eq!(result.len(), 2);
        assert!(result[0].ends_with("a.mp4"));
        assert!(result[1].ends_with("sub/b.jpg"));
    }

    #[test]
    fn test_collect_reports_unsupported_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        File::create(&txt).unwrap();

        let mut skipped = Vec::new();
        let result = collect_supported_inputs(&[txt.clone()], |p, why| {
            skipped.push((p.to_path_buf(), why.to_string()));
        });
        assert!(result.is_empty());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, txt);
    }

    #[test]
    fn test_collect_reports_missing_path() {
        let mut skipped = Vec::new();
        collect_supported_inputs(&[PathBuf::from("/nonexistent/clip.mp4")], |_, why| {
            skipped.push(why.to_string());
        });
        assert_eq!(skipped, vec!["invalid path"]);
    }

    #[test]
    fn test_collect_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp4");
        File::create(&file).unwrap();

        let result = collect_supported_inputs(&[file.clone(), file.clone()], |_, _| {});
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_output_path_preserves_extension_by_default() {
        let out = output_path_for(Path::new("/in/video.mp4"), Path::new("/out"), None);
        assert_eq!(out, PathBuf::from("/out/video.mp4"));
    }

    #[test]
    fn test_output_path_applies_format_override() {
        let out = output_path_for(Path::new("/in/video.avi"), Path::new("/out"), Some("mkv"));
        assert_eq!(out, PathBuf::from("/out/video.mkv"));
    }
}
