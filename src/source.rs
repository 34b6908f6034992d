// src/source.rs

use crate::error::{ReportError, ReportResult};
use crate::model::Meet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Turns the raw bytes of one result file into a meet.
pub trait MeetParser {
    /// File extension (without the dot) this parser understands.
    fn extension(&self) -> &str;

    fn parse(&self, origin: &str, bytes: &[u8]) -> ReportResult<Meet>;
}

/// Meet files stored as JSON documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMeetParser;

impl MeetParser for JsonMeetParser {
    fn extension(&self) -> &str {
        "json"
    }

    fn parse(&self, origin: &str, bytes: &[u8]) -> ReportResult<Meet> {
        serde_json::from_slice(bytes).map_err(|source| ReportError::Json {
            origin: origin.to_string(),
            source,
        })
    }
}

/// A result file found on disk, either loose or inside a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultFile {
    Loose(PathBuf),
    Archived { archive: PathBuf, member: String },
}

impl ResultFile {
    pub fn origin(&self) -> String {
        match self {
            ResultFile::Loose(path) => path.display().to_string(),
            ResultFile::Archived { archive, member } => format!("{}!{}", archive.display(), member),
        }
    }

    pub fn read(&self) -> ReportResult<Vec<u8>> {
        match self {
            ResultFile::Loose(path) => fs::read(path).map_err(|e| ReportError::io(path, e)),
            ResultFile::Archived { archive, member } => {
                let mut zip = open_archive(archive)?;
                let mut file = zip.by_name(member).map_err(|source| ReportError::Archive {
                    path: archive.clone(),
                    source,
                })?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)
                    .map_err(|e| ReportError::io(archive, e))?;
                Ok(bytes)
            }
        }
    }

    fn sort_key(&self) -> (&Path, &str) {
        match self {
            ResultFile::Loose(path) => (path.as_path(), ""),
            ResultFile::Archived { archive, member } => (archive.as_path(), member.as_str()),
        }
    }
}

/// Recursively collects every result file under `root` that `parser` can
/// read, looking inside `.zip` archives too. Sorted by path, then member.
///
/// Symbolic links are not followed, so a link back into the tree cannot
/// make the same meet show up twice.
pub fn discover(root: &Path, parser: &dyn MeetParser) -> ReportResult<Vec<ResultFile>> {
    let extension = parser.extension();
    let mut found = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(path, "zip") {
            archive_members(path, extension, &mut found)?;
        } else if has_extension(path, extension) {
            found.push(ResultFile::Loose(path.to_path_buf()));
        }
    }

    found.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    debug!(root = %root.display(), files = found.len(), "discovered result files");
    Ok(found)
}

fn archive_members(path: &Path, extension: &str, found: &mut Vec<ResultFile>) -> ReportResult<()> {
    let mut zip = open_archive(path)?;
    for i in 0..zip.len() {
        let member = zip.by_index(i).map_err(|source| ReportError::Archive {
            path: path.to_path_buf(),
            source,
        })?;
        if member.is_file() && has_extension(Path::new(member.name()), extension) {
            found.push(ResultFile::Archived {
                archive: path.to_path_buf(),
                member: member.name().to_string(),
            });
        }
    }
    Ok(())
}

fn open_archive(path: &Path) -> ReportResult<zip::ZipArchive<File>> {
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    zip::ZipArchive::new(file).map_err(|source| ReportError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(extension))
}

/// Reads and parses `files` one at a time, in order.
pub fn load_meets<'a>(
    files: &'a [ResultFile],
    parser: &'a dyn MeetParser,
) -> impl Iterator<Item = ReportResult<Meet>> + 'a {
    files.iter().map(move |file| {
        let origin = file.origin();
        debug!(file = %origin, "parsing meet file");
        let bytes = file.read()?;
        parser.parse(&origin, &bytes)
    })
}
