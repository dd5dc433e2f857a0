//! Export and import command handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use readlist_core::{CollectionStore, Config, Format, MergeMode, ReadingList};

use crate::output::{Output, OutputFormat};

/// Write the whole list to a file in `dir`
///
/// Without `dir` the configured export directory is used, falling back to
/// the current directory.
pub fn export<S: CollectionStore>(
    list: &ReadingList<S>,
    config: &Config,
    format: Format,
    dir: Option<PathBuf>,
    output: &Output,
) -> Result<PathBuf> {
    let file = list.export(format, Utc::now())?;

    let dir = dir.unwrap_or_else(|| config.export_dir_or_cwd());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

    let path = dir.join(&file.filename);
    fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": "success",
                    "path": path,
                    "format": format,
                    "mime_type": file.mime_type,
                    "records": file.records
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", path.display());
        }
        OutputFormat::Human => {
            output.success(&format!(
                "Exported {} record(s) to {}",
                file.records,
                path.display()
            ));
        }
    }

    Ok(path)
}

/// Import records from a JSON or CSV file
///
/// The format comes from `mime_type` when given, else from the file
/// extension. `mode` falls back to the configured default.
pub fn import<S: CollectionStore>(
    list: &ReadingList<S>,
    config: &Config,
    file: &Path,
    mode: Option<MergeMode>,
    mime_type: Option<&str>,
    output: &Output,
) -> Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = Format::detect(mime_type, &filename)?;

    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {:?}", file))?;

    let mode = mode.unwrap_or(config.default_import_mode);
    let summary = list.import(&text, format, mode)?;

    output.print_import_summary(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use readlist_core::{MemoryStore, ReadingListError, Record, Status};
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn seeded() -> ReadingList<MemoryStore> {
        let mut first = Record::new("https://a.example", "A");
        first.set_comment("has, comma");
        let mut second = Record::new("https://b.example", "B");
        second.set_status(Status::Read);
        ReadingList::new(MemoryStore::with_records(vec![first, second]))
    }

    #[test]
    fn test_export_writes_named_file() {
        let temp_dir = TempDir::new().unwrap();
        let list = seeded();

        let path = export(
            &list,
            &Config::default(),
            Format::Csv,
            Some(temp_dir.path().to_path_buf()),
            &quiet(),
        )
        .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("reading_list_"));
        assert!(name.ends_with(".csv"));

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    }

    #[test]
    fn test_export_uses_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            export_dir: Some(temp_dir.path().join("exports")),
            ..Config::default()
        };

        let path = export(&seeded(), &config, Format::Json, None, &quiet()).unwrap();
        assert!(path.starts_with(temp_dir.path().join("exports")));
        assert!(path.exists());
    }

    #[test]
    fn test_export_empty_list_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let list = ReadingList::new(MemoryStore::new());

        let err = export(
            &list,
            &Config::default(),
            Format::Json,
            Some(temp_dir.path().to_path_buf()),
            &quiet(),
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReadingListError>(),
            Some(ReadingListError::NothingToExport)
        ));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_then_import_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = seeded();
        let path = export(
            &source,
            &Config::default(),
            Format::Csv,
            Some(temp_dir.path().to_path_buf()),
            &quiet(),
        )
        .unwrap();

        let target = ReadingList::new(MemoryStore::new());
        import(&target, &Config::default(), &path, None, None, &quiet()).unwrap();

        assert_eq!(target.store().snapshot(), source.store().snapshot());
    }

    #[test]
    fn test_import_uses_configured_mode() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.json");
        fs::write(&path, r#"[{"url": "https://new.example"}]"#).unwrap();

        let list = seeded();
        let config = Config {
            default_import_mode: MergeMode::Overwrite,
            ..Config::default()
        };
        import(&list, &config, &path, None, None, &quiet()).unwrap();
        assert_eq!(list.count().unwrap(), 1);

        let list = seeded();
        import(&list, &config, &path, Some(MergeMode::Append), None, &quiet()).unwrap();
        assert_eq!(list.count().unwrap(), 3);
    }

    #[test]
    fn test_import_mime_type_overrides_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("download.txt");
        fs::write(&path, "url,status,added_at\nhttps://c.example,read,\n").unwrap();

        let list = ReadingList::new(MemoryStore::new());
        import(&list, &Config::default(), &path, None, None, &quiet()).unwrap_err();

        import(
            &list,
            &Config::default(),
            &path,
            None,
            Some("text/csv"),
            &quiet(),
        )
        .unwrap();
        assert_eq!(list.count().unwrap(), 1);
    }
}
