use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use framelens_core::{
    DeviceDefinition, DeviceRepository, DeviceStore, Endianness, PayloadFormat, RepositoryError,
    ValidationError, build_report, export_reports, hex_to_bytes, import_into, is_valid_hex_text,
    validate_fields,
};
use glob::glob;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::CliError;
use crate::config::Settings;

pub(crate) struct DecodeArgs {
    pub(crate) device: String,
    pub(crate) input: Option<PathBuf>,
    pub(crate) hex: Option<String>,
    pub(crate) allow_advisory: bool,
    pub(crate) stdout: bool,
    pub(crate) pretty: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn device_list(settings: &Settings) -> Result<(), CliError> {
    let repo = open_read_only(settings);
    if repo.devices().is_empty() {
        eprintln!("No devices in {}", settings.store_path.display());
        return Ok(());
    }
    for device in repo.devices() {
        println!(
            "{}\t{}\t{}\t{} fields\t{} reports",
            device.name,
            device.payload_format,
            device.endian,
            device.fields.len(),
            device.reports.len()
        );
    }
    Ok(())
}

pub(crate) fn device_show(settings: &Settings, name: &str) -> Result<(), CliError> {
    let repo = open_read_only(settings);
    let device = find(&repo, name)?;
    println!("Device: {}", device.name);
    println!("Payload format: {}", device.payload_format);
    println!("Endianness: {}", device.endian);
    println!("Fields:");
    for field in &device.fields {
        println!(
            "  {:>5} {:>5}  {:<11} {:<6} {}",
            field.offset, field.length, field.field_type, field.endian, field.meaning
        );
    }
    println!("Reports: {}", device.reports.len());
    Ok(())
}

pub(crate) fn device_add(
    settings: &Settings,
    name: Option<String>,
    format: PayloadFormat,
    endian: Endianness,
    quiet: bool,
) -> Result<(), CliError> {
    let (store, mut repo) = open_for_update(settings)?;
    let name = name.unwrap_or_else(|| repo.unique_name("Device"));
    let mut device = DeviceDefinition::new(name);
    device.payload_format = format;
    device.endian = endian;
    let name = device.name.trim().to_string();
    repo.add(device).map_err(repository_error)?;
    save(&store, &repo)?;
    if !quiet {
        eprintln!("OK: device '{}' added", name);
    }
    Ok(())
}

pub(crate) fn device_rename(
    settings: &Settings,
    name: &str,
    new_name: &str,
    quiet: bool,
) -> Result<(), CliError> {
    let (store, mut repo) = open_for_update(settings)?;
    repo.rename(name, new_name).map_err(repository_error)?;
    repo.promote(new_name).map_err(repository_error)?;
    save(&store, &repo)?;
    if !quiet {
        eprintln!("OK: device '{}' renamed to '{}'", name, new_name.trim());
    }
    Ok(())
}

pub(crate) fn device_remove(settings: &Settings, name: &str, quiet: bool) -> Result<(), CliError> {
    let (store, mut repo) = open_for_update(settings)?;
    let removed = repo.remove(name).map_err(repository_error)?;
    save(&store, &repo)?;
    if !quiet {
        eprintln!(
            "OK: device '{}' removed ({} reports discarded)",
            removed.name,
            removed.reports.len()
        );
    }
    Ok(())
}

pub(crate) fn schema_validate(settings: &Settings, name: &str) -> Result<(), CliError> {
    let repo = open_read_only(settings);
    let device = find(&repo, name)?;
    let errors = validate_fields(&device.fields);
    print_validation(&errors);
    let blocking = errors.iter().filter(|err| !err.is_advisory()).count();
    if blocking > 0 {
        return Err(CliError::new(
            format!("{} schema problem(s) in device '{}'", blocking, device.name),
            Some("fix offsets, lengths, and types, then validate again".to_string()),
        ));
    }
    println!("Schema OK: {} fields", device.fields.len());
    Ok(())
}

pub(crate) fn schema_import(
    settings: &Settings,
    name: &str,
    file: &Path,
    quiet: bool,
) -> Result<(), CliError> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read schema file: {}", file.display()))?;
    let (store, mut repo) = open_for_update(settings)?;
    let device = repo.get_mut(name).map_err(repository_error)?;
    let count = import_into(&json, device).map_err(|err| {
        CliError::new(
            format!("import failed: {}", err),
            Some(
                "expected a top-level array or a 'Fields' / 'ParsedFields' / 'packet_structure' property"
                    .to_string(),
            ),
        )
    })?;
    let device_name = device.name.clone();
    save(&store, &repo)?;
    if !quiet {
        eprintln!("OK: imported {} fields into device '{}'", count, device_name);
    }
    Ok(())
}

pub(crate) fn decode(settings: &Settings, args: DecodeArgs) -> Result<(), CliError> {
    let (store, mut repo) = open_for_update(settings)?;
    let device = find(&repo, &args.device)?;
    let buffer = read_capture(args.input.as_deref(), args.hex.as_deref(), device.payload_format)?;
    if buffer.is_empty() {
        return Err(CliError::new(
            "no data to decode",
            Some("the capture is empty".to_string()),
        ));
    }
    if device.fields.is_empty() {
        return Err(CliError::new(
            format!("device '{}' has no fields", device.name),
            Some("configure the device first, e.g. with `framelens schema import`".to_string()),
        ));
    }

    let errors = validate_fields(&device.fields);
    let (advisory, blocking): (Vec<_>, Vec<_>) = errors
        .into_iter()
        .partition(|err| args.allow_advisory && err.is_advisory());
    if !blocking.is_empty() {
        let listed: Vec<_> = blocking.iter().map(ToString::to_string).collect();
        return Err(CliError::new(
            format!("Device configuration errors:\n{}", listed.join("\n")),
            Some("run `framelens schema validate` for details".to_string()),
        ));
    }
    for warning in &advisory {
        tracing::warn!(device = %device.name, "{}", warning);
    }

    let report = build_report(&buffer, device, &device.fields, OffsetDateTime::now_utc());
    let device_name = device.name.clone();
    repo.record_report(&device_name, report.clone())
        .map_err(repository_error)?;
    save(&store, &repo)?;

    if args.stdout {
        let json = if args.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .context("JSON serialization failed")?;
        println!("{}", json);
    } else if !args.quiet {
        println!("Raw Data: {}", report.raw_data_hex);
        for field in &report.parsed_fields {
            println!("  {}: {}", field.meaning, field.display_value);
        }
    }
    if !args.quiet {
        eprintln!(
            "OK: parsed {} fields ({} failed) -> report added to '{}'",
            report.parsed_fields.len(),
            report.failed_fields().count(),
            device_name
        );
    }
    Ok(())
}

pub(crate) fn report_list(settings: &Settings, name: &str) -> Result<(), CliError> {
    let repo = open_read_only(settings);
    let device = find(&repo, name)?;
    for (index, report) in device.reports_newest_first().enumerate() {
        let timestamp = report
            .timestamp
            .format(&Rfc3339)
            .context("timestamp formatting failed")?;
        println!(
            "{}\t{}\t{} fields\t{} failed\t{}",
            index + 1,
            timestamp,
            report.parsed_fields.len(),
            report.failed_fields().count(),
            report.raw_data_hex
        );
    }
    Ok(())
}

/// Exports the whole history, or with `index` the single report at that
/// 1-based position of the newest-first listing.
pub(crate) fn report_export(
    settings: &Settings,
    name: &str,
    output: &Path,
    index: Option<usize>,
    quiet: bool,
) -> Result<(), CliError> {
    let repo = open_read_only(settings);
    let device = find(&repo, name)?;
    if device.reports.is_empty() {
        return Err(CliError::new(
            format!("device '{}' has no reports", device.name),
            Some("decode a capture first with `framelens decode`".to_string()),
        ));
    }
    let selected = match index {
        None => device.reports.as_slice(),
        Some(index) => index
            .checked_sub(1)
            .and_then(|skip| device.reports_newest_first().nth(skip))
            .map(std::slice::from_ref)
            .ok_or_else(|| {
                CliError::new(
                    format!(
                        "device '{}' has no report #{} ({} available)",
                        device.name,
                        index,
                        device.reports.len()
                    ),
                    Some("use `framelens report list` to see report numbers".to_string()),
                )
            })?,
    };
    export_reports(selected, output).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("use a .json, .txt, or .csv output path".to_string()),
        )
    })?;
    if !quiet {
        eprintln!(
            "OK: {} reports exported -> {}",
            selected.len(),
            output.display()
        );
    }
    Ok(())
}

pub(crate) fn report_clear(settings: &Settings, name: &str, quiet: bool) -> Result<(), CliError> {
    let (store, mut repo) = open_for_update(settings)?;
    let removed = repo.clear_reports(name).map_err(repository_error)?;
    save(&store, &repo)?;
    if !quiet {
        eprintln!("OK: {} reports cleared", removed);
    }
    Ok(())
}

fn open_read_only(settings: &Settings) -> DeviceRepository {
    let store = DeviceStore::new(&settings.store_path);
    DeviceRepository::from_devices(store.load_or_default())
}

// Mutating commands refuse to start from a store they could not read, so a
// damaged file is never replaced by an empty collection.
fn open_for_update(settings: &Settings) -> Result<(DeviceStore, DeviceRepository), CliError> {
    let store = DeviceStore::new(&settings.store_path);
    let devices = store.load().map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("repair or move the store file, or pass --store".to_string()),
        )
    })?;
    Ok((store, DeviceRepository::from_devices(devices)))
}

fn save(store: &DeviceStore, repo: &DeviceRepository) -> Result<(), CliError> {
    store
        .save(repo.devices())
        .map_err(|err| CliError::new(err.to_string(), None))
}

fn find<'a>(repo: &'a DeviceRepository, name: &str) -> Result<&'a DeviceDefinition, CliError> {
    repo.find(name).ok_or_else(|| {
        CliError::new(
            format!("device '{}' not found", name),
            Some("use `framelens device list` to see configured devices".to_string()),
        )
    })
}

fn repository_error(err: RepositoryError) -> CliError {
    let hint = match err {
        RepositoryError::NotFound(_) => Some("use `framelens device list` to see configured devices"),
        RepositoryError::DuplicateName(_) => Some("device names are case-insensitive; pick another"),
        RepositoryError::EmptyName => None,
    };
    CliError::new(err.to_string(), hint.map(str::to_string))
}

fn print_validation(errors: &[ValidationError]) {
    for err in errors {
        let label = if err.is_advisory() { "warning" } else { "problem" };
        println!("{}: {}", label, err);
    }
}

// Inline hex for a hex-dump device stays text, so the report pipeline
// performs the one and only unwrap.
fn read_capture(
    input: Option<&Path>,
    hex: Option<&str>,
    payload_format: PayloadFormat,
) -> Result<Vec<u8>, CliError> {
    if let Some(text) = hex {
        if !is_valid_hex_text(text) {
            return Err(CliError::new(
                "invalid --hex value",
                Some("expected an even number of hex digits, optionally space/dash separated".to_string()),
            ));
        }
        return Ok(match payload_format {
            PayloadFormat::HexDump => text.trim().as_bytes().to_vec(),
            PayloadFormat::Binary => hex_to_bytes(text),
        });
    }
    let input = input.ok_or_else(|| {
        CliError::new(
            "missing capture input",
            Some("pass a capture file or --hex".to_string()),
        )
    })?;
    let path = resolve_input_path(input)?;
    if !path.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", path.display()),
            Some("pass a file holding one captured frame".to_string()),
        ));
    }
    // Owned copy: the pipeline never sees a buffer that is still being written.
    let bytes = fs::read(&path)
        .with_context(|| format!("Failed to read capture: {}", path.display()))?;
    Ok(bytes)
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }
    let mut captures = glob_files(&pattern)?;
    if captures.len() > 1 {
        return Err(CliError::new(
            format!("pattern '{}' matches {} captures", pattern, captures.len()),
            Some(format!(
                "decode one capture per run, e.g. {}",
                captures[0].display()
            )),
        ));
    }
    captures.pop().ok_or_else(|| {
        CliError::new(
            format!("no capture matches pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )
    })
}

// Regular files only, in the order glob yields them.
fn glob_files(pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let invalid = |detail: String| {
        CliError::new(format!("invalid input pattern '{}'", pattern), Some(detail))
    };
    glob(pattern)
        .map_err(|err| invalid(err.msg.to_string()))?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(Ok(path)),
            Ok(_) => None,
            Err(err) => Some(Err(invalid(err.to_string()))),
        })
        .collect()
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
