use crate::core::FileInfo;
use colored::Colorize;
use comfy_table::Table;

pub fn display_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "Info:".cyan(), message);
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

pub fn file_table(entries: &[FileInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Size", "Modified", "Name"]);
    for entry in entries {
        let (kind, size) = if entry.is_dir() {
            ("dir", String::new())
        } else {
            ("file", format_size(entry.size))
        };
        table.add_row(vec![
            kind.to_string(),
            size,
            entry.last_modified.clone().unwrap_or_default(),
            entry.filename.clone(),
        ]);
    }
    table
}

pub fn display_file_info(info: &FileInfo) {
    println!("{:>10}  {}", "path:".bold(), info.path);
    println!("{:>10}  {}", "type:".bold(), if info.is_dir() { "directory" } else { "file" });
    if info.is_file() {
        println!("{:>10}  {} ({} bytes)", "size:".bold(), format_size(info.size), info.size);
    }
    if let Some(mime) = &info.mime {
        println!("{:>10}  {}", "mime:".bold(), mime);
    }
    if let Some(modified) = &info.last_modified {
        println!("{:>10}  {}", "modified:".bold(), modified);
    }
}
