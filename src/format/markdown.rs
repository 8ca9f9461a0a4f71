//! Append-only markdown report document.
//!
//! The document is created once per run with its title block and table of
//! contents; sections then append headings, pipe tables and image links in
//! pipeline order.
//!
//! # Example
//!
//! ```ignore
//! use quality_report::format::markdown::ReportDocument;
//!
//! let path = "reports/Quality_Report.md";
//! let doc = ReportDocument::create(path, "Quality", today, &["Subsystems"])?;
//! doc.heading(2, "Subsystems")?;
//! doc.table(&["Subsystem", "Release 242"], &[vec!["Debugger".into(), "4".into()]])?;
//! ```

use crate::error::Result;
use crate::stats::{AlignedTable, ComparisonRecord};
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the image directory created beside the document.
pub const IMAGES_DIR: &str = "images";

/// A markdown report on disk.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    path: PathBuf,
    dir: PathBuf,
}

impl ReportDocument {
    /// Create (or truncate) the document and write its title block.
    ///
    /// `sections` lists the section titles for the table of contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directories or the file cannot be written.
    pub fn create<S: AsRef<str>>(
        path: impl Into<PathBuf>,
        title: &str,
        date: NaiveDate,
        sections: &[S],
    ) -> Result<Self> {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(dir.join(IMAGES_DIR))?;

        let mut header = format!("# {title}\n\n**Date:** {}\n\n", date.format("%Y-%m-%d"));
        if !sections.is_empty() {
            header.push_str(&table_of_contents(sections));
            header.push('\n');
        }
        fs::write(&path, header)?;
        debug!(path = %path.display(), "Created report document");

        Ok(Self { path, dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory charts are written to.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.dir.join(IMAGES_DIR)
    }

    /// Append `markdown` followed by a blank line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn append(&self, markdown: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(markdown.trim_end().as_bytes())?;
        file.write_all(b"\n\n")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn heading(&self, level: usize, text: &str) -> Result<()> {
        self.append(&format!("{} {text}", "#".repeat(level.clamp(1, 6))))
    }

    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn table<H: AsRef<str>>(&self, headers: &[H], rows: &[Vec<String>]) -> Result<()> {
        self.append(&render_table(headers, rows))
    }

    /// Link an image, relative to the document directory when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn image(&self, alt: &str, image: &Path) -> Result<()> {
        let target = image.strip_prefix(&self.dir).unwrap_or(image);
        self.append(&format!("![{alt}]({})", link_path(target)))
    }
}

/// Render a path with `/` separators for a markdown link.
fn link_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir => Some(String::new()),
            Component::CurDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// GitHub-style anchor for a heading.
#[must_use]
pub fn anchor(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c == ' ' {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// `## Table of Contents` with one link per section.
#[must_use]
pub fn table_of_contents<S: AsRef<str>>(sections: &[S]) -> String {
    let mut out = String::from("## Table of Contents\n\n");
    for (index, title) in sections.iter().enumerate() {
        let title = title.as_ref();
        out.push_str(&format!("{}. [{title}](#{})\n", index + 1, anchor(title)));
    }
    out
}

/// Escape a value for a pipe-table cell.
#[must_use]
pub fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render a markdown pipe table.
#[must_use]
pub fn render_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push('|');
    for header in headers {
        out.push_str(&format!(" {} |", escape_cell(header.as_ref())));
    }
    out.push_str("\n|");
    for _ in headers {
        out.push_str(" --- |");
    }
    for row in rows {
        out.push_str("\n|");
        for cell in row {
            out.push_str(&format!(" {} |", escape_cell(cell)));
        }
    }
    out.push('\n');
    out
}

/// Table with one row per reference label and one column per release.
#[must_use]
pub fn counts_table<S: AsRef<str>>(
    label_header: &str,
    labels: &[S],
    aligned: &AlignedTable,
) -> String {
    let mut headers = vec![label_header.to_string()];
    headers.extend(aligned.keys().cloned());

    let rows: Vec<Vec<String>> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mut row = vec![label.as_ref().to_string()];
            row.extend(
                aligned
                    .values()
                    .map(|values| values.get(index).copied().unwrap_or(0).to_string()),
            );
            row
        })
        .collect();

    render_table(&headers, &rows)
}

/// Table of created/fixed records with a `Fixed %` column.
#[must_use]
pub fn comparison_table(category_header: &str, records: &[ComparisonRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.release.clone(),
                record.category.clone(),
                record.created.to_string(),
                record.fixed.to_string(),
                format!("{:.1}%", record.fixed_percent()),
            ]
        })
        .collect();
    render_table(&["Release", category_header, "Created", "Fixed", "Fixed %"], &rows)
}
